//! Loan ledger HTTP handlers.
//!
//! ```text
//! POST /api/v1/loans            (borrower asks for an available item)
//! POST /api/v1/loans/lend       (owner hands the item out with a due date)
//! PUT  /api/v1/loans/{id}/return
//! GET  /api/v1/loans/borrowed
//! GET  /api/v1/loans/lent
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::{
    DirectLendRequest, LoanSummary, RequestBorrowRequest, ReturnLoanRequest, ReturnTarget,
};
use crate::domain::{DueStatus, Error, ItemId, Loan, LoanId, LoanStatus, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid};

/// Request body for a borrower-initiated borrow.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRequestBody {
    #[schema(format = "uuid")]
    pub item_id: String,
}

/// Request body for an owner-initiated lend.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LendRequestBody {
    #[schema(format = "uuid")]
    pub item_id: String,
    #[schema(format = "uuid")]
    pub borrower_id: String,
    /// Loan duration in whole days, 1 to 365.
    pub days: i64,
}

/// Loan payload returned by the two open transitions.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoanResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: Uuid,
    #[schema(value_type = String, format = "uuid")]
    pub item_id: Uuid,
    #[schema(value_type = String, format = "uuid")]
    pub borrower_id: Uuid,
    #[schema(value_type = String, example = "active")]
    pub status: LoanStatus,
    #[schema(format = "date-time")]
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(format = "date-time")]
    pub due_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(format = "date-time")]
    pub returned_at: Option<DateTime<Utc>>,
}

impl From<&Loan> for LoanResponse {
    fn from(value: &Loan) -> Self {
        Self {
            id: *value.id().as_uuid(),
            item_id: *value.item_id().as_uuid(),
            borrower_id: *value.borrower().as_uuid(),
            status: value.status(),
            created_at: value.created_at(),
            due_at: value.due_at(),
            returned_at: value.returned_at(),
        }
    }
}

/// Joined loan row returned by the two listing endpoints.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoanSummaryResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: Uuid,
    #[schema(value_type = String, format = "uuid")]
    pub item_id: Uuid,
    pub item_title: String,
    #[schema(value_type = String, format = "uuid")]
    pub counterparty_id: Uuid,
    pub counterparty_name: String,
    #[schema(value_type = String, example = "active")]
    pub status: LoanStatus,
    #[schema(format = "date-time")]
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(format = "date-time")]
    pub due_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(format = "date-time")]
    pub returned_at: Option<DateTime<Utc>>,
    /// Ceiling of whole days until due; absent for open-ended loans.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_remaining: Option<i64>,
    pub due_status: DueStatus,
}

impl From<LoanSummary> for LoanSummaryResponse {
    fn from(value: LoanSummary) -> Self {
        Self {
            id: *value.id.as_uuid(),
            item_id: *value.item_id.as_uuid(),
            item_title: value.item_title,
            counterparty_id: *value.counterparty.as_uuid(),
            counterparty_name: value.counterparty_name,
            status: value.status,
            created_at: value.created_at,
            due_at: value.due_at,
            returned_at: value.returned_at,
            days_remaining: value.days_remaining,
            due_status: value.due_status,
        }
    }
}

/// Borrow an available item; the resulting loan is open-ended.
#[utoipa::path(
    post,
    path = "/api/v1/loans",
    request_body = BorrowRequestBody,
    responses(
        (status = 201, description = "Loan opened", body = LoanResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Item not found", body = Error),
        (status = 409, description = "Item already on loan", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["loans"],
    operation_id = "requestBorrow"
)]
#[post("/loans")]
pub async fn request_borrow(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<BorrowRequestBody>,
) -> ApiResult<HttpResponse> {
    let borrower = session.require_user_id()?;
    let item_id =
        ItemId::from_uuid(parse_uuid(&payload.item_id, FieldName::new("itemId"))?);
    let loan = state
        .loans
        .request_borrow(RequestBorrowRequest { borrower, item_id })
        .await?;
    Ok(HttpResponse::Created().json(LoanResponse::from(&loan)))
}

/// Lend an item the caller owns to a chosen borrower with a due date.
#[utoipa::path(
    post,
    path = "/api/v1/loans/lend",
    request_body = LendRequestBody,
    responses(
        (status = 201, description = "Loan opened", body = LoanResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Item not found", body = Error),
        (status = 409, description = "Item already on loan", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["loans"],
    operation_id = "directLend"
)]
#[post("/loans/lend")]
pub async fn direct_lend(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LendRequestBody>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let body = payload.into_inner();
    let item_id = ItemId::from_uuid(parse_uuid(&body.item_id, FieldName::new("itemId"))?);
    let borrower =
        UserId::from_uuid(parse_uuid(&body.borrower_id, FieldName::new("borrowerId"))?);
    let loan = state
        .loans
        .direct_lend(DirectLendRequest {
            actor,
            item_id,
            borrower,
            days: body.days,
        })
        .await?;
    Ok(HttpResponse::Created().json(LoanResponse::from(&loan)))
}

/// Close an active loan, addressed by the loan's id.
#[utoipa::path(
    put,
    path = "/api/v1/loans/{id}/return",
    params(("id" = String, Path, format = "uuid", description = "Loan identifier")),
    responses(
        (status = 204, description = "Loan closed and item released"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Loan not found or not active", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["loans"],
    operation_id = "returnLoan"
)]
#[put("/loans/{id}/return")]
pub async fn return_loan(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let loan_id = LoanId::from_uuid(parse_uuid(&path.into_inner(), FieldName::new("id"))?);
    state
        .loans
        .return_loan(ReturnLoanRequest {
            actor,
            target: ReturnTarget::Loan(loan_id),
        })
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// List loans where the caller is the borrower.
#[utoipa::path(
    get,
    path = "/api/v1/loans/borrowed",
    responses(
        (status = 200, description = "Borrowed loans", body = [LoanSummaryResponse]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["loans"],
    operation_id = "listBorrowed"
)]
#[get("/loans/borrowed")]
pub async fn list_borrowed(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<LoanSummaryResponse>>> {
    let user = session.require_user_id()?;
    let loans = state.loans_query.borrowed_by(&user).await?;
    Ok(web::Json(
        loans.into_iter().map(LoanSummaryResponse::from).collect(),
    ))
}

/// List loans against items the caller owns, active and returned alike.
#[utoipa::path(
    get,
    path = "/api/v1/loans/lent",
    responses(
        (status = 200, description = "Lent loans", body = [LoanSummaryResponse]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["loans"],
    operation_id = "listLent"
)]
#[get("/loans/lent")]
pub async fn list_lent(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<LoanSummaryResponse>>> {
    let user = session.require_user_id()?;
    let loans = state.loans_query.lent_by(&user).await?;
    Ok(web::Json(
        loans.into_iter().map(LoanSummaryResponse::from).collect(),
    ))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{App, test as actix_test, web};
    use chrono::Duration;
    use serde_json::Value;

    use super::*;
    use crate::domain::ports::{
        FixtureLoginService, FixtureUsersQuery, MockItemRegistry, MockLoanCommand, MockLoanQuery,
    };

    fn state_with(loans: MockLoanCommand, loans_query: MockLoanQuery) -> HttpState {
        HttpState::new(
            Arc::new(FixtureLoginService),
            Arc::new(FixtureUsersQuery),
            Arc::new(MockItemRegistry::new()),
            Arc::new(loans),
            Arc::new(loans_query),
        )
    }

    fn test_app(
        state: HttpState,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .wrap(crate::inbound::http::test_utils::test_session_middleware())
            .app_data(web::Data::new(state))
            .route(
                "/test-login/{id}",
                web::get().to(
                    |session: SessionContext, path: web::Path<String>| async move {
                        let id = UserId::parse(path.into_inner()).expect("fixture id");
                        session.persist_user(&id)?;
                        Ok::<_, Error>(HttpResponse::Ok())
                    },
                ),
            )
            .service(
                web::scope("/api/v1")
                    .service(request_borrow)
                    .service(direct_lend)
                    .service(return_loan)
                    .service(list_borrowed)
                    .service(list_lent),
            )
    }

    async fn session_cookie(
        app: &impl actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
        user: &UserId,
    ) -> actix_web::cookie::Cookie<'static> {
        let response = actix_test::call_service(
            app,
            actix_test::TestRequest::get()
                .uri(&format!("/test-login/{user}"))
                .to_request(),
        )
        .await;
        response
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie")
            .into_owned()
    }

    #[actix_web::test]
    async fn borrow_returns_the_opened_loan() {
        let borrower = UserId::random();
        let item_id = ItemId::random();
        let mut loans = MockLoanCommand::new();
        loans
            .expect_request_borrow()
            .times(1)
            .return_once(move |request| {
                Ok(Loan::open_request(
                    request.item_id,
                    request.borrower,
                    chrono::Utc::now(),
                ))
            });

        let app = actix_test::init_service(test_app(state_with(loans, MockLoanQuery::new())))
            .await;
        let cookie = session_cookie(&app, &borrower).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/loans")
                .cookie(cookie)
                .set_json(&BorrowRequestBody {
                    item_id: item_id.to_string(),
                })
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), actix_web::http::StatusCode::CREATED);
        let body = actix_test::read_body(response).await;
        let value: Value = serde_json::from_slice(&body).expect("loan payload");
        assert_eq!(
            value.get("itemId").and_then(Value::as_str),
            Some(item_id.to_string().as_str())
        );
        assert_eq!(value.get("status").and_then(Value::as_str), Some("active"));
        assert!(value.get("dueAt").is_none());
    }

    #[actix_web::test]
    async fn borrow_rejects_malformed_item_ids_before_the_port() {
        let mut loans = MockLoanCommand::new();
        loans.expect_request_borrow().times(0);

        let app = actix_test::init_service(test_app(state_with(loans, MockLoanQuery::new())))
            .await;
        let cookie = session_cookie(&app, &UserId::random()).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/loans")
                .cookie(cookie)
                .set_json(&BorrowRequestBody {
                    item_id: "not-a-uuid".into(),
                })
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn lend_passes_days_through_to_the_port() {
        let owner = UserId::random();
        let borrower = UserId::random();
        let item_id = ItemId::random();
        let mut loans = MockLoanCommand::new();
        loans
            .expect_direct_lend()
            .times(1)
            .withf(move |request| request.days == 14)
            .return_once(move |request| {
                let duration =
                    crate::domain::LoanDuration::from_days(request.days).expect("valid days");
                Ok(Loan::open_lend(
                    request.item_id,
                    request.borrower,
                    duration,
                    chrono::Utc::now(),
                ))
            });

        let app = actix_test::init_service(test_app(state_with(loans, MockLoanQuery::new())))
            .await;
        let cookie = session_cookie(&app, &owner).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/loans/lend")
                .cookie(cookie)
                .set_json(&LendRequestBody {
                    item_id: item_id.to_string(),
                    borrower_id: borrower.to_string(),
                    days: 14,
                })
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), actix_web::http::StatusCode::CREATED);
        let body = actix_test::read_body(response).await;
        let value: Value = serde_json::from_slice(&body).expect("loan payload");
        assert!(value.get("dueAt").is_some());
    }

    #[actix_web::test]
    async fn return_by_loan_targets_the_loan_id() {
        let loan_id = LoanId::random();
        let mut loans = MockLoanCommand::new();
        loans
            .expect_return_loan()
            .times(1)
            .withf(move |request| request.target == ReturnTarget::Loan(loan_id))
            .return_once(|_| Ok(()));

        let app = actix_test::init_service(test_app(state_with(loans, MockLoanQuery::new())))
            .await;
        let cookie = session_cookie(&app, &UserId::random()).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::put()
                .uri(&format!("/api/v1/loans/{loan_id}/return"))
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), actix_web::http::StatusCode::NO_CONTENT);
    }

    #[actix_web::test]
    async fn borrowed_listing_serialises_due_status() {
        let borrower = UserId::random();
        let owner = UserId::random();
        let now = chrono::Utc::now();
        let summary = LoanSummary {
            id: LoanId::random(),
            item_id: ItemId::random(),
            item_title: "Breath of the Wild".to_owned(),
            counterparty: owner,
            counterparty_name: "Robin".to_owned(),
            status: LoanStatus::Active,
            created_at: now - Duration::days(5),
            due_at: Some(now - Duration::days(1)),
            returned_at: None,
            days_remaining: Some(-1),
            due_status: DueStatus::Overdue,
        };

        let mut loans_query = MockLoanQuery::new();
        loans_query
            .expect_borrowed_by()
            .times(1)
            .return_once(move |_| Ok(vec![summary]));

        let app = actix_test::init_service(test_app(state_with(
            MockLoanCommand::new(),
            loans_query,
        )))
        .await;
        let cookie = session_cookie(&app, &borrower).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/loans/borrowed")
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert!(response.status().is_success());
        let body = actix_test::read_body(response).await;
        let value: Value = serde_json::from_slice(&body).expect("loans payload");
        let first = &value.as_array().expect("array")[0];
        assert_eq!(
            first.get("dueStatus").and_then(Value::as_str),
            Some("overdue")
        );
        assert_eq!(
            first.get("daysRemaining").and_then(Value::as_i64),
            Some(-1)
        );
        assert_eq!(
            first.get("counterpartyName").and_then(Value::as_str),
            Some("Robin")
        );
    }

    #[actix_web::test]
    async fn listings_require_a_session() {
        let app = actix_test::init_service(test_app(state_with(
            MockLoanCommand::new(),
            MockLoanQuery::new(),
        )))
        .await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/loans/lent")
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), actix_web::http::StatusCode::UNAUTHORIZED);
    }
}
