//! Item registry HTTP handlers.
//!
//! ```text
//! GET    /api/v1/items?owner=<uuid>
//! POST   /api/v1/items
//! DELETE /api/v1/items/{id}
//! PUT    /api/v1/items/{id}/return
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::{
    ItemSummary, ListItemsRequest, RegisterItemRequest, RemoveItemRequest, ReturnLoanRequest,
    ReturnTarget,
};
use crate::domain::{
    Availability, Error, Item, ItemId, ItemMetadata, ItemValidationError, Title, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid};

/// Request body for registering an item.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterItemBody {
    pub title: String,
    pub platform: Option<String>,
    pub cover_url: Option<String>,
}

/// Item payload returned by every item endpoint.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: Uuid,
    #[schema(value_type = String, format = "uuid")]
    pub owner_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
    pub title: String,
    pub platform: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    #[schema(value_type = String, example = "available")]
    pub availability: Availability,
    #[schema(format = "date-time")]
    pub created_at: DateTime<Utc>,
}

impl From<ItemSummary> for ItemResponse {
    fn from(value: ItemSummary) -> Self {
        Self {
            id: *value.id.as_uuid(),
            owner_id: *value.owner.as_uuid(),
            owner_name: Some(value.owner_name),
            title: value.title,
            platform: value.platform,
            cover_url: value.cover_url,
            availability: value.availability,
            created_at: value.created_at,
        }
    }
}

impl From<&Item> for ItemResponse {
    fn from(value: &Item) -> Self {
        Self {
            id: *value.id().as_uuid(),
            owner_id: *value.owner().as_uuid(),
            owner_name: None,
            title: value.title().to_string(),
            platform: value.metadata().platform_or_default().to_owned(),
            cover_url: value.metadata().cover_url.clone(),
            availability: value.availability(),
            created_at: value.created_at(),
        }
    }
}

/// Query parameters for listing items.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListItemsQuery {
    /// Restrict the listing to items owned by this user.
    pub owner: Option<String>,
}

fn map_title_error(err: ItemValidationError) -> Error {
    Error::invalid_request(err.to_string())
        .with_details(json!({ "field": "title", "code": "invalid_title" }))
}

/// List items, optionally filtered to one owner.
#[utoipa::path(
    get,
    path = "/api/v1/items",
    params(ListItemsQuery),
    responses(
        (status = 200, description = "Items", body = [ItemResponse]),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["items"],
    operation_id = "listItems"
)]
#[get("/items")]
pub async fn list_items(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ListItemsQuery>,
) -> ApiResult<web::Json<Vec<ItemResponse>>> {
    session.require_user_id()?;
    let owner = query
        .into_inner()
        .owner
        .map(|raw| parse_uuid(&raw, FieldName::new("owner")).map(UserId::from_uuid))
        .transpose()?;
    let items = state.items.list_items(ListItemsRequest { owner }).await?;
    Ok(web::Json(items.into_iter().map(ItemResponse::from).collect()))
}

/// Register an item owned by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/items",
    request_body = RegisterItemBody,
    responses(
        (status = 201, description = "Item registered", body = ItemResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["items"],
    operation_id = "registerItem"
)]
#[post("/items")]
pub async fn register_item(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RegisterItemBody>,
) -> ApiResult<HttpResponse> {
    let owner = session.require_user_id()?;
    let body = payload.into_inner();
    let title = Title::new(body.title).map_err(map_title_error)?;
    let item = state
        .items
        .register_item(RegisterItemRequest {
            owner,
            title,
            metadata: ItemMetadata {
                platform: body.platform,
                cover_url: body.cover_url,
            },
        })
        .await?;
    Ok(HttpResponse::Created().json(ItemResponse::from(&item)))
}

/// Remove an item the caller owns, provided it is not on loan.
#[utoipa::path(
    delete,
    path = "/api/v1/items/{id}",
    params(("id" = String, Path, format = "uuid", description = "Item identifier")),
    responses(
        (status = 204, description = "Item removed"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Item is on loan", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["items"],
    operation_id = "removeItem"
)]
#[delete("/items/{id}")]
pub async fn remove_item(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let item_id = ItemId::from_uuid(parse_uuid(&path.into_inner(), FieldName::new("id"))?);
    state
        .items
        .remove_item(RemoveItemRequest { actor, item_id })
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Close the active loan on an item, addressed by the item's id.
#[utoipa::path(
    put,
    path = "/api/v1/items/{id}/return",
    params(("id" = String, Path, format = "uuid", description = "Item identifier")),
    responses(
        (status = 204, description = "Loan closed and item released"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "No active loan on this item", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["items"],
    operation_id = "returnItem"
)]
#[put("/items/{id}/return")]
pub async fn return_item(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let item_id = ItemId::from_uuid(parse_uuid(&path.into_inner(), FieldName::new("id"))?);
    state
        .loans
        .return_loan(ReturnLoanRequest {
            actor,
            target: ReturnTarget::Item(item_id),
        })
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{App, test as actix_test, web};
    use serde_json::Value;

    use super::*;
    use crate::domain::ports::{
        FixtureLoginService, FixtureUsersQuery, MockItemRegistry, MockLoanCommand, MockLoanQuery,
    };
    use crate::inbound::http::session::SessionContext;

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
                        Ok::<_, Error>(actix_web::HttpResponse::Ok())
                    },
                ),
            )
            .service(
                web::scope("/api/v1")
                    .service(list_items)
                    .service(register_item)
                    .service(remove_item)
                    .service(return_item),
            )
    }

    fn state_with(items: MockItemRegistry, loans: MockLoanCommand) -> HttpState {
        HttpState::new(
            Arc::new(FixtureLoginService),
            Arc::new(FixtureUsersQuery),
            Arc::new(items),
            Arc::new(loans),
            Arc::new(MockLoanQuery::new()),
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
    async fn register_rejects_blank_titles() {
        let mut items = MockItemRegistry::new();
        items.expect_register_item().times(0);
        let app = actix_test::init_service(test_app(state_with(items, MockLoanCommand::new())))
            .await;
        let user = UserId::random();
        let cookie = session_cookie(&app, &user).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/items")
                .cookie(cookie)
                .set_json(&RegisterItemBody {
                    title: "   ".into(),
                    platform: None,
                    cover_url: None,
                })
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn register_returns_created_item_with_defaulted_platform() {
        let owner = UserId::random();
        let mut items = MockItemRegistry::new();
        items.expect_register_item().times(1).return_once(|request| {
            Ok(Item::register(
                request.owner,
                request.title,
                request.metadata,
                chrono::Utc::now(),
            ))
        });

        let app = actix_test::init_service(test_app(state_with(items, MockLoanCommand::new())))
            .await;
        let cookie = session_cookie(&app, &owner).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/items")
                .cookie(cookie)
                .set_json(&RegisterItemBody {
                    title: "Tears of the Kingdom".into(),
                    platform: None,
                    cover_url: None,
                })
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), actix_web::http::StatusCode::CREATED);
        let body = actix_test::read_body(response).await;
        let value: Value = serde_json::from_slice(&body).expect("item payload");
        assert_eq!(
            value.get("platform").and_then(Value::as_str),
            Some("Nintendo Switch")
        );
        assert_eq!(
            value.get("availability").and_then(Value::as_str),
            Some("available")
        );
        assert_eq!(
            value.get("ownerId").and_then(Value::as_str),
            Some(owner.to_string().as_str())
        );
    }

    #[actix_web::test]
    async fn list_rejects_malformed_owner_filter() {
        let mut items = MockItemRegistry::new();
        items.expect_list_items().times(0);
        let app = actix_test::init_service(test_app(state_with(items, MockLoanCommand::new())))
            .await;
        let cookie = session_cookie(&app, &UserId::random()).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/items?owner=not-a-uuid")
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn remove_returns_no_content() {
        let mut items = MockItemRegistry::new();
        items.expect_remove_item().times(1).return_once(|_| Ok(()));
        let app = actix_test::init_service(test_app(state_with(items, MockLoanCommand::new())))
            .await;
        let cookie = session_cookie(&app, &UserId::random()).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&format!("/api/v1/items/{}", ItemId::random()))
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), actix_web::http::StatusCode::NO_CONTENT);
    }

    #[actix_web::test]
    async fn return_by_item_targets_the_item_id() {
        let item_id = ItemId::random();
        let mut loans = MockLoanCommand::new();
        loans
            .expect_return_loan()
            .times(1)
            .withf(move |request| request.target == ReturnTarget::Item(item_id))
            .return_once(|_| Ok(()));

        let app = actix_test::init_service(test_app(state_with(MockItemRegistry::new(), loans)))
            .await;
        let cookie = session_cookie(&app, &UserId::random()).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::put()
                .uri(&format!("/api/v1/items/{item_id}/return"))
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), actix_web::http::StatusCode::NO_CONTENT);
    }

    #[actix_web::test]
    async fn endpoints_require_a_session() {
        let app = actix_test::init_service(test_app(state_with(
            MockItemRegistry::new(),
            MockLoanCommand::new(),
        )))
        .await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/api/v1/items").to_request(),
        )
        .await;
        assert_eq!(response.status(), actix_web::http::StatusCode::UNAUTHORIZED);
    }
}
