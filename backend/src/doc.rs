//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct that generates the OpenAPI specification
//! for the REST API: every HTTP endpoint from the inbound layer, the shared
//! error and domain schemas, and the session cookie security scheme. The
//! generated document backs Swagger UI in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{DueStatus, Error, ErrorCode, User};
use crate::inbound::http::items::{ItemResponse, RegisterItemBody};
use crate::inbound::http::loans::{
    BorrowRequestBody, LendRequestBody, LoanResponse, LoanSummaryResponse,
};
use crate::inbound::http::users::LoginRequest;

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Cartshare backend API",
        description = "HTTP interface for the peer-to-peer game-cartridge lending tracker."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::login,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::current_user,
        crate::inbound::http::items::list_items,
        crate::inbound::http::items::register_item,
        crate::inbound::http::items::remove_item,
        crate::inbound::http::items::return_item,
        crate::inbound::http::loans::request_borrow,
        crate::inbound::http::loans::direct_lend,
        crate::inbound::http::loans::return_loan,
        crate::inbound::http::loans::list_borrowed,
        crate::inbound::http::loans::list_lent,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        User,
        DueStatus,
        LoginRequest,
        ItemResponse,
        RegisterItemBody,
        BorrowRequestBody,
        LendRequestBody,
        LoanResponse,
        LoanSummaryResponse,
    )),
    tags(
        (name = "users", description = "Login and user directory"),
        (name = "items", description = "Cartridge registration and listing"),
        (name = "loans", description = "Loan lifecycle and listings"),
        (name = "health", description = "Service health probes")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use utoipa::OpenApi;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    use super::*;

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn error_schema_has_required_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get("Error").expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
    }

    #[test]
    fn every_lending_endpoint_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/login",
            "/api/v1/users",
            "/api/v1/users/me",
            "/api/v1/items",
            "/api/v1/items/{id}",
            "/api/v1/items/{id}/return",
            "/api/v1/loans",
            "/api/v1/loans/lend",
            "/api/v1/loans/{id}/return",
            "/api/v1/loans/borrowed",
            "/api/v1/loans/lent",
            "/healthz/ready",
            "/healthz/live",
        ] {
            assert!(
                doc.paths.paths.contains_key(path),
                "missing documented path: {path}"
            );
        }
    }
}
