use utoipa::openapi::security::HttpAuthScheme;
use utoipa::openapi::security::HttpBuilder;
use utoipa::openapi::security::SecurityScheme;
use utoipa::Modify;
use utoipa::OpenApi;

use super::handlers::create_user::CreateUserRequest;
use super::handlers::create_user::UserResponseData;
use super::handlers::healthcheck::HealthResponseData;
use super::handlers::me::MeResponseData;
use super::handlers::MessageResponse;

#[derive(OpenApi)]
#[openapi(
    info(title = "API service", description = "User registration and lookup behind bearer authentication"),
    paths(
        super::handlers::root::root,
        super::handlers::root::api_root,
        super::handlers::me::me,
        super::handlers::create_user::create_user,
        super::handlers::find_user::find_user,
        super::handlers::healthcheck::healthcheck,
    ),
    components(schemas(
        CreateUserRequest,
        UserResponseData,
        MeResponseData,
        MessageResponse,
        HealthResponseData
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "greeting", description = "Hello world endpoints"),
        (name = "users", description = "User registration and lookup"),
        (name = "health", description = "Dependency healthcheck, served on its own port")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
