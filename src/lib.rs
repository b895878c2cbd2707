use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod policy;
pub mod repository;

// Routing segregation (public vs. token-protected).
pub mod routes;
use auth::AuthUser;
use routes::{authenticated, public};

// --- Public Re-exports ---

// Makes core state types easily accessible to the binary and the test suite.
pub use config::AppConfig;
pub use error::ApiError;
pub use repository::{MemoryRepository, PostgresRepository, RepositoryState};

/// ApiDoc
///
/// Auto-generates the OpenAPI documentation for the application. It
/// aggregates every handler decorated with `#[utoipa::path]` plus the
/// request/response schemas, and the resulting JSON is served at
/// `/api-docs/openapi.json` behind the Swagger UI.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::register,
        handlers::login,
        handlers::get_profile,
        handlers::create_category,
        handlers::get_categories,
        handlers::create_content,
        handlers::get_contents,
        handlers::update_content,
        handlers::delete_content,
    ),
    components(schemas(
        models::Role,
        models::ContentKind,
        models::PublicUser,
        models::AuthResponse,
        models::RegisterRequest,
        models::LoginRequest,
        models::Category,
        models::CreateCategoryRequest,
        models::Content,
        models::CreateContentRequest,
        models::UpdateContentRequest,
        models::ContentCreator,
        models::ContentResponse,
        error::ErrorBody,
    )),
    tags(
        (name = "content-portal", description = "Role-aware content sharing API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, thread-safe, immutable container holding the persistence
/// layer and configuration, shared across all incoming requests.
#[derive(Clone)]
pub struct AppState {
    /// Repository layer: credential, category and content stores.
    pub repo: RepositoryState,
    /// The loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// Allow extractors (notably AuthUser) to pull individual components out of
// the shared AppState.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Enforces authentication for the protected routes. `AuthUser` implements
/// `FromRequestParts`, so if token resolution fails the extractor rejects
/// the request with 401 before the handler executes; on success the request
/// simply proceeds (handlers re-extract the identity they need).
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the routing structure, applies global and scoped middleware,
/// and registers the application state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        // Documentation: auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public routes: no middleware applied.
        .merge(public::public_routes())
        // Protected routes: bearer token required before anything runs.
        .merge(
            authenticated::authenticated_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )
        .with_state(state);

    // Observability and correlation layers, outermost first.
    base_router
        .layer(
            ServiceBuilder::new()
                // Unique request id per incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // Wrap the request/response lifecycle in a tracing span
                // correlated by that id.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // Return the generated x-request-id header to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Customizes span creation for `TraceLayer`: includes the x-request-id
/// header (when present) next to the HTTP method and URI so every log line
/// of a request shares one correlation id.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
