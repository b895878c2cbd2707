use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, put},
};

/// Authenticated Router Module
///
/// Every route here requires a resolved identity: the `AuthUser` extractor
/// middleware rejects the request with 401 before the handler runs. Role
/// restrictions beyond "authenticated" (admin-only category creation and
/// deletion, creator ownership on update) are enforced inside the handlers
/// through the policy table, keeping this module a plain route map.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /api/profile
        // The authenticated user's own record, password hash excluded.
        .route("/api/profile", get(handlers::get_profile))
        // GET/POST /api/categories
        // Listing is open to any authenticated role; creation is ADMIN-only
        // (policy-checked in the handler).
        .route(
            "/api/categories",
            get(handlers::get_categories).post(handlers::create_category),
        )
        // GET/POST /api/content
        // Listing resolves category and creator references for display.
        // Creation runs the category permission workflow and is limited to
        // ADMIN and CREATOR.
        .route(
            "/api/content",
            get(handlers::get_contents).post(handlers::create_content),
        )
        // PUT/DELETE /api/content/{id}
        // Update: ADMIN any record, CREATOR own records only.
        // Delete: ADMIN only. Both return the affected record.
        .route(
            "/api/content/{id}",
            put(handlers::update_content).delete(handlers::delete_content),
        )
}
