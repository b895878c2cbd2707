#![allow(dead_code)]

use content_portal::{
    AppConfig, AppState, MemoryRepository, RepositoryState, auth, create_router,
    models::{AuthResponse, NewUser, Role},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use uuid::Uuid;

/// A running application instance bound to an ephemeral port, backed by the
/// in-memory repository so the whole HTTP surface can be exercised without
/// a database.
pub struct TestApp {
    pub address: String,
    pub repo: RepositoryState,
    pub config: AppConfig,
}

pub async fn spawn_app() -> TestApp {
    let repo = Arc::new(MemoryRepository::new()) as RepositoryState;
    let config = AppConfig::default();

    let state = AppState {
        repo: repo.clone(),
        config: config.clone(),
    };
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp {
        address,
        repo,
        config,
    }
}

/// Registers a user through the public endpoint and returns the response
/// body (public user plus bearer token). Panics on a non-201 outcome.
pub async fn register(
    app: &TestApp,
    client: &reqwest::Client,
    username: &str,
    role: &str,
) -> AuthResponse {
    let response = client
        .post(format!("{}/api/register", app.address))
        .json(&serde_json::json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": format!("{username}-password"),
            "role": role,
        }))
        .send()
        .await
        .expect("register request failed");
    assert_eq!(response.status(), 201, "registration should succeed");
    response.json().await.expect("invalid register response")
}

/// Admin accounts are provisioned out-of-band, so tests seed one directly
/// through the store and mint a token for it.
pub async fn seed_admin(app: &TestApp) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    let user = app
        .repo
        .create_user(NewUser {
            username: format!("admin-{suffix}"),
            email: format!("admin-{suffix}@example.com"),
            password_hash: auth::hash_password("admin-password").unwrap(),
            role: Role::Admin,
        })
        .await
        .expect("failed to seed admin");
    auth::issue_token(user.id, &app.config.jwt_secret).unwrap()
}

/// Creates a category as an admin and returns its JSON representation.
pub async fn create_category(
    app: &TestApp,
    client: &reqwest::Client,
    admin_token: &str,
    name: &str,
    allow_images: bool,
    allow_videos: bool,
    allow_texts: bool,
) -> serde_json::Value {
    let response = client
        .post(format!("{}/api/categories", app.address))
        .bearer_auth(admin_token)
        .json(&serde_json::json!({
            "name": name,
            "coverImage": "https://example.com/cover.png",
            "allowImages": allow_images,
            "allowVideos": allow_videos,
            "allowTexts": allow_texts,
        }))
        .send()
        .await
        .expect("category request failed");
    assert_eq!(response.status(), 201, "category creation should succeed");
    response.json().await.expect("invalid category response")
}
