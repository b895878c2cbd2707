use std::collections::HashMap;

use crate::{
    AppState,
    auth::{self, AuthUser},
    error::ApiError,
    models::{
        AuthResponse, Category, Content, ContentCreator, ContentKind, ContentPatch,
        ContentResponse, CreateCategoryRequest, CreateContentRequest, LoginRequest, NewContent,
        NewUser, PublicUser, RegisterRequest, Role, UpdateContentRequest,
    },
    policy::{self, Action},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

fn require_non_empty(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

// --- Authentication Handlers ---

/// register
///
/// [Public Route] Creates a new user account. Only READER and CREATOR may
/// self-register; ADMIN accounts are provisioned out-of-band, so requesting
/// the ADMIN role is a validation failure, not an authorization one.
///
/// On success the password is stored only as a salted Argon2id hash and the
/// response carries a signed bearer token bound to the new identifier.
#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registered", body = AuthResponse),
        (status = 400, description = "Invalid role or empty field"),
        (status = 409, description = "Username or email already exists")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let role = Role::from_registration(&payload.role)?;
    require_non_empty("username", &payload.username)?;
    require_non_empty("email", &payload.email)?;
    require_non_empty("password", &payload.password)?;

    if state
        .repo
        .find_user_by_username_or_email(&payload.username, &payload.email)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(
            "username or email already exists".to_string(),
        ));
    }

    let password_hash = auth::hash_password(&payload.password)?;
    let user = state
        .repo
        .create_user(NewUser {
            username: payload.username,
            email: payload.email,
            password_hash,
            role,
        })
        .await?;

    let token = auth::issue_token(user.id, &state.config.jwt_secret)?;
    tracing::info!(user_id = %user.id, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: user.into(),
            token,
        }),
    ))
}

/// login
///
/// [Public Route] Verifies credentials and issues a fresh bearer token.
/// Unknown email and wrong password fail identically, so the endpoint
/// cannot be used to probe which accounts exist.
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = state
        .repo
        .find_user_by_email(&payload.email)
        .await?
        .ok_or_else(|| ApiError::Authentication("invalid credentials".to_string()))?;

    if !auth::verify_password(&payload.password, &user.password_hash) {
        return Err(ApiError::Authentication("invalid credentials".to_string()));
    }

    let token = auth::issue_token(user.id, &state.config.jwt_secret)?;

    Ok(Json(AuthResponse {
        user: user.into(),
        token,
    }))
}

/// get_profile
///
/// [Authenticated Route] Returns the authenticated user's own record, with
/// the password hash excluded by construction.
#[utoipa::path(
    get,
    path = "/api/profile",
    responses(
        (status = 200, description = "Profile", body = PublicUser),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "User no longer exists")
    )
)]
pub async fn get_profile(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<PublicUser>, ApiError> {
    let user = state
        .repo
        .get_user(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".to_string()))?;
    Ok(Json(user.into()))
}

// --- Category Handlers ---

/// create_category
///
/// [Admin Route] Creates a content category with its per-media-type
/// permission flags. Role enforcement goes through the policy table.
#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Created", body = Category),
        (status = 403, description = "Admin only"),
        (status = 409, description = "Category name already exists")
    )
)]
pub async fn create_category(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    policy::authorize(&user, Action::CreateCategory, None)?;
    require_non_empty("name", &payload.name)?;
    require_non_empty("coverImage", &payload.cover_image)?;

    let category = state.repo.create_category(payload).await?;
    tracing::info!(category_id = %category.id, "category created");

    Ok((StatusCode::CREATED, Json(category)))
}

/// get_categories
///
/// [Authenticated Route] Lists all categories for any authenticated role.
#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "Categories", body = [Category]),
        (status = 401, description = "Authentication required")
    )
)]
pub async fn get_categories(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, ApiError> {
    policy::authorize(&user, Action::ReadCategories, None)?;
    let categories = state.repo.get_categories().await?;
    Ok(Json(categories))
}

// --- Content Workflow Handlers ---

/// create_content
///
/// [Creator/Admin Route] The content creation workflow:
/// 1. the policy must allow CreateContent for the identity's role;
/// 2. the target category must exist (404 otherwise);
/// 3. the category's allow-flag matching the requested type must be set
///    (400 otherwise); the flag is checked once, at creation time only;
/// 4. the record is persisted attributed to the authenticated creator.
///
/// The check and the insert are not one transaction; a category deleted
/// in between is accepted as a best-effort race, per the storage model.
#[utoipa::path(
    post,
    path = "/api/content",
    request_body = CreateContentRequest,
    responses(
        (status = 201, description = "Created", body = Content),
        (status = 400, description = "Type not permitted for this category"),
        (status = 403, description = "Readers cannot create content"),
        (status = 404, description = "Category not found")
    )
)]
pub async fn create_content(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateContentRequest>,
) -> Result<(StatusCode, Json<Content>), ApiError> {
    policy::authorize(&user, Action::CreateContent, None)?;
    require_non_empty("title", &payload.title)?;
    let kind = ContentKind::parse(&payload.kind)?;

    let category = state
        .repo
        .get_category(payload.category)
        .await?
        .ok_or_else(|| ApiError::NotFound("category not found".to_string()))?;

    if !category.permits(kind) {
        return Err(ApiError::Validation(
            "this content type is not permitted for this category".to_string(),
        ));
    }

    // One payload column serves both shapes: a URL for media, raw text
    // for text entries.
    let body = match kind {
        ContentKind::Image | ContentKind::Video => payload
            .url
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| {
                ApiError::Validation("a url is required for image and video content".to_string())
            })?,
        ContentKind::Text => payload
            .text
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                ApiError::Validation("a text body is required for text content".to_string())
            })?,
    };

    let content = state
        .repo
        .create_content(NewContent {
            title: payload.title,
            kind,
            payload: body,
            category_id: category.id,
            creator_id: user.id,
        })
        .await?;
    tracing::info!(content_id = %content.id, creator_id = %user.id, "content created");

    Ok((StatusCode::CREATED, Json(content)))
}

/// get_contents
///
/// [Authenticated Route] Lists all content records with their references
/// resolved for display: the category object inline and the creator reduced
/// to id plus username. The store hands back raw foreign keys; this mapping
/// step is the only place they are expanded.
#[utoipa::path(
    get,
    path = "/api/content",
    responses(
        (status = 200, description = "Contents", body = [ContentResponse]),
        (status = 401, description = "Authentication required")
    )
)]
pub async fn get_contents(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<ContentResponse>>, ApiError> {
    policy::authorize(&user, Action::ReadContent, None)?;

    let contents = state.repo.get_contents().await?;
    let categories: HashMap<Uuid, Category> = state
        .repo
        .get_categories()
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();

    let mut creator_names: HashMap<Uuid, String> = HashMap::new();
    let mut resolved = Vec::with_capacity(contents.len());

    for content in contents {
        let Some(category) = categories.get(&content.category_id).cloned() else {
            // Categories are not deletable through the API; a dangling
            // reference means direct store intervention. Skip the row.
            tracing::warn!(
                content_id = %content.id,
                category_id = %content.category_id,
                "content references a missing category"
            );
            continue;
        };

        let username = match creator_names.get(&content.creator_id) {
            Some(name) => name.clone(),
            None => {
                let name = state
                    .repo
                    .get_user(content.creator_id)
                    .await?
                    .map(|u| u.username)
                    .unwrap_or_else(|| "unknown".to_string());
                creator_names.insert(content.creator_id, name.clone());
                name
            }
        };

        resolved.push(ContentResponse {
            id: content.id,
            title: content.title,
            kind: content.kind,
            payload: content.payload,
            category,
            creator: ContentCreator {
                id: content.creator_id,
                username,
            },
            created_at: content.created_at,
        });
    }

    Ok(Json(resolved))
}

/// update_content
///
/// [Creator/Admin Route] Partially updates a content record. The ownership
/// rule lives in the policy: a Creator may only touch their own records,
/// an Admin may touch any. The category, creator and createdAt references
/// are immutable; supplying them is rejected outright.
///
/// Payload fields obey the same pairing as creation: `url` for image/video,
/// `text` for text, judged against the record's post-patch type. Switching
/// between the media and text shapes requires the matching payload field.
#[utoipa::path(
    put,
    path = "/api/content/{id}",
    params(("id" = Uuid, Path, description = "Content ID")),
    request_body = UpdateContentRequest,
    responses(
        (status = 200, description = "Updated", body = Content),
        (status = 400, description = "Immutable field in patch"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_content(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateContentRequest>,
) -> Result<Json<Content>, ApiError> {
    let content = state
        .repo
        .get_content(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("content not found".to_string()))?;

    policy::authorize(&user, Action::UpdateContent, Some(content.creator_id))?;

    if payload.category.is_some() || payload.creator.is_some() || payload.created_at.is_some() {
        return Err(ApiError::Validation(
            "category, creator and createdAt cannot be changed".to_string(),
        ));
    }
    if payload.url.is_some() && payload.text.is_some() {
        return Err(ApiError::Validation(
            "provide either url or text, not both".to_string(),
        ));
    }
    if let Some(title) = &payload.title {
        require_non_empty("title", title)?;
    }
    if let Some(url) = &payload.url {
        require_non_empty("url", url)?;
    }
    if let Some(text) = &payload.text {
        require_non_empty("text", text)?;
    }

    let kind = match &payload.kind {
        Some(raw) => Some(ContentKind::parse(raw)?),
        None => None,
    };

    // The payload field must pair with the record's type after the patch,
    // the same check creation applies. A patch that moves the record
    // between the media and text shapes must carry the matching field.
    let effective_kind = kind.unwrap_or(content.kind);
    let was_text = content.kind == ContentKind::Text;
    let body = match effective_kind {
        ContentKind::Image | ContentKind::Video => {
            if payload.text.is_some() {
                return Err(ApiError::Validation(
                    "a url carries the payload for image and video content".to_string(),
                ));
            }
            if was_text && payload.url.is_none() {
                return Err(ApiError::Validation(
                    "a url is required for image and video content".to_string(),
                ));
            }
            payload.url
        }
        ContentKind::Text => {
            if payload.url.is_some() {
                return Err(ApiError::Validation(
                    "a text body carries the payload for text content".to_string(),
                ));
            }
            if !was_text && payload.text.is_none() {
                return Err(ApiError::Validation(
                    "a text body is required for text content".to_string(),
                ));
            }
            payload.text
        }
    };

    let patch = ContentPatch {
        title: payload.title,
        kind,
        payload: body,
    };

    let updated = state
        .repo
        .update_content(id, patch)
        .await?
        .ok_or_else(|| ApiError::NotFound("content not found".to_string()))?;

    Ok(Json(updated))
}

/// delete_content
///
/// [Admin Route] Removes a content record and returns it.
#[utoipa::path(
    delete,
    path = "/api/content/{id}",
    params(("id" = Uuid, Path, description = "Content ID")),
    responses(
        (status = 200, description = "Deleted", body = Content),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_content(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Content>, ApiError> {
    policy::authorize(&user, Action::DeleteContent, None)?;

    let removed = state
        .repo
        .delete_content(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("content not found".to_string()))?;
    tracing::info!(content_id = %removed.id, "content deleted");

    Ok(Json(removed))
}
