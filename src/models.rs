use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;

// --- Closed Enumerations ---

/// Role
///
/// The closed role set. Fixed at registration; self-registration may only
/// produce Reader or Creator, Admin accounts are provisioned out-of-band.
/// Stored as the Postgres `user_role` enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, TS, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
#[ts(export)]
pub enum Role {
    Admin,
    Reader,
    Creator,
}

impl Role {
    /// Parses a registration role string. Only READER and CREATOR are
    /// accepted here: ADMIN (or anything else) is a validation failure
    /// rather than a deserialization failure, so the client sees a 400.
    pub fn from_registration(value: &str) -> Result<Self, ApiError> {
        match value {
            "READER" => Ok(Role::Reader),
            "CREATOR" => Ok(Role::Creator),
            _ => Err(ApiError::Validation(
                "invalid role, must be READER or CREATOR".to_string(),
            )),
        }
    }
}

/// ContentKind
///
/// The media type of a content record. Stored as the Postgres
/// `content_kind` enum type, serialized as "image" | "video" | "text".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "content_kind", rename_all = "lowercase")]
#[ts(export)]
pub enum ContentKind {
    Image,
    Video,
    Text,
}

impl ContentKind {
    pub fn parse(value: &str) -> Result<Self, ApiError> {
        match value {
            "image" => Ok(ContentKind::Image),
            "video" => Ok(ContentKind::Video),
            "text" => Ok(ContentKind::Text),
            _ => Err(ApiError::Validation(
                "invalid content type, must be image, video or text".to_string(),
            )),
        }
    }
}

// --- Storage Rows (Mapped to Database) ---

/// User
///
/// The canonical user row from the `users` table. Deliberately *not*
/// serializable: the password hash must never reach the wire, so every
/// response path goes through [`PublicUser`] instead.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// NewUser
///
/// Insert payload for the credential store. The password arrives here
/// already hashed; the authentication service is the only producer.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Category
///
/// A named content bucket with three independent per-media-type permission
/// flags. Serves as both the storage row and the wire representation, since
/// the category carries nothing sensitive.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub cover_image: String,
    pub allow_images: bool,
    pub allow_videos: bool,
    pub allow_texts: bool,
}

impl Category {
    /// The single cross-entity permission check of the system: does this
    /// category allow the given content kind?
    pub fn permits(&self, kind: ContentKind) -> bool {
        match kind {
            ContentKind::Image => self.allow_images,
            ContentKind::Video => self.allow_videos,
            ContentKind::Text => self.allow_texts,
        }
    }
}

/// Content
///
/// A content row with raw foreign keys. This is what the store returns;
/// reference resolution into [`ContentResponse`] happens as an explicit
/// presentation-mapping step in the list handler, keeping the storage and
/// wire representations distinct.
#[derive(Debug, Clone, Serialize, FromRow, TS, ToSchema)]
#[ts(export)]
pub struct Content {
    pub id: Uuid,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ContentKind,
    /// URL for image/video content, raw text for text content.
    pub payload: String,
    #[serde(rename = "category")]
    pub category_id: Uuid,
    #[serde(rename = "creator")]
    pub creator_id: Uuid,
    #[serde(rename = "createdAt")]
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// NewContent
///
/// Insert payload produced by the content workflow after the category
/// permission check has passed. `creator_id` always comes from the
/// authenticated identity, never from the request body.
#[derive(Debug, Clone)]
pub struct NewContent {
    pub title: String,
    pub kind: ContentKind,
    pub payload: String,
    pub category_id: Uuid,
    pub creator_id: Uuid,
}

/// ContentPatch
///
/// The mutable subset of a content record. The immutable fields
/// (category, creator, createdAt) have no representation here; the
/// handler rejects attempts to supply them before this struct is built.
#[derive(Debug, Clone, Default)]
pub struct ContentPatch {
    pub title: Option<String>,
    pub kind: Option<ContentKind>,
    pub payload: Option<String>,
}

// --- Request Payloads (Input Schemas) ---

/// RegisterRequest
///
/// Input for POST /api/register. The role arrives as a plain string so the
/// closed-set check yields a ValidationError rather than a decode failure.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

/// LoginRequest
///
/// Input for POST /api/login.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// CreateCategoryRequest
///
/// Input for POST /api/categories (admin only). Unspecified flags default
/// to false, matching the storage defaults.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub cover_image: String,
    #[serde(default)]
    pub allow_images: bool,
    #[serde(default)]
    pub allow_videos: bool,
    #[serde(default)]
    pub allow_texts: bool,
}

/// CreateContentRequest
///
/// Input for POST /api/content. `url` carries the payload for image/video
/// kinds, `text` for text kinds; the workflow selects whichever matches the
/// requested type and rejects the request if it is missing.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CreateContentRequest {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Identifier of the target category.
    pub category: Uuid,
}

/// UpdateContentRequest
///
/// Partial update payload for PUT /api/content/{id}. Only title/type/url/
/// text are mutable. `category`, `creator` and `createdAt` are listed so
/// that an attempt to change them is rejected explicitly with a
/// ValidationError instead of being silently dropped.
#[derive(Debug, Clone, Serialize, Deserialize, Default, TS, ToSchema)]
#[ts(export)]
pub struct UpdateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    // Immutable references. Present only so the handler can reject them.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(type = "unknown")]
    #[schema(value_type = Object)]
    pub category: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(type = "unknown")]
    #[schema(value_type = Object)]
    pub creator: Option<serde_json::Value>,

    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    #[ts(type = "unknown")]
    #[schema(value_type = Object)]
    pub created_at: Option<serde_json::Value>,
}

// --- Response Schemas (Output) ---

/// PublicUser
///
/// The wire representation of a user: everything except the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
        }
    }
}

/// AuthResponse
///
/// Output of register and login: the created/authenticated user plus a
/// signed bearer token bound to their identifier.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AuthResponse {
    pub user: PublicUser,
    pub token: String,
}

/// ContentCreator
///
/// Display form of a content's creator: id and username only.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ContentCreator {
    pub id: Uuid,
    pub username: String,
}

/// ContentResponse
///
/// Enriched content record for GET /api/content: the raw foreign keys are
/// resolved into the inline category object and the creator's display form.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ContentResponse {
    pub id: Uuid,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ContentKind,
    pub payload: String,
    pub category: Category,
    pub creator: ContentCreator,
    #[serde(rename = "createdAt")]
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}
