use crate::error::ApiError;
use crate::models::{
    Category, Content, ContentPatch, CreateCategoryRequest, NewContent, NewUser, User,
};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Repository Trait
///
/// The abstract contract for all persistence operations: the credential
/// store, the category store and the content store behind one seam. Handlers
/// interact with the data layer through this trait only, so the concrete
/// implementation (Postgres in production, in-memory in tests) is swappable.
///
/// Each store exclusively owns its collection; single-record writes are
/// atomic, and no multi-record transaction is offered across stores.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users (Credential Store) ---
    async fn create_user(&self, user: NewUser) -> Result<User, ApiError>;
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, ApiError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ApiError>;
    /// Duplicate pre-check for registration: matches on either field.
    async fn find_user_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<User>, ApiError>;

    // --- Categories (Category Store) ---
    async fn create_category(&self, req: CreateCategoryRequest) -> Result<Category, ApiError>;
    async fn get_categories(&self) -> Result<Vec<Category>, ApiError>;
    async fn get_category(&self, id: Uuid) -> Result<Option<Category>, ApiError>;

    // --- Contents (Content Store) ---
    async fn create_content(&self, content: NewContent) -> Result<Content, ApiError>;
    async fn get_content(&self, id: Uuid) -> Result<Option<Content>, ApiError>;
    /// All content rows, newest first, raw foreign keys unresolved.
    async fn get_contents(&self) -> Result<Vec<Content>, ApiError>;
    /// Applies the mutable fields of the patch. Returns None if the row
    /// does not exist. Ownership is checked by the caller, not here.
    async fn update_content(
        &self,
        id: Uuid,
        patch: ContentPatch,
    ) -> Result<Option<Content>, ApiError>;
    /// Removes and returns the row, or None if it does not exist.
    async fn delete_content(&self, id: Uuid) -> Result<Option<Content>, ApiError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the
/// application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The production implementation of the `Repository` trait, backed by
/// PostgreSQL. All queries use bound parameters; unique-constraint
/// violations are mapped to ConflictError by `ApiError::from`.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str = "id, username, email, password_hash, role";
const CATEGORY_COLUMNS: &str = "id, name, cover_image, allow_images, allow_videos, allow_texts";
const CONTENT_COLUMNS: &str = "id, title, kind, payload, category_id, creator_id, created_at";

#[async_trait]
impl Repository for PostgresRepository {
    async fn create_user(&self, user: NewUser) -> Result<User, ApiError> {
        let sql = format!(
            "INSERT INTO users (id, username, email, password_hash, role) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"
        );
        let created = sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<User>, ApiError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1 OR email = $2");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn create_category(&self, req: CreateCategoryRequest) -> Result<Category, ApiError> {
        let sql = format!(
            "INSERT INTO categories (id, name, cover_image, allow_images, allow_videos, allow_texts) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {CATEGORY_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Category>(&sql)
            .bind(Uuid::new_v4())
            .bind(&req.name)
            .bind(&req.cover_image)
            .bind(req.allow_images)
            .bind(req.allow_videos)
            .bind(req.allow_texts)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn get_categories(&self) -> Result<Vec<Category>, ApiError> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY name ASC");
        let categories = sqlx::query_as::<_, Category>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(categories)
    }

    async fn get_category(&self, id: Uuid) -> Result<Option<Category>, ApiError> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1");
        let category = sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(category)
    }

    async fn create_content(&self, content: NewContent) -> Result<Content, ApiError> {
        let sql = format!(
            "INSERT INTO contents (id, title, kind, payload, category_id, creator_id, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, NOW()) RETURNING {CONTENT_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Content>(&sql)
            .bind(Uuid::new_v4())
            .bind(&content.title)
            .bind(content.kind)
            .bind(&content.payload)
            .bind(content.category_id)
            .bind(content.creator_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn get_content(&self, id: Uuid) -> Result<Option<Content>, ApiError> {
        let sql = format!("SELECT {CONTENT_COLUMNS} FROM contents WHERE id = $1");
        let content = sqlx::query_as::<_, Content>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(content)
    }

    async fn get_contents(&self) -> Result<Vec<Content>, ApiError> {
        let sql = format!("SELECT {CONTENT_COLUMNS} FROM contents ORDER BY created_at DESC");
        let contents = sqlx::query_as::<_, Content>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(contents)
    }

    async fn update_content(
        &self,
        id: Uuid,
        patch: ContentPatch,
    ) -> Result<Option<Content>, ApiError> {
        // COALESCE keeps unpatched columns untouched; category_id, creator_id
        // and created_at are simply never part of the SET list.
        let sql = format!(
            "UPDATE contents \
             SET title = COALESCE($2, title), \
                 kind = COALESCE($3, kind), \
                 payload = COALESCE($4, payload) \
             WHERE id = $1 RETURNING {CONTENT_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Content>(&sql)
            .bind(id)
            .bind(patch.title)
            .bind(patch.kind)
            .bind(patch.payload)
            .fetch_optional(&self.pool)
            .await?;
        Ok(updated)
    }

    async fn delete_content(&self, id: Uuid) -> Result<Option<Content>, ApiError> {
        let sql = format!("DELETE FROM contents WHERE id = $1 RETURNING {CONTENT_COLUMNS}");
        let removed = sqlx::query_as::<_, Content>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(removed)
    }
}

/// MemoryRepository
///
/// In-process implementation of the `Repository` trait with the same
/// semantics (uniqueness, immutable references, newest-first listing).
/// Backs the integration test suite so the full HTTP surface can be
/// exercised without a database.
#[derive(Default)]
pub struct MemoryRepository {
    users: Mutex<Vec<User>>,
    categories: Mutex<Vec<Category>>,
    contents: Mutex<Vec<Content>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn create_user(&self, user: NewUser) -> Result<User, ApiError> {
        let mut users = self.users.lock().unwrap();
        if users
            .iter()
            .any(|u| u.username == user.username || u.email == user.email)
        {
            return Err(ApiError::Conflict(
                "username or email already exists".to_string(),
            ));
        }
        let created = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<User>, ApiError> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|u| u.username == username || u.email == email)
            .cloned())
    }

    async fn create_category(&self, req: CreateCategoryRequest) -> Result<Category, ApiError> {
        let mut categories = self.categories.lock().unwrap();
        if categories.iter().any(|c| c.name == req.name) {
            return Err(ApiError::Conflict(
                "category name already exists".to_string(),
            ));
        }
        let created = Category {
            id: Uuid::new_v4(),
            name: req.name,
            cover_image: req.cover_image,
            allow_images: req.allow_images,
            allow_videos: req.allow_videos,
            allow_texts: req.allow_texts,
        };
        categories.push(created.clone());
        Ok(created)
    }

    async fn get_categories(&self) -> Result<Vec<Category>, ApiError> {
        let mut categories = self.categories.lock().unwrap().clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn get_category(&self, id: Uuid) -> Result<Option<Category>, ApiError> {
        let categories = self.categories.lock().unwrap();
        Ok(categories.iter().find(|c| c.id == id).cloned())
    }

    async fn create_content(&self, content: NewContent) -> Result<Content, ApiError> {
        let mut contents = self.contents.lock().unwrap();
        let created = Content {
            id: Uuid::new_v4(),
            title: content.title,
            kind: content.kind,
            payload: content.payload,
            category_id: content.category_id,
            creator_id: content.creator_id,
            created_at: Utc::now(),
        };
        contents.push(created.clone());
        Ok(created)
    }

    async fn get_content(&self, id: Uuid) -> Result<Option<Content>, ApiError> {
        let contents = self.contents.lock().unwrap();
        Ok(contents.iter().find(|c| c.id == id).cloned())
    }

    async fn get_contents(&self) -> Result<Vec<Content>, ApiError> {
        let mut contents = self.contents.lock().unwrap().clone();
        contents.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(contents)
    }

    async fn update_content(
        &self,
        id: Uuid,
        patch: ContentPatch,
    ) -> Result<Option<Content>, ApiError> {
        let mut contents = self.contents.lock().unwrap();
        let Some(content) = contents.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        if let Some(title) = patch.title {
            content.title = title;
        }
        if let Some(kind) = patch.kind {
            content.kind = kind;
        }
        if let Some(payload) = patch.payload {
            content.payload = payload;
        }
        Ok(Some(content.clone()))
    }

    async fn delete_content(&self, id: Uuid) -> Result<Option<Content>, ApiError> {
        let mut contents = self.contents.lock().unwrap();
        let index = contents.iter().position(|c| c.id == id);
        Ok(index.map(|i| contents.remove(i)))
    }
}
