//! Database repository for CRUD operations.
//!
//! Uses prepared statements and transactions for data integrity. Document
//! writes are last-write-wins; there is no version check.

use chrono::{Duration, SecondsFormat, Utc};
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{
    CreateDocumentRequest, Document, Profile, Session, UpdateDocumentRequest,
    UpdateProfileRequest, User,
};

const DOCUMENT_COLUMNS: &str =
    "id, title, emoji, excerpt, content, tags, is_public, owner_id, created_at, updated_at";

const PROFILE_COLUMNS: &str = "id, username, full_name, bio, website, github_url, twitter_url, linkedin_url, avatar_url, updated_at";

/// Current time as a fixed-width RFC 3339 string, so text ordering matches time ordering.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== USER OPERATIONS ====================

    /// Create a user together with its profile row.
    pub async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        full_name: Option<&str>,
    ) -> Result<User, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = timestamp_now();

        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO users (id, email, password_hash, created_at) VALUES (?, ?, ?, ?)")
            .bind(&id)
            .bind(email)
            .bind(password_hash)
            .bind(&now)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db) = &e {
                    if db.is_unique_violation() {
                        return AppError::Conflict("User already registered".to_string());
                    }
                }
                AppError::from(e)
            })?;

        sqlx::query("INSERT INTO profiles (id, full_name, updated_at) VALUES (?, ?, ?)")
            .bind(&id)
            .bind(full_name)
            .bind(&now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(User {
            id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
        })
    }

    /// Get a user by (normalized) email.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query(
            "SELECT id, email, password_hash, created_at FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    /// Get a user by ID.
    pub async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query("SELECT id, email, password_hash, created_at FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    // ==================== SESSION OPERATIONS ====================

    /// Open a new session for a user.
    pub async fn create_session(&self, user_id: &str, ttl: Duration) -> Result<Session, AppError> {
        let token = new_session_token();
        let created = Utc::now();
        let created_at = created.to_rfc3339_opts(SecondsFormat::Micros, true);
        let expires_at = (created + ttl).to_rfc3339_opts(SecondsFormat::Micros, true);

        sqlx::query(
            "INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&token)
        .bind(user_id)
        .bind(&created_at)
        .bind(&expires_at)
        .execute(&self.pool)
        .await?;

        Ok(Session {
            token,
            user_id: user_id.to_string(),
            created_at,
            expires_at,
        })
    }

    /// Get an unexpired session by token.
    pub async fn get_session(&self, token: &str) -> Result<Option<Session>, AppError> {
        let row = sqlx::query(
            "SELECT token, user_id, created_at, expires_at FROM sessions WHERE token = ? AND expires_at > ?",
        )
        .bind(token)
        .bind(timestamp_now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| Session {
            token: row.get("token"),
            user_id: row.get("user_id"),
            created_at: row.get("created_at"),
            expires_at: row.get("expires_at"),
        }))
    }

    /// Delete a session. Deleting an unknown token is not an error.
    pub async fn delete_session(&self, token: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Remove every expired session, returning how many were removed.
    pub async fn purge_expired_sessions(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(timestamp_now())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    // ==================== PROFILE OPERATIONS ====================

    /// Get a profile by user ID.
    pub async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = ?"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(profile_from_row))
    }

    /// Insert or fully replace a user's profile.
    pub async fn upsert_profile(
        &self,
        user_id: &str,
        request: &UpdateProfileRequest,
    ) -> Result<Profile, AppError> {
        let now = timestamp_now();

        sqlx::query(
            r#"INSERT INTO profiles (
                id, username, full_name, bio, website, github_url, twitter_url,
                linkedin_url, avatar_url, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                username = excluded.username,
                full_name = excluded.full_name,
                bio = excluded.bio,
                website = excluded.website,
                github_url = excluded.github_url,
                twitter_url = excluded.twitter_url,
                linkedin_url = excluded.linkedin_url,
                avatar_url = excluded.avatar_url,
                updated_at = excluded.updated_at"#,
        )
        .bind(user_id)
        .bind(&request.username)
        .bind(&request.full_name)
        .bind(&request.bio)
        .bind(&request.website)
        .bind(&request.github_url)
        .bind(&request.twitter_url)
        .bind(&request.linkedin_url)
        .bind(&request.avatar_url)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(Profile {
            id: user_id.to_string(),
            username: request.username.clone(),
            full_name: request.full_name.clone(),
            bio: request.bio.clone(),
            website: request.website.clone(),
            github_url: request.github_url.clone(),
            twitter_url: request.twitter_url.clone(),
            linkedin_url: request.linkedin_url.clone(),
            avatar_url: request.avatar_url.clone(),
            updated_at: Some(now),
        })
    }

    // ==================== DOCUMENT OPERATIONS ====================

    /// List documents visible to a user, newest first.
    pub async fn list_visible_documents(&self, viewer_id: &str) -> Result<Vec<Document>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE is_public = 1 OR owner_id = ? ORDER BY created_at DESC, rowid DESC"
        ))
        .bind(viewer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(document_from_row).collect())
    }

    /// List a user's own documents, most recently updated first.
    pub async fn list_documents_by_owner(&self, owner_id: &str) -> Result<Vec<Document>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE owner_id = ? ORDER BY updated_at DESC, rowid DESC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(document_from_row).collect())
    }

    /// List every document.
    pub async fn list_all_documents(&self) -> Result<Vec<Document>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents ORDER BY created_at DESC, rowid DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(document_from_row).collect())
    }

    /// Get a document by ID.
    pub async fn get_document(&self, id: &str) -> Result<Option<Document>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(document_from_row))
    }

    /// Count a user's documents.
    pub async fn count_documents_by_owner(&self, owner_id: &str) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM documents WHERE owner_id = ?")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }

    /// Create a document. The request is expected to be normalized already.
    pub async fn create_document(
        &self,
        owner_id: &str,
        request: &CreateDocumentRequest,
    ) -> Result<Document, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = timestamp_now();
        let tags_json = serde_json::to_string(&request.tags)?;

        sqlx::query(&format!(
            "INSERT INTO documents ({DOCUMENT_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(&id)
        .bind(&request.title)
        .bind(&request.emoji)
        .bind(&request.excerpt)
        .bind(&request.content)
        .bind(&tags_json)
        .bind(request.is_public as i32)
        .bind(owner_id)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(Document {
            id,
            title: request.title.clone(),
            emoji: request.emoji.clone(),
            excerpt: request.excerpt.clone(),
            content: request.content.clone(),
            tags: request.tags.clone(),
            created_at: now.clone(),
            updated_at: now,
            owner_id: owner_id.to_string(),
            is_public: request.is_public,
        })
    }

    /// Apply a partial update and refresh `updated_at`.
    pub async fn update_document(
        &self,
        id: &str,
        request: &UpdateDocumentRequest,
    ) -> Result<Document, AppError> {
        let existing = self
            .get_document(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Document {} not found", id)))?;

        let now = timestamp_now();

        let title = request.title.clone().unwrap_or(existing.title);
        let emoji = clearable(&request.emoji, existing.emoji);
        let excerpt = clearable(&request.excerpt, existing.excerpt);
        let content = request.content.clone().unwrap_or(existing.content);
        let tags = request.tags.clone().unwrap_or(existing.tags);
        let is_public = request.is_public.unwrap_or(existing.is_public);
        let tags_json = serde_json::to_string(&tags)?;

        let result = sqlx::query(
            "UPDATE documents SET title = ?, emoji = ?, excerpt = ?, content = ?, tags = ?, is_public = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&title)
        .bind(&emoji)
        .bind(&excerpt)
        .bind(&content)
        .bind(&tags_json)
        .bind(is_public as i32)
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Document {} not found", id)));
        }

        Ok(Document {
            id: id.to_string(),
            title,
            emoji,
            excerpt,
            content,
            tags,
            created_at: existing.created_at,
            updated_at: now,
            owner_id: existing.owner_id,
            is_public,
        })
    }

    /// Delete a document.
    pub async fn delete_document(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM documents WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Document {} not found", id)));
        }

        Ok(())
    }
}

// Helper functions for row conversion

fn user_from_row(row: &sqlx::sqlite::SqliteRow) -> User {
    User {
        id: row.get("id"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        created_at: row.get("created_at"),
    }
}

fn profile_from_row(row: &sqlx::sqlite::SqliteRow) -> Profile {
    Profile {
        id: row.get("id"),
        username: row.get("username"),
        full_name: row.get("full_name"),
        bio: row.get("bio"),
        website: row.get("website"),
        github_url: row.get("github_url"),
        twitter_url: row.get("twitter_url"),
        linkedin_url: row.get("linkedin_url"),
        avatar_url: row.get("avatar_url"),
        updated_at: row.get("updated_at"),
    }
}

fn document_from_row(row: &sqlx::sqlite::SqliteRow) -> Document {
    let is_public: i32 = row.get("is_public");
    let tags_str: String = row.get("tags");
    Document {
        id: row.get("id"),
        title: row.get("title"),
        emoji: row.get("emoji"),
        excerpt: row.get("excerpt"),
        content: row.get("content"),
        tags: parse_json_array(&tags_str),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        owner_id: row.get("owner_id"),
        is_public: is_public != 0,
    }
}

fn parse_json_array(s: &str) -> Vec<String> {
    serde_json::from_str(s).unwrap_or_default()
}

/// Present-and-empty clears the field, absent keeps it.
fn clearable(update: &Option<String>, existing: Option<String>) -> Option<String> {
    match update {
        Some(value) if value.is_empty() => None,
        Some(value) => Some(value.clone()),
        None => existing,
    }
}

fn new_session_token() -> String {
    format!(
        "{}{}",
        uuid::Uuid::new_v4().simple(),
        uuid::Uuid::new_v4().simple()
    )
}
