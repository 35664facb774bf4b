//! Database operations for the `trend_documents` table.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `trend_documents` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TrendDocumentRow {
    pub id: String,
    pub brand: String,
    pub product: String,
    pub recipient_email: String,
    pub recipient_name: String,
    pub email_subject: String,
    pub email_body: String,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for [`upsert_trend_document`].
#[derive(Debug, Clone)]
pub struct NewTrendDocument {
    pub id: String,
    pub brand: String,
    pub product: String,
    pub recipient_email: String,
    pub recipient_name: String,
    pub email_subject: String,
    pub email_body: String,
    pub metadata: Value,
}

/// Whether an upsert created the document or refreshed an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertAction {
    Inserted,
    Updated,
}

impl UpsertAction {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            UpsertAction::Inserted => "inserted",
            UpsertAction::Updated => "updated",
        }
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Insert a trend document, or refresh it if the id already exists.
///
/// On conflict only `email_subject`, `email_body`, `metadata`, and
/// `updated_at` change — brand, product, recipient, and `created_at` are
/// fixed at first insert. `created_at` and `updated_at` share the statement
/// timestamp on insert, which is how the action is detected.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the statement fails, including a unique
/// violation when a different id targets the same
/// `(recipient_email, brand, product)`.
pub async fn upsert_trend_document(
    pool: &PgPool,
    doc: &NewTrendDocument,
) -> Result<UpsertAction, DbError> {
    let inserted: bool = sqlx::query_scalar(
        "INSERT INTO trend_documents \
             (id, brand, product, recipient_email, recipient_name, \
              email_subject, email_body, metadata) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         ON CONFLICT (id) DO UPDATE SET \
             email_subject = EXCLUDED.email_subject, \
             email_body = EXCLUDED.email_body, \
             metadata = EXCLUDED.metadata, \
             updated_at = NOW() \
         RETURNING (created_at = updated_at)",
    )
    .bind(&doc.id)
    .bind(&doc.brand)
    .bind(&doc.product)
    .bind(&doc.recipient_email)
    .bind(&doc.recipient_name)
    .bind(&doc.email_subject)
    .bind(&doc.email_body)
    .bind(&doc.metadata)
    .fetch_one(pool)
    .await?;

    Ok(if inserted {
        UpsertAction::Inserted
    } else {
        UpsertAction::Updated
    })
}

/// Fetch one trend document by id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row matches, [`DbError::Sqlx`] on
/// query failure.
pub async fn get_trend_document(pool: &PgPool, id: &str) -> Result<TrendDocumentRow, DbError> {
    let row = sqlx::query_as::<_, TrendDocumentRow>(
        "SELECT id, brand, product, recipient_email, recipient_name, \
                email_subject, email_body, metadata, created_at, updated_at \
         FROM trend_documents \
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.ok_or(DbError::NotFound)
}

/// List trend documents, most recently updated first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_trend_documents(
    pool: &PgPool,
    limit: i64,
) -> Result<Vec<TrendDocumentRow>, DbError> {
    let rows = sqlx::query_as::<_, TrendDocumentRow>(
        "SELECT id, brand, product, recipient_email, recipient_name, \
                email_subject, email_body, metadata, created_at, updated_at \
         FROM trend_documents \
         ORDER BY updated_at DESC, id \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// List every stored document for a refresh sweep.
///
/// Each returned row carries its own id; refresh runs are keyed by that id,
/// never by an identifier shared across the sweep.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_trend_documents_for_refresh(
    pool: &PgPool,
) -> Result<Vec<TrendDocumentRow>, DbError> {
    let rows = sqlx::query_as::<_, TrendDocumentRow>(
        "SELECT id, brand, product, recipient_email, recipient_name, \
                email_subject, email_body, metadata, created_at, updated_at \
         FROM trend_documents \
         ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
