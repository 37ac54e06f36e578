// src/handlers/content.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    models::page::{CreatePageRequest, Page, PageSummary, UpdatePageRequest},
    sanitize::{escape_html, escape_html_with_breaks, sanitize_html},
    store,
    utils::jwt::Claims,
};

fn page_key(slug: &str) -> String {
    format!("page:{}", slug)
}

/// Slugs become storage keys and URL path segments; keep them to a safe
/// closed alphabet.
fn validate_slug(slug: &str) -> Result<(), AppError> {
    let ok = !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !ok {
        return Err(AppError::BadRequest(
            "Slug may only contain lowercase letters, digits and hyphens".to_string(),
        ));
    }
    Ok(())
}

fn decode_page(slug: &str, blob: &[u8]) -> Result<Page, AppError> {
    serde_json::from_slice(blob).map_err(|e| {
        tracing::error!("Corrupt page blob for '{}': {:?}", slug, e);
        AppError::InternalServerError(e.to_string())
    })
}

/// List all pages (without bodies), ordered by slug.
pub async fn list_pages(
    State(pool): State<SqlitePool>,
) -> Result<impl IntoResponse, AppError> {
    let entries = store::list_prefix(&pool, "page:").await?;

    let mut pages = Vec::with_capacity(entries.len());
    for (key, blob) in entries {
        let page = decode_page(&key, &blob)?;
        pages.push(PageSummary::from(page));
    }

    Ok(Json(pages))
}

/// Get a single page by slug.
///
/// The stored body was sanitized at ingestion and is returned as stored.
pub async fn get_page(
    State(pool): State<SqlitePool>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let blob = store::get(&pool, &page_key(&slug))
        .await?
        .ok_or(AppError::NotFound(format!("Page '{}' not found", slug)))?;

    Ok(Json(decode_page(&slug, &blob)?))
}

/// Create a new page (admin only, enforced by router middleware).
///
/// Untrusted editor input is neutralized before it is persisted: the rich
/// body goes through the sanitizer, plain-text fields through the escaper.
pub async fn create_page(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreatePageRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }
    validate_slug(&payload.slug)?;

    let now = chrono::Utc::now();
    let page = Page {
        slug: payload.slug.clone(),
        title: escape_html(&payload.title),
        summary: escape_html_with_breaks(&payload.summary),
        body: sanitize_html(&payload.body),
        author: claims.sub.clone(),
        created_at: now,
        updated_at: now,
    };

    let blob = serde_json::to_vec(&page)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let created = store::insert(&pool, &page_key(&page.slug), &blob).await?;
    if !created {
        return Err(AppError::Conflict(format!(
            "Page '{}' already exists",
            payload.slug
        )));
    }

    Ok((StatusCode::CREATED, Json(page)))
}

/// Update an existing page (admin only).
pub async fn update_page(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(slug): Path<String>,
    Json(payload): Json<UpdatePageRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let key = page_key(&slug);
    let blob = store::get(&pool, &key)
        .await?
        .ok_or(AppError::NotFound(format!("Page '{}' not found", slug)))?;
    let existing = decode_page(&slug, &blob)?;

    let page = Page {
        slug: existing.slug,
        title: escape_html(&payload.title),
        summary: escape_html_with_breaks(&payload.summary),
        body: sanitize_html(&payload.body),
        author: claims.sub.clone(),
        created_at: existing.created_at,
        updated_at: chrono::Utc::now(),
    };

    let blob = serde_json::to_vec(&page)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;
    store::put(&pool, &key, &blob).await?;

    Ok(Json(page))
}

/// Delete a page (admin only).
pub async fn delete_page(
    State(pool): State<SqlitePool>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = store::delete(&pool, &page_key(&slug)).await?;
    if !deleted {
        return Err(AppError::NotFound(format!("Page '{}' not found", slug)));
    }

    Ok(StatusCode::NO_CONTENT)
}
