// src/models/page.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A CMS content page, stored as a JSON blob under `page:{slug}`.
///
/// `body` holds sanitized HTML and `title`/`summary` hold entity-escaped
/// text: sanitization happens at ingestion, so anything read back from the
/// store is already safe to insert into a template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub slug: String,

    /// Entity-escaped plain text.
    pub title: String,

    /// Entity-escaped plain text with newlines rendered as `<br>`.
    pub summary: String,

    /// Sanitized rich HTML.
    pub body: String,

    pub author: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Listing view: everything but the body.
#[derive(Debug, Serialize)]
pub struct PageSummary {
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub author: String,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Page> for PageSummary {
    fn from(page: Page) -> Self {
        Self {
            slug: page.slug,
            title: page.title,
            summary: page.summary,
            author: page.author,
            updated_at: page.updated_at,
        }
    }
}

/// DTO for creating a page. All fields arrive untrusted from the editor.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePageRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Slug length must be between 1 and 100 chars"
    ))]
    pub slug: String,

    #[validate(length(
        min = 1,
        max = 200,
        message = "Title length must be between 1 and 200 chars"
    ))]
    pub title: String,

    #[validate(length(max = 1000, message = "Summary must be at most 1000 chars"))]
    #[serde(default)]
    pub summary: String,

    #[validate(length(
        min = 1,
        max = 100000,
        message = "Body length must be between 1 and 100000 chars"
    ))]
    pub body: String,
}

/// DTO for updating a page (slug comes from the path).
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePageRequest {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Title length must be between 1 and 200 chars"
    ))]
    pub title: String,

    #[validate(length(max = 1000, message = "Summary must be at most 1000 chars"))]
    #[serde(default)]
    pub summary: String,

    #[validate(length(
        min = 1,
        max = 100000,
        message = "Body length must be between 1 and 100000 chars"
    ))]
    pub body: String,
}
