use std::sync::Arc;

use axum::{Extension, Json};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    gallery::{Gallery, ObjectDescriptor},
    types::{AppError, ValidatedQuery},
};

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// Key prefix to list (defaults to `uploads/`)
    pub prefix: Option<String>,
    /// Maximum entries to return, capped at 1000
    pub max_keys: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListItem {
    /// Object key
    pub key: String,
    /// Size in bytes
    pub size: i64,
    /// ISO-8601 UTC timestamp of the last modification
    pub last_modified: Option<String>,
    /// Public URL of the object, if the bucket is publicly served
    pub public_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ListResponse {
    /// Objects, most recently modified first
    pub items: Vec<ListItem>,
    /// Whether more objects exist than were returned
    pub truncated: bool,
}

impl From<ObjectDescriptor> for ListItem {
    fn from(object: ObjectDescriptor) -> Self {
        Self {
            key: object.key,
            size: object.size,
            last_modified: object.last_modified.map(|ts| ts.to_rfc3339()),
            public_url: object.public_url,
        }
    }
}

/// Lists stored objects for the gallery view
///
/// # Errors
///
/// - 400 `invalid_input` - unparsable query string
/// - 500 `failed_to_list` - the store listing failed; no partial results
#[instrument(skip(gallery))]
pub async fn list_objects(
    Extension(gallery): Extension<Arc<Gallery>>,
    ValidatedQuery(query): ValidatedQuery<ListQuery>,
) -> Result<Json<ListResponse>, AppError> {
    let listing = gallery
        .list(query.prefix.as_deref(), query.max_keys)
        .await?;

    Ok(Json(ListResponse {
        items: listing.items.into_iter().map(ListItem::from).collect(),
        truncated: listing.truncated,
    }))
}
