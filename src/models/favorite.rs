//! Favorite toggle models.

use serde::Serialize;
use utoipa::ToSchema;

/// Response for the favorite toggle endpoint. `is_favorited` reflects the
/// state after this call.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToggleFavoriteResponse {
    pub message: String,
    pub is_favorited: bool,
}
