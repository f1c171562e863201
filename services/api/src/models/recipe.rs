//! Recipe models for request and response payloads

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::label::{Label, LabelInput};

/// Recipe representation for list responses
#[derive(Debug, Serialize)]
pub struct RecipeSummary {
    pub id: i64,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: String,
    pub description: String,
}

/// Recipe representation for detail responses
#[derive(Debug, Serialize)]
pub struct RecipeDetail {
    pub id: i64,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: String,
    pub description: String,
    pub image: Option<String>,
    pub tags: Vec<Label>,
    pub ingredients: Vec<Label>,
}

/// Request for recipe creation
///
/// `tags` and `ingredients` are lists of `{name}` labels resolved to
/// per-owner records during the write; an omitted list behaves like an
/// empty one on creation.
#[derive(Debug, Deserialize)]
pub struct CreateRecipeRequest {
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<LabelInput>>,
    pub ingredients: Option<Vec<LabelInput>>,
}

/// Request for partial recipe update
///
/// Every field is optional. For `tags` and `ingredients` the omitted
/// key and the empty list mean different things: `None` leaves the
/// association set untouched, `Some(vec![])` clears it.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateRecipeRequest {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Decimal>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<LabelInput>>,
    pub ingredients: Option<Vec<LabelInput>>,
}

/// Query parameters for recipe listing
#[derive(Debug, Default, Deserialize)]
pub struct RecipeListQuery {
    /// Comma separated list of tag IDs to filter by
    pub tags: Option<String>,
    /// Comma separated list of ingredient IDs to filter by
    pub ingredients: Option<String>,
}

/// Response for recipe image upload
#[derive(Debug, Serialize)]
pub struct RecipeImageResponse {
    pub id: i64,
    pub image: String,
}
