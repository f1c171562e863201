//! Tag and ingredient models
//!
//! Tags and ingredients share one shape: a named record owned by a
//! single user. They only differ in the table they live in, so the
//! request/response types are shared between the two collections.

use serde::{Deserialize, Serialize};

/// A tag or ingredient record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Label {
    pub id: i64,
    pub name: String,
}

/// A `{name}` entry inside a recipe create/update payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LabelInput {
    pub name: String,
}

/// Request for renaming a tag or ingredient
#[derive(Debug, Deserialize)]
pub struct UpdateLabelRequest {
    pub name: String,
}

/// Query parameters for tag/ingredient listing
#[derive(Debug, Default, Deserialize)]
pub struct LabelListQuery {
    /// When `1`, only return records assigned to at least one recipe
    pub assigned_only: Option<u8>,
}
