//! Shared repository for the tag and ingredient collections
//!
//! The two attribute collections have identical CRUD semantics, so one
//! repository serves both, parameterized by [`LabelKind`] instead of
//! duplicated per entity.

use anyhow::Result;
use sqlx::PgPool;

use crate::models::label::Label;

/// The two label collections a recipe can reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    Tag,
    Ingredient,
}

impl LabelKind {
    /// Table holding the labels themselves
    pub fn table(&self) -> &'static str {
        match self {
            LabelKind::Tag => "tags",
            LabelKind::Ingredient => "ingredients",
        }
    }

    /// Recipe association table
    pub fn join_table(&self) -> &'static str {
        match self {
            LabelKind::Tag => "recipe_tags",
            LabelKind::Ingredient => "recipe_ingredients",
        }
    }

    /// Label column inside the association table
    pub fn join_column(&self) -> &'static str {
        match self {
            LabelKind::Tag => "tag_id",
            LabelKind::Ingredient => "ingredient_id",
        }
    }

    /// Payload field the collection appears under, used for error keys
    pub fn field(&self) -> &'static str {
        match self {
            LabelKind::Tag => "tags",
            LabelKind::Ingredient => "ingredients",
        }
    }
}

/// Repository for one label collection
#[derive(Clone)]
pub struct LabelRepository {
    pool: PgPool,
    kind: LabelKind,
}

impl LabelRepository {
    /// Create a new label repository for the given collection
    pub fn new(pool: PgPool, kind: LabelKind) -> Self {
        Self { pool, kind }
    }

    /// List the caller's labels, ordered by name descending
    ///
    /// With `assigned_only`, restrict to labels referenced by at least
    /// one recipe.
    pub async fn list(&self, owner_id: i64, assigned_only: bool) -> Result<Vec<Label>> {
        let query = if assigned_only {
            format!(
                "SELECT l.id, l.name FROM {table} l \
                 WHERE l.user_id = $1 \
                   AND EXISTS (SELECT 1 FROM {join} j WHERE j.{column} = l.id) \
                 ORDER BY l.name DESC",
                table = self.kind.table(),
                join = self.kind.join_table(),
                column = self.kind.join_column(),
            )
        } else {
            format!(
                "SELECT id, name FROM {table} WHERE user_id = $1 ORDER BY name DESC",
                table = self.kind.table(),
            )
        };

        let labels = sqlx::query_as::<_, (i64, String)>(&query)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(|(id, name)| Label { id, name })
            .collect();

        Ok(labels)
    }

    /// Rename one of the caller's labels
    ///
    /// Returns `None` when the label does not exist in the caller's
    /// scope. Renaming onto an existing name surfaces as a unique
    /// violation.
    pub async fn update(&self, owner_id: i64, id: i64, name: &str) -> Result<Option<Label>> {
        let query = format!(
            "UPDATE {table} SET name = $3 WHERE id = $2 AND user_id = $1 RETURNING id, name",
            table = self.kind.table(),
        );

        let label = sqlx::query_as::<_, (i64, String)>(&query)
            .bind(owner_id)
            .bind(id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?
            .map(|(id, name)| Label { id, name });

        Ok(label)
    }

    /// Delete one of the caller's labels
    ///
    /// Association rows cascade; recipes themselves are untouched.
    pub async fn delete(&self, owner_id: i64, id: i64) -> Result<bool> {
        let query = format!(
            "DELETE FROM {table} WHERE id = $2 AND user_id = $1",
            table = self.kind.table(),
        );

        let result = sqlx::query(&query)
            .bind(owner_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// The collection this repository serves
    pub fn kind(&self) -> LabelKind {
        self.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_distinct_tables() {
        assert_eq!(LabelKind::Tag.table(), "tags");
        assert_eq!(LabelKind::Ingredient.table(), "ingredients");
        assert_ne!(LabelKind::Tag.join_table(), LabelKind::Ingredient.join_table());
    }

    #[test]
    fn field_matches_payload_keys() {
        assert_eq!(LabelKind::Tag.field(), "tags");
        assert_eq!(LabelKind::Ingredient.field(), "ingredients");
    }
}
