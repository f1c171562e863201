//! Recipe repository for database operations
//!
//! All queries are scoped to the owning user; a recipe belonging to
//! someone else behaves exactly like a recipe that does not exist.
//! Writes that touch the tag/ingredient association sets run through
//! the reconciler on a single transaction.

use anyhow::Result;
use sqlx::{PgPool, Row};
use tracing::info;

use crate::models::label::Label;
use crate::models::recipe::{
    CreateRecipeRequest, RecipeDetail, RecipeSummary, UpdateRecipeRequest,
};
use crate::reconcile::reconcile_associations;
use crate::repositories::label::LabelKind;

/// Recipe repository for database operations
#[derive(Clone)]
pub struct RecipeRepository {
    pool: PgPool,
}

impl RecipeRepository {
    /// Create a new recipe repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a recipe with its nested tag and ingredient labels
    ///
    /// On creation an omitted label list behaves like an empty one:
    /// the recipe ends up associated with exactly the resolved sets.
    pub async fn create(&self, owner_id: i64, payload: &CreateRecipeRequest) -> Result<RecipeDetail> {
        let mut tx = self.pool.begin().await?;

        let recipe_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO recipes (user_id, title, description, time_minutes, price, link)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(owner_id)
        .bind(&payload.title)
        .bind(payload.description.as_deref().unwrap_or(""))
        .bind(payload.time_minutes)
        .bind(payload.price)
        .bind(payload.link.as_deref().unwrap_or(""))
        .fetch_one(&mut *tx)
        .await?;

        reconcile_associations(
            &mut tx,
            recipe_id,
            owner_id,
            Some(payload.tags.as_deref().unwrap_or(&[])),
            Some(payload.ingredients.as_deref().unwrap_or(&[])),
        )
        .await?;

        tx.commit().await?;
        info!("Created recipe {} for user {}", recipe_id, owner_id);

        self.get(owner_id, recipe_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Recipe {} vanished after create", recipe_id))
    }

    /// Partially update one of the caller's recipes
    ///
    /// Absent scalar fields keep their current value. For the label
    /// lists the omitted/empty distinction from the payload carries
    /// through to the reconciler.
    pub async fn update(
        &self,
        owner_id: i64,
        recipe_id: i64,
        payload: &UpdateRecipeRequest,
    ) -> Result<Option<RecipeDetail>> {
        let mut tx = self.pool.begin().await?;

        let updated: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE recipes
            SET title = COALESCE($3::text, title),
                time_minutes = COALESCE($4::int, time_minutes),
                price = COALESCE($5::numeric, price),
                link = COALESCE($6::text, link),
                description = COALESCE($7::text, description),
                updated_at = now()
            WHERE id = $1 AND user_id = $2
            RETURNING id
            "#,
        )
        .bind(recipe_id)
        .bind(owner_id)
        .bind(&payload.title)
        .bind(payload.time_minutes)
        .bind(payload.price)
        .bind(&payload.link)
        .bind(&payload.description)
        .fetch_optional(&mut *tx)
        .await?;

        if updated.is_none() {
            return Ok(None);
        }

        reconcile_associations(
            &mut tx,
            recipe_id,
            owner_id,
            payload.tags.as_deref(),
            payload.ingredients.as_deref(),
        )
        .await?;

        tx.commit().await?;

        self.get(owner_id, recipe_id).await
    }

    /// List the caller's recipes, most recent first
    ///
    /// A CSV filter restricts the result to recipes whose association
    /// set intersects the given IDs; the two filters combine with AND,
    /// the IDs inside one filter with OR.
    pub async fn list(
        &self,
        owner_id: i64,
        tag_ids: Option<Vec<i64>>,
        ingredient_ids: Option<Vec<i64>>,
    ) -> Result<Vec<RecipeSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, time_minutes, price, link, description
            FROM recipes r
            WHERE user_id = $1
              AND ($2::bigint[] IS NULL OR EXISTS (
                    SELECT 1 FROM recipe_tags rt
                    WHERE rt.recipe_id = r.id AND rt.tag_id = ANY($2)))
              AND ($3::bigint[] IS NULL OR EXISTS (
                    SELECT 1 FROM recipe_ingredients ri
                    WHERE ri.recipe_id = r.id AND ri.ingredient_id = ANY($3)))
            ORDER BY id DESC
            "#,
        )
        .bind(owner_id)
        .bind(tag_ids)
        .bind(ingredient_ids)
        .fetch_all(&self.pool)
        .await?;

        let recipes = rows
            .into_iter()
            .map(|row| RecipeSummary {
                id: row.get("id"),
                title: row.get("title"),
                time_minutes: row.get("time_minutes"),
                price: row.get("price"),
                link: row.get("link"),
                description: row.get("description"),
            })
            .collect();

        Ok(recipes)
    }

    /// Fetch one of the caller's recipes with its label sets
    pub async fn get(&self, owner_id: i64, recipe_id: i64) -> Result<Option<RecipeDetail>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, time_minutes, price, link, description, image
            FROM recipes
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(recipe_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let tags = self.load_labels(LabelKind::Tag, recipe_id).await?;
        let ingredients = self.load_labels(LabelKind::Ingredient, recipe_id).await?;

        Ok(Some(RecipeDetail {
            id: row.get("id"),
            title: row.get("title"),
            time_minutes: row.get("time_minutes"),
            price: row.get("price"),
            link: row.get("link"),
            description: row.get("description"),
            image: row.get("image"),
            tags,
            ingredients,
        }))
    }

    /// Delete one of the caller's recipes
    ///
    /// Association rows cascade away with the recipe; shared tag and
    /// ingredient rows survive for other recipes.
    pub async fn delete(&self, owner_id: i64, recipe_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1 AND user_id = $2")
            .bind(recipe_id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Check that one of the caller's recipes exists
    pub async fn exists(&self, owner_id: i64, recipe_id: i64) -> Result<bool> {
        let found: Option<i64> =
            sqlx::query_scalar("SELECT id FROM recipes WHERE id = $1 AND user_id = $2")
                .bind(recipe_id)
                .bind(owner_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(found.is_some())
    }

    /// Attach a stored image reference to one of the caller's recipes
    pub async fn set_image(
        &self,
        owner_id: i64,
        recipe_id: i64,
        filename: &str,
    ) -> Result<Option<i64>> {
        let updated: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE recipes
            SET image = $3, updated_at = now()
            WHERE id = $1 AND user_id = $2
            RETURNING id
            "#,
        )
        .bind(recipe_id)
        .bind(owner_id)
        .bind(filename)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    /// Labels associated with a recipe, ordered by name
    async fn load_labels(&self, kind: LabelKind, recipe_id: i64) -> Result<Vec<Label>> {
        let query = format!(
            "SELECT l.id, l.name FROM {table} l \
             JOIN {join} j ON j.{column} = l.id \
             WHERE j.recipe_id = $1 \
             ORDER BY l.name",
            table = kind.table(),
            join = kind.join_table(),
            column = kind.join_column(),
        );

        let labels = sqlx::query_as::<_, (i64, String)>(&query)
            .bind(recipe_id)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(|(id, name)| Label { id, name })
            .collect();

        Ok(labels)
    }
}
