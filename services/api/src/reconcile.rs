//! Association reconciliation for recipe writes
//!
//! A recipe payload may embed lists of `{name}` labels for tags and
//! ingredients. Each name is resolved to the caller's own record,
//! created on first use, and the recipe's association set is replaced
//! with exactly the resolved set. Everything runs on the transaction
//! of the surrounding recipe write, so a failed write never leaves
//! orphaned label rows behind.

use anyhow::Result;
use sqlx::{Postgres, Transaction};
use std::collections::BTreeSet;

use crate::models::label::LabelInput;
use crate::repositories::label::LabelKind;

/// Reconcile a recipe's tag and ingredient associations
///
/// `None` means the key was absent from the payload and the existing
/// associations are left untouched. `Some(&[])` clears the set, and a
/// non-empty list replaces it wholesale. The two lists are handled
/// independently.
pub async fn reconcile_associations(
    tx: &mut Transaction<'_, Postgres>,
    recipe_id: i64,
    owner_id: i64,
    tags: Option<&[LabelInput]>,
    ingredients: Option<&[LabelInput]>,
) -> Result<()> {
    if let Some(labels) = tags {
        replace_associations(tx, LabelKind::Tag, recipe_id, owner_id, labels).await?;
    }

    if let Some(labels) = ingredients {
        replace_associations(tx, LabelKind::Ingredient, recipe_id, owner_id, labels).await?;
    }

    Ok(())
}

/// Replace one association set with the resolved label set
async fn replace_associations(
    tx: &mut Transaction<'_, Postgres>,
    kind: LabelKind,
    recipe_id: i64,
    owner_id: i64,
    labels: &[LabelInput],
) -> Result<()> {
    let resolved = resolve_labels(tx, kind, owner_id, labels).await?;

    sqlx::query(&format!(
        "DELETE FROM {} WHERE recipe_id = $1",
        kind.join_table()
    ))
    .bind(recipe_id)
    .execute(&mut **tx)
    .await?;

    for label_id in &resolved {
        sqlx::query(&format!(
            "INSERT INTO {} (recipe_id, {}) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            kind.join_table(),
            kind.join_column()
        ))
        .bind(recipe_id)
        .bind(label_id)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

/// Resolve each label name to the owner's record, creating it if absent
///
/// The upsert makes get-or-create race-safe: a create that loses a
/// concurrent race hits the unique constraint and returns the winner's
/// id instead of failing. Duplicate names collapse into a set.
async fn resolve_labels(
    tx: &mut Transaction<'_, Postgres>,
    kind: LabelKind,
    owner_id: i64,
    labels: &[LabelInput],
) -> Result<BTreeSet<i64>> {
    let mut ids = BTreeSet::new();

    for name in dedup_names(labels) {
        let (id,): (i64,) = sqlx::query_as(&format!(
            "INSERT INTO {} (user_id, name) VALUES ($1, $2) \
             ON CONFLICT (user_id, name) DO UPDATE SET name = EXCLUDED.name \
             RETURNING id",
            kind.table()
        ))
        .bind(owner_id)
        .bind(name)
        .fetch_one(&mut **tx)
        .await?;

        ids.insert(id);
    }

    Ok(ids)
}

/// Collapse duplicate label names, keeping first-occurrence order
fn dedup_names(labels: &[LabelInput]) -> Vec<&str> {
    let mut seen = BTreeSet::new();
    labels
        .iter()
        .map(|label| label.name.as_str())
        .filter(|name| seen.insert(*name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<LabelInput> {
        names
            .iter()
            .map(|name| LabelInput {
                name: name.to_string(),
            })
            .collect()
    }

    #[test]
    fn duplicate_names_collapse() {
        let input = labels(&["Sugar", "Salt", "Sugar", "Sugar"]);
        assert_eq!(dedup_names(&input), vec!["Sugar", "Salt"]);
    }

    #[test]
    fn names_are_case_sensitive() {
        let input = labels(&["Vegan", "vegan"]);
        assert_eq!(dedup_names(&input), vec!["Vegan", "vegan"]);
    }

    #[test]
    fn empty_list_resolves_to_empty_set() {
        assert!(dedup_names(&[]).is_empty());
    }
}
