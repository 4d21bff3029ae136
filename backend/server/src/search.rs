//! # Search
//!
//! Linear scan over the cached catalog.
//!
//! ## Matching
//! - Case-insensitive substring on `item_output` only
//! - Recipes without an `item_output` never match
//! - Results keep catalog (upstream document) order, no ranking
//!
//! A few thousand recipes at most, so a scan per request is cheaper than keeping any index
//! in sync with a catalog that is replaced wholesale every TTL.
use catalog::{Catalog, Recipe};

use crate::error::AppError;

pub const NAME_PARAM: &str = "name";

pub fn search<'a>(catalog: &'a Catalog, query: &str) -> Result<Vec<&'a Recipe>, AppError> {
    let needle = query.trim().to_lowercase();

    if needle.is_empty() {
        return Err(AppError::MissingParameter(NAME_PARAM));
    }

    Ok(catalog
        .recipes()
        .filter(|recipe| {
            recipe
                .item_output
                .as_ref()
                .is_some_and(|name| name.to_lowercase().contains(&needle))
        })
        .collect())
}

/// Catalog key first, then a recipe whose own `id` field matches.
pub fn find_by_id<'a>(catalog: &'a Catalog, id: &str) -> Option<&'a Recipe> {
    let id = id.trim();

    catalog
        .get(id)
        .or_else(|| catalog.recipes().find(|recipe| recipe.id_text().as_deref() == Some(id)))
}

pub fn find_by_name<'a>(catalog: &'a Catalog, name: &str) -> Option<&'a Recipe> {
    let name = name.trim().to_lowercase();

    catalog.recipes().find(|recipe| {
        recipe
            .item_output
            .as_ref()
            .is_some_and(|output| output.to_lowercase() == name)
    })
}
