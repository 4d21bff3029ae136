//! # Recipes
//!
//! Data model of the upstream `recipes.json` document.
//!
//! ## Schema
//! - Top level: JSON object, recipe id (**string**) to recipe (**object**)
//! - Known recipe fields: `id`, `item_output` (**string**), `ingredient1..ingredientN` (**string**), `img_url` (**string**)
//! - Anything else is carried along untouched in [`Recipe::extra`]
//!
//! Ingredient slots are sparse. A recipe may use `ingredient1` and `ingredient3` without
//! `ingredient2`, so they are kept as a slot number to string map and iterated in numeric order.
//! Only `ingredient<N>` with a plain decimal `N` (no sign, no leading zero) is a slot; keys like
//! `ingredient01` stay in [`Recipe::extra`] under their own name.
//!
//! Serializing a parsed recipe emits its fields in the order the upstream document had them.
//! Fields that were set in code rather than parsed follow in the order id, name, ingredients,
//! image, extra.
use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

pub const RECIPE_ID: &str = "id";
pub const RECIPE_NAME: &str = "item_output";
pub const RECIPE_IMAGE: &str = "img_url";
pub const INGREDIENT_PREFIX: &str = "ingredient";

/// Highest ingredient slot shown to clients.
pub const MAX_INGREDIENTS: u32 = 9;

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Recipe {
    pub id: Option<Value>,
    pub item_output: Option<String>,
    pub ingredients: BTreeMap<u32, String>,
    pub img_url: Option<String>,
    pub extra: Map<String, Value>,
    /// Upstream key order, empty for recipes built in code.
    pub field_order: Vec<String>,
}

impl Recipe {
    pub fn named(name: &str) -> Self {
        Self {
            item_output: Some(name.to_string()),
            ..Self::default()
        }
    }

    /// Non-empty ingredients in slots `1..=MAX_INGREDIENTS`, ascending.
    pub fn ingredient_lines(&self) -> impl Iterator<Item = &str> {
        self.ingredients
            .range(1..=MAX_INGREDIENTS)
            .map(|(_, ingredient)| ingredient.as_str())
            .filter(|ingredient| !ingredient.trim().is_empty())
    }

    /// `id` as plain text, numbers included.
    pub fn id_text(&self) -> Option<String> {
        match self.id.as_ref()? {
            Value::String(id) => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }

    pub fn image(&self) -> Option<&str> {
        self.img_url.as_deref().filter(|url| !url.trim().is_empty())
    }
}

fn ingredient_slot(key: &str) -> Option<u32> {
    let digits = key.strip_prefix(INGREDIENT_PREFIX)?;

    if digits.is_empty() || digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    digits.parse().ok()
}

impl From<Map<String, Value>> for Recipe {
    fn from(fields: Map<String, Value>) -> Self {
        let mut recipe = Recipe::default();

        for (key, value) in fields {
            let slot = ingredient_slot(&key);
            recipe.field_order.push(key.clone());

            match (value, slot) {
                (value, _) if key == RECIPE_ID => recipe.id = Some(value),
                (Value::String(name), _) if key == RECIPE_NAME => recipe.item_output = Some(name),
                (Value::String(url), _) if key == RECIPE_IMAGE => recipe.img_url = Some(url),
                (Value::String(ingredient), Some(slot)) => {
                    recipe.ingredients.insert(slot, ingredient);
                }
                (value, _) => {
                    recipe.extra.insert(key, value);
                }
            }
        }

        recipe
    }
}

impl From<Recipe> for Map<String, Value> {
    fn from(recipe: Recipe) -> Self {
        let Recipe {
            id,
            item_output,
            ingredients,
            img_url,
            extra,
            field_order,
        } = recipe;

        let mut pending: Vec<(String, Value)> = Vec::new();

        if let Some(id) = id {
            pending.push((RECIPE_ID.to_string(), id));
        }
        if let Some(name) = item_output {
            pending.push((RECIPE_NAME.to_string(), Value::String(name)));
        }
        for (slot, ingredient) in ingredients {
            pending.push((format!("{INGREDIENT_PREFIX}{slot}"), Value::String(ingredient)));
        }
        if let Some(url) = img_url {
            pending.push((RECIPE_IMAGE.to_string(), Value::String(url)));
        }
        pending.extend(extra);

        let mut fields = Map::new();
        for key in field_order {
            if let Some(position) = pending.iter().position(|(pending_key, _)| *pending_key == key) {
                let (key, value) = pending.remove(position);
                fields.insert(key, value);
            }
        }
        fields.extend(pending);

        fields
    }
}

/// Every recipe published upstream at one point in time, in document order.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    entries: Vec<(String, Recipe)>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Parses the upstream document. Entries that are not objects are skipped.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let document: Map<String, Value> = serde_json::from_slice(bytes)?;

        Ok(document
            .into_iter()
            .filter_map(|(key, value)| match value {
                Value::Object(fields) => Some((key, Recipe::from(fields))),
                _ => {
                    warn!("Skipping non-object recipe entry {key}");
                    None
                }
            })
            .collect())
    }

    pub fn get(&self, key: &str) -> Option<&Recipe> {
        self.index.get(key).map(|&position| &self.entries[position].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Recipe)> {
        self.entries
            .iter()
            .map(|(key, recipe)| (key.as_str(), recipe))
    }

    pub fn recipes(&self) -> impl Iterator<Item = &Recipe> {
        self.entries.iter().map(|(_, recipe)| recipe)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, Recipe)> for Catalog {
    fn from_iter<I: IntoIterator<Item = (String, Recipe)>>(iter: I) -> Self {
        let mut catalog = Catalog::default();

        for (key, recipe) in iter {
            match catalog.index.get(&key) {
                Some(&position) => catalog.entries[position].1 = recipe,
                None => {
                    catalog.index.insert(key.clone(), catalog.entries.len());
                    catalog.entries.push((key, recipe));
                }
            }
        }

        catalog
    }
}
