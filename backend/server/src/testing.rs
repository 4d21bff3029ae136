use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use async_trait::async_trait;
use axum::http::StatusCode;
use catalog::{Catalog, FetchError, Recipe, RecipeSource};

pub struct MockSource {
    catalog: Catalog,
    pub fetches: AtomicUsize,
    pub fail: AtomicBool,
}

impl MockSource {
    pub fn new(catalog: Catalog) -> Arc<Self> {
        Arc::new(Self {
            catalog,
            fetches: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        })
    }

    pub fn failing() -> Arc<Self> {
        let source = Self::new(Catalog::default());
        source.fail.store(true, Ordering::SeqCst);
        source
    }
}

#[async_trait]
impl RecipeSource for MockSource {
    async fn fetch(&self) -> Result<Catalog, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        if self.fail.load(Ordering::SeqCst) {
            return Err(FetchError::Status(StatusCode::SERVICE_UNAVAILABLE));
        }

        Ok(self.catalog.clone())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

pub fn recipe(id: &str, name: &str, ingredients: &[(u32, &str)]) -> (String, Recipe) {
    let mut recipe = Recipe::named(name);
    recipe.id = Some(id.into());
    recipe.ingredients = ingredients
        .iter()
        .map(|(slot, ingredient)| (*slot, ingredient.to_string()))
        .collect();

    (id.to_string(), recipe)
}

pub fn sample_catalog() -> Catalog {
    let mut tartlets = recipe(
        "301",
        "DFS Strawberry Tartlets",
        &[(1, "Flour"), (2, "Sugar"), (3, "Strawberries")],
    );
    tartlets.1.img_url = Some("https://example.com/tartlets.png".to_string());

    [
        tartlets,
        recipe("302", "DFS Strawberry Jam", &[(1, "Strawberries"), (2, "Sugar")]),
        recipe("303", "Apple Pie", &[(1, "Apples"), (4, "Butter")]),
        ("304".to_string(), Recipe::default()),
        recipe("305", "Blueberry Muffins", &[(1, "Blueberries")]),
    ]
    .into_iter()
    .collect()
}

/// `count` recipes named `Bread 1..=count`.
pub fn bread_catalog(count: usize) -> Catalog {
    (1..=count)
        .map(|n| recipe(&n.to_string(), &format!("Bread {n}"), &[(1, "Flour")]))
        .collect()
}
