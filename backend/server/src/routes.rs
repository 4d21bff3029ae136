use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    response::{Html, IntoResponse, Response},
};
use catalog::Recipe;
use serde_json::json;
use tracing::info;

use crate::{
    error::AppError,
    pagination::{PageInfo, paginate},
    render::{Envelope, Format, LinkBase, Rendered, Summary, render_html, render_json},
    search::{NAME_PARAM, find_by_id, find_by_name, search},
    state::AppState,
    utils::{Lookup, RecipeParams},
};

pub const RECIPE_PATH: &str = "/recipe";
pub const SEARCH_PATH: &str = "/search";
pub const NAME_PATH: &str = "/name";

pub const USAGE: &str = r#"<!DOCTYPE html>
<html><head><meta charset="utf-8"><title>DFS Recipe API</title></head><body>
<h1>DFS Recipe API is running.</h1>
<h2>Search</h2>
<ul>
<li><code>GET /recipe?name=strawberry</code> recipes whose name contains the text, with paging metadata</li>
<li><code>GET /name?name=strawberry</code> id and name of each match</li>
<li><code>GET /search?name=strawberry</code> same as <code>/recipe</code></li>
</ul>
<h2>Lookup</h2>
<ul>
<li><code>GET /recipe?id=301</code> one recipe by id</li>
<li><code>GET /recipe?name=Apple%20Pie&amp;exact=1</code> one recipe by its exact name</li>
</ul>
<h2>Paging</h2>
<ul>
<li><code>page</code> and <code>page_size</code> page numbers, starting at 1</li>
<li><code>start</code> and <code>limit</code> offset into the results</li>
<li><code>budget</code> pages that fit in that many bytes of JSON, with <code>page</code></li>
</ul>
<h2>Output</h2>
<ul>
<li><code>human=1</code> indented JSON</li>
<li><code>human=html</code> a browsable page</li>
</ul>
</body></html>
"#;

/// Which JSON body a search endpoint answers with. HTML looks the same for both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Envelope,
    List,
}

pub async fn root_handler() -> impl IntoResponse {
    Html(USAGE)
}

pub async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let status = state.cache.status().await;

    Json(json!({
        "status": "ok",
        "cached": status.is_some(),
        "fresh": status.is_some_and(|status| status.fresh),
        "recipes": status.map_or(0, |status| status.recipes),
        "age_secs": status.map(|status| status.age.as_secs()),
    }))
}

pub async fn recipe_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RecipeParams>,
) -> Result<Response, AppError> {
    respond(&state, &params, RECIPE_PATH, Shape::Envelope).await
}

pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RecipeParams>,
) -> Result<Response, AppError> {
    respond(&state, &params, SEARCH_PATH, Shape::Envelope).await
}

pub async fn name_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RecipeParams>,
) -> Result<Response, AppError> {
    respond(&state, &params, NAME_PATH, Shape::List).await
}

async fn respond(
    state: &AppState,
    params: &RecipeParams,
    path: &'static str,
    shape: Shape,
) -> Result<Response, AppError> {
    let lookup = params.lookup();
    if lookup == Lookup::Missing {
        return Err(AppError::MissingParameter(NAME_PARAM));
    }

    let catalog = state.cache.get_catalog().await?;
    let format = params.format();

    let rendered = match lookup {
        Lookup::Id(id) => single(find_by_id(&catalog, &id), format)?,
        Lookup::ExactName(name) => single(find_by_name(&catalog, &name), format)?,
        Lookup::Search(name) => {
            let results = search(&catalog, &name)?;
            if results.is_empty() {
                return Err(AppError::NotFound);
            }

            let pagination = params.pagination(&state.config);

            // page over exactly what gets serialized, so byte budgets measure the real body
            match (format, shape) {
                (Format::Html, _) => {
                    let page = paginate(&results, pagination)?;
                    log_page(path, &name, &page.info);

                    let links = LinkBase {
                        path,
                        params: params.link_params(pagination),
                    };
                    render_html(&name, page.items, &page.info, &links)?
                }
                (_, Shape::Envelope) => {
                    let page = paginate(&results, pagination)?;
                    log_page(path, &name, &page.info);

                    render_json(&Envelope::new(page.items, &page.info), format)?
                }
                (_, Shape::List) => {
                    let summaries: Vec<Summary> =
                        results.iter().map(|recipe| Summary::from(*recipe)).collect();
                    let page = paginate(&summaries, pagination)?;
                    log_page(path, &name, &page.info);

                    render_json(page.items, format)?
                }
            }
        }
        Lookup::Missing => return Err(AppError::MissingParameter(NAME_PARAM)),
    };

    Ok(rendered.into_response())
}

fn log_page(path: &str, name: &str, info: &PageInfo) {
    info!(
        "{path} {name:?}: {} matches, page {} of {}",
        info.total, info.page, info.page_count
    );
}

fn single(recipe: Option<&Recipe>, format: Format) -> Result<Rendered, AppError> {
    let recipe = recipe.ok_or(AppError::NotFound)?;

    render_json(recipe, format)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Request, StatusCode, header::CONTENT_TYPE},
    };
    use catalog::Catalog;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::{
        app,
        config::Config,
        testing::{MockSource, bread_catalog, recipe, sample_catalog},
    };

    fn router(catalog: Catalog) -> (Router, Arc<MockSource>) {
        let source = MockSource::new(catalog);
        let state = AppState::with_source(Config::default(), source.clone());

        (app(state), source)
    }

    async fn get(router: &Router, uri: &str) -> (StatusCode, String, String) {
        let response = router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        (status, content_type, String::from_utf8(body.to_vec()).unwrap())
    }

    async fn get_json(router: &Router, uri: &str) -> (StatusCode, Value) {
        let (status, _, body) = get(router, uri).await;

        (status, serde_json::from_str(&body).unwrap())
    }

    #[tokio::test]
    async fn test_search_strawberry() {
        let (router, _) = router(sample_catalog());
        let (status, body) = get_json(&router, "/recipe?name=strawberry").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 2);
        assert_eq!(body["page"], 1);
        assert_eq!(body["page_count"], 1);
        assert_eq!(body["results"][0]["item_output"], "DFS Strawberry Tartlets");
        assert_eq!(body["results"][0]["ingredient3"], "Strawberries");
    }

    #[tokio::test]
    async fn test_search_not_found() {
        let (router, _) = router(sample_catalog());
        let (status, body) = get_json(&router, "/recipe?name=nonexistent").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Recipe not found.");
    }

    #[tokio::test]
    async fn test_missing_name() {
        let (router, source) = router(sample_catalog());

        for uri in ["/recipe", "/recipe?name=", "/name?page=2", "/search?human=1"] {
            let (status, body) = get_json(&router, uri).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body["error"], "Missing 'name' query parameter.");
        }

        assert_eq!(source.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_upstream_failure() {
        let source = MockSource::failing();
        let router = app(AppState::with_source(Config::default(), source));

        let (status, body) = get_json(&router, "/recipe?name=pie").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("recipes.json"));
    }

    #[tokio::test]
    async fn test_cache_shared_between_requests() {
        let (router, source) = router(sample_catalog());

        get(&router, "/recipe?name=pie").await;
        get(&router, "/name?name=jam").await;
        get(&router, "/recipe?id=301").await;

        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_page_number_mode() {
        let (router, _) = router(bread_catalog(23));

        let (_, first) = get_json(&router, "/recipe?name=bread&page_size=10").await;
        assert_eq!(first["total"], 23);
        assert_eq!(first["page_count"], 3);
        assert_eq!(first["results"].as_array().unwrap().len(), 10);

        let (status, clamped) = get_json(&router, "/recipe?name=bread&page_size=10&page=5").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(clamped["page"], 3);
        assert_eq!(clamped["results"].as_array().unwrap().len(), 3);
        assert_eq!(clamped["results"][0]["item_output"], "Bread 21");
    }

    #[tokio::test]
    async fn test_default_page_size() {
        let (router, _) = router(bread_catalog(23));
        let (_, body) = get_json(&router, "/search?name=bread").await;

        assert_eq!(body["results"].as_array().unwrap().len(), 9);
        assert_eq!(body["page_count"], 3);
        assert!(body.get("next_start").is_none());
    }

    #[tokio::test]
    async fn test_offset_mode() {
        let (router, _) = router(bread_catalog(23));
        let (_, body) = get_json(&router, "/recipe?name=bread&start=5").await;

        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 5);
        assert_eq!(results[0]["item_output"], "Bread 6");
        assert_eq!(body["page"], 2);
        assert_eq!(body["next_start"], 10);
    }

    #[tokio::test]
    async fn test_budget_mode() {
        let (router, _) = router(bread_catalog(23));
        let (_, body) = get_json(&router, "/recipe?name=bread&budget=300").await;

        let results = body["results"].as_array().unwrap();
        let serialized = serde_json::to_string(results).unwrap();

        assert!(!results.is_empty());
        assert!(serialized.len() <= 300);
        assert!(body["page_count"].as_u64().unwrap() > 1);
    }

    #[tokio::test]
    async fn test_name_budget_measures_summaries() {
        let long = "x".repeat(60);
        let ingredients: Vec<(u32, &str)> = (1..=9).map(|slot| (slot, long.as_str())).collect();
        let catalog: Catalog = (1..=10)
            .map(|n| recipe(&n.to_string(), &format!("Bread {n}"), &ingredients))
            .collect();
        let (router, _) = router(catalog);

        let (status, body) = get_json(&router, "/name?name=bread&budget=400").await;
        let emitted = serde_json::to_string(&body).unwrap();

        // each full recipe is over the budget on its own, all ten summaries fit together
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 10, "{emitted}");
        assert!(emitted.len() <= 400);
    }

    #[tokio::test]
    async fn test_name_endpoint_summaries() {
        let (router, _) = router(sample_catalog());
        let (status, body) = get_json(&router, "/name?name=STRAWBERRY").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([
                { "id": "301", "item_output": "DFS Strawberry Tartlets" },
                { "id": "302", "item_output": "DFS Strawberry Jam" }
            ])
        );
    }

    #[tokio::test]
    async fn test_lookup_by_id() {
        let (router, _) = router(sample_catalog());

        let (status, body) = get_json(&router, "/recipe?id=303").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["item_output"], "Apple Pie");
        assert_eq!(body["ingredient4"], "Butter");

        let (status, _) = get_json(&router, "/recipe?id=999").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_lookup_by_exact_name() {
        let (router, _) = router(sample_catalog());

        let (status, body) = get_json(&router, "/recipe?name=apple%20pie&exact=1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], "303");

        let (status, _) = get_json(&router, "/recipe?name=apple&exact=1").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_pretty_json() {
        let (router, _) = router(sample_catalog());
        let (status, content_type, body) = get(&router, "/recipe?name=jam&human=1").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type, "application/json");
        assert!(body.contains("\n  \"total\": 1"));
    }

    #[tokio::test]
    async fn test_html() {
        let (router, _) = router(sample_catalog());
        let (status, content_type, body) = get(&router, "/recipe?name=tartlets&human=html").await;

        assert_eq!(status, StatusCode::OK);
        assert!(content_type.starts_with("text/html"));
        assert!(body.contains("<h2>DFS Strawberry Tartlets</h2>"));
        assert_eq!(body.matches("<li>").count(), 3);
        assert!(body.contains("<img src=\"https://example.com/tartlets.png\""));
        assert!(body.contains("Page 1 of 1"));
    }

    #[tokio::test]
    async fn test_html_navigation() {
        let (router, _) = router(bread_catalog(23));
        let (_, _, body) = get(&router, "/name?name=bread&human=html&page=2").await;

        assert!(body.contains("Page 2 of 3"));
        assert!(body.contains("href=\"/name?name=bread&amp;human=html&amp;page=1\""));
        assert!(body.contains("href=\"/name?name=bread&amp;human=html&amp;page=3\""));
    }

    #[tokio::test]
    async fn test_root_usage() {
        let (router, source) = router(sample_catalog());
        let (status, content_type, body) = get(&router, "/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(content_type.starts_with("text/html"));
        assert!(body.contains("DFS Recipe API is running."));
        assert_eq!(source.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_health() {
        let (router, _) = router(sample_catalog());

        let (_, before) = get_json(&router, "/health").await;
        assert_eq!(before["cached"], false);
        assert_eq!(before["recipes"], 0);

        get(&router, "/recipe?name=pie").await;

        let (status, after) = get_json(&router, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(after["status"], "ok");
        assert_eq!(after["cached"], true);
        assert_eq!(after["fresh"], true);
        assert_eq!(after["recipes"], 5);
    }

    #[tokio::test]
    async fn test_cors() {
        let (router, _) = router(sample_catalog());
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/recipe?name=jam")
                    .header("origin", "https://example.org")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
    }
}
