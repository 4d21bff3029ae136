use axum::{
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
};
use catalog::Recipe;
use serde::Serialize;
use serde_json::Value;

use crate::{
    error::AppError,
    pagination::{Cursor, PageInfo},
};

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Pretty,
    Html,
}

impl Format {
    /// `human=html` is an HTML page, any other non-empty value is pretty JSON.
    pub fn from_human(human: Option<&str>) -> Self {
        match human.map(str::trim) {
            None | Some("" | "0" | "false") => Format::Json,
            Some(human) if human.eq_ignore_ascii_case("html") => Format::Html,
            Some(_) => Format::Pretty,
        }
    }
}

pub struct Rendered {
    pub body: String,
    pub content_type: &'static str,
}

impl IntoResponse for Rendered {
    fn into_response(self) -> Response {
        ([(CONTENT_TYPE, self.content_type)], self.body).into_response()
    }
}

/// Search results with their pagination metadata.
#[derive(Serialize)]
pub struct Envelope<'a, T> {
    pub total: usize,
    pub page: usize,
    pub page_count: usize,
    pub results: &'a [T],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_start: Option<usize>,
}

impl<'a, T> Envelope<'a, T> {
    pub fn new(results: &'a [T], info: &PageInfo) -> Self {
        let next_start = match info.next {
            Some(Cursor::Start(start)) => Some(start),
            _ => None,
        };

        Self {
            total: info.total,
            page: info.page,
            page_count: info.page_count,
            results,
            next_start,
        }
    }
}

/// The id/name projection served by `/name`.
#[derive(Serialize)]
pub struct Summary<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<&'a Value>,
    pub item_output: Option<&'a str>,
}

impl<'a> From<&'a Recipe> for Summary<'a> {
    fn from(recipe: &'a Recipe) -> Self {
        Self {
            id: recipe.id.as_ref(),
            item_output: recipe.item_output.as_deref(),
        }
    }
}

pub fn render_json<T: Serialize + ?Sized>(value: &T, format: Format) -> Result<Rendered, AppError> {
    let body = match format {
        Format::Json => serde_json::to_string(value)?,
        Format::Pretty | Format::Html => serde_json::to_string_pretty(value)?,
    };

    Ok(Rendered {
        body,
        content_type: JSON_CONTENT_TYPE,
    })
}

/// Path and query of the current search, reused for previous/next links.
pub struct LinkBase {
    pub path: &'static str,
    pub params: Vec<(&'static str, String)>,
}

impl LinkBase {
    pub fn href(&self, cursor: Cursor) -> Result<String, AppError> {
        let mut params = self.params.clone();
        match cursor {
            Cursor::Page(page) => params.push(("page", page.to_string())),
            Cursor::Start(start) => params.push(("start", start.to_string())),
        }

        let query = serde_urlencoded::to_string(&params)
            .map_err(|e| AppError::InternalError(Box::new(e)))?;

        Ok(format!("{}?{query}", self.path))
    }
}

pub fn render_html(
    query: &str,
    recipes: &[&Recipe],
    info: &PageInfo,
    links: &LinkBase,
) -> Result<Rendered, AppError> {
    let query = escape(query.trim());
    let mut html = String::new();

    html.push_str(&format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>DFS Recipes: {query}</title></head><body>"
    ));
    html.push_str(&format!("<h1>DFS Recipes Matching: &quot;{query}&quot;</h1>"));
    html.push_str(&format!("<p>Found {} matching recipes</p>", info.total));

    for recipe in recipes {
        html.push_str(&recipe_html(recipe));
    }

    html.push_str(&format!("<hr/><p>Page {} of {}</p>", info.page, info.page_count));

    let mut nav = Vec::new();
    if let Some(prev) = info.prev {
        nav.push(format!("<a href=\"{}\">&laquo; Previous</a>", escape(&links.href(prev)?)));
    }
    if let Some(next) = info.next {
        nav.push(format!("<a href=\"{}\">Next &raquo;</a>", escape(&links.href(next)?)));
    }
    if !nav.is_empty() {
        html.push_str(&format!("<p>{}</p>", nav.join(" | ")));
    }

    html.push_str("</body></html>");

    Ok(Rendered {
        body: html,
        content_type: HTML_CONTENT_TYPE,
    })
}

fn recipe_html(recipe: &Recipe) -> String {
    let name = escape(recipe.item_output.as_deref().unwrap_or_default());
    let mut html = format!("<hr/><h2>{name}</h2>");

    let ingredients: Vec<String> = recipe
        .ingredient_lines()
        .map(|ingredient| format!("<li>{}</li>", escape(ingredient)))
        .collect();
    if !ingredients.is_empty() {
        html.push_str(&format!("<ul>{}</ul>", ingredients.concat()));
    }

    if let Some(url) = recipe.image() {
        html.push_str(&format!(
            "<img src=\"{}\" alt=\"{name}\" style=\"max-width:300px;\"><br/>",
            escape(url)
        ));
    }

    html
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }

    escaped
}
