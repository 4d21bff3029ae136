use serde::Deserialize;

use crate::{config::Config, pagination::Pagination, render::Format};

/// Raw query string. Numbers stay strings so a bad `page=abc` falls back to the default
/// instead of failing the whole request.
#[derive(Debug, Default, Deserialize)]
pub struct RecipeParams {
    pub name: Option<String>,
    pub query: Option<String>,
    pub id: Option<String>,
    pub exact: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub start: Option<String>,
    pub limit: Option<String>,
    pub budget: Option<String>,
    pub human: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Lookup {
    Id(String),
    ExactName(String),
    Search(String),
    Missing,
}

impl RecipeParams {
    /// `name` wins over its `query` alias. Blank values count as missing.
    pub fn name(&self) -> Option<&str> {
        non_blank(self.name.as_deref()).or_else(|| non_blank(self.query.as_deref()))
    }

    pub fn lookup(&self) -> Lookup {
        if let Some(id) = non_blank(self.id.as_deref()) {
            return Lookup::Id(id.to_string());
        }

        match self.name() {
            Some(name) if flag(self.exact.as_deref()) => Lookup::ExactName(name.to_string()),
            Some(name) => Lookup::Search(name.to_string()),
            None => Lookup::Missing,
        }
    }

    pub fn format(&self) -> Format {
        Format::from_human(self.human.as_deref())
    }

    pub fn pagination(&self, config: &Config) -> Pagination {
        let page = positive(self.page.as_deref()).unwrap_or(1);

        if self.budget.is_some() {
            return Pagination::Budget {
                page,
                max_bytes: positive(self.budget.as_deref()).unwrap_or(config.byte_budget),
            };
        }

        if self.start.is_some() || self.limit.is_some() {
            return Pagination::Offset {
                start: number(self.start.as_deref()).unwrap_or(0),
                limit: positive(self.limit.as_deref()).unwrap_or(config.default_limit),
            };
        }

        Pagination::Page {
            page,
            page_size: positive(self.page_size.as_deref()).unwrap_or(config.page_size),
        }
    }

    /// Parameters carried into previous/next links, minus the cursor itself.
    pub fn link_params(&self, pagination: Pagination) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();

        if let Some(name) = self.name() {
            params.push(("name", name.to_string()));
        }
        if let Some(human) = non_blank(self.human.as_deref()) {
            params.push(("human", human.to_string()));
        }

        match pagination {
            Pagination::Page { page_size, .. } => {
                if self.page_size.is_some() {
                    params.push(("page_size", page_size.to_string()));
                }
            }
            Pagination::Offset { limit, .. } => params.push(("limit", limit.to_string())),
            Pagination::Budget { max_bytes, .. } => params.push(("budget", max_bytes.to_string())),
        }

        params
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn number(value: Option<&str>) -> Option<usize> {
    non_blank(value)?.parse().ok()
}

fn positive(value: Option<&str>) -> Option<usize> {
    number(value).filter(|&value| value > 0)
}

fn flag(value: Option<&str>) -> bool {
    matches!(non_blank(value), Some(value) if value != "0" && !value.eq_ignore_ascii_case("false"))
}
