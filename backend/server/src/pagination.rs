//! # Pagination
//!
//! Three ways to address a slice of search results. In-world scripts get small HTTP
//! bodies, so every variant exists to keep a response under some limit.
//!
//! - **Page**: 1-based page number over fixed-size pages
//! - **Offset**: `start` index plus `limit`
//! - **Budget**: pages filled greedily until the JSON array of the page would go over a
//!   byte budget, then addressed by page number
//!
//! Page numbers past either end clamp to the first/last page instead of failing.
use std::ops::Range;

use serde::Serialize;

use crate::error::AppError;

/// `[` and `]` around the serialized page.
const ARRAY_OVERHEAD: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pagination {
    Page { page: usize, page_size: usize },
    Offset { start: usize, limit: usize },
    Budget { page: usize, max_bytes: usize },
}

/// Where a navigation link points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    Page(usize),
    Start(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageInfo {
    pub total: usize,
    pub page: usize,
    pub page_count: usize,
    pub range: Range<usize>,
    pub prev: Option<Cursor>,
    pub next: Option<Cursor>,
}

pub struct Page<'a, T> {
    pub items: &'a [T],
    pub info: PageInfo,
}

pub fn paginate<T: Serialize>(results: &[T], pagination: Pagination) -> Result<Page<'_, T>, AppError> {
    let total = results.len();

    let info = match pagination {
        Pagination::Page { page, page_size } => by_page(total, page, page_size),
        Pagination::Offset { start, limit } => by_offset(total, start, limit),
        Pagination::Budget { page, max_bytes } => {
            let sizes = results
                .iter()
                .map(|item| serde_json::to_vec(item).map(|bytes| bytes.len()))
                .collect::<Result<Vec<_>, _>>()?;

            by_budget(&sizes, page, max_bytes)
        }
    };

    Ok(Page {
        items: &results[info.range.clone()],
        info,
    })
}

pub fn page_count(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1))
}

fn clamp_page(page: usize, page_count: usize) -> usize {
    page.clamp(1, page_count.max(1))
}

fn page_links(page: usize, page_count: usize) -> (Option<Cursor>, Option<Cursor>) {
    let prev = (page > 1).then(|| Cursor::Page(page - 1));
    let next = (page < page_count).then(|| Cursor::Page(page + 1));

    (prev, next)
}

fn by_page(total: usize, page: usize, page_size: usize) -> PageInfo {
    let page_size = page_size.max(1);
    let page_count = page_count(total, page_size);
    let page = clamp_page(page, page_count);

    let start = ((page - 1) * page_size).min(total);
    let end = (start + page_size).min(total);
    let (prev, next) = page_links(page, page_count);

    PageInfo {
        total,
        page,
        page_count,
        range: start..end,
        prev,
        next,
    }
}

fn by_offset(total: usize, start: usize, limit: usize) -> PageInfo {
    let limit = limit.max(1);
    let end = start.saturating_add(limit).min(total);
    let start = start.min(total);

    PageInfo {
        total,
        page: start / limit + 1,
        page_count: page_count(total, limit),
        range: start..end,
        prev: (start > 0).then(|| Cursor::Start(start.saturating_sub(limit))),
        next: (end < total).then_some(Cursor::Start(end)),
    }
}

fn by_budget(sizes: &[usize], page: usize, max_bytes: usize) -> PageInfo {
    let chunks = greedy_chunks(sizes, max_bytes);
    let page_count = chunks.len();
    let page = clamp_page(page, page_count);
    let (prev, next) = page_links(page, page_count);

    PageInfo {
        total: sizes.len(),
        page,
        page_count,
        range: chunks.get(page - 1).cloned().unwrap_or(0..0),
        prev,
        next,
    }
}

/// Splits items into consecutive pages whose serialized JSON array fits `max_bytes`.
///
/// One pass, no backtracking: an item that does not fit closes the current page and opens
/// the next one. An item larger than the whole budget still gets a page to itself.
pub fn greedy_chunks(sizes: &[usize], max_bytes: usize) -> Vec<Range<usize>> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut used = ARRAY_OVERHEAD;

    for (index, &size) in sizes.iter().enumerate() {
        if index == start {
            used = ARRAY_OVERHEAD + size;
            continue;
        }

        // comma separator
        let cost = size + 1;

        if used + cost > max_bytes {
            chunks.push(start..index);
            start = index;
            used = ARRAY_OVERHEAD + size;
        } else {
            used += cost;
        }
    }

    if start < sizes.len() {
        chunks.push(start..sizes.len());
    }

    chunks
}
