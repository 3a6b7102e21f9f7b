//! Fixed-size page requests and the page object returned by the list endpoint.

use serde::Serialize;

/// Products per page.
pub const PER_PAGE: u64 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub per_page: u64,
}

impl PageRequest {
    pub fn new(page: u64) -> Self {
        PageRequest {
            page: page.max(1),
            per_page: PER_PAGE,
        }
    }

    /// Missing, unparsable or zero `page` values fall back to the first page.
    pub fn from_query(raw: Option<&str>) -> Self {
        let page = raw.and_then(|s| s.trim().parse::<u64>().ok()).unwrap_or(1);
        Self::new(page)
    }

    /// Row offset of the first item, capped at `i64::MAX` so it always binds as a BIGINT.
    pub fn offset(&self) -> u64 {
        (self.page - 1)
            .saturating_mul(self.per_page)
            .min(i64::MAX as u64)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1)
    }
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub current_page: u64,
    pub data: Vec<T>,
    pub first_page_url: String,
    pub from: Option<u64>,
    pub last_page: u64,
    pub last_page_url: String,
    pub next_page_url: Option<String>,
    pub path: String,
    pub per_page: u64,
    pub prev_page_url: Option<String>,
    pub to: Option<u64>,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, request: PageRequest, total: u64, path: &str) -> Self {
        let url = |page: u64| format!("{}?page={}", path, page);
        let last_page = total.div_ceil(request.per_page).max(1);
        let (from, to) = if data.is_empty() {
            (None, None)
        } else {
            let from = request.offset() + 1;
            (Some(from), Some(from + data.len() as u64 - 1))
        };
        Page {
            current_page: request.page,
            first_page_url: url(1),
            from,
            last_page,
            last_page_url: url(last_page),
            next_page_url: (request.page < last_page).then(|| url(request.page + 1)),
            path: path.to_string(),
            per_page: request.per_page,
            prev_page_url: (request.page > 1).then(|| url(request.page - 1)),
            to,
            total,
            data,
        }
    }
}
