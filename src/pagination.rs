//! Offset pagination shared by the search and history endpoints.

use std::future::Future;

use crate::error::Result;

/// One page of results plus the server-reported total.
#[derive(Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Elements the server returned, before unparsable ones were dropped.
    pub received: usize,
    pub total: usize,
}

/// Walk pages in increasing offset order until the reported total is
/// reached, a page comes back empty or absent, or `cap` items are collected.
///
/// Offsets advance by what the server returned, not by what was kept, so
/// dropped elements neither shift later pages nor end the walk early.
/// `fetch_page` receives `(start_at, max_results)`; `max_results` never
/// exceeds `page_size` nor the remaining budget toward `cap`.
pub async fn collect_pages<T, F, Fut>(page_size: usize, cap: usize, mut fetch_page: F) -> Result<Vec<T>>
where
    F: FnMut(usize, usize) -> Fut,
    Fut: Future<Output = Result<Option<Page<T>>>>,
{
    let page_size = page_size.max(1);
    let mut items: Vec<T> = Vec::new();
    let mut start_at = 0;

    while items.len() < cap {
        let max_results = page_size.min(cap - items.len());

        let Some(page) = fetch_page(start_at, max_results).await? else {
            break;
        };
        if page.received == 0 {
            break;
        }

        start_at += page.received;
        items.extend(page.items);

        if start_at >= page.total {
            break;
        }
    }

    items.truncate(cap);
    Ok(items)
}
