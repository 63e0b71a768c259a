//! Pagination aggregation for cursor-paged APIs.

use std::future::Future;
use tracing::debug;

/// Request for one page: continuation cursor plus an upstream page-size bound.
#[derive(Debug, Clone, Default)]
pub struct PageRequest {
    pub cursor: Option<String>,
    pub page_size: Option<i32>,
}

impl PageRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(mut self, page_size: i32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }
}

/// One page of results. An absent cursor marks the terminal page.
#[derive(Debug, Clone)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
}

impl<T> PageResponse<T> {
    pub fn terminal(items: Vec<T>) -> Self {
        Self {
            items,
            next_cursor: None,
        }
    }

    pub fn partial(items: Vec<T>, next_cursor: impl Into<String>) -> Self {
        Self {
            items,
            next_cursor: Some(next_cursor.into()),
        }
    }
}

/// Drain a cursor-paged sequence into one materialized collection.
///
/// Pages are fetched strictly sequentially, items appended in arrival order,
/// until the response carries no continuation cursor or the running count
/// reaches `max_items`. A maximum that lands mid-page truncates that page's
/// trailing items, so the result is always a stable prefix of the unbounded
/// sequence and never longer than `max_items`.
///
/// Any fetch failure aborts the whole call; partial accumulation is
/// discarded. An empty continuation token is treated as terminal.
pub async fn paginate<T, E, F, Fut>(
    first: PageRequest,
    max_items: Option<usize>,
    mut fetch: F,
) -> Result<Vec<T>, E>
where
    F: FnMut(PageRequest) -> Fut,
    Fut: Future<Output = Result<PageResponse<T>, E>>,
{
    let mut collected: Vec<T> = Vec::new();
    let mut request = first;

    loop {
        if max_items.is_some_and(|max| collected.len() >= max) {
            break;
        }

        let page = fetch(request.clone()).await?;
        let fetched = page.items.len();
        let next = page.next_cursor.filter(|cursor| !cursor.is_empty());

        collected.extend(page.items);
        if let Some(max) = max_items {
            if collected.len() > max {
                collected.truncate(max);
            }
        }
        debug!(
            fetched,
            total = collected.len(),
            more = next.is_some(),
            "page drained"
        );

        match next {
            Some(cursor) => request.cursor = Some(cursor),
            None => break,
        }
    }

    Ok(collected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fetcher over fixed pages of `3,3,3`, cursor-linked.
    fn three_pages(
        fetches: &AtomicU32,
    ) -> impl FnMut(PageRequest) -> std::future::Ready<Result<PageResponse<u32>, ApiError>> + '_
    {
        move |request| {
            fetches.fetch_add(1, Ordering::SeqCst);
            let response = match request.cursor.as_deref() {
                None => PageResponse::partial(vec![1, 2, 3], "p2"),
                Some("p2") => PageResponse::partial(vec![4, 5, 6], "p3"),
                Some("p3") => PageResponse::terminal(vec![7, 8, 9]),
                Some(other) => panic!("unexpected cursor {other}"),
            };
            std::future::ready(Ok(response))
        }
    }

    #[tokio::test]
    async fn unbounded_drain_collects_every_page_in_order() {
        let fetches = AtomicU32::new(0);
        let items = paginate(PageRequest::new(), None, three_pages(&fetches))
            .await
            .unwrap();

        assert_eq!(items, vec![1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert_eq!(fetches.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn max_five_over_pages_of_three_truncates_the_second_page() {
        let fetches = AtomicU32::new(0);
        let items = paginate(PageRequest::new(), Some(5), three_pages(&fetches))
            .await
            .unwrap();

        assert_eq!(items, vec![1, 2, 3, 4, 5]);
        // The third page is never requested.
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn max_landing_on_a_page_boundary_stops_before_the_next_fetch() {
        let fetches = AtomicU32::new(0);
        let items = paginate(PageRequest::new(), Some(6), three_pages(&fetches))
            .await
            .unwrap();

        assert_eq!(items, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn max_zero_fetches_nothing() {
        let fetches = AtomicU32::new(0);
        let items = paginate(PageRequest::new(), Some(0), three_pages(&fetches))
            .await
            .unwrap();

        assert!(items.is_empty());
        assert_eq!(fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn fetch_failure_aborts_with_no_partial_result() {
        let fetches = AtomicU32::new(0);
        let result: Result<Vec<u32>, ApiError> =
            paginate(PageRequest::new(), None, |request| {
                fetches.fetch_add(1, Ordering::SeqCst);
                std::future::ready(match request.cursor.as_deref() {
                    None => Ok(PageResponse::partial(vec![1, 2, 3], "p2")),
                    Some(_) => Err(ApiError::new("Rate exceeded").with_code("Throttling")),
                })
            })
            .await;

        assert_eq!(result.unwrap_err().code.as_deref(), Some("Throttling"));
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn empty_continuation_token_is_terminal() {
        let items: Vec<u32> = paginate(PageRequest::new(), None, |_| {
            std::future::ready(Ok::<_, ApiError>(PageResponse::partial(vec![1], "")))
        })
        .await
        .unwrap();

        assert_eq!(items, vec![1]);
    }

    #[tokio::test]
    async fn cursor_and_page_size_are_threaded_through() {
        let items = paginate(
            PageRequest::new().with_page_size(2),
            None,
            |request| {
                assert_eq!(request.page_size, Some(2));
                std::future::ready(Ok::<_, ApiError>(match request.cursor.as_deref() {
                    None => PageResponse::partial(vec!["a"], "next"),
                    Some("next") => PageResponse::terminal(vec!["b"]),
                    Some(other) => panic!("unexpected cursor {other}"),
                }))
            },
        )
        .await
        .unwrap();

        assert_eq!(items, vec!["a", "b"]);
    }
}
