//! # Pagination
//!
//! Turns a token-paginated listing API into a lazy stream of items.
//!
//! The caller supplies a function that fetches one page for a continuation
//! token (`None` for the first page). The stream asks for the next page only
//! after the items of the previous one have been consumed, ends when a page
//! comes back without a token, and ends early with the first page error.
//! Calling [`paginate`] again restarts the listing from the first page.

use futures::stream::{self, Stream, TryStreamExt};
use std::future::Future;

/// One page of a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    #[must_use]
    pub fn new(items: Vec<T>, next_token: Option<String>) -> Self {
        Self { items, next_token }
    }

    /// Final page (no continuation token)
    #[must_use]
    pub fn last(items: Vec<T>) -> Self {
        Self::new(items, None)
    }
}

enum Cursor {
    Start,
    Next(String),
    Done,
}

/// Stream every item of every page, in page order
pub fn paginate<T, E, F, Fut>(fetch_page: F) -> impl Stream<Item = Result<T, E>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>, E>>,
{
    stream::try_unfold(
        (Cursor::Start, fetch_page),
        |(cursor, mut fetch_page)| async move {
            let token = match cursor {
                Cursor::Done => return Ok(None),
                Cursor::Start => None,
                Cursor::Next(token) => Some(token),
            };

            let page = fetch_page(token).await?;

            // An empty token is treated the same as a missing one
            let next = match page.next_token {
                Some(token) if !token.is_empty() => Cursor::Next(token),
                _ => Cursor::Done,
            };

            let items = stream::iter(page.items.into_iter().map(Ok::<T, E>));
            Ok(Some((items, (next, fetch_page))))
        },
    )
    .try_flatten()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn pages() -> Vec<Page<&'static str>> {
        vec![
            Page::new(vec!["a", "b"], Some("t1".to_string())),
            Page::new(vec![], Some("t2".to_string())),
            Page::last(vec!["c"]),
        ]
    }

    #[tokio::test]
    async fn test_collects_all_pages_in_order() {
        let seen_tokens = Arc::new(Mutex::new(Vec::new()));
        let tokens = Arc::clone(&seen_tokens);
        let source = pages();

        let items: Vec<&str> = paginate(move |token: Option<String>| {
            let index = match token.as_deref() {
                None => 0,
                Some("t1") => 1,
                Some("t2") => 2,
                Some(other) => panic!("unexpected token {other}"),
            };
            tokens.lock().unwrap().push(token);
            let page = source[index].clone();
            async move { Ok::<_, String>(page) }
        })
        .try_collect()
        .await
        .unwrap();

        assert_eq!(items, vec!["a", "b", "c"]);
        assert_eq!(
            *seen_tokens.lock().unwrap(),
            vec![None, Some("t1".to_string()), Some("t2".to_string())]
        );
    }

    #[tokio::test]
    async fn test_empty_token_ends_listing() {
        let mut calls = 0;
        let items: Vec<u32> = paginate(|_token| {
            calls += 1;
            async { Ok::<_, String>(Page::new(vec![1, 2], Some(String::new()))) }
        })
        .try_collect()
        .await
        .unwrap();

        assert_eq!(items, vec![1, 2]);
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_page_error_ends_stream() {
        let result: Result<Vec<u32>, String> = paginate(|token: Option<String>| async move {
            match token {
                None => Ok(Page::new(vec![1], Some("next".to_string()))),
                Some(_) => Err("access denied".to_string()),
            }
        })
        .try_collect()
        .await;

        assert_eq!(result, Err("access denied".to_string()));
    }

    #[tokio::test]
    async fn test_no_items_is_empty_stream() {
        let items: Vec<u32> = paginate(|_token| async { Ok::<_, String>(Page::<u32>::last(vec![])) })
            .try_collect()
            .await
            .unwrap();
        assert!(items.is_empty());
    }
}
