//! Paginated loading of the catalog list.
//!
//! Pages are appended in the order they were requested. `load_next_page`
//! takes `&mut self`, so two loads can never overlap; `prefetch` issues
//! several requests at once and still applies them in order. Both have
//! cancellable forms; a cancelled load appends nothing.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;

use super::entry::{ListEntry, list_entries};
use super::repository::{PokemonRepository, Resource};
use super::types::{ErrorResponse, PokemonListResponse};

/// What a page load did.
#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    /// The page was appended; carries how many results it had.
    Appended(usize),
    /// Nothing left to load; no request was made.
    EndReached,
    /// The request failed; nothing was appended.
    Failed(ErrorResponse),
    /// The load was cancelled before it finished; nothing was appended.
    Cancelled,
}

pub struct PokemonPager {
    repository: Arc<dyn PokemonRepository>,
    page_size: u32,
    images_base: String,
    current_page: u32,
    entries: Vec<ListEntry>,
    end_reached: bool,
    last_error: Option<ErrorResponse>,
}

impl PokemonPager {
    pub fn new(
        repository: Arc<dyn PokemonRepository>,
        page_size: u32,
        images_base: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            page_size: page_size.max(1),
            images_base: images_base.into(),
            current_page: 0,
            entries: Vec::new(),
            end_reached: false,
            last_error: None,
        }
    }

    pub fn entries(&self) -> &[ListEntry] {
        &self.entries
    }

    pub fn is_end_reached(&self) -> bool {
        self.end_reached
    }

    /// Error of the most recent failed load, cleared by the next success.
    pub fn last_error(&self) -> Option<&ErrorResponse> {
        self.last_error.as_ref()
    }

    /// Number of pages appended so far.
    pub fn pages_loaded(&self) -> u32 {
        self.current_page
    }

    /// Fetches and appends the next page.
    pub async fn load_next_page(&mut self) -> PageOutcome {
        self.load_next_page_cancellable(&CancellationToken::new()).await
    }

    /// Like [`load_next_page`](Self::load_next_page), but abandons the
    /// request once `token` is cancelled.
    pub async fn load_next_page_cancellable(&mut self, token: &CancellationToken) -> PageOutcome {
        if self.end_reached {
            return PageOutcome::EndReached;
        }
        let Some(offset) = self.page_offset(0) else {
            return self.offset_overflow();
        };
        let resource = tokio::select! {
            biased;
            _ = token.cancelled() => {
                info!("Page load at offset {offset} cancelled");
                return PageOutcome::Cancelled;
            }
            resource = self.repository.pokemon_list(self.page_size, offset) => resource,
        };
        self.apply(offset, resource)
    }

    /// Requests up to `pages` upcoming pages with at most `concurrency` in
    /// flight, then appends them in request order. Stops at the first
    /// failure or once the end is reached.
    pub async fn prefetch(&mut self, pages: u32, concurrency: usize) -> Vec<PageOutcome> {
        self.prefetch_cancellable(pages, concurrency, &CancellationToken::new()).await
    }

    /// Like [`prefetch`](Self::prefetch). Cancelling `token` drops every
    /// request still in flight and appends none of the batch.
    pub async fn prefetch_cancellable(
        &mut self,
        pages: u32,
        concurrency: usize,
        token: &CancellationToken,
    ) -> Vec<PageOutcome> {
        if self.end_reached {
            return vec![PageOutcome::EndReached];
        }

        let offsets: Vec<u32> = (0..pages).map_while(|i| self.page_offset(i)).collect();
        if offsets.is_empty() && pages > 0 {
            return vec![self.offset_overflow()];
        }

        let page_size = self.page_size;
        let repository = Arc::clone(&self.repository);
        debug!(
            "Prefetching {} pages from page {}, concurrency {concurrency}",
            offsets.len(),
            self.current_page
        );

        let fetch = stream::iter(offsets)
            .map(|offset| {
                let repository = Arc::clone(&repository);
                async move { (offset, repository.pokemon_list(page_size, offset).await) }
            })
            .buffered(concurrency.max(1))
            .collect::<Vec<(u32, Resource<PokemonListResponse>)>>();
        let fetched = tokio::select! {
            biased;
            _ = token.cancelled() => {
                info!("Prefetch cancelled");
                return vec![PageOutcome::Cancelled];
            }
            fetched = fetch => fetched,
        };

        let mut outcomes = Vec::with_capacity(fetched.len());
        for (offset, resource) in fetched {
            if self.end_reached {
                break;
            }
            let outcome = self.apply(offset, resource);
            let failed = matches!(outcome, PageOutcome::Failed(_));
            outcomes.push(outcome);
            if failed {
                break;
            }
        }
        outcomes
    }

    /// Offset of the page `ahead` pages past the next one, if it fits in `u32`.
    fn page_offset(&self, ahead: u32) -> Option<u32> {
        self.current_page
            .checked_add(ahead)?
            .checked_mul(self.page_size)
    }

    fn offset_overflow(&mut self) -> PageOutcome {
        warn!(
            "Offset of page {} with page size {} does not fit, treating as end of list",
            self.current_page, self.page_size
        );
        self.end_reached = true;
        PageOutcome::EndReached
    }

    fn apply(&mut self, offset: u32, resource: Resource<PokemonListResponse>) -> PageOutcome {
        match resource {
            Resource::Success(page) => {
                let added = page.results.len();
                self.end_reached =
                    added == 0 || u64::from(offset) + added as u64 >= u64::from(page.count);
                self.entries
                    .extend(list_entries(&page.results, &self.images_base));
                self.current_page += 1;
                self.last_error = None;
                info!(
                    "Loaded page {} ({} results, {} total, end reached: {})",
                    self.current_page,
                    added,
                    self.entries.len(),
                    self.end_reached
                );
                PageOutcome::Appended(added)
            }
            Resource::Error { code, message } => {
                warn!("Page load at offset {offset} failed: {code} {message}");
                let error = ErrorResponse { id: code, message };
                self.last_error = Some(error.clone());
                PageOutcome::Failed(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pokeapi::types::{NamedResource, PokemonResponse};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    const IMAGES: &str = "https://img.example/dream-world/";

    /// In-memory catalog of `total` Pokémon. Earlier offsets answer slower
    /// so concurrent requests complete out of order.
    struct FakeCatalog {
        total: u32,
        fail_at_offset: Option<u32>,
        calls: Mutex<Vec<(u32, u32)>>,
    }

    impl FakeCatalog {
        fn new(total: u32) -> Self {
            Self {
                total,
                fail_at_offset: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(u32, u32)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PokemonRepository for FakeCatalog {
        async fn pokemon_list(&self, limit: u32, offset: u32) -> Resource<PokemonListResponse> {
            self.calls.lock().unwrap().push((limit, offset));
            tokio::time::sleep(Duration::from_millis(u64::from(100 - offset.min(100)))).await;

            if self.fail_at_offset == Some(offset) {
                return Resource::Error {
                    code: 2000,
                    message: "Network error".to_string(),
                };
            }
            let end = offset.saturating_add(limit).min(self.total);
            let results = (offset..end)
                .map(|i| NamedResource {
                    name: format!("mon{}", i + 1),
                    url: format!("https://pokeapi.co/api/v2/pokemon/{}/", i + 1),
                })
                .collect();
            Resource::Success(PokemonListResponse {
                count: self.total,
                next: None,
                previous: None,
                results,
            })
        }

        async fn pokemon_details(&self, _name: &str) -> Resource<PokemonResponse> {
            unreachable!("pager never loads details")
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_pages_append_until_end() {
        let catalog = Arc::new(FakeCatalog::new(45));
        let mut pager = PokemonPager::new(catalog.clone(), 20, IMAGES);

        assert_eq!(pager.load_next_page().await, PageOutcome::Appended(20));
        assert!(!pager.is_end_reached());
        assert_eq!(pager.load_next_page().await, PageOutcome::Appended(20));
        assert_eq!(pager.load_next_page().await, PageOutcome::Appended(5));
        assert!(pager.is_end_reached());
        assert_eq!(pager.load_next_page().await, PageOutcome::EndReached);

        assert_eq!(pager.entries().len(), 45);
        assert_eq!(pager.entries()[0].name, "Mon1");
        assert_eq!(pager.entries()[44].number, 45);
        assert_eq!(pager.pages_loaded(), 3);
        assert_eq!(catalog.calls(), vec![(20, 0), (20, 20), (20, 40)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exact_multiple_reaches_end_without_extra_request() {
        let catalog = Arc::new(FakeCatalog::new(40));
        let mut pager = PokemonPager::new(catalog.clone(), 20, IMAGES);

        pager.load_next_page().await;
        pager.load_next_page().await;
        assert!(pager.is_end_reached());
        assert_eq!(pager.load_next_page().await, PageOutcome::EndReached);
        assert_eq!(catalog.calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_keeps_position_and_records_error() {
        let catalog = Arc::new(FakeCatalog {
            fail_at_offset: Some(20),
            ..FakeCatalog::new(100)
        });
        let mut pager = PokemonPager::new(catalog.clone(), 20, IMAGES);

        pager.load_next_page().await;
        let outcome = pager.load_next_page().await;
        assert_eq!(
            outcome,
            PageOutcome::Failed(ErrorResponse {
                id: 2000,
                message: "Network error".to_string()
            })
        );
        assert_eq!(pager.entries().len(), 20);
        assert_eq!(pager.pages_loaded(), 1);
        assert_eq!(pager.last_error().map(|e| e.id), Some(2000));

        // Retrying asks for the same offset again.
        pager.load_next_page().await;
        assert_eq!(catalog.calls().last(), Some(&(20, 20)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_prefetch_preserves_request_order() {
        let catalog = Arc::new(FakeCatalog::new(1000));
        let mut pager = PokemonPager::new(catalog.clone(), 20, IMAGES);

        let outcomes = pager.prefetch(4, 4).await;
        assert_eq!(outcomes, vec![PageOutcome::Appended(20); 4]);

        let numbers: Vec<u32> = pager.entries().iter().map(|e| e.number).collect();
        assert_eq!(numbers, (1..=80).collect::<Vec<_>>());
        assert_eq!(pager.pages_loaded(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_prefetch_stops_at_end_and_failure() {
        let catalog = Arc::new(FakeCatalog::new(30));
        let mut pager = PokemonPager::new(catalog, 20, IMAGES);
        let outcomes = pager.prefetch(5, 2).await;
        assert_eq!(
            outcomes,
            vec![PageOutcome::Appended(20), PageOutcome::Appended(10)]
        );
        assert!(pager.is_end_reached());
        assert_eq!(pager.prefetch(1, 1).await, vec![PageOutcome::EndReached]);

        let failing = Arc::new(FakeCatalog {
            fail_at_offset: Some(20),
            ..FakeCatalog::new(100)
        });
        let mut pager = PokemonPager::new(failing, 20, IMAGES);
        let outcomes = pager.prefetch(3, 3).await;
        assert_eq!(outcomes.len(), 2);
        assert!(matches!(outcomes[1], PageOutcome::Failed(_)));
        assert_eq!(pager.entries().len(), 20);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_load_appends_nothing() {
        let catalog = Arc::new(FakeCatalog::new(100));
        let mut pager = PokemonPager::new(catalog.clone(), 20, IMAGES);
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });

        // The first page answers after 100ms, well after the cancel.
        assert_eq!(
            pager.load_next_page_cancellable(&token).await,
            PageOutcome::Cancelled
        );
        assert!(pager.entries().is_empty());
        assert_eq!(pager.pages_loaded(), 0);
        assert!(pager.last_error().is_none());
        assert!(!pager.is_end_reached());

        // Cancelled loads are not end-of-list; a fresh load resumes at offset 0.
        assert_eq!(pager.load_next_page().await, PageOutcome::Appended(20));
        assert_eq!(catalog.calls(), vec![(20, 0), (20, 0)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_prefetch_appends_nothing() {
        let catalog = Arc::new(FakeCatalog::new(1000));
        let mut pager = PokemonPager::new(catalog, 20, IMAGES);
        let token = CancellationToken::new();
        token.cancel();

        let outcomes = pager.prefetch_cancellable(3, 3, &token).await;
        assert_eq!(outcomes, vec![PageOutcome::Cancelled]);
        assert!(pager.entries().is_empty());
        assert_eq!(pager.pages_loaded(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_offset_overflow_ends_the_list() {
        let page_size = u32::MAX / 2 + 1;
        let catalog = Arc::new(FakeCatalog::new(45));
        let mut pager = PokemonPager::new(catalog.clone(), page_size, IMAGES);
        pager.current_page = 1;

        // Page 1 fits; page 2 would overflow, so the batch stops there.
        let outcomes = pager.prefetch(3, 3).await;
        assert_eq!(outcomes, vec![PageOutcome::Appended(0)]);
        assert_eq!(catalog.calls(), vec![(page_size, page_size)]);

        let mut pager = PokemonPager::new(catalog.clone(), page_size, IMAGES);
        pager.current_page = 2;
        assert_eq!(pager.load_next_page().await, PageOutcome::EndReached);
        assert!(pager.is_end_reached());
        assert_eq!(pager.prefetch(3, 3).await, vec![PageOutcome::EndReached]);
        assert_eq!(catalog.calls().len(), 1);
    }
}
