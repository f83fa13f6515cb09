use crate::models::book::Book;
use crate::models::context::RequestContext;
use crate::models::responses::MetricsResult;
use crate::models::source::BookSource;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

pub type Source = Arc<dyn BookSource + Send + Sync>;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputeError {
    #[error("error fetching books from external service")]
    ExternalServiceFailure,
}

pub struct MetricsService {
    source: Source,
}

impl MetricsService {
    pub fn new(source: Source) -> Self {
        Self { source }
    }

    /// Fetches a fresh catalog and aggregates it for `author`.
    ///
    /// Every fetch failure collapses into [`ComputeError::ExternalServiceFailure`];
    /// the cause is only logged.
    pub async fn compute_metrics(
        &self,
        ctx: &RequestContext,
        author: &str,
    ) -> Result<MetricsResult, ComputeError> {
        let books = match self.source.fetch(ctx).await {
            Ok(books) => books,
            Err(e) => {
                warn!("Failed to fetch book catalog: {}", e);
                return Err(ComputeError::ExternalServiceFailure);
            }
        };

        info!("Computing metrics over {} books", books.len());

        Ok(compute(&books, author))
    }
}

pub fn compute(books: &[Book], author: &str) -> MetricsResult {
    MetricsResult {
        mean_units_sold: mean_units_sold(books),
        cheapest_book: cheapest_book(books).name,
        books_written_by_author: books_written_by_author(books, author),
    }
}

/// Floor of the average units sold; 0 for an empty catalog.
pub fn mean_units_sold(books: &[Book]) -> u64 {
    if books.is_empty() {
        return 0;
    }

    let total: u128 = books.iter().map(|book| u128::from(book.units_sold)).sum();
    // The mean never exceeds the largest element, so it fits back into u64.
    (total / books.len() as u128) as u64
}

/// Lowest-priced book, first in catalog order on ties. Zero book when empty.
pub fn cheapest_book(books: &[Book]) -> Book {
    books
        .iter()
        .min_by_key(|book| book.price)
        .cloned()
        .unwrap_or_default()
}

pub fn books_written_by_author(books: &[Book], author: &str) -> u64 {
    books.iter().filter(|book| book.author == author).count() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::source::{FetchError, InMemoryBookSource};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailingSource {
        calls: AtomicUsize,
        make_error: fn() -> FetchError,
    }

    impl FailingSource {
        fn new(make_error: fn() -> FetchError) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                make_error,
            }
        }
    }

    #[async_trait]
    impl BookSource for FailingSource {
        async fn fetch(&self, _ctx: &RequestContext) -> Result<Vec<Book>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err((self.make_error)())
        }
    }

    fn book(name: &str, author: &str, price: u64, units_sold: u64) -> Book {
        Book {
            id: 0,
            name: name.to_string(),
            author: author.to_string(),
            price,
            units_sold,
        }
    }

    fn sample_service() -> MetricsService {
        MetricsService::new(Arc::new(InMemoryBookSource::sample()))
    }

    #[tokio::test]
    async fn computes_metrics_for_known_author() {
        let result = sample_service()
            .compute_metrics(&RequestContext::background(), "Robert C. Martin")
            .await
            .unwrap();

        assert_eq!(
            result,
            MetricsResult {
                mean_units_sold: 11000,
                cheapest_book: "The Go Programming Language".to_string(),
                books_written_by_author: 1,
            }
        );
    }

    #[tokio::test]
    async fn unknown_author_only_changes_count() {
        let result = sample_service()
            .compute_metrics(&RequestContext::background(), "Unknown Author")
            .await
            .unwrap();

        assert_eq!(result.mean_units_sold, 11000);
        assert_eq!(result.cheapest_book, "The Go Programming Language");
        assert_eq!(result.books_written_by_author, 0);
    }

    #[tokio::test]
    async fn empty_catalog_uses_fallbacks() {
        let service = MetricsService::new(Arc::new(InMemoryBookSource::new(Vec::new())));

        let result = service
            .compute_metrics(&RequestContext::background(), "Anyone")
            .await
            .unwrap();

        assert_eq!(result, MetricsResult::default());
        assert_eq!(result.cheapest_book, "");
    }

    #[tokio::test]
    async fn repeated_computation_is_identical() {
        let service = sample_service();
        let ctx = RequestContext::background();

        let first = service.compute_metrics(&ctx, "Alan Donovan").await.unwrap();
        let second = service.compute_metrics(&ctx, "Alan Donovan").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.books_written_by_author, 1);
    }

    #[tokio::test]
    async fn every_fetch_failure_collapses() {
        let makers: [fn() -> FetchError; 4] = [
            || FetchError::Status(500),
            || FetchError::Cancelled,
            || FetchError::DeadlineExceeded,
            || FetchError::Decode(serde_json::from_str::<Vec<Book>>("{").unwrap_err()),
        ];

        for make_error in makers {
            let source = Arc::new(FailingSource::new(make_error));
            let service = MetricsService::new(source.clone());

            let err = service
                .compute_metrics(&RequestContext::background(), "Any Author")
                .await
                .unwrap_err();

            assert_eq!(err, ComputeError::ExternalServiceFailure);
            assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn failure_message_is_generic() {
        assert_eq!(
            ComputeError::ExternalServiceFailure.to_string(),
            "error fetching books from external service"
        );
    }

    #[test]
    fn mean_truncates() {
        let books = vec![book("a", "x", 1, 1000), book("b", "x", 1, 2000), book("c", "x", 1, 3000)];
        assert_eq!(mean_units_sold(&books), 2000);

        let books = vec![book("a", "x", 1, 1), book("b", "x", 1, 2)];
        assert_eq!(mean_units_sold(&books), 1);
    }

    #[test]
    fn mean_of_empty_is_zero() {
        assert_eq!(mean_units_sold(&[]), 0);
    }

    #[test]
    fn mean_does_not_overflow() {
        let books = vec![book("a", "x", 1, u64::MAX), book("b", "x", 1, u64::MAX)];

        assert_eq!(mean_units_sold(&books), u64::MAX);
    }

    #[test]
    fn cheapest_picks_minimum_price() {
        let books = vec![
            book("Expensive Book", "x", 100, 0),
            book("Cheap Book", "x", 20, 0),
            book("Medium Book", "x", 50, 0),
        ];

        let cheapest = cheapest_book(&books);

        assert_eq!(cheapest.name, "Cheap Book");
        assert_eq!(cheapest.price, 20);
    }

    #[test]
    fn cheapest_tie_goes_to_first_in_order() {
        let books = vec![
            book("Pricey", "x", 30, 0),
            book("First Cheap", "x", 10, 0),
            book("Second Cheap", "x", 10, 0),
        ];

        assert_eq!(cheapest_book(&books).name, "First Cheap");
    }

    #[test]
    fn cheapest_of_empty_is_zero_book() {
        assert_eq!(cheapest_book(&[]), Book::default());
    }

    #[test]
    fn counts_exact_author_matches() {
        let books = vec![
            book("a", "John Doe", 1, 0),
            book("b", "Jane Smith", 1, 0),
            book("c", "John Doe", 1, 0),
            book("d", "Bob Wilson", 1, 0),
        ];

        assert_eq!(books_written_by_author(&books, "John Doe"), 2);
        assert_eq!(books_written_by_author(&books, "Unknown Author"), 0);
    }

    #[test]
    fn author_match_is_case_sensitive() {
        let books = vec![book("a", "John Doe", 1, 0)];

        assert_eq!(books_written_by_author(&books, "john doe"), 0);
        assert_eq!(books_written_by_author(&books, "John Doe "), 0);
    }

    #[test]
    fn empty_author_is_not_a_wildcard() {
        let books = vec![
            book("a", "John Doe", 1, 0),
            book("b", "", 1, 0),
            book("c", "Jane Smith", 1, 0),
        ];

        assert_eq!(books_written_by_author(&books, ""), 1);
    }
}
