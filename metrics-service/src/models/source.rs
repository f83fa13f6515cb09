use crate::models::book::Book;
use crate::models::context::RequestContext;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("external service unavailable: {0}")]
    Unavailable(#[from] reqwest::Error),
    #[error("external service unavailable: request cancelled")]
    Cancelled,
    #[error("external service unavailable: deadline exceeded")]
    DeadlineExceeded,
    #[error("external service returned status {0}")]
    Status(u16),
    #[error("failed to decode book catalog: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FetchError {
    /// Transport-class failures: the remote could not be reached in time.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            FetchError::Unavailable(_) | FetchError::Cancelled | FetchError::DeadlineExceeded
        )
    }
}

#[async_trait]
pub trait BookSource {
    /// Fetches the whole catalog. All-or-nothing, single attempt.
    async fn fetch(&self, ctx: &RequestContext) -> Result<Vec<Book>, FetchError>;
}

/// Races `request` against the context's deadline and cancellation signal.
async fn bounded<F>(ctx: &RequestContext, request: F) -> Result<Vec<Book>, FetchError>
where
    F: std::future::Future<Output = Result<Vec<Book>, FetchError>>,
{
    if ctx.is_cancelled() {
        return Err(FetchError::Cancelled);
    }

    let deadline_bounded = async {
        match ctx.deadline() {
            Some(deadline) => match tokio::time::timeout_at(deadline, request).await {
                Ok(result) => result,
                Err(_) => Err(FetchError::DeadlineExceeded),
            },
            None => request.await,
        }
    };

    tokio::select! {
        biased;
        _ = ctx.cancelled() => Err(FetchError::Cancelled),
        result = deadline_bounded => result,
    }
}

/// Reads the catalog from a remote JSON endpoint over HTTP.
pub struct ExternalBookSource {
    client: reqwest::Client,
    endpoint: String,
}

impl ExternalBookSource {
    pub fn new(endpoint: &str) -> Result<Self, FetchError> {
        Self::with_timeout(endpoint, DEFAULT_FETCH_TIMEOUT)
    }

    pub fn with_timeout(endpoint: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn request_catalog(&self) -> Result<Vec<Book>, FetchError> {
        debug!("Fetching book catalog from {}", self.endpoint);

        let response = self.client.get(&self.endpoint).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Books API {} responded with {}", self.endpoint, status);
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let books: Vec<Book> = serde_json::from_slice(&body)?;

        debug!("Fetched {} books", books.len());
        Ok(books)
    }
}

#[async_trait]
impl BookSource for ExternalBookSource {
    async fn fetch(&self, ctx: &RequestContext) -> Result<Vec<Book>, FetchError> {
        bounded(ctx, self.request_catalog()).await
    }
}

/// Serves a fixed catalog without touching the network.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBookSource {
    books: Vec<Book>,
}

impl InMemoryBookSource {
    pub fn new(books: Vec<Book>) -> Self {
        Self { books }
    }

    pub fn sample() -> Self {
        Self::new(vec![
            Book {
                id: 1,
                name: "The Go Programming Language".to_string(),
                author: "Alan Donovan".to_string(),
                price: 40,
                units_sold: 5000,
            },
            Book {
                id: 2,
                name: "Clean Code".to_string(),
                author: "Robert C. Martin".to_string(),
                price: 44,
                units_sold: 15000,
            },
            Book {
                id: 3,
                name: "The Pragmatic Programmer".to_string(),
                author: "Andrew Hunt".to_string(),
                price: 50,
                units_sold: 13000,
            },
        ])
    }
}

#[async_trait]
impl BookSource for InMemoryBookSource {
    async fn fetch(&self, ctx: &RequestContext) -> Result<Vec<Book>, FetchError> {
        bounded(ctx, async { Ok(self.books.clone()) }).await
    }
}
