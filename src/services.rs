// src/services.rs

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use url::Url;

use crate::models::Category;

const CATEGORY_CACHE_KEY: &str = "all";

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Błąd komunikacji z usługą kategorii: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Usługa kategorii odpowiedziała statusem {0}")]
    Status(StatusCode),

    #[error("Nieprawidłowy adres usługi kategorii: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Źródło listy kategorii dla selektora w formularzu.
#[async_trait]
pub trait CategoryLookup: Send + Sync + 'static {
    async fn fetch_all(&self) -> Result<Vec<Category>, LookupError>;
}

/// Pobiera kategorie z zewnętrznej usługi (`GET <base>/categories`).
///
/// Udana odpowiedź trafia do cache'u na `cache_ttl`, więc kolejne formularze
/// otwierane w krótkim odstępie nie generują nowych zapytań.
pub struct HttpCategoryLookup {
    client: Client,
    endpoint: Url,
    cache: Cache<&'static str, Vec<Category>>,
}

impl HttpCategoryLookup {
    pub fn new(
        base_url: &Url,
        timeout: Duration,
        cache_ttl: Duration,
    ) -> Result<Self, LookupError> {
        let endpoint = base_url.join("categories")?;
        let client = Client::builder().timeout(timeout).build()?;
        let cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(cache_ttl)
            .build();

        tracing::debug!("Adres usługi kategorii: {}", endpoint);
        Ok(HttpCategoryLookup {
            client,
            endpoint,
            cache,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl CategoryLookup for HttpCategoryLookup {
    async fn fetch_all(&self) -> Result<Vec<Category>, LookupError> {
        // Krok 1: Sprawdzenie cache'u
        if let Some(cached) = self.cache.get(CATEGORY_CACHE_KEY).await {
            tracing::debug!("Cache HIT dla listy kategorii ({} pozycji)", cached.len());
            return Ok(cached);
        }

        // Krok 2: Zapytanie do usługi
        tracing::debug!("Cache MISS dla listy kategorii. GET {}", self.endpoint);
        let response = self.client.get(self.endpoint.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Usługa kategorii zwróciła status {}", status);
            return Err(LookupError::Status(status));
        }
        let categories: Vec<Category> = response.json().await?;

        // Krok 3: Zapisanie wyniku w cache'u
        self.cache
            .insert(CATEGORY_CACHE_KEY, categories.clone())
            .await;

        Ok(categories)
    }
}

/// Stała lista kategorii, bez żadnej komunikacji sieciowej.
#[derive(Debug, Clone, Default)]
pub struct StaticCategoryLookup {
    categories: Vec<Category>,
}

impl StaticCategoryLookup {
    pub fn new(categories: Vec<Category>) -> Self {
        StaticCategoryLookup { categories }
    }
}

#[async_trait]
impl CategoryLookup for StaticCategoryLookup {
    async fn fetch_all(&self) -> Result<Vec<Category>, LookupError> {
        Ok(self.categories.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, http::StatusCode as HttpStatus, routing::get};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::net::TcpListener;

    async fn spawn_category_service(status: HttpStatus, hits: Arc<AtomicUsize>) -> Url {
        let app = Router::new().route(
            "/api/categories",
            get(move || {
                let hits = hits.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    (
                        status,
                        Json(vec![Category::new(1, "Tools"), Category::new(2, "Food")]),
                    )
                }
            }),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Url::parse(&format!("http://{}/api/", addr)).unwrap()
    }

    #[tokio::test]
    async fn fetches_and_caches_categories() {
        let hits = Arc::new(AtomicUsize::new(0));
        let base = spawn_category_service(HttpStatus::OK, hits.clone()).await;
        let lookup =
            HttpCategoryLookup::new(&base, Duration::from_secs(5), Duration::from_secs(60)).unwrap();

        let first = lookup.fetch_all().await.unwrap();
        let second = lookup.fetch_all().await.unwrap();

        assert_eq!(first, vec![Category::new(1, "Tools"), Category::new(2, "Food")]);
        assert_eq!(first, second);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn error_status_is_reported_and_not_cached() {
        let hits = Arc::new(AtomicUsize::new(0));
        let base = spawn_category_service(HttpStatus::SERVICE_UNAVAILABLE, hits.clone()).await;
        let lookup =
            HttpCategoryLookup::new(&base, Duration::from_secs(5), Duration::from_secs(60)).unwrap();

        let err = lookup.fetch_all().await.unwrap_err();
        assert!(matches!(err, LookupError::Status(s) if s == StatusCode::SERVICE_UNAVAILABLE));

        lookup.fetch_all().await.unwrap_err();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn unreachable_service_is_an_http_error() {
        // Port 9 (discard) na localhoście zwykle odrzuca połączenie.
        let base = Url::parse("http://127.0.0.1:9/api/").unwrap();
        let lookup =
            HttpCategoryLookup::new(&base, Duration::from_secs(2), Duration::from_secs(60)).unwrap();
        assert!(matches!(lookup.fetch_all().await, Err(LookupError::Http(_))));
    }

    #[test]
    fn endpoint_is_joined_to_base() {
        let base = Url::parse("http://localhost:3000/api/").unwrap();
        let lookup =
            HttpCategoryLookup::new(&base, Duration::from_secs(1), Duration::from_secs(1)).unwrap();
        assert_eq!(lookup.endpoint().as_str(), "http://localhost:3000/api/categories");
    }

    #[tokio::test]
    async fn static_lookup_returns_its_list() {
        let lookup = StaticCategoryLookup::new(vec![Category::new(7, "Drinks")]);
        assert_eq!(lookup.fetch_all().await.unwrap(), vec![Category::new(7, "Drinks")]);
    }
}
