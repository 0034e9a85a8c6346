// src/state.rs

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use url::Url;
use validator::Validate;

use crate::catalog::Catalog;
use crate::errors::AppError;
use crate::models::Category;
use crate::services::CategoryLookup;
use crate::sessions::FormSessions;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub forms: FormSessions,
    pub category_lookup: Arc<dyn CategoryLookup>,
}

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Ustawienia aplikacji wczytywane ze zmiennych środowiskowych (i `.env`).
#[derive(Debug, Clone, Validate)]
pub struct Settings {
    pub bind_addr: SocketAddr,

    /// Brak adresu oznacza kategorie z lokalnego katalogu, bez zapytań HTTP.
    #[validate(url(message = "CATEGORY_SERVICE_URL musi być poprawnym adresem URL"))]
    pub category_service_url: Option<String>,

    #[validate(range(min = 1, max = 86400))]
    pub category_cache_ttl_secs: u64,

    #[validate(range(min = 1, max = 300))]
    pub category_fetch_timeout_secs: u64,

    #[validate(range(min = 60, message = "Sesja formularza musi trwać co najmniej minutę"))]
    pub form_session_idle_secs: u64,

    pub categories: Option<Vec<Category>>,
}

impl Settings {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Wczytuje ustawienia z dowolnego źródła klucz -> wartość.
    pub fn from_source<F>(get: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| AppError::Config(format!("BIND_ADDR: {}", e)))?;

        let categories = match get("CATEGORIES") {
            Some(raw) => Some(
                serde_json::from_str::<Vec<Category>>(&raw)
                    .map_err(|e| AppError::Config(format!("CATEGORIES: {}", e)))?,
            ),
            None => None,
        };

        let settings = Settings {
            bind_addr,
            category_service_url: get("CATEGORY_SERVICE_URL").filter(|url| !url.is_empty()),
            category_cache_ttl_secs: parse_secs(&get, "CATEGORY_CACHE_TTL_SECS", 60)?,
            category_fetch_timeout_secs: parse_secs(&get, "CATEGORY_FETCH_TIMEOUT_SECS", 10)?,
            form_session_idle_secs: parse_secs(&get, "FORM_SESSION_IDLE_SECS", 1800)?,
            categories,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Adres bazowy usługi kategorii, zawsze zakończony `/`,
    /// żeby `join("categories")` nie zgubił ostatniego segmentu.
    pub fn category_base_url(&self) -> Result<Option<Url>, AppError> {
        let Some(mut raw) = self.category_service_url.clone() else {
            return Ok(None);
        };
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Url::parse(&raw)
            .map(Some)
            .map_err(|e| AppError::Config(format!("CATEGORY_SERVICE_URL: {}", e)))
    }

    pub fn category_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.category_cache_ttl_secs)
    }

    pub fn category_fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.category_fetch_timeout_secs)
    }

    pub fn form_session_idle(&self) -> Duration {
        Duration::from_secs(self.form_session_idle_secs)
    }
}

fn parse_secs<F>(get: &F, key: &str, default: u64) -> Result<u64, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .parse::<u64>()
            .map_err(|_| AppError::Config(format!("{} musi być liczbą sekund", key))),
        None => Ok(default),
    }
}
