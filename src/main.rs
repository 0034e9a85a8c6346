// src/main.rs

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Deklaracje modułów
mod catalog; // dla src/catalog.rs
mod coerce; // dla src/coerce.rs
mod errors; // dla src/errors.rs
mod form; // dla src/form.rs
mod handlers; // dla src/handlers.rs
mod htmx_handlers;
mod models; // dla src/models.rs
mod response; // dla src/response.rs
mod services; // dla src/services.rs
mod sessions; // dla src/sessions.rs
mod state; // dla src/state.rs
mod validation; // dla src/validation.rs

// Importy z własnych modułów
use crate::catalog::Catalog;
use crate::handlers::*;
use crate::services::{CategoryLookup, HttpCategoryLookup, StaticCategoryLookup};
use crate::sessions::FormSessions;
use crate::state::{AppState, Settings};

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(products_page_handler))
        .route("/api/categories", get(list_categories_handler))
        .route("/api/products", get(list_products_handler))
        .route("/htmx/products", get(list_products_htmx_handler))
        .route("/htmx/forms", post(mount_form_handler))
        .route("/htmx/forms/{form_id}", get(get_form_handler))
        .route(
            "/htmx/forms/{form_id}/categories",
            get(category_select_handler),
        )
        .route(
            "/htmx/forms/{form_id}/fields/{field}",
            post(change_field_handler),
        )
        .route(
            "/htmx/forms/{form_id}/category",
            post(select_category_handler),
        )
        .route("/htmx/forms/{form_id}/submit", post(submit_form_handler))
        .route("/htmx/forms/{form_id}/back", post(back_handler))
        .nest_service("/static", ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    // Inicjalizacja systemu logowania (tracing)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "product_form=debug,tower_http=debug".into()), // np. RUST_LOG=info cargo run
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Inicjalizacja serwera...");

    // --- Konfiguracja ---
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(err) => {
            tracing::error!("Nieprawidłowa konfiguracja: {:?}", err);
            std::process::exit(1);
        }
    };

    let categories = settings
        .categories
        .clone()
        .unwrap_or_else(Catalog::default_categories);

    // --- Usługa kategorii ---
    // Bez CATEGORY_SERVICE_URL formularze biorą kategorie z lokalnego katalogu.
    let category_lookup: Arc<dyn CategoryLookup> = match settings.category_base_url() {
        Ok(Some(base_url)) => match HttpCategoryLookup::new(
            &base_url,
            settings.category_fetch_timeout(),
            settings.category_cache_ttl(),
        ) {
            Ok(lookup) => {
                tracing::info!("Kategorie pobierane z {}", lookup.endpoint());
                Arc::new(lookup)
            }
            Err(err) => {
                tracing::error!("Nie można utworzyć klienta usługi kategorii: {:?}", err);
                std::process::exit(1);
            }
        },
        Ok(None) => {
            tracing::info!("Kategorie z lokalnego katalogu ({} pozycji)", categories.len());
            Arc::new(StaticCategoryLookup::new(categories.clone()))
        }
        Err(err) => {
            tracing::error!("Nieprawidłowy adres usługi kategorii: {:?}", err);
            std::process::exit(1);
        }
    };

    // Definicja AppState
    let app_state = AppState {
        catalog: Arc::new(Catalog::new(categories)),
        forms: FormSessions::new(settings.form_session_idle()),
        category_lookup,
    };

    let app = build_router(app_state);

    let addr = settings.bind_addr;
    tracing::info!("Serwer nasłuchuje na {}", addr);

    // Utworzenie listenera TCP
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Nie można powiązać adresu {}: {}", addr, e);
            return;
        }
    };

    // Uruchomienie serwera Axum
    if let Err(e) = axum::serve(listener, app.into_make_service()).await {
        tracing::error!("Błąd serwera: {}", e);
    }
}
