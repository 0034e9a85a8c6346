// src/handlers.rs
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use axum::response::Response;
use axum::{Form, Json};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
};
use maud::Markup;
use serde::Deserialize;
use strum::IntoEnumIterator;
use uuid::Uuid;

use crate::catalog::{CatalogHandlers, Selection};
use crate::errors::AppError;
use crate::form::ProductForm;
use crate::htmx_handlers::{render_category_select, render_product_form, render_product_list};
use crate::models::{Category, FieldChange, Product, ProductField, SelectedProduct};
use crate::response::build_response;
use crate::sessions::FormSession;
use crate::state::AppState;

pub async fn list_categories_handler(State(app_state): State<AppState>) -> Json<Vec<Category>> {
    tracing::debug!("Obsłużono zapytanie GET /api/categories");
    Json(app_state.catalog.categories().to_vec())
}

pub async fn list_products_handler(State(app_state): State<AppState>) -> Json<Vec<Product>> {
    Json(app_state.catalog.products())
}

pub async fn products_page_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    build_response(&headers, render_product_list(&app_state.catalog.products())).await
}

pub async fn list_products_htmx_handler(State(app_state): State<AppState>) -> Markup {
    render_product_list(&app_state.catalog.products())
}

#[derive(Debug, Deserialize)]
pub struct MountFormPayload {
    #[serde(default)]
    pub product_id: Option<i64>,
}

/// Otwiera formularz: bez `product_id` do tworzenia, z nim do edycji.
pub async fn mount_form_handler(
    State(app_state): State<AppState>,
    Form(payload): Form<MountFormPayload>,
) -> Result<Markup, AppError> {
    let selected = match payload.product_id {
        Some(product_id) => {
            let product = app_state.catalog.product(product_id).ok_or_else(|| {
                tracing::warn!("Nie znaleziono produktu o ID: {}", product_id);
                AppError::NotFound
            })?;
            SelectedProduct::from(&product)
        }
        None => SelectedProduct::blank(),
    };

    let (form_id, session) = app_state
        .forms
        .mount(selected, app_state.category_lookup.clone())
        .await;
    let form = session.form().await;
    Ok(render_product_form(form_id, &form, None))
}

async fn find_session(app_state: &AppState, form_id: Uuid) -> Result<Arc<FormSession>, AppError> {
    let session = app_state.forms.get(&form_id).await;
    session.filter(|s| !s.is_disposed()).ok_or_else(|| {
        tracing::warn!("Nie znaleziono formularza {}", form_id);
        AppError::NotFound
    })
}

pub async fn get_form_handler(
    State(app_state): State<AppState>,
    Path(form_id): Path<Uuid>,
) -> Result<Markup, AppError> {
    let session = find_session(&app_state, form_id).await?;
    let form = session.form().await;
    Ok(render_product_form(form_id, &form, None))
}

pub async fn category_select_handler(
    State(app_state): State<AppState>,
    Path(form_id): Path<Uuid>,
) -> Result<Markup, AppError> {
    let session = find_session(&app_state, form_id).await?;
    let form = session.form().await;
    Ok(render_category_select(form_id, &form, false))
}

pub async fn change_field_handler(
    State(app_state): State<AppState>,
    Path((form_id, field_name)): Path<(Uuid, String)>,
    Form(values): Form<HashMap<String, String>>,
) -> Result<StatusCode, AppError> {
    let field = ProductField::from_str(&field_name).map_err(|_| {
        AppError::UnprocessableEntity(format!("Nieznane pole formularza: '{}'", field_name))
    })?;
    let session = find_session(&app_state, form_id).await?;

    let change = FieldChange::from_form_value(field, values.get(&field_name).map(String::as_str));
    tracing::debug!("Formularz {}: zmiana pola '{}'", form_id, change.field());
    session.form().await.change_field(change);

    Ok(StatusCode::NO_CONTENT)
}

const CATEGORY_FIELD: &str = "category_id";

#[derive(Debug, Deserialize)]
pub struct CategoryPayload {
    #[serde(default)]
    pub category_id: Option<String>,
}

/// Pusta wartość czyści kategorię; ID musi pochodzić z załadowanej listy
/// albo być bieżącą kategorią wersji roboczej.
fn resolve_category(form: &ProductForm, raw: Option<&str>) -> Result<Option<Category>, AppError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    let category_id: i64 = raw.parse().map_err(|_| {
        AppError::UnprocessableEntity(format!("Nieprawidłowe ID kategorii: '{}'", raw))
    })?;
    let category = form.selectable_category(category_id).cloned().ok_or_else(|| {
        AppError::UnprocessableEntity(format!("Nieznana kategoria: {}", category_id))
    })?;
    Ok(Some(category))
}

pub async fn select_category_handler(
    State(app_state): State<AppState>,
    Path(form_id): Path<Uuid>,
    Form(payload): Form<CategoryPayload>,
) -> Result<StatusCode, AppError> {
    let session = find_session(&app_state, form_id).await?;
    let mut form = session.form().await;

    let category = resolve_category(&form, payload.category_id.as_deref())?;
    form.select_category(category);
    Ok(StatusCode::NO_CONTENT)
}

/// Nadpisuje wersję roboczą wartościami przesłanymi razem z formularzem.
/// Pola z opóźnionych żądań `fields/*` mogły jeszcze nie dotrzeć.
/// Niezaznaczony checkbox nie jest wysyłany, więc jego brak liczy się
/// tylko wtedy, gdy przyszedł cały formularz.
fn apply_posted_fields(
    form: &mut ProductForm,
    values: &HashMap<String, String>,
) -> Result<(), AppError> {
    let full_form = ProductField::iter()
        .filter(|field| *field != ProductField::StockControl)
        .any(|field| values.contains_key(&field.to_string()));

    for field in ProductField::iter() {
        let value = values.get(&field.to_string()).map(String::as_str);
        let posted = value.is_some() || (field == ProductField::StockControl && full_form);
        if posted {
            form.change_field(FieldChange::from_form_value(field, value));
        }
    }

    if values.contains_key(CATEGORY_FIELD) {
        let category = resolve_category(form, values.get(CATEGORY_FIELD).map(String::as_str))?;
        form.select_category(category);
    }
    Ok(())
}

pub async fn submit_form_handler(
    State(app_state): State<AppState>,
    Path(form_id): Path<Uuid>,
    Form(values): Form<HashMap<String, String>>,
) -> Result<Markup, AppError> {
    let session = find_session(&app_state, form_id).await?;
    let handlers = CatalogHandlers::new(&app_state.catalog);

    {
        let mut form = session.form().await;
        apply_posted_fields(&mut form, &values)?;
        if let Err(error) = form.submit(&handlers) {
            return Err(AppError::UnprocessableEntityWithHtml(render_product_form(
                form_id,
                &form,
                Some(&error),
            )));
        }
    }

    let selection = handlers.selection();
    navigate(&app_state, form_id, selection).await
}

pub async fn back_handler(
    State(app_state): State<AppState>,
    Path(form_id): Path<Uuid>,
) -> Result<Markup, AppError> {
    let session = find_session(&app_state, form_id).await?;
    let handlers = CatalogHandlers::new(&app_state.catalog);
    session.form().await.back(&handlers);

    let selection = handlers.selection();
    navigate(&app_state, form_id, selection).await
}

/// Rodzic decyduje o kolejnym widoku na podstawie zmiany wyboru produktu.
async fn navigate(
    app_state: &AppState,
    form_id: Uuid,
    selection: Selection,
) -> Result<Markup, AppError> {
    match selection {
        Selection::Unchanged => {
            let session = find_session(app_state, form_id).await?;
            let form = session.form().await;
            Ok(render_product_form(form_id, &form, None))
        }
        Selection::Cleared => {
            app_state.forms.dispose(&form_id).await;
            Ok(render_product_list(&app_state.catalog.products()))
        }
        Selection::Replaced(selected) => {
            app_state.forms.dispose(&form_id).await;
            let (next_id, session) = app_state
                .forms
                .mount(selected, app_state.category_lookup.clone())
                .await;
            let form = session.form().await;
            Ok(render_product_form(next_id, &form, None))
        }
    }
}
