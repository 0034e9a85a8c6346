use axum::body::Body;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use lol_html::html_content::ContentType;
use lol_html::{HtmlRewriter, Settings, element};
use maud::Markup;
use tokio::fs;

use crate::errors::AppError;

const SHELL_PATH: &str = "static/index.html";

/// Wstawia fragment do szablonu strony (`#content`) i usuwa atrybuty HTMX
/// inicjujące ładowanie, żeby przeglądarka nie pobrała treści drugi raz.
pub fn embed_in_shell(shell: &[u8], content_markup: Markup) -> Result<Vec<u8>, AppError> {
    let content_string = content_markup.into_string();
    let mut response_body = Vec::new();

    let mut rewriter = HtmlRewriter::new(
        Settings {
            element_content_handlers: vec![element!("#content", |el| {
                el.set_inner_content(&content_string, ContentType::Html);
                el.remove_attribute("hx-trigger");
                el.remove_attribute("hx-get");
                Ok(())
            })],
            ..Settings::default()
        },
        |c: &[u8]| response_body.extend_from_slice(c),
    );

    rewriter.write(shell).map_err(rewriting_error)?;
    rewriter.end().map_err(rewriting_error)?;

    Ok(response_body)
}

fn rewriting_error(e: lol_html::errors::RewritingError) -> AppError {
    tracing::error!("Błąd przetwarzania szablonu strony: {}", e);
    AppError::InternalServerError("Błąd renderowania strony".to_string())
}

async fn serve_full_page(content_markup: Markup) -> Result<Response, AppError> {
    let shell_content = fs::read(SHELL_PATH).await.map_err(|e| {
        tracing::error!("Nie można wczytać pliku szablonu {}: {}", SHELL_PATH, e);
        AppError::InternalServerError("Błąd wczytywania szablonu strony".to_string())
    })?;

    let body = embed_in_shell(&shell_content, content_markup)?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        Body::from(body),
    )
        .into_response())
}

/// Dla żądań HTMX zwraca sam fragment, dla pełnego odświeżenia (F5) całą stronę.
pub async fn build_response(
    headers: &HeaderMap,
    page_content: Markup,
) -> Result<Response, AppError> {
    if headers.contains_key("HX-Request") {
        Ok(page_content.into_response())
    } else {
        serve_full_page(page_content).await
    }
}
