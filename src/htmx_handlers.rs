// src/htmx_handlers.rs

use maud::{Markup, html};
use uuid::Uuid;

use crate::form::{CategoryLoad, ProductForm};
use crate::models::{Product, ProductField};
use crate::validation::ValidationError;

const INPUT_CLASS: &str = "w-full rounded-md border border-gray-300 px-3 py-2 text-sm focus:outline-none focus:ring-2 focus:ring-gray-400";
const LABEL_CLASS: &str = "text-sm font-medium text-gray-700";

// Funkcja pomocnicza do formatowania ceny na liście
fn format_price_maud(price: f64) -> String {
    format!("{:.2}", price)
}

fn field_id(form_id: Uuid, field: &str) -> String {
    format!("{}-{}", field, form_id)
}

/// Pole tekstowe lub liczbowe. Każda zmiana trafia od razu na serwer.
fn render_text_input(
    form_id: Uuid,
    form: &ProductForm,
    field: ProductField,
    label: &str,
    input_type: &str,
    step: Option<&str>,
    invalid: bool,
) -> Markup {
    let name = field.to_string();
    let id = field_id(form_id, &name);
    html! {
        div ."grid gap-2" {
            label for=(id) class=(LABEL_CLASS) { (label) }
            input
                id=(id)
                name=(name)
                type=(input_type)
                step=[step]
                value=(form.draft().text_value(field))
                aria-invalid=[invalid.then_some("true")]
                class=(INPUT_CLASS)
                "hx-post"=(format!("/htmx/forms/{}/fields/{}", form_id, name))
                "hx-trigger"="input changed delay:200ms"
                "hx-swap"="none";
        }
    }
}

/// Selektor kategorii. Dopóki kategorie się ładują, fragment sam się odświeża.
pub fn render_category_select(form_id: Uuid, form: &ProductForm, invalid: bool) -> Markup {
    let selected = form.draft().category.as_ref();
    let selected_missing_from_options =
        selected.is_some_and(|c| form.category_by_id(c.id).is_none());
    let id = field_id(form_id, "category_id");

    html! {
        div ."grid gap-2" id=(format!("category-select-{}", form_id))
            "hx-get"=[(form.category_load() == CategoryLoad::Pending)
                .then(|| format!("/htmx/forms/{}/categories", form_id))]
            "hx-trigger"=[(form.category_load() == CategoryLoad::Pending).then_some("load delay:300ms")]
            "hx-swap"="outerHTML"
        {
            label for=(id) class=(LABEL_CLASS) { "Category" }
            select
                id=(id)
                name="category_id"
                aria-invalid=[invalid.then_some("true")]
                class=(INPUT_CLASS)
                "hx-post"=(format!("/htmx/forms/{}/category", form_id))
                "hx-trigger"="change"
                "hx-swap"="none"
            {
                option value="" selected[selected.is_none()] { "Select..." }
                @if selected_missing_from_options {
                    @if let Some(category) = selected {
                        option value=(category.id) selected { (category.name) }
                    }
                }
                @for category in form.categories() {
                    option
                        value=(category.id)
                        selected[selected.is_some_and(|c| c.id == category.id)]
                    {
                        (category.name)
                    }
                }
            }
        }
    }
}

pub fn render_validation_alert(error: &ValidationError) -> Markup {
    html! {
        div role="alert" data-field=(error.field())
            class="rounded-md border border-red-300 bg-red-50 px-4 py-3 text-sm text-red-800" {
            (error.to_string())
        }
    }
}

/// Cały formularz produktu. `alert` to błąd z ostatniej nieudanej wysyłki.
pub fn render_product_form(
    form_id: Uuid,
    form: &ProductForm,
    alert: Option<&ValidationError>,
) -> Markup {
    let mode = form.mode();
    let stock_control_id = field_id(form_id, "stockControl");
    let description_id = field_id(form_id, "description");
    // Po nieudanej wysyłce oznaczamy wszystkie błędne pola, nie tylko pierwsze.
    let invalid_fields: Vec<&'static str> = match alert {
        Some(_) => form.validation_report().iter().map(|e| e.field()).collect(),
        None => Vec::new(),
    };
    let is_invalid = |name: &str| invalid_fields.iter().any(|field| *field == name);

    html! {
        div #product-form ."grid gap-4 md:gap-8" data-form-id=(form_id.to_string()) data-mode=(mode.to_string()) {
            div ."flex items-center" {
                button type="button"
                    class="mr-4 rounded-md border border-gray-300 p-2 hover:bg-gray-50"
                    "hx-post"=(format!("/htmx/forms/{}/back", form_id))
                    "hx-target"="#content"
                    "hx-swap"="innerHTML"
                {
                    span aria-hidden="true" { "←" }
                    span ."sr-only" { "Back" }
                }
                h1 ."text-2xl font-bold" { (form.heading()) }
            }
            div ."rounded-lg border bg-white shadow-sm" {
                div ."p-6 pb-2" {
                    h2 ."text-lg font-semibold" { (mode.title()) }
                }
                div ."p-6 pt-2" {
                    @if let Some(error) = alert {
                        (render_validation_alert(error))
                    }
                    form
                        "hx-post"=(format!("/htmx/forms/{}/submit", form_id))
                        "hx-target"="#content"
                        "hx-swap"="innerHTML"
                    {
                        div ."grid grid-cols-1 md:grid-cols-2 gap-4" {
                            (render_text_input(form_id, form, ProductField::Code, "Code", "text", None, false))
                            (render_text_input(form_id, form, ProductField::Name, "Name", "text", None, is_invalid("name")))
                            div ."col-span-2" {
                                label for=(description_id) class=(LABEL_CLASS) { "Description" }
                                textarea
                                    id=(description_id)
                                    name="description"
                                    class=(INPUT_CLASS)
                                    "hx-post"=(format!("/htmx/forms/{}/fields/description", form_id))
                                    "hx-trigger"="input changed delay:200ms"
                                    "hx-swap"="none"
                                {
                                    (form.draft().description)
                                }
                            }
                            (render_category_select(form_id, form, is_invalid("category")))
                            (render_text_input(form_id, form, ProductField::Price, "Price", "number", Some("0.01"), is_invalid("price")))
                            (render_text_input(form_id, form, ProductField::Iva, "IVA %", "number", None, false))
                            div ."grid gap-2" {
                                div ."flex items-center mt-5" {
                                    input
                                        id=(stock_control_id)
                                        name="stockControl"
                                        type="checkbox"
                                        checked[form.draft().stock_control]
                                        "hx-post"=(format!("/htmx/forms/{}/fields/stockControl", form_id))
                                        "hx-trigger"="change"
                                        "hx-swap"="none";
                                    label for=(stock_control_id) class=(format!("{} ml-2", LABEL_CLASS)) {
                                        "Stock control?"
                                    }
                                }
                            }
                            div ."col-span-2 flex justify-end" {
                                button type="submit"
                                    class="rounded-md bg-gray-900 px-4 py-2 text-sm font-medium text-white hover:bg-gray-700"
                                {
                                    (mode.submit_label())
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Lista produktów, czyli widok rodzica po zamknięciu formularza.
pub fn render_product_list(products: &[Product]) -> Markup {
    html! {
        div #product-list ."grid gap-4" {
            div ."flex items-center justify-between" {
                h1 ."text-2xl font-bold" { "Products" }
                button type="button"
                    class="rounded-md bg-gray-900 px-4 py-2 text-sm font-medium text-white hover:bg-gray-700"
                    "hx-post"="/htmx/forms"
                    "hx-target"="#content"
                    "hx-swap"="innerHTML"
                {
                    "New product"
                }
            }
            @if products.is_empty() {
                p ."text-center text-gray-500 py-8" { "No products yet." }
            } @else {
                table ."w-full text-sm" {
                    thead {
                        tr ."text-left text-gray-500" {
                            th { "Code" }
                            th { "Name" }
                            th { "Category" }
                            th ."text-right" { "Price" }
                            th ."text-right" { "IVA %" }
                            th ."text-right" { "Stock" }
                            th {}
                        }
                    }
                    tbody {
                        @for product in products {
                            tr ."border-t" data-product-id=(product.id) {
                                td { (product.code) }
                                td { (product.name) }
                                td { (product.category.name) }
                                td ."text-right" { (format_price_maud(product.price)) }
                                td ."text-right" {
                                    @if let Some(iva) = product.iva { (iva) } @else { "-" }
                                }
                                td ."text-right" {
                                    @if product.stock_control { (product.stock) } @else { "-" }
                                }
                                td ."text-right" {
                                    button type="button"
                                        class="text-blue-600 hover:underline"
                                        "hx-post"="/htmx/forms"
                                        "hx-vals"=(format!("{{\"product_id\": {}}}", product.id))
                                        "hx-target"="#content"
                                        "hx-swap"="innerHTML"
                                    {
                                        "Edit"
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, FieldChange, SelectedProduct};

    fn tools() -> Category {
        Category::new(1, "Tools")
    }

    #[test]
    fn create_form_labels() {
        let form = ProductForm::mount(SelectedProduct::blank());
        let html = render_product_form(Uuid::nil(), &form, None).into_string();
        assert!(html.contains("Create Product"));
        assert!(html.contains(">Create</button>"));
        assert!(html.contains(r#"<h1 class="text-2xl font-bold"></h1>"#));
        assert!(!html.contains("role=\"alert\""));
    }

    #[test]
    fn edit_form_labels_and_heading() {
        let selected = SelectedProduct {
            id: Some(5),
            name: Some("Old".to_string()),
            ..SelectedProduct::default()
        };
        let mut form = ProductForm::mount(selected);
        form.change_field(FieldChange::Name("New".to_string()));
        let html = render_product_form(Uuid::nil(), &form, None).into_string();
        assert!(html.contains("Edit Product"));
        assert!(html.contains(">Save</button>"));
        assert!(html.contains(r#"<h1 class="text-2xl font-bold">Old</h1>"#));
        assert!(html.contains(r#"value="New""#));
    }

    #[test]
    fn alert_is_rendered_inline() {
        let form = ProductForm::mount(SelectedProduct::blank());
        let html =
            render_product_form(Uuid::nil(), &form, Some(&ValidationError::MissingCategory))
                .into_string();
        assert!(html.contains("role=\"alert\""));
        assert!(html.contains("Select a category"));
        // Pusty formularz: nazwa, kategoria i cena są oznaczone jako błędne.
        assert_eq!(html.matches(r#"aria-invalid="true""#).count(), 3);
    }

    #[test]
    fn category_options_are_keyed_by_id() {
        let mut form = ProductForm::mount(SelectedProduct::blank());
        form.begin_category_load();
        form.apply_categories(Ok(vec![tools(), Category::new(2, "Food")]));
        form.select_category(Some(Category::new(2, "Food")));

        let html = render_category_select(Uuid::nil(), &form, false).into_string();
        assert!(html.contains(r#"<option value="1">Tools</option>"#));
        assert!(html.contains(r#"<option value="2" selected>Food</option>"#));
        assert!(!html.contains("hx-get"));
    }

    #[test]
    fn pending_select_refreshes_itself() {
        let mut form = ProductForm::mount(SelectedProduct::blank());
        form.begin_category_load();
        let html = render_category_select(Uuid::nil(), &form, false).into_string();
        assert!(html.contains("hx-get=\"/htmx/forms/00000000-0000-0000-0000-000000000000/categories\""));
        assert!(html.contains("load delay:300ms"));
    }

    #[test]
    fn edit_category_is_shown_before_options_load() {
        let selected = SelectedProduct {
            id: Some(1),
            category: Some(tools()),
            ..SelectedProduct::default()
        };
        let form = ProductForm::mount(selected);
        let html = render_category_select(Uuid::nil(), &form, false).into_string();
        assert!(html.contains(r#"<option value="1" selected>Tools</option>"#));
    }

    #[test]
    fn product_list_shows_rows() {
        let products = vec![Product {
            id: 7,
            code: "A-7".to_string(),
            name: "Widget".to_string(),
            description: String::new(),
            category: tools(),
            price: 9.5,
            iva: Some(21),
            stock_control: true,
            stock: 3,
        }];
        let html = render_product_list(&products).into_string();
        assert!(html.contains("Widget"));
        assert!(html.contains("9.50"));
        assert!(html.contains(r#"data-product-id="7""#));
        assert!(render_product_list(&[]).into_string().contains("No products yet."));
    }
}
