// src/models.rs
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

impl Category {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Category {
            id,
            name: name.into(),
        }
    }
}

/// Tryb formularza. Ustalany raz przy montowaniu i nigdy nie zmieniany.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum FormMode {
    Create,
    Edit,
}

impl FormMode {
    /// Pusty rekord (bez żadnego pola) oznacza nowy produkt.
    pub fn for_selection(selected: &SelectedProduct) -> Self {
        if selected.is_blank() {
            FormMode::Create
        } else {
            FormMode::Edit
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            FormMode::Create => "Create Product",
            FormMode::Edit => "Edit Product",
        }
    }

    pub fn submit_label(self) -> &'static str {
        match self {
            FormMode::Create => "Create",
            FormMode::Edit => "Save",
        }
    }
}

/// Produkt przekazany do formularza przez rodzica. Może być całkowicie pusty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SelectedProduct {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iva: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_control: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
}

impl SelectedProduct {
    pub fn blank() -> Self {
        SelectedProduct::default()
    }

    pub fn is_blank(&self) -> bool {
        self.id.is_none()
            && self.code.is_none()
            && self.name.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.price.is_none()
            && self.iva.is_none()
            && self.stock_control.is_none()
            && self.stock.is_none()
    }
}

/// Rekord produktu przechowywany w katalogu.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub description: String,
    pub category: Category,
    pub price: f64,
    pub iva: Option<i64>,
    pub stock_control: bool,
    pub stock: i64,
}

impl Product {
    pub fn from_submission(id: i64, submission: ProductSubmission) -> Self {
        Product {
            id,
            code: submission.code,
            name: submission.name,
            description: submission.description,
            category: submission.category,
            price: submission.price,
            iva: submission.iva,
            stock_control: submission.stock_control,
            stock: submission.stock,
        }
    }
}

impl From<&Product> for SelectedProduct {
    fn from(product: &Product) -> Self {
        SelectedProduct {
            id: Some(product.id),
            code: Some(product.code.clone()),
            name: Some(product.name.clone()),
            description: Some(product.description.clone()),
            category: Some(product.category.clone()),
            price: Some(product.price),
            iva: product.iva,
            stock_control: Some(product.stock_control),
            stock: Some(product.stock),
        }
    }
}

/// Nazwy pól formularza, tak jak występują w atrybucie `name` inputów.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, EnumIter, IntoStaticStr)]
pub enum ProductField {
    #[strum(serialize = "code")]
    Code,
    #[strum(serialize = "name")]
    Name,
    #[strum(serialize = "description")]
    Description,
    #[strum(serialize = "price")]
    Price,
    #[strum(serialize = "iva")]
    Iva,
    #[strum(serialize = "stockControl")]
    StockControl,
}

/// Pojedyncza zmiana pola. Tekstowe pola przyjmują dowolny napis, także pusty.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldChange {
    Code(String),
    Name(String),
    Description(String),
    Price(String),
    Iva(String),
    StockControl(bool),
}

impl FieldChange {
    pub fn field(&self) -> ProductField {
        match self {
            FieldChange::Code(_) => ProductField::Code,
            FieldChange::Name(_) => ProductField::Name,
            FieldChange::Description(_) => ProductField::Description,
            FieldChange::Price(_) => ProductField::Price,
            FieldChange::Iva(_) => ProductField::Iva,
            FieldChange::StockControl(_) => ProductField::StockControl,
        }
    }

    /// Buduje zmianę z wartości wysłanej przez formularz HTML.
    /// Niezaznaczony checkbox nie wysyła pola wcale, stąd `Option`.
    pub fn from_form_value(field: ProductField, value: Option<&str>) -> Self {
        let text = value.unwrap_or_default().to_string();
        match field {
            ProductField::Code => FieldChange::Code(text),
            ProductField::Name => FieldChange::Name(text),
            ProductField::Description => FieldChange::Description(text),
            ProductField::Price => FieldChange::Price(text),
            ProductField::Iva => FieldChange::Iva(text),
            ProductField::StockControl => {
                let raw = value.unwrap_or("false");
                FieldChange::StockControl(raw.eq_ignore_ascii_case("true") || raw == "on")
            }
        }
    }
}

/// Robocza kopia produktu trzymana przez formularz.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub code: String,
    pub name: String,
    pub description: String,
    pub category: Option<Category>,
    pub price: String,
    pub iva: String,
    pub stock_control: bool,
}

impl ProductDraft {
    /// Wartości "puste" (brak, pusty napis, zero) zamieniane są na domyślne.
    pub fn seeded_from(selected: &SelectedProduct) -> Self {
        ProductDraft {
            code: selected.code.clone().unwrap_or_default(),
            name: selected.name.clone().unwrap_or_default(),
            description: selected.description.clone().unwrap_or_default(),
            category: selected.category.clone(),
            price: selected
                .price
                .filter(|p| *p != 0.0 && !p.is_nan())
                .map(|p| p.to_string())
                .unwrap_or_default(),
            iva: selected
                .iva
                .filter(|iva| *iva != 0)
                .map(|iva| iva.to_string())
                .unwrap_or_default(),
            stock_control: selected.stock_control.unwrap_or(false),
        }
    }

    pub fn with_change(&self, change: FieldChange) -> Self {
        let mut next = self.clone();
        match change {
            FieldChange::Code(value) => next.code = value,
            FieldChange::Name(value) => next.name = value,
            FieldChange::Description(value) => next.description = value,
            FieldChange::Price(value) => next.price = value,
            FieldChange::Iva(value) => next.iva = value,
            FieldChange::StockControl(checked) => next.stock_control = checked,
        }
        next
    }

    pub fn with_category(&self, category: Option<Category>) -> Self {
        ProductDraft {
            category,
            ..self.clone()
        }
    }

    /// Wartość pola tekstowego w postaci do wyrenderowania w inpucie.
    pub fn text_value(&self, field: ProductField) -> &str {
        match field {
            ProductField::Code => &self.code,
            ProductField::Name => &self.name,
            ProductField::Description => &self.description,
            ProductField::Price => &self.price,
            ProductField::Iva => &self.iva,
            ProductField::StockControl => "",
        }
    }
}

/// Dane złożone z wersji roboczej przed walidacją.
#[derive(Debug, Clone, PartialEq)]
pub struct UncheckedSubmission {
    pub id: Option<i64>,
    pub code: String,
    pub name: String,
    pub description: String,
    pub category: Option<Category>,
    pub price: f64,
    pub iva: Option<i64>,
    pub stock_control: bool,
    pub stock: i64,
}

/// Zwalidowany payload przekazywany do `create` albo `update`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductSubmission {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub code: String,
    pub name: String,
    pub description: String,
    pub category: Category,
    pub price: f64,
    pub iva: Option<i64>,
    pub stock_control: bool,
    pub stock: i64,
}
