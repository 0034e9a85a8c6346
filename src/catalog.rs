// src/catalog.rs

use std::collections::BTreeMap;

use parking_lot::{Mutex, RwLock};

use crate::form::ProductHandlers;
use crate::models::{Category, Product, ProductSubmission, SelectedProduct};

/// Lista produktów i kategorii trzymana w pamięci procesu.
/// To "rodzic" formularza: jest właścicielem listy i decyduje o widoku.
#[derive(Debug, Default)]
pub struct Catalog {
    products: RwLock<BTreeMap<i64, Product>>,
    categories: Vec<Category>,
}

impl Catalog {
    pub fn new(categories: Vec<Category>) -> Self {
        Catalog {
            products: RwLock::new(BTreeMap::new()),
            categories,
        }
    }

    pub fn default_categories() -> Vec<Category> {
        vec![
            Category::new(1, "Tools"),
            Category::new(2, "Food"),
            Category::new(3, "Drinks"),
            Category::new(4, "Cleaning"),
        ]
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn products(&self) -> Vec<Product> {
        self.products.read().values().cloned().collect()
    }

    pub fn product(&self, id: i64) -> Option<Product> {
        self.products.read().get(&id).cloned()
    }

    pub fn insert(&self, submission: ProductSubmission) -> Product {
        let mut products = self.products.write();
        let id = products.keys().next_back().map_or(1, |last| last + 1);
        let product = Product::from_submission(id, submission);
        products.insert(id, product.clone());
        tracing::info!("Dodano produkt {} ({})", product.id, product.name);
        product
    }

    /// Zastępuje istniejący produkt. Zwraca `None` dla nieznanego ID.
    pub fn replace(&self, submission: ProductSubmission) -> Option<Product> {
        let id = submission.id?;
        let mut products = self.products.write();
        let slot = products.get_mut(&id)?;
        *slot = Product::from_submission(id, submission);
        tracing::info!("Zaktualizowano produkt {} ({})", id, slot.name);
        Some(slot.clone())
    }
}

/// Zmiana wyboru produktu zgłoszona przez formularz w trakcie żądania.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Unchanged,
    Cleared,
    Replaced(SelectedProduct),
}

/// Callbacki rodzica dla jednego żądania. Po obsłudze handler odczytuje
/// `selection()`, żeby wiedzieć, który widok wyrenderować.
pub struct CatalogHandlers<'a> {
    catalog: &'a Catalog,
    selection: Mutex<Selection>,
}

impl<'a> CatalogHandlers<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        CatalogHandlers {
            catalog,
            selection: Mutex::new(Selection::Unchanged),
        }
    }

    pub fn selection(&self) -> Selection {
        self.selection.lock().clone()
    }
}

impl ProductHandlers for CatalogHandlers<'_> {
    fn create(&self, submission: ProductSubmission) {
        self.catalog.insert(submission);
        self.set_product(None);
    }

    fn update(&self, submission: ProductSubmission) {
        if self.catalog.replace(submission.clone()).is_none() {
            tracing::warn!(
                "Nie znaleziono produktu do aktualizacji, ID: {:?}",
                submission.id
            );
        }
        self.set_product(None);
    }

    fn set_product(&self, product: Option<SelectedProduct>) {
        *self.selection.lock() = match product {
            Some(p) => Selection::Replaced(p),
            None => Selection::Cleared,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(id: Option<i64>, name: &str) -> ProductSubmission {
        ProductSubmission {
            id,
            code: String::new(),
            name: name.to_string(),
            description: String::new(),
            category: Category::new(1, "Tools"),
            price: 2.5,
            iva: Some(21),
            stock_control: false,
            stock: 0,
        }
    }

    #[test]
    fn insert_assigns_increasing_ids() {
        let catalog = Catalog::new(Catalog::default_categories());
        assert_eq!(catalog.insert(submission(None, "A")).id, 1);
        assert_eq!(catalog.insert(submission(None, "B")).id, 2);
        assert_eq!(catalog.products().len(), 2);
    }

    #[test]
    fn replace_requires_known_id() {
        let catalog = Catalog::default();
        catalog.insert(submission(None, "A"));
        assert!(catalog.replace(submission(Some(9), "X")).is_none());
        assert!(catalog.replace(submission(None, "X")).is_none());

        let updated = catalog.replace(submission(Some(1), "Renamed")).unwrap();
        assert_eq!(updated.name, "Renamed");
        assert_eq!(catalog.product(1).unwrap().name, "Renamed");
    }

    #[test]
    fn handlers_store_and_return_to_list() {
        let catalog = Catalog::default();
        let handlers = CatalogHandlers::new(&catalog);
        assert_eq!(handlers.selection(), Selection::Unchanged);

        handlers.create(submission(None, "A"));
        assert_eq!(handlers.selection(), Selection::Cleared);
        assert_eq!(catalog.products().len(), 1);

        let handlers = CatalogHandlers::new(&catalog);
        handlers.update(submission(Some(1), "B"));
        assert_eq!(handlers.selection(), Selection::Cleared);
        assert_eq!(catalog.product(1).unwrap().name, "B");
    }
}
