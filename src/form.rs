// src/form.rs

use crate::coerce::{parse_float, parse_int};
use crate::models::{
    Category, FieldChange, FormMode, ProductDraft, ProductSubmission, SelectedProduct,
    UncheckedSubmission,
};
use crate::services::LookupError;
use crate::validation::{self, ValidationError};

/// Wywołania zwrotne dostarczane przez rodzica formularza.
///
/// Formularz nie czeka na wynik i nie sprawdza, czy zapis się udał.
pub trait ProductHandlers: Send + Sync {
    fn create(&self, submission: ProductSubmission);
    fn update(&self, submission: ProductSubmission);
    /// `None` oznacza odznaczenie produktu (powrót do listy).
    fn set_product(&self, product: Option<SelectedProduct>);
}

/// Stan jednego zamontowanego formularza produktu.
///
/// Tryb i wersja robocza są ustalane raz, z `SelectedProduct` przekazanego
/// przy montowaniu. Późniejsza zmiana wyboru u rodzica nie wpływa na formularz.
#[derive(Debug, Clone)]
pub struct ProductForm {
    selected: SelectedProduct,
    mode: FormMode,
    draft: ProductDraft,
    categories: Vec<Category>,
    category_load: CategoryLoad,
}

/// Etap jednorazowego ładowania kategorii.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryLoad {
    NotStarted,
    Pending,
    /// Zakończone, z sukcesem albo nie. Błąd zostaje tylko w logach.
    Settled,
}

impl ProductForm {
    pub fn mount(selected: SelectedProduct) -> Self {
        let mode = FormMode::for_selection(&selected);
        let draft = ProductDraft::seeded_from(&selected);
        tracing::debug!("Montowanie formularza produktu w trybie {}", mode);
        ProductForm {
            selected,
            mode,
            draft,
            categories: Vec::new(),
            category_load: CategoryLoad::NotStarted,
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn draft(&self) -> &ProductDraft {
        &self.draft
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category_load(&self) -> CategoryLoad {
        self.category_load
    }

    /// Nagłówek strony: oryginalna nazwa w trybie edycji, pusty przy tworzeniu.
    pub fn heading(&self) -> &str {
        match self.mode {
            FormMode::Create => "",
            FormMode::Edit => self.selected.name.as_deref().unwrap_or_default(),
        }
    }

    /// Zaznacza, że ładowanie kategorii ruszyło. Zwraca `false`, jeśli już
    /// wcześniej je zlecono; ładowanie odbywa się najwyżej raz.
    pub fn begin_category_load(&mut self) -> bool {
        if self.category_load != CategoryLoad::NotStarted {
            tracing::warn!("Kategorie dla tego formularza były już ładowane, pomijam");
            return false;
        }
        self.category_load = CategoryLoad::Pending;
        true
    }

    pub fn apply_categories(&mut self, result: Result<Vec<Category>, LookupError>) {
        self.category_load = CategoryLoad::Settled;
        match result {
            Ok(categories) => {
                tracing::debug!("Załadowano kategorie: {:?}", categories);
                self.categories = categories;
            }
            Err(e) => {
                tracing::error!("Błąd pobierania kategorii: {}", e);
            }
        }
    }

    pub fn change_field(&mut self, change: FieldChange) {
        self.draft = self.draft.with_change(change);
    }

    pub fn select_category(&mut self, category: Option<Category>) {
        self.draft = self.draft.with_category(category);
    }

    pub fn category_by_id(&self, id: i64) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Kategoria, którą użytkownik może wybrać: z załadowanej listy albo
    /// bieżąca kategoria wersji roboczej (widoczna w selektorze przed załadowaniem listy).
    pub fn selectable_category(&self, id: i64) -> Option<&Category> {
        self.category_by_id(id).or_else(|| {
            self.draft
                .category
                .as_ref()
                .filter(|current| current.id == id)
        })
    }

    pub fn build_submission(&self) -> UncheckedSubmission {
        let draft = &self.draft;
        UncheckedSubmission {
            id: self.selected.id,
            code: draft.code.clone(),
            name: draft.name.clone(),
            description: draft.description.clone(),
            category: draft.category.clone(),
            price: parse_float(&draft.price),
            iva: parse_int(&draft.iva),
            stock_control: draft.stock_control,
            stock: self.selected.stock.unwrap_or(0),
        }
    }

    pub fn validation_report(&self) -> Vec<ValidationError> {
        validation::validation_report(&self.build_submission())
    }

    /// Waliduje wersję roboczą i przekazuje ją do `create` lub `update`.
    /// Przy błędzie żaden callback nie jest wywoływany.
    pub fn submit(&self, handlers: &dyn ProductHandlers) -> Result<(), ValidationError> {
        let submission = validation::validate_submission(self.build_submission())
            .inspect_err(|e| tracing::info!("Odrzucono formularz produktu: {}", e))?;

        match self.mode {
            FormMode::Create => handlers.create(submission),
            FormMode::Edit => handlers.update(submission),
        }
        Ok(())
    }

    pub fn back(&self, handlers: &dyn ProductHandlers) {
        handlers.set_product(None);
    }
}
