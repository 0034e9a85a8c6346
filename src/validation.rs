// src/validation.rs

use thiserror::Error;

use crate::models::{ProductField, ProductSubmission, UncheckedSubmission};

/// Błąd walidacji przy wysyłce. Kolejność wariantów to kolejność sprawdzania.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid name")]
    InvalidName,

    #[error("Select a category")]
    MissingCategory,

    #[error("Invalid price")]
    InvalidPrice,
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::InvalidName => ProductField::Name.into(),
            ValidationError::MissingCategory => "category",
            ValidationError::InvalidPrice => ProductField::Price.into(),
        }
    }
}

fn is_valid_price(price: f64) -> bool {
    // NaN nie spełnia żadnego porównania, więc odpada razem z zerem.
    // Nieskończoność też odpada: JSON nie ma dla `inf` reprezentacji.
    price.is_finite() && price > 0.0
}

/// Sprawdza reguły po kolei i zatrzymuje się na pierwszym błędzie.
pub fn validate_submission(
    candidate: UncheckedSubmission,
) -> Result<ProductSubmission, ValidationError> {
    if candidate.name.is_empty() {
        return Err(ValidationError::InvalidName);
    }
    let Some(category) = candidate.category else {
        return Err(ValidationError::MissingCategory);
    };
    if !is_valid_price(candidate.price) {
        return Err(ValidationError::InvalidPrice);
    }

    Ok(ProductSubmission {
        id: candidate.id,
        code: candidate.code,
        name: candidate.name,
        description: candidate.description,
        category,
        price: candidate.price,
        iva: candidate.iva,
        stock_control: candidate.stock_control,
        stock: candidate.stock,
    })
}

/// Wszystkie błędne pola naraz, w tej samej kolejności co przy wysyłce.
/// Używane przez widok do oznaczania pól.
pub fn validation_report(candidate: &UncheckedSubmission) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if candidate.name.is_empty() {
        errors.push(ValidationError::InvalidName);
    }
    if candidate.category.is_none() {
        errors.push(ValidationError::MissingCategory);
    }
    if !is_valid_price(candidate.price) {
        errors.push(ValidationError::InvalidPrice);
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    fn candidate() -> UncheckedSubmission {
        UncheckedSubmission {
            id: None,
            code: String::new(),
            name: "Widget".to_string(),
            description: String::new(),
            category: Some(Category::new(1, "Tools")),
            price: 9.99,
            iva: Some(21),
            stock_control: true,
            stock: 0,
        }
    }

    #[test]
    fn valid_candidate_passes() {
        let submission = validate_submission(candidate()).unwrap();
        assert_eq!(submission.category, Category::new(1, "Tools"));
        assert_eq!(submission.price, 9.99);
    }

    #[test]
    fn first_failing_rule_wins() {
        let broken = UncheckedSubmission {
            name: String::new(),
            category: None,
            price: f64::NAN,
            ..candidate()
        };
        assert_eq!(validate_submission(broken.clone()), Err(ValidationError::InvalidName));
        assert_eq!(
            validation_report(&broken),
            vec![
                ValidationError::InvalidName,
                ValidationError::MissingCategory,
                ValidationError::InvalidPrice
            ]
        );

        let no_category = UncheckedSubmission {
            category: None,
            price: 0.0,
            ..candidate()
        };
        assert_eq!(validate_submission(no_category), Err(ValidationError::MissingCategory));
    }

    #[test]
    fn zero_negative_and_nan_prices_are_rejected() {
        for price in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let c = UncheckedSubmission {
                price,
                ..candidate()
            };
            assert_eq!(validate_submission(c), Err(ValidationError::InvalidPrice));
        }
    }

    #[test]
    fn iva_and_free_text_are_not_checked() {
        let c = UncheckedSubmission {
            iva: None,
            code: "   ".to_string(),
            description: String::new(),
            stock_control: false,
            ..candidate()
        };
        let submission = validate_submission(c).unwrap();
        assert_eq!(submission.iva, None);
    }

    #[test]
    fn messages_match_user_facing_alerts() {
        assert_eq!(ValidationError::InvalidName.to_string(), "Invalid name");
        assert_eq!(ValidationError::MissingCategory.to_string(), "Select a category");
        assert_eq!(ValidationError::InvalidPrice.to_string(), "Invalid price");
        assert_eq!(ValidationError::InvalidPrice.field(), "price");
    }
}
