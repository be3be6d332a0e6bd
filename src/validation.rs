// 📐 Validation - raw form input → NewExpense
// Every rule runs; all failing fields are reported together

use crate::expense::{Category, NewExpense};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

pub const AMOUNT_ERROR: &str = "Amount must be greater than 0";
pub const DATE_ERROR: &str = "Please select a valid date";
pub const CATEGORY_ERROR: &str = "Please select a category";

// ASCII digits only; no calendar check (2023-99-99 passes)
static DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("hardcoded regex should be valid")
});

/// Field values exactly as typed by the user
#[derive(Debug, Clone, PartialEq)]
pub struct FormInput {
    pub amount: String,
    pub date: String,
    pub note: String,
    pub category: Option<Category>,
}

impl Default for FormInput {
    fn default() -> Self {
        FormInput {
            amount: String::new(),
            date: String::new(),
            note: String::new(),
            category: Some(Category::default()),
        }
    }
}

// ============================================================================
// FIELD ERRORS
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub amount: Option<String>,
    pub date: Option<String>,
    pub category: Option<String>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.amount.is_none() && self.date.is_none() && self.category.is_none()
    }

    /// (field, message) pairs in display order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("amount", self.amount.as_deref()),
            ("date", self.date.as_deref()),
            ("category", self.category.as_deref()),
        ]
        .into_iter()
        .filter_map(|(field, message)| message.map(|m| (field, m)))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for FieldErrors {}

pub type ValidationResult = Result<NewExpense, FieldErrors>;

// ============================================================================
// RULES
// ============================================================================

/// Parse amount text the way a numeric input does: surrounding whitespace is
/// ignored and blank text is zero. Unparsable or non-finite text gives NaN.
pub fn parse_amount(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => f64::NAN,
    }
}

pub fn is_valid_date(date: &str) -> bool {
    DATE_PATTERN.is_match(date)
}

pub fn validate(input: &FormInput) -> ValidationResult {
    let mut errors = FieldErrors::default();

    let amount = parse_amount(&input.amount);
    // NaN fails this comparison too
    if !(amount > 0.0) {
        errors.amount = Some(AMOUNT_ERROR.to_string());
    }

    if !is_valid_date(&input.date) {
        errors.date = Some(DATE_ERROR.to_string());
    }

    if input.category.is_none() {
        errors.category = Some(CATEGORY_ERROR.to_string());
    }

    match (errors.is_empty(), input.category) {
        (true, Some(category)) => Ok(NewExpense {
            amount,
            date: input.date.clone(),
            note: input.note.trim().to_string(),
            category,
        }),
        _ => Err(errors),
    }
}
