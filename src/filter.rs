// 🔎 Filter Engine
// Narrows a collection by category and an inclusive date window (logical AND)

use crate::expense::{Category, Expense};
use anyhow::Result;

/// Label used for "no category filter" in pickers and on the command line
pub const ALL_CATEGORIES: &str = "All";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// `None` = every category
    pub category: Option<Category>,
    /// Inclusive lower bound; empty = unbounded
    pub date_from: String,
    /// Inclusive upper bound; empty = unbounded
    pub date_to: String,
}

impl FilterCriteria {
    pub fn is_active(&self) -> bool {
        self.category.is_some() || !self.date_from.is_empty() || !self.date_to.is_empty()
    }

    pub fn matches(&self, expense: &Expense) -> bool {
        if let Some(category) = self.category {
            if expense.category != category {
                return false;
            }
        }

        // YYYY-MM-DD compares correctly as text
        if !self.date_from.is_empty() && expense.date.as_str() < self.date_from.as_str() {
            return false;
        }

        if !self.date_to.is_empty() && expense.date.as_str() > self.date_to.as_str() {
            return false;
        }

        true
    }

    pub fn category_label(&self) -> &'static str {
        self.category.map(|c| c.as_str()).unwrap_or(ALL_CATEGORIES)
    }
}

/// "All" → no filter, otherwise an exact category name
pub fn parse_category_filter(value: &str) -> Result<Option<Category>> {
    if value == ALL_CATEGORIES {
        Ok(None)
    } else {
        Ok(Some(value.parse()?))
    }
}

/// Expenses passing every supplied criterion, in input order.
///
/// A reversed window (`date_from > date_to`) is not an error; nothing passes.
pub fn filter_expenses(expenses: &[Expense], criteria: &FilterCriteria) -> Vec<Expense> {
    expenses
        .iter()
        .filter(|e| criteria.matches(e))
        .cloned()
        .collect()
}
