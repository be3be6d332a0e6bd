// Expense Tracker - Core Library
// Exposes the model, filtering, summaries and persistence for the CLI, TUI and tests

pub mod expense;
pub mod validation;
pub mod storage;
pub mod filter;
pub mod summary;
pub mod currency;
pub mod form;
pub mod ids;
pub mod book;
pub mod import;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use expense::{Category, Expense, NewExpense};
pub use validation::{
    validate, FieldErrors, FormInput, ValidationResult,
    AMOUNT_ERROR, DATE_ERROR, CATEGORY_ERROR,
};
pub use storage::{
    ExpenseRepository, KeyValueStore, MemoryStore, SqliteStore, StoredCollection, STORAGE_KEY,
};
pub use filter::{filter_expenses, parse_category_filter, FilterCriteria, ALL_CATEGORIES};
pub use summary::{summarize, CategoryTotal, Summary};
pub use currency::{format_list_amount, format_summary_amount};
pub use form::{ExpenseForm, FormField, FormMode, FormSubmission};
pub use ids::{IdGenerator, IdStrategy, TimestampGenerator, UuidGenerator};
pub use book::ExpenseBook;
pub use import::{import_csv, import_csv_reader, ImportReport, RejectedRow};
pub use config::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
