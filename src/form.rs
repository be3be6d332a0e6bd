// ✏️ Form Controller - transient create/edit state
//
// The form never touches the collection. A successful submit hands back a
// FormSubmission for the owner to apply.

use crate::expense::{Category, Expense, NewExpense};
use crate::validation::{validate, FieldErrors, FormInput};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    /// Editing the expense with this id
    Edit { id: String },
}

/// Result of a submit that passed validation
#[derive(Debug, Clone, PartialEq)]
pub enum FormSubmission {
    Create(NewExpense),
    Update(Expense),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Amount,
    Date,
    Note,
    Category,
}

impl FormField {
    pub const ALL: [FormField; 4] = [
        FormField::Amount,
        FormField::Date,
        FormField::Note,
        FormField::Category,
    ];

    pub fn next(&self) -> Self {
        match self {
            FormField::Amount => FormField::Date,
            FormField::Date => FormField::Note,
            FormField::Note => FormField::Category,
            FormField::Category => FormField::Amount,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Amount => "Amount",
            FormField::Date => "Date",
            FormField::Note => "Note",
            FormField::Category => "Category",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExpenseForm {
    mode: FormMode,
    input: FormInput,
    errors: FieldErrors,
}

impl Default for ExpenseForm {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpenseForm {
    /// Blank form in create mode
    pub fn new() -> Self {
        ExpenseForm {
            mode: FormMode::Create,
            input: FormInput::default(),
            errors: FieldErrors::default(),
        }
    }

    /// Form seeded from an existing expense; the id is kept out of the
    /// editable fields.
    pub fn edit(expense: &Expense) -> Self {
        ExpenseForm {
            mode: FormMode::Edit {
                id: expense.id.clone(),
            },
            input: FormInput {
                amount: expense.amount.to_string(),
                date: expense.date.clone(),
                note: expense.note.clone(),
                category: Some(expense.category),
            },
            errors: FieldErrors::default(),
        }
    }

    /// Drop all field state and return to a blank create form
    pub fn reset_to_create(&mut self) {
        *self = Self::new();
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn is_edit(&self) -> bool {
        matches!(self.mode, FormMode::Edit { .. })
    }

    pub fn editing_id(&self) -> Option<&str> {
        match &self.mode {
            FormMode::Edit { id } => Some(id),
            FormMode::Create => None,
        }
    }

    pub fn input(&self) -> &FormInput {
        &self.input
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error_for(&self, field: FormField) -> Option<&str> {
        match field {
            FormField::Amount => self.errors.amount.as_deref(),
            FormField::Date => self.errors.date.as_deref(),
            FormField::Category => self.errors.category.as_deref(),
            FormField::Note => None,
        }
    }

    // Errors stay visible while the user edits; they are recomputed on submit.

    pub fn set_amount(&mut self, amount: impl Into<String>) {
        self.input.amount = amount.into();
    }

    pub fn set_date(&mut self, date: impl Into<String>) {
        self.input.date = date.into();
    }

    pub fn set_note(&mut self, note: impl Into<String>) {
        self.input.note = note.into();
    }

    pub fn set_category(&mut self, category: Option<Category>) {
        self.input.category = category;
    }

    /// Text of a free-text field (`None` for the category picker)
    pub fn text(&self, field: FormField) -> Option<&str> {
        match field {
            FormField::Amount => Some(&self.input.amount),
            FormField::Date => Some(&self.input.date),
            FormField::Note => Some(&self.input.note),
            FormField::Category => None,
        }
    }

    pub fn text_mut(&mut self, field: FormField) -> Option<&mut String> {
        match field {
            FormField::Amount => Some(&mut self.input.amount),
            FormField::Date => Some(&mut self.input.date),
            FormField::Note => Some(&mut self.input.note),
            FormField::Category => None,
        }
    }

    /// Validate and emit.
    ///
    /// On failure nothing is emitted and the fields are left alone. A
    /// successful create clears the form; a successful edit keeps the fields
    /// and leaves ending the session to the owner.
    pub fn submit(&mut self) -> Option<FormSubmission> {
        match validate(&self.input) {
            Ok(payload) => {
                self.errors = FieldErrors::default();
                match &self.mode {
                    FormMode::Create => {
                        self.input = FormInput::default();
                        Some(FormSubmission::Create(payload))
                    }
                    FormMode::Edit { id } => Some(FormSubmission::Update(payload.with_id(id.clone()))),
                }
            }
            Err(errors) => {
                log::debug!("Form rejected: {}", errors);
                self.errors = errors;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{AMOUNT_ERROR, DATE_ERROR};

    fn existing() -> Expense {
        Expense {
            id: "keep-me".to_string(),
            amount: 100.0,
            date: "2024-02-02".to_string(),
            note: "hotel".to_string(),
            category: Category::Travel,
        }
    }

    #[test]
    fn test_create_defaults() {
        let form = ExpenseForm::new();
        assert_eq!(form.mode(), &FormMode::Create);
        assert_eq!(form.input().amount, "");
        assert_eq!(form.input().date, "");
        assert_eq!(form.input().note, "");
        assert_eq!(form.input().category, Some(Category::Food));
        assert!(form.errors().is_empty());
    }

    #[test]
    fn test_create_submit_emits_and_resets() {
        let mut form = ExpenseForm::new();
        form.set_amount("42.50");
        form.set_date("2024-03-01");
        form.set_note("  lunch  ");
        form.set_category(Some(Category::Food));

        let submission = form.submit().unwrap();
        assert_eq!(
            submission,
            FormSubmission::Create(NewExpense {
                amount: 42.5,
                date: "2024-03-01".to_string(),
                note: "lunch".to_string(),
                category: Category::Food,
            })
        );
        assert_eq!(form.input(), &FormInput::default());
    }

    #[test]
    fn test_failed_submit_keeps_fields_and_exposes_errors() {
        let mut form = ExpenseForm::new();
        form.set_amount("-3");
        form.set_date("03/01/2024");
        form.set_note("x");

        assert!(form.submit().is_none());
        assert_eq!(form.error_for(FormField::Amount), Some(AMOUNT_ERROR));
        assert_eq!(form.error_for(FormField::Date), Some(DATE_ERROR));
        assert_eq!(form.input().amount, "-3");
        assert_eq!(form.input().note, "x");

        // Still editable; next submit recomputes errors
        form.set_amount("3");
        assert!(form.submit().is_none());
        assert_eq!(form.error_for(FormField::Amount), None);
        assert_eq!(form.error_for(FormField::Date), Some(DATE_ERROR));
    }

    #[test]
    fn test_edit_seeds_fields() {
        let form = ExpenseForm::edit(&existing());
        assert_eq!(form.editing_id(), Some("keep-me"));
        assert_eq!(form.input().amount, "100");
        assert_eq!(form.input().date, "2024-02-02");
        assert_eq!(form.input().note, "hotel");
        assert_eq!(form.input().category, Some(Category::Travel));

        let form = ExpenseForm::edit(&Expense {
            amount: 42.5,
            ..existing()
        });
        assert_eq!(form.input().amount, "42.5");
    }

    #[test]
    fn test_edit_submit_keeps_id_and_fields() {
        let mut form = ExpenseForm::edit(&existing());
        form.set_amount("120");
        form.set_category(Some(Category::Bills));

        let submission = form.submit().unwrap();
        assert_eq!(
            submission,
            FormSubmission::Update(Expense {
                id: "keep-me".to_string(),
                amount: 120.0,
                date: "2024-02-02".to_string(),
                note: "hotel".to_string(),
                category: Category::Bills,
            })
        );
        assert!(form.is_edit());
        assert_eq!(form.input().amount, "120");
    }

    #[test]
    fn test_missing_category_is_rejected() {
        let mut form = ExpenseForm::new();
        form.set_amount("1");
        form.set_date("2024-01-01");
        form.set_category(None);
        assert!(form.submit().is_none());
        assert!(form.error_for(FormField::Category).is_some());
    }

    #[test]
    fn test_switching_sessions_discards_state() {
        let mut form = ExpenseForm::edit(&existing());
        form.set_amount("oops");
        assert!(form.submit().is_none());

        let other = Expense {
            id: "other".to_string(),
            ..existing()
        };
        let form = ExpenseForm::edit(&other);
        assert_eq!(form.input().amount, "100");
        assert!(form.errors().is_empty());

        let mut form = form;
        form.reset_to_create();
        assert_eq!(form.mode(), &FormMode::Create);
        assert_eq!(form.input(), &FormInput::default());
    }

    #[test]
    fn test_field_cycle_covers_all_fields() {
        let mut field = FormField::Amount;
        let mut seen = Vec::new();
        for _ in 0..FormField::ALL.len() {
            seen.push(field);
            field = field.next();
        }
        assert_eq!(seen, FormField::ALL.to_vec());
        assert_eq!(field, FormField::Amount);
    }
}
