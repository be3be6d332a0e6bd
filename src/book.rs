// 📒 Expense Book - the single owner of application state
//
// Holds the collection, the active filter and the edit target. Every
// mutation builds a new collection, swaps it in and saves it. Derived views
// (visible list, summary) are recomputed on each call.

use crate::expense::{Expense, NewExpense};
use crate::filter::{filter_expenses, FilterCriteria};
use crate::form::FormSubmission;
use crate::ids::IdGenerator;
use crate::storage::{ExpenseRepository, KeyValueStore};
use crate::summary::{summarize, Summary};

pub struct ExpenseBook<S: KeyValueStore> {
    expenses: Vec<Expense>,
    repository: ExpenseRepository<S>,
    ids: Box<dyn IdGenerator>,
    criteria: FilterCriteria,
    editing: Option<String>,
}

impl<S: KeyValueStore> ExpenseBook<S> {
    /// Hydrate from storage (once)
    pub fn open(mut repository: ExpenseRepository<S>, ids: Box<dyn IdGenerator>) -> Self {
        let expenses = repository.load();
        log::info!("Opened expense book with {} expenses", expenses.len());

        ExpenseBook {
            expenses,
            repository,
            ids,
            criteria: FilterCriteria::default(),
            editing: None,
        }
    }

    // ========================================================================
    // COLLECTION
    // ========================================================================

    /// Full, unfiltered collection (newest first)
    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn get(&self, id: &str) -> Option<&Expense> {
        self.expenses.iter().find(|e| e.id == id)
    }

    pub fn repository(&self) -> &ExpenseRepository<S> {
        &self.repository
    }

    fn replace(&mut self, expenses: Vec<Expense>) {
        self.expenses = expenses;
        self.repository.save(&self.expenses);
    }

    /// Give the payload a fresh id and put it at the front
    pub fn add(&mut self, payload: NewExpense) -> &Expense {
        let expense = payload.with_id(self.ids.next_id());
        log::debug!("Adding expense {}", expense.id);

        let mut next = Vec::with_capacity(self.expenses.len() + 1);
        next.push(expense);
        next.extend(self.expenses.iter().cloned());
        self.replace(next);

        &self.expenses[0]
    }

    /// Add a batch (CSV import) with one save at the end. The last payload
    /// ends up first, as if each had been added in turn.
    pub fn import(&mut self, payloads: Vec<NewExpense>) -> usize {
        let count = payloads.len();
        if count == 0 {
            return 0;
        }

        let mut next: Vec<Expense> = payloads
            .into_iter()
            .map(|p| p.with_id(self.ids.next_id()))
            .collect();
        next.reverse();
        next.extend(self.expenses.iter().cloned());
        self.replace(next);

        log::debug!("Imported {} expenses", count);
        count
    }

    /// Replace the expense with the same id, in place. `false` if unknown.
    pub fn update(&mut self, updated: Expense) -> bool {
        if self.get(&updated.id).is_none() {
            log::warn!("Update for unknown expense {}", updated.id);
            return false;
        }

        log::debug!("Updating expense {}", updated.id);
        let next = self
            .expenses
            .iter()
            .map(|e| if e.id == updated.id { updated.clone() } else { e.clone() })
            .collect();
        self.replace(next);
        true
    }

    /// Remove by id; also ends an edit session on that expense
    pub fn delete(&mut self, id: &str) -> bool {
        if self.get(id).is_none() {
            return false;
        }

        log::debug!("Deleting expense {}", id);
        let next = self.expenses.iter().filter(|e| e.id != id).cloned().collect();
        self.replace(next);

        if self.editing.as_deref() == Some(id) {
            self.editing = None;
        }
        true
    }

    /// Route a form result; an update also ends the edit session
    pub fn apply(&mut self, submission: FormSubmission) {
        match submission {
            FormSubmission::Create(payload) => {
                self.add(payload);
            }
            FormSubmission::Update(expense) => {
                self.update(expense);
                self.editing = None;
            }
        }
    }

    // ========================================================================
    // EDIT SESSION
    // ========================================================================

    /// Start editing `id`; returns a copy to seed the form with
    pub fn begin_edit(&mut self, id: &str) -> Option<Expense> {
        let expense = self.get(id).cloned()?;
        self.editing = Some(expense.id.clone());
        Some(expense)
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    pub fn editing(&self) -> Option<&Expense> {
        self.editing.as_deref().and_then(|id| self.get(id))
    }

    // ========================================================================
    // DERIVED VIEWS
    // ========================================================================

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
    }

    pub fn clear_filters(&mut self) {
        self.criteria = FilterCriteria::default();
    }

    pub fn visible(&self) -> Vec<Expense> {
        filter_expenses(&self.expenses, &self.criteria)
    }

    /// Summary of the visible (filtered) expenses
    pub fn summary(&self) -> Summary {
        summarize(&self.visible())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expense::Category;
    use crate::form::ExpenseForm;
    use crate::storage::{MemoryStore, STORAGE_KEY};

    struct SequentialIds(u32);

    impl IdGenerator for SequentialIds {
        fn next_id(&mut self) -> String {
            self.0 += 1;
            format!("id-{}", self.0)
        }
    }

    fn new_book() -> ExpenseBook<MemoryStore> {
        ExpenseBook::open(
            ExpenseRepository::new(MemoryStore::new()),
            Box::new(SequentialIds(0)),
        )
    }

    fn payload(amount: f64, date: &str, category: Category) -> NewExpense {
        NewExpense {
            amount,
            date: date.to_string(),
            note: String::new(),
            category,
        }
    }

    fn stored(book: &ExpenseBook<MemoryStore>) -> Vec<Expense> {
        let raw = book.repository().store().get(STORAGE_KEY).unwrap().unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    #[test]
    fn test_add_prepends_and_saves() {
        let mut book = new_book();
        book.add(payload(1.0, "2024-01-01", Category::Food));
        let added = book.add(payload(2.0, "2024-01-02", Category::Bills)).clone();

        assert_eq!(added.id, "id-2");
        let ids: Vec<&str> = book.expenses().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["id-2", "id-1"]);
        assert_eq!(stored(&book), book.expenses().to_vec());
    }

    #[test]
    fn test_update_replaces_in_place() {
        let mut book = new_book();
        book.add(payload(1.0, "2024-01-01", Category::Food));
        book.add(payload(2.0, "2024-01-02", Category::Food));

        let mut changed = book.get("id-1").unwrap().clone();
        changed.amount = 9.0;
        changed.category = Category::Other;
        assert!(book.update(changed.clone()));

        assert_eq!(book.expenses()[1], changed);
        assert_eq!(book.expenses().len(), 2);
        assert_eq!(stored(&book)[1], changed);

        let ghost = Expense {
            id: "nope".to_string(),
            ..changed
        };
        assert!(!book.update(ghost));
    }

    #[test]
    fn test_delete_clears_matching_edit_session() {
        let mut book = new_book();
        book.add(payload(1.0, "2024-01-01", Category::Food));
        book.add(payload(2.0, "2024-01-02", Category::Food));

        assert!(book.begin_edit("id-1").is_some());
        assert!(book.delete("id-2"));
        assert_eq!(book.editing().map(|e| e.id.as_str()), Some("id-1"));

        assert!(book.delete("id-1"));
        assert!(book.editing().is_none());
        assert!(book.expenses().is_empty());
        assert!(stored(&book).is_empty());
        assert!(!book.delete("id-1"));
    }

    #[test]
    fn test_form_round_trip_through_book() {
        let mut book = new_book();
        let mut form = ExpenseForm::new();
        form.set_amount("10");
        form.set_date("2024-05-05");
        book.apply(form.submit().unwrap());

        let seed = book.begin_edit("id-1").unwrap();
        let mut form = ExpenseForm::edit(&seed);
        form.set_note("taxi");
        book.apply(form.submit().unwrap());

        assert!(book.editing().is_none());
        assert_eq!(book.expenses().len(), 1);
        assert_eq!(book.expenses()[0].note, "taxi");
        assert_eq!(book.expenses()[0].id, "id-1");
    }

    #[test]
    fn test_visible_and_summary_follow_criteria() {
        let mut book = new_book();
        book.add(payload(100.0, "2024-01-10", Category::Food));
        book.add(payload(100.0, "2024-01-11", Category::Travel));

        book.set_criteria(FilterCriteria {
            category: Some(Category::Food),
            ..Default::default()
        });
        let visible = book.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].category, Category::Food);

        let summary = book.summary();
        assert_eq!(summary.total, 100.0);
        assert_eq!(summary.for_category(Category::Food).unwrap().percentage, 100);

        book.clear_filters();
        assert_eq!(book.visible().len(), 2);
        assert_eq!(book.summary().total, 200.0);
    }

    #[test]
    fn test_import_keeps_reverse_file_order() {
        let mut book = new_book();
        book.add(payload(1.0, "2024-01-01", Category::Food));
        let added = book.import(vec![
            payload(2.0, "2024-01-02", Category::Food),
            payload(3.0, "2024-01-03", Category::Food),
        ]);

        assert_eq!(added, 2);
        let amounts: Vec<f64> = book.expenses().iter().map(|e| e.amount).collect();
        assert_eq!(amounts, vec![3.0, 2.0, 1.0]);
        assert_eq!(book.import(Vec::new()), 0);
    }

    #[test]
    fn test_reopen_hydrates_saved_state() {
        let mut book = new_book();
        book.add(payload(5.0, "2024-01-01", Category::Bills));
        let expected = book.expenses().to_vec();

        let store = book.repository().store().clone();
        let reopened = ExpenseBook::open(ExpenseRepository::new(store), Box::new(SequentialIds(0)));
        assert_eq!(reopened.expenses(), expected.as_slice());
    }

    #[test]
    fn test_delete_keeps_records_it_cannot_read() {
        let mut store = MemoryStore::new();
        store
            .set(
                STORAGE_KEY,
                r#"[
                    {"id":"a","amount":1,"date":"2024-01-01","note":"","category":"Food"},
                    {"id":"b","amount":2,"date":"2024-01-01","note":"","category":"Groceries"},
                    {"id":"c","amount":"3","date":"2024-01-01","note":null,"category":"Bills"}
                ]"#,
            )
            .unwrap();

        let mut book = ExpenseBook::open(ExpenseRepository::new(store), Box::new(SequentialIds(0)));
        let ids: Vec<&str> = book.expenses().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);

        assert!(book.delete("a"));

        let raw = book.repository().store().get(STORAGE_KEY).unwrap().unwrap();
        let items: Vec<serde_json::Value> = serde_json::from_str(&raw).unwrap();
        let stored_ids: Vec<&str> = items.iter().filter_map(|v| v["id"].as_str()).collect();
        assert_eq!(stored_ids, vec!["c", "b"]);

        let store = book.repository().store().clone();
        let reopened = ExpenseBook::open(ExpenseRepository::new(store), Box::new(SequentialIds(0)));
        assert_eq!(reopened.expenses().len(), 1);
        assert_eq!(reopened.expenses()[0].amount, 3.0);
    }

    #[test]
    fn test_failed_save_keeps_in_memory_state() {
        let mut book = ExpenseBook::open(
            ExpenseRepository::new(MemoryStore::with_capacity_limit(4)),
            Box::new(SequentialIds(0)),
        );
        book.add(payload(5.0, "2024-01-01", Category::Bills));

        assert_eq!(book.expenses().len(), 1);
        assert!(book.repository().store().get(STORAGE_KEY).unwrap().is_none());
    }
}
