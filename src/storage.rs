// 💾 Persistence - one JSON blob in a durable key-value slot
//
// Load never fails (absent or corrupt data reads as an empty collection) and
// save never fails (write errors are logged and dropped). The in-memory
// collection stays the source of truth for the session either way.

use crate::expense::Expense;
use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// Storage slot for the whole collection. Changing it orphans all stored data.
pub const STORAGE_KEY: &str = "expenses-v1";

// ============================================================================
// KEY-VALUE STORES
// ============================================================================

/// Durable string slots addressed by key
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value under `key`
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// SQLite-backed store (single `kv_store` table, WAL journal)
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database {}", path.display()))?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        setup_kv_table(&conn)?;
        Ok(SqliteStore { conn })
    }
}

fn setup_kv_table(conn: &Connection) -> Result<()> {
    // WAL for crash recovery (in-memory databases silently keep "memory")
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv_store (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    Ok(())
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, CURRENT_TIMESTAMP)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at",
            params![key, value],
        )?;
        Ok(())
    }
}

/// In-process store with an optional byte quota.
///
/// Writes that would push the total size of all values past the quota fail,
/// leaving the previous value in place.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    slots: HashMap<String, String>,
    capacity: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity_limit(capacity: usize) -> Self {
        MemoryStore {
            slots: HashMap::new(),
            capacity: Some(capacity),
        }
    }

    fn used_without(&self, key: &str) -> usize {
        self.slots
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(_, v)| v.len())
            .sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if let Some(capacity) = self.capacity {
            let needed = self.used_without(key) + value.len();
            if needed > capacity {
                return Err(anyhow!(
                    "Storage quota exceeded: {} bytes needed, {} available",
                    needed,
                    capacity
                ));
            }
        }
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ============================================================================
// EXPENSE REPOSITORY
// ============================================================================

/// What a read of the slot produced: records that became `Expense`s, plus
/// array elements that could not, kept verbatim
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StoredCollection {
    pub expenses: Vec<Expense>,
    pub unreadable: Vec<Value>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum StoredItem<'a> {
    Known(&'a Expense),
    Raw(&'a Value),
}

/// Loads and saves the full expense collection under a single key
pub struct ExpenseRepository<S: KeyValueStore> {
    store: S,
    key: String,
    // elements from the last load that are written back untouched on save
    unreadable: Vec<Value>,
}

impl<S: KeyValueStore> ExpenseRepository<S> {
    pub fn new(store: S) -> Self {
        Self::with_key(store, STORAGE_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        ExpenseRepository {
            store,
            key: key.into(),
            unreadable: Vec::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Elements carried over from the last `load` that are not expenses
    pub fn unreadable(&self) -> &[Value] {
        &self.unreadable
    }

    /// Parse the slot without touching repository state.
    ///
    /// Absent, unreadable, non-JSON or non-array data reads as empty. Records
    /// are not revalidated. An element that cannot be represented as an
    /// `Expense` (unknown category, missing id, ...) lands in `unreadable`.
    pub fn read(&self) -> StoredCollection {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return StoredCollection::default(),
            Err(e) => {
                log::warn!("Could not read '{}' from storage: {:#}", self.key, e);
                return StoredCollection::default();
            }
        };

        let items = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(items)) => items,
            Ok(_) => {
                log::warn!("Stored '{}' is not an array; ignoring it", self.key);
                return StoredCollection::default();
            }
            Err(e) => {
                log::warn!("Stored '{}' is not valid JSON; ignoring it: {}", self.key, e);
                return StoredCollection::default();
            }
        };

        let mut collection = StoredCollection::default();
        for (index, item) in items.into_iter().enumerate() {
            match Expense::deserialize(&item) {
                Ok(expense) => collection.expenses.push(expense),
                Err(e) => {
                    log::warn!("Keeping stored record #{} as-is: {}", index, e);
                    collection.unreadable.push(item);
                }
            }
        }
        collection
    }

    /// Read the stored collection; anything unreadable comes back empty.
    ///
    /// Elements that are not expenses are remembered and written back after
    /// the expenses on every later `save`, so they are never lost.
    pub fn load(&mut self) -> Vec<Expense> {
        let StoredCollection { expenses, unreadable } = self.read();
        log::debug!(
            "Loaded {} stored expenses ({} kept as-is)",
            expenses.len(),
            unreadable.len()
        );
        self.unreadable = unreadable;
        expenses
    }

    /// Write the whole collection, replacing the previous value.
    ///
    /// Returns whether the write went through. Failures are logged only;
    /// there is no retry.
    pub fn save(&mut self, expenses: &[Expense]) -> bool {
        let items: Vec<StoredItem> = expenses
            .iter()
            .map(StoredItem::Known)
            .chain(self.unreadable.iter().map(StoredItem::Raw))
            .collect();

        let json = match serde_json::to_string(&items) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Could not serialize expenses: {}", e);
                return false;
            }
        };

        match self.store.set(&self.key, &json) {
            Ok(()) => {
                log::debug!("Saved {} expenses to '{}'", expenses.len(), self.key);
                true
            }
            Err(e) => {
                log::warn!("Could not save expenses to '{}': {:#}", self.key, e);
                false
            }
        }
    }
}
