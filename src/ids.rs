// 🆔 Identity generation for new expenses

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Supplies a fresh id for every created expense
pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}

/// Random v4 UUIDs (default)
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&mut self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Milliseconds since the epoch as decimal text.
///
/// Coarse: two creates within the same millisecond collide.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimestampGenerator;

impl IdGenerator for TimestampGenerator {
    fn next_id(&mut self) -> String {
        Utc::now().timestamp_millis().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    #[default]
    Uuid,
    Timestamp,
}

impl IdStrategy {
    pub fn generator(&self) -> Box<dyn IdGenerator> {
        match self {
            IdStrategy::Uuid => Box::new(UuidGenerator),
            IdStrategy::Timestamp => Box::new(TimestampGenerator),
        }
    }
}
