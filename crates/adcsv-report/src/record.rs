//! Flat insight records.
//!
//! Insights have no fixed schema, so a record is an insertion-ordered JSON
//! object. Synthetic tag keys carry the owning account and platform.

use serde_json::{Map, Value};

/// Insertion-ordered string-keyed mapping used for rows and summaries.
pub type Record = Map<String, Value>;

/// Tag key holding the owning account's name.
pub const ACCOUNT_NAME_KEY: &str = "account_name";
/// Tag key holding the platform display name in cross-platform exports.
pub const PLATFORM_KEY: &str = "platform";

pub const PLATFORM_COLUMN: &str = "Platform";
pub const ACCOUNT_NAME_COLUMN: &str = "Account Name";

/// An insight tagged with its account (and optionally platform).
///
/// Read-only once built.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatRecord(Record);

impl FlatRecord {
    /// Tags `insight` with `account_name` and, when given, `platform`.
    #[must_use]
    pub fn tagged(mut insight: Record, account_name: &str, platform: Option<&str>) -> Self {
        if let Some(platform) = platform {
            insight.insert(PLATFORM_KEY.to_owned(), Value::String(platform.to_owned()));
        }
        insight.insert(
            ACCOUNT_NAME_KEY.to_owned(),
            Value::String(account_name.to_owned()),
        );
        Self(insight)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    #[must_use]
    pub fn as_map(&self) -> &Record {
        &self.0
    }

    #[must_use]
    pub fn account_name(&self) -> Option<&str> {
        self.get(ACCOUNT_NAME_KEY).and_then(Value::as_str)
    }

    #[must_use]
    pub fn platform(&self) -> Option<&str> {
        self.get(PLATFORM_KEY).and_then(Value::as_str)
    }
}

impl From<Record> for FlatRecord {
    fn from(map: Record) -> Self {
        Self(map)
    }
}
