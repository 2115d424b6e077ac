//! Upstream metrics API resource types.
//!
//! Only the structural resources (platforms, accounts, fields) are typed.
//! Insights are open-schema and stay as `serde_json` objects.

use serde::{Deserialize, Deserializer};

/// An advertising channel exposed by the `platforms` resource.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Platform {
    /// Machine identifier used in query strings (e.g. `"meta_ads"`).
    pub value: String,
    /// Display name used in CSV output (e.g. `"Facebook Ads"`).
    pub text: String,
}

/// A credentialed account scoped to one platform.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Account {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    /// Required by the `insights` resource for this account.
    pub token: String,
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("token", &"[redacted]")
            .finish()
    }
}

/// A metric column available on a platform.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Field {
    pub value: String,
}

/// Accepts `"123"` or `123` and yields `"123"`.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}
