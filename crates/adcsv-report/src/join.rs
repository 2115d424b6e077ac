//! Joins platforms, accounts, fields, and insights into flat records.
//!
//! Every fetch is awaited in turn: accounts, then fields, then each
//! account's insights, platform by platform. Nothing is cached between calls.

use std::collections::HashSet;

use adcsv_upstream::{fetch_all, Account, Field, PageSource, Platform};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::record::FlatRecord;

/// Flat records plus the field names that were requested to produce them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsightSet {
    pub records: Vec<FlatRecord>,
    /// Requested field names in first-seen order, de-duplicated across platforms.
    pub field_names: Vec<String>,
}

impl InsightSet {
    fn absorb(&mut self, other: InsightSet) {
        self.records.extend(other.records);
        let mut seen: HashSet<String> = self.field_names.iter().cloned().collect();
        for name in other.field_names {
            if seen.insert(name.clone()) {
                self.field_names.push(name);
            }
        }
    }
}

/// Collects insights for one platform (by machine id), or for every platform
/// when `platform_filter` is `None`.
///
/// In the cross-platform case each record is also tagged with the platform's
/// display name.
pub async fn collect_insights<S>(source: &S, platform_filter: Option<&str>) -> InsightSet
where
    S: PageSource + Sync,
{
    match platform_filter {
        Some(platform) => collect_platform(source, platform, None).await,
        None => collect_all_platforms(source).await,
    }
}

async fn collect_all_platforms<S>(source: &S) -> InsightSet
where
    S: PageSource + Sync,
{
    let platforms: Vec<Platform> = decode_items(fetch_all(source, "platforms", &[]).await, "platform");
    tracing::info!(platforms = platforms.len(), "collecting insights across platforms");

    let mut all = InsightSet::default();
    for platform in &platforms {
        let set = collect_platform(source, &platform.value, Some(&platform.text)).await;
        all.absorb(set);
    }
    all
}

/// Fetches accounts and fields for `platform`, then each account's insights.
///
/// `label` is written into the `platform` tag when present.
async fn collect_platform<S>(source: &S, platform: &str, label: Option<&str>) -> InsightSet
where
    S: PageSource + Sync,
{
    let platform_param = [("platform", platform)];
    let accounts: Vec<Account> =
        decode_items(fetch_all(source, "accounts", &platform_param).await, "account");
    let fields: Vec<Field> = decode_items(fetch_all(source, "fields", &platform_param).await, "field");

    let field_names: Vec<String> = fields.into_iter().map(|f| f.value).collect();
    let joined_fields = field_names.join(",");

    tracing::info!(
        platform,
        accounts = accounts.len(),
        fields = field_names.len(),
        "collecting platform insights"
    );

    let mut records = Vec::new();
    for account in &accounts {
        let params = [
            ("platform", platform),
            ("account", account.id.as_str()),
            ("token", account.token.as_str()),
            ("fields", joined_fields.as_str()),
        ];
        let insights = fetch_all(source, "insights", &params).await;
        tracing::debug!(platform, account = %account.name, insights = insights.len(), "account insights fetched");

        for insight in insights {
            match insight {
                Value::Object(map) => records.push(FlatRecord::tagged(map, &account.name, label)),
                other => {
                    tracing::warn!(platform, account = %account.name, insight = %other, "skipping non-object insight");
                }
            }
        }
    }

    InsightSet {
        records,
        field_names,
    }
}

/// Decodes each item, logging and dropping those that do not fit `T`.
fn decode_items<T: DeserializeOwned>(items: Vec<Value>, kind: &str) -> Vec<T> {
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<T>(item) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                tracing::warn!(kind, error = %e, "skipping undecodable upstream item");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absorb_pools_field_names_without_duplicates() {
        let mut all = InsightSet {
            records: Vec::new(),
            field_names: vec!["clicks".to_owned(), "spend".to_owned()],
        };
        all.absorb(InsightSet {
            records: Vec::new(),
            field_names: vec!["impressions".to_owned(), "clicks".to_owned()],
        });
        assert_eq!(all.field_names, ["clicks", "spend", "impressions"]);
    }

    #[test]
    fn decode_items_drops_bad_entries() {
        let items = vec![
            serde_json::json!({ "value": "clicks" }),
            serde_json::json!({ "name": "no value" }),
        ];
        let fields: Vec<Field> = decode_items(items, "field");
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].value, "clicks");
    }
}
