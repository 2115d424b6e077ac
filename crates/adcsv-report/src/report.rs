//! The four CSV exports: raw and summarized, per platform and across platforms.

use std::collections::HashSet;

use serde_json::Value;

use crate::aggregate::aggregate;
use crate::columns::discover_columns;
use crate::emit::to_csv;
use crate::error::ReportError;
use crate::join::InsightSet;
use crate::record::{
    FlatRecord, Record, ACCOUNT_NAME_COLUMN, ACCOUNT_NAME_KEY, PLATFORM_COLUMN, PLATFORM_KEY,
};

const TAG_KEYS: [&str; 2] = [PLATFORM_KEY, ACCOUNT_NAME_KEY];

/// Header order plus rows keyed by header name, ready for CSV output.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Record>,
}

impl Table {
    /// One row per insight of a single platform. The `Platform` column holds
    /// the platform id the caller asked for.
    #[must_use]
    pub fn platform_insights(platform: &str, set: &InsightSet) -> Self {
        let platform = Value::String(platform.to_owned());
        insight_table(set, |_| platform.clone())
    }

    /// One row per insight across platforms, labelled with each platform's
    /// display name.
    #[must_use]
    pub fn all_insights(set: &InsightSet) -> Self {
        insight_table(set, |record| tag_value(record, PLATFORM_KEY))
    }

    /// One row per account with every numeric field summed.
    #[must_use]
    pub fn platform_summary(platform: &str, set: &InsightSet) -> Self {
        let metrics = metric_columns(&set.field_names);
        let summaries = aggregate(&set.records, ACCOUNT_NAME_KEY, &metrics);

        let mut headers = vec![PLATFORM_COLUMN.to_owned(), ACCOUNT_NAME_COLUMN.to_owned()];
        headers.extend(metrics.iter().cloned());

        let rows = summaries
            .into_iter()
            .map(|mut summary| {
                let account = summary.remove(ACCOUNT_NAME_KEY).unwrap_or(Value::Null);
                let mut row = Record::new();
                row.insert(PLATFORM_COLUMN.to_owned(), Value::String(platform.to_owned()));
                row.insert(ACCOUNT_NAME_COLUMN.to_owned(), account);
                row.extend(summary);
                row
            })
            .collect();

        Self { headers, rows }
    }

    /// One row per platform with every numeric field summed. Fields are pooled
    /// across platforms; a platform that never reports a field shows 0.
    #[must_use]
    pub fn all_summary(set: &InsightSet) -> Self {
        let metrics = metric_columns(&set.field_names);
        let summaries = aggregate(&set.records, PLATFORM_KEY, &metrics);

        let mut headers = vec![PLATFORM_COLUMN.to_owned()];
        headers.extend(metrics.iter().cloned());

        let rows = summaries
            .into_iter()
            .map(|mut summary| {
                let platform = summary.remove(PLATFORM_KEY).unwrap_or(Value::Null);
                let mut row = Record::new();
                row.insert(PLATFORM_COLUMN.to_owned(), platform);
                row.extend(summary);
                row
            })
            .collect();

        Self { headers, rows }
    }

    /// Serializes the table as CSV text.
    ///
    /// # Errors
    ///
    /// Propagates [`ReportError`] from [`to_csv`].
    pub fn to_csv(&self) -> Result<String, ReportError> {
        to_csv(&self.rows, &self.headers)
    }
}

fn insight_table<F>(set: &InsightSet, platform_cell: F) -> Table
where
    F: Fn(&FlatRecord) -> Value,
{
    let headers = discover_columns(
        &set.records,
        &[PLATFORM_COLUMN, ACCOUNT_NAME_COLUMN],
        &TAG_KEYS,
    );

    let rows = set
        .records
        .iter()
        .map(|record| {
            let mut row = Record::new();
            row.insert(PLATFORM_COLUMN.to_owned(), platform_cell(record));
            row.insert(
                ACCOUNT_NAME_COLUMN.to_owned(),
                tag_value(record, ACCOUNT_NAME_KEY),
            );
            for column in &headers[2..] {
                if let Some(value) = record.get(column) {
                    row.insert(column.clone(), value.clone());
                }
            }
            row
        })
        .collect();

    Table { headers, rows }
}

fn tag_value(record: &FlatRecord, key: &str) -> Value {
    record.get(key).cloned().unwrap_or(Value::Null)
}

/// Requested field names usable as summary columns: de-duplicated, without
/// tag keys or names that collide with the fixed columns.
fn metric_columns(field_names: &[String]) -> Vec<String> {
    let mut seen: HashSet<&str> = TAG_KEYS
        .iter()
        .chain(&[PLATFORM_COLUMN, ACCOUNT_NAME_COLUMN])
        .copied()
        .collect();
    field_names
        .iter()
        .filter(|name| seen.insert(name.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(value: Value) -> FlatRecord {
        match value {
            Value::Object(map) => FlatRecord::from(map),
            other => panic!("expected object, got {other}"),
        }
    }

    fn set(records: Vec<FlatRecord>, fields: &[&str]) -> InsightSet {
        InsightSet {
            records,
            field_names: fields.iter().map(|f| (*f).to_owned()).collect(),
        }
    }

    #[test]
    fn platform_insights_use_requested_platform_id() {
        let data = set(
            vec![record(json!({"clicks": 3, "account_name": "Acme"}))],
            &["clicks"],
        );

        let table = Table::platform_insights("meta_ads", &data);

        assert_eq!(table.headers, ["Platform", "Account Name", "clicks"]);
        assert_eq!(table.rows[0]["Platform"], "meta_ads");
        assert_eq!(table.rows[0]["Account Name"], "Acme");
        assert_eq!(table.rows[0]["clicks"], json!(3));
    }

    #[test]
    fn all_insights_use_platform_tag_and_hide_tag_columns() {
        let data = set(
            vec![
                record(json!({"clicks": 3, "platform": "Facebook Ads", "account_name": "Acme"})),
                record(json!({"cost": 1.5, "platform": "Google Analytics", "account_name": "Beta"})),
            ],
            &["clicks", "cost"],
        );

        let table = Table::all_insights(&data);

        assert_eq!(table.headers, ["Platform", "Account Name", "clicks", "cost"]);
        assert_eq!(table.rows[1]["Platform"], "Google Analytics");
        assert!(table.rows[1].get("clicks").is_none());
        let csv = table.to_csv().expect("csv");
        assert_eq!(
            csv,
            "Platform,Account Name,clicks,cost\r\n\
             Facebook Ads,Acme,3,\r\n\
             Google Analytics,Beta,,1.5\r\n"
        );
    }

    #[test]
    fn platform_summary_rows_per_account() {
        let data = set(
            vec![
                record(json!({"ad_name": "a", "clicks": 5, "account_name": "X"})),
                record(json!({"ad_name": "b", "clicks": 7, "account_name": "X"})),
                record(json!({"ad_name": "c", "clicks": 2, "account_name": "Y"})),
            ],
            &["ad_name", "clicks"],
        );

        let csv = Table::platform_summary("ga4", &data).to_csv().expect("csv");

        assert_eq!(
            csv,
            "Platform,Account Name,ad_name,clicks\r\nga4,X,,12\r\nga4,Y,,2\r\n"
        );
    }

    #[test]
    fn all_summary_pools_fields_across_platforms() {
        let data = set(
            vec![
                record(json!({"impressions": 100, "platform": "A", "account_name": "a1"})),
                record(json!({"impressions": 50, "platform": "A", "account_name": "a2"})),
                record(json!({"clicks": 9, "platform": "B", "account_name": "b1"})),
            ],
            &["impressions", "clicks"],
        );

        let table = Table::all_summary(&data);

        assert_eq!(table.headers, ["Platform", "impressions", "clicks"]);
        assert_eq!(
            table.to_csv().expect("csv"),
            "Platform,impressions,clicks\r\nA,150,0\r\nB,0,9\r\n"
        );
    }

    #[test]
    fn metric_columns_drop_duplicates_and_tags() {
        let names: Vec<String> = ["clicks", "platform", "clicks", "Account Name", "spend"]
            .iter()
            .map(|s| (*s).to_owned())
            .collect();
        assert_eq!(metric_columns(&names), ["clicks", "spend"]);
    }

    #[test]
    fn empty_set_yields_header_only() {
        let csv = Table::all_summary(&InsightSet::default()).to_csv().expect("csv");
        assert_eq!(csv, "Platform\r\n");
    }
}
