//! Per-group numeric aggregation of flat records.

use std::collections::{HashMap, HashSet};

use serde_json::{Number, Value};

use crate::record::{FlatRecord, Record};

/// Running total for one metric. Integer sums stay integral until a float
/// contribution (or an `i64` overflow) arrives.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Sum {
    Int(i64),
    Float(f64),
}

impl Sum {
    #[allow(clippy::cast_precision_loss)]
    fn add(self, n: &Number) -> Self {
        match (self, n.as_i64()) {
            (Sum::Int(acc), Some(v)) => acc
                .checked_add(v)
                .map_or_else(|| Sum::Float(acc as f64 + v as f64), Sum::Int),
            (Sum::Int(acc), None) => Sum::Float(acc as f64 + n.as_f64().unwrap_or(0.0)),
            (Sum::Float(acc), _) => Sum::Float(acc + n.as_f64().unwrap_or(0.0)),
        }
    }

    fn into_value(self) -> Value {
        match self {
            Sum::Int(v) => Value::from(v),
            Sum::Float(v) => Number::from_f64(v).map_or(Value::Null, Value::Number),
        }
    }
}

/// Sums numeric fields per distinct value of `group_key`.
///
/// Returns one summary per group in first-seen order. Each summary holds
/// `group_key` plus a total for every candidate field that is numeric in at
/// least one input record; groups that never report such a field get 0.
/// Strings, booleans, nulls, and missing values add nothing. Records without
/// a string `group_key` are skipped.
#[must_use]
pub fn aggregate(records: &[FlatRecord], group_key: &str, candidate_fields: &[String]) -> Vec<Record> {
    let mut unique = HashSet::new();
    let metrics: Vec<&str> = candidate_fields
        .iter()
        .map(String::as_str)
        .filter(|field| *field != group_key && unique.insert(*field))
        .filter(|field| records.iter().any(|r| numeric(r.get(field)).is_some()))
        .collect();

    let mut order: Vec<(&str, Vec<Sum>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let Some(group) = record.get(group_key).and_then(Value::as_str) else {
            tracing::warn!(group_key, "record has no group value; skipping in summary");
            continue;
        };

        let slot = *index.entry(group).or_insert_with(|| {
            order.push((group, vec![Sum::Int(0); metrics.len()]));
            order.len() - 1
        });
        let sums = &mut order[slot].1;

        for (sum, field) in sums.iter_mut().zip(&metrics) {
            if let Some(n) = numeric(record.get(field)) {
                *sum = sum.add(n);
            }
        }
    }

    order
        .into_iter()
        .map(|(group, sums)| {
            let mut summary = Record::new();
            summary.insert(group_key.to_owned(), Value::String(group.to_owned()));
            for (field, sum) in metrics.iter().zip(sums) {
                summary.insert((*field).to_owned(), sum.into_value());
            }
            summary
        })
        .collect()
}

fn numeric(value: Option<&Value>) -> Option<&Number> {
    match value {
        Some(Value::Number(n)) => Some(n),
        _ => None,
    }
}
