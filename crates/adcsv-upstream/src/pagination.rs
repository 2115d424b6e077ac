//! Page-counter pagination for the upstream metrics API.
//!
//! Every resource answers with an envelope of the form
//!
//! ```text
//! { "<resource>": [ ... ], "pagination": { "current": 1, "total": 3 } }
//! ```
//!
//! [`fetch_all`] walks `page = 1, 2, ...` until `page >= total`, collecting the
//! payload list of each page. Failures never propagate: a bad status, a
//! transport error, or an unknown envelope stops the walk and whatever was
//! collected so far is returned.

use std::future::Future;

use serde_json::Value;

use crate::error::UpstreamError;

/// Hard cap on pages per resource when a source does not configure one.
pub const DEFAULT_MAX_PAGES: u64 = 500;

/// Envelope keys that may hold a page's payload, in lookup order.
pub const PAYLOAD_KEYS: [&str; 5] = ["data", "platforms", "accounts", "fields", "insights"];

/// A transport able to fetch a single page of an upstream resource.
///
/// [`crate::UpstreamClient`] is the HTTP implementation; tests substitute
/// canned page sequences.
pub trait PageSource {
    /// Fetches page `page` of `endpoint` with `params` and returns the decoded body.
    ///
    /// Implementations must report a non-2xx status as
    /// [`UpstreamError::UnexpectedStatus`].
    fn fetch_page(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
        page: u64,
    ) -> impl Future<Output = Result<Value, UpstreamError>> + Send;

    /// Maximum number of pages [`fetch_all`] will request from one resource.
    fn max_pages(&self) -> u64 {
        DEFAULT_MAX_PAGES
    }
}

/// Fetches every page of `endpoint` and concatenates the payload lists.
///
/// Pages are requested strictly one after another. The walk stops when the
/// current page reaches `pagination.total` (a missing total counts as 1), or
/// early on any failure, in which case the items gathered from earlier pages
/// are returned.
pub async fn fetch_all<S>(source: &S, endpoint: &str, params: &[(&str, &str)]) -> Vec<Value>
where
    S: PageSource + Sync,
{
    let max_pages = source.max_pages();
    let mut items: Vec<Value> = Vec::new();
    let mut page = 1u64;

    loop {
        tracing::debug!(endpoint, page, "fetching upstream page");

        let mut body = match source.fetch_page(endpoint, params, page).await {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(
                    endpoint,
                    page,
                    collected = items.len(),
                    error = %e,
                    "upstream request failed; returning partial result"
                );
                break;
            }
        };

        let total = declared_total(&body);

        let Some(page_items) = take_payload(&mut body) else {
            tracing::error!(
                endpoint,
                page,
                collected = items.len(),
                keys = ?top_level_keys(&body),
                "unexpected upstream response shape; returning partial result"
            );
            break;
        };
        items.extend(page_items);

        if page >= total {
            break;
        }
        if page >= max_pages {
            tracing::warn!(
                endpoint,
                page,
                total,
                max_pages,
                "page limit reached before the declared total; truncating"
            );
            break;
        }
        page += 1;
    }

    items
}

/// Reads `pagination.total`, defaulting to 1 when absent or not an integer.
#[must_use]
pub fn declared_total(body: &Value) -> u64 {
    body.get("pagination")
        .and_then(|p| p.get("total"))
        .and_then(Value::as_u64)
        .unwrap_or(1)
}

/// Removes and returns the payload list under the first present [`PAYLOAD_KEYS`] key.
///
/// Returns `None` when no payload key is present, or when the first one found
/// does not hold an array.
fn take_payload(body: &mut Value) -> Option<Vec<Value>> {
    let object = body.as_object_mut()?;
    let key = PAYLOAD_KEYS.iter().find(|k| object.contains_key(**k))?;
    match object.get_mut(*key)?.take() {
        Value::Array(list) => Some(list),
        other => {
            // Put it back so the key still shows up in the caller's log.
            object.insert((*key).to_owned(), other);
            None
        }
    }
}

/// Top-level keys of a response body. Values are never logged: an
/// `accounts` payload carries per-account tokens.
fn top_level_keys(body: &Value) -> Vec<&str> {
    body.as_object()
        .map(|object| object.keys().map(String::as_str).collect())
        .unwrap_or_default()
}
