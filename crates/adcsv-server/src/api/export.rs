//! CSV export handlers.
//!
//! Each request re-fetches everything it needs from the upstream API; the
//! result is buffered in full before the response is written.

use adcsv_report::{collect_insights, ReportError, Table};
use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Extension,
};

use crate::middleware::RequestId;

use super::{ApiError, AppState};

const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

/// Buffered CSV body served as `text/csv`.
pub(super) struct CsvResponse(String);

impl IntoResponse for CsvResponse {
    fn into_response(self) -> Response {
        ([(header::CONTENT_TYPE, CSV_CONTENT_TYPE)], self.0).into_response()
    }
}

fn render(req_id: RequestId, table: &Table) -> Result<CsvResponse, ApiError> {
    table.to_csv().map(CsvResponse).map_err(|e| map_report_error(req_id.0, &e))
}

fn map_report_error(request_id: String, error: &ReportError) -> ApiError {
    tracing::error!(error = %error, "csv rendering failed");
    ApiError::new(request_id, "internal_error", "failed to render CSV")
}

/// `GET /{platform}`: every insight of one platform.
pub(super) async fn platform_insights(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(platform): Path<String>,
) -> Result<CsvResponse, ApiError> {
    tracing::info!(platform = %platform, request_id = %req_id.0, "exporting platform insights");
    let set = collect_insights(state.upstream.as_ref(), Some(platform.as_str())).await;
    render(req_id, &Table::platform_insights(&platform, &set))
}

/// `GET /{platform}/resumo`: per-account totals for one platform.
pub(super) async fn platform_summary(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(platform): Path<String>,
) -> Result<CsvResponse, ApiError> {
    tracing::info!(platform = %platform, request_id = %req_id.0, "exporting platform summary");
    let set = collect_insights(state.upstream.as_ref(), Some(platform.as_str())).await;
    render(req_id, &Table::platform_summary(&platform, &set))
}

/// `GET /geral`: every insight across all platforms.
pub(super) async fn all_insights(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<CsvResponse, ApiError> {
    tracing::info!(request_id = %req_id.0, "exporting insights for all platforms");
    let set = collect_insights(state.upstream.as_ref(), None).await;
    render(req_id, &Table::all_insights(&set))
}

/// `GET /geral/resumo`: per-platform totals with fields pooled across platforms.
pub(super) async fn all_summary(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<CsvResponse, ApiError> {
    tracing::info!(request_id = %req_id.0, "exporting summary for all platforms");
    let set = collect_insights(state.upstream.as_ref(), None).await;
    render(req_id, &Table::all_summary(&set))
}
