use super::service::{RangeStream, StreamingService};
use crate::common::error::AppError;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

/// IMF-fixdate, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`.
const HTTP_DATE: &[BorrowedFormatItem<'static>] =
    format_description!("[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT");

/// Stream an object with support for Range requests
/// Proxies the stream from S3/MinIO to the client without buffering it
#[utoipa::path(
    get,
    path = "/api/v1/stream/{key}",
    params(
        ("key" = String, Path, description = "Object key, e.g. videos/episodes/{id}/{file}")
    ),
    responses(
        (status = 200, description = "Stream Content"),
        (status = 206, description = "Partial Content"),
        (status = 404, description = "Not Found"),
        (status = 416, description = "Range Not Satisfiable")
    ),
    tag = "Streaming"
)]
pub async fn stream_object(
    State(state): State<AppState>,
    Path(key): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let range = range_header(&headers);
    let stream = StreamingService::stream_range(state.storage.as_ref(), &key, range.as_deref()).await?;
    Ok(range_response(stream))
}

pub fn range_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::RANGE)
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string())
}

/// 200 for whole objects, 206 with `Content-Range` for partial ones.
pub fn range_response(stream: RangeStream) -> Response {
    let window = stream.window;

    let mut builder = Response::builder()
        .header(header::ACCEPT_RANGES, "bytes")
        .header(header::CONTENT_TYPE, stream.content_type)
        .header(header::CONTENT_LENGTH, window.content_length());

    if let Some(et) = stream.etag {
        builder = builder.header(header::ETAG, et);
    }
    if let Some(modified) = stream.last_modified.and_then(http_date) {
        builder = builder.header(header::LAST_MODIFIED, modified);
    }

    if window.is_partial {
        builder = builder
            .header(header::CONTENT_RANGE, window.content_range())
            .status(StatusCode::PARTIAL_CONTENT);
    } else {
        builder = builder.status(StatusCode::OK);
    }

    builder
        .body(Body::from_stream(stream.body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

fn http_date(at: OffsetDateTime) -> Option<String> {
    at.to_offset(UtcOffset::UTC).format(HTTP_DATE).ok()
}
