use hyper::{Response, StatusCode};
use http_body_util::Full;
use bytes::Bytes;
use super::FilterError;

/// 필터 에러를 HTTP 응답으로 변환합니다.
///
/// 실패한 교환은 캡처된 본문을 버리고 이 응답만 내보냅니다.
pub fn handle_filter_error(err: FilterError) -> Response<Full<Bytes>> {
    let status = match &err {
        FilterError::BodyRead(_) | FilterError::Encoding(_) => StatusCode::BAD_REQUEST,
        FilterError::Transform(_)
        | FilterError::WriteSurfaceMisuse { .. }
        | FilterError::CaptureReleased
        | FilterError::Handler(_)
        | FilterError::Config(_)
        | FilterError::ConfigParse(_)
        | FilterError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    Response::builder()
        .status(status)
        .header(hyper::header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(Full::new(Bytes::from(err.to_string())))
        .unwrap_or_else(|_| {
            Response::new(Full::new(Bytes::from("Internal Server Error")))
        })
}
