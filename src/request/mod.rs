//! 요청 가로채기
//!
//! [`InterceptedRequest`] 는 원본 요청 본문을 생성 시점에 한 번만 읽고, 이후 소비자에게는
//! 버퍼링된 본문과 파라미터 사본을 제공합니다.

mod body;
mod params;

pub use body::BufferedBody;
pub use params::ParameterSnapshot;

use std::net::SocketAddr;
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Body;
use hyper::header::{HeaderMap, CONTENT_LENGTH, CONTENT_TYPE, COOKIE};
use hyper::http::request::Parts;
use hyper::{Method, Request, Uri};
use tracing::debug;
use crate::charset;
use crate::filter::{BoxError, FilterError};

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// 전송 계층의 원격 주소. 서버가 요청 extension 으로 넣어 줍니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteAddr(pub SocketAddr);

/// 본문을 여러 번 읽을 수 있는 요청
#[derive(Debug)]
pub struct InterceptedRequest {
    parts: Parts,
    body: BufferedBody,
    params: ParameterSnapshot,
}

impl InterceptedRequest {
    /// 요청을 감쌉니다. 원본 본문은 여기서 한 번 끝까지 읽힙니다.
    pub async fn from_request<B>(req: Request<B>) -> Result<Self, FilterError>
    where
        B: Body,
        B::Error: Into<BoxError>,
    {
        let (parts, body) = req.into_parts();

        let content_type = parts
            .headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok());
        let encoding = charset::resolve(content_type);
        let is_form = content_type
            .map(|ct| ct.to_ascii_lowercase().starts_with(FORM_URLENCODED))
            .unwrap_or(false);
        let declared_length = declared_length(&parts.headers);

        let body = BufferedBody::read_from(body, encoding, declared_length).await?;
        let params = ParameterSnapshot::capture(
            parts.uri.query(),
            is_form.then(|| body.as_bytes()),
            body.charset(),
        );

        debug!(
            method = %parts.method,
            path = %parts.uri.path(),
            bytes = body.len(),
            charset = body.charset().name(),
            "요청 본문 버퍼링 완료"
        );

        Ok(Self { parts, body, params })
    }

    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    pub fn uri(&self) -> &Uri {
        &self.parts.uri
    }

    pub fn path(&self) -> &str {
        self.parts.uri.path()
    }

    pub fn query(&self) -> Option<&str> {
        self.parts.uri.query()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.parts.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn extensions(&self) -> &hyper::http::Extensions {
        &self.parts.extensions
    }

    /// 선언된 본문 길이. 헤더가 없거나 숫자가 아니면 `None`
    pub fn content_length(&self) -> Option<u64> {
        declared_length(&self.parts.headers)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header(CONTENT_TYPE.as_str())
    }

    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.parts.extensions.get::<RemoteAddr>().map(|addr| addr.0)
    }

    /// 클라이언트 IP
    ///
    /// `X-Forwarded-For` 가 있으면 첫 번째 주소를, 없으면 전송 계층 주소를 사용합니다.
    pub fn client_ip(&self) -> String {
        if let Some(forwarded) = self.header("x-forwarded-for") {
            if let Some(ip) = forwarded.split(',').next().map(str::trim).filter(|ip| !ip.is_empty()) {
                return ip.to_string();
            }
        }

        self.remote_addr()
            .map(|addr| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }

    pub fn body(&self) -> &BufferedBody {
        &self.body
    }

    pub fn parameters(&self) -> &ParameterSnapshot {
        &self.params
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    pub fn parameter_values(&self, name: &str) -> &[String] {
        self.params.get_all(name)
    }

    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.params.names()
    }

    /// `Cookie` 헤더의 이름/값 목록
    pub fn cookies(&self) -> Vec<(String, String)> {
        self.parts
            .headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|line| line.split(';'))
            .filter_map(|pair| {
                let (name, value) = pair.split_once('=')?;
                let name = name.trim();
                (!name.is_empty()).then(|| (name.to_string(), value.trim().to_string()))
            })
            .collect()
    }

    /// hyper 요청으로 되돌립니다. 본문은 버퍼링된 바이트를 사용합니다.
    pub fn into_request(self) -> Request<Full<Bytes>> {
        Request::from_parts(self.parts, self.body.to_body())
    }
}

fn declared_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}
