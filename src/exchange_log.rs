//! 요청/응답 교환 로깅
//!
//! 상세 로깅이 켜져 있을 때만 요청 시작과 종료 시점에 구조화된 기록을 남깁니다.
//! 꺼져 있으면 헤더, 쿠키, 파라미터, 본문 스냅샷을 아예 만들지 않습니다.
//! 소요 시간은 밀리초(`f64`) 단위입니다.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use hyper::StatusCode;
use serde::Serialize;
use tracing::{debug, Level};
use uuid::Uuid;
use crate::request::InterceptedRequest;

pub const EXCHANGE_TARGET: &str = "web_filters::exchange";

/// 로깅에 필요한 요청 정보
pub trait ExchangeView {
    fn client_ip(&self) -> String;
    fn method(&self) -> &str;
    fn path(&self) -> &str;
    fn content_length(&self) -> Option<u64>;
    fn header_snapshot(&self) -> BTreeMap<String, String>;
    fn cookie_snapshot(&self) -> BTreeMap<String, String>;
    fn parameter_snapshot(&self) -> BTreeMap<String, Vec<String>>;
    fn body_text(&self) -> String;
}

impl ExchangeView for InterceptedRequest {
    fn client_ip(&self) -> String {
        InterceptedRequest::client_ip(self)
    }

    fn method(&self) -> &str {
        InterceptedRequest::method(self).as_str()
    }

    fn path(&self) -> &str {
        InterceptedRequest::path(self)
    }

    fn content_length(&self) -> Option<u64> {
        InterceptedRequest::content_length(self)
    }

    fn header_snapshot(&self) -> BTreeMap<String, String> {
        let mut headers: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in self.headers() {
            let value = String::from_utf8_lossy(value.as_bytes());
            headers
                .entry(name.as_str().to_string())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(&value);
                })
                .or_insert_with(|| value.into_owned());
        }
        headers
    }

    fn cookie_snapshot(&self) -> BTreeMap<String, String> {
        self.cookies().into_iter().collect()
    }

    fn parameter_snapshot(&self) -> BTreeMap<String, Vec<String>> {
        self.parameters().as_map().clone()
    }

    fn body_text(&self) -> String {
        self.body().text().into_owned()
    }
}

/// 요청 시작 기록
#[derive(Debug, Clone, Serialize)]
pub struct EntryRecord {
    pub exchange_id: String,
    pub client_ip: String,
    pub method: String,
    pub path: String,
    pub content_length: Option<u64>,
    pub headers: BTreeMap<String, String>,
    pub cookies: BTreeMap<String, String>,
    pub parameters: BTreeMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// 요청 종료 기록
#[derive(Debug, Clone, Serialize)]
pub struct ExitRecord {
    pub exchange_id: String,
    pub client_ip: String,
    pub method: String,
    pub path: String,
    pub status: u16,
    pub duration_ms: f64,
}

/// 교환 기록을 받는 쪽
pub trait ExchangeSink: Send + Sync {
    /// 기록을 받을 준비가 되어 있는지. `false` 면 스냅샷을 만들지 않는다.
    fn enabled(&self) -> bool {
        true
    }

    fn entry(&self, record: &EntryRecord);

    fn exit(&self, record: &ExitRecord);
}

/// `tracing` 으로 내보내는 기본 sink
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ExchangeSink for TracingSink {
    fn enabled(&self) -> bool {
        tracing::enabled!(target: EXCHANGE_TARGET, Level::DEBUG)
    }

    fn entry(&self, record: &EntryRecord) {
        debug!(
            target: EXCHANGE_TARGET,
            exchange_id = %record.exchange_id,
            client_ip = %record.client_ip,
            method = %record.method,
            path = %record.path,
            content_length = ?record.content_length,
            "★★★ 요청 시작"
        );
        debug!(target: EXCHANGE_TARGET, exchange_id = %record.exchange_id, "headers={}", pretty(&record.headers));
        debug!(target: EXCHANGE_TARGET, exchange_id = %record.exchange_id, "cookies={}", pretty(&record.cookies));
        debug!(target: EXCHANGE_TARGET, exchange_id = %record.exchange_id, "parameters={}", pretty(&record.parameters));
        if let Some(body) = &record.body {
            debug!(target: EXCHANGE_TARGET, exchange_id = %record.exchange_id, "ReqBody={{ {} }}", body);
        }
    }

    fn exit(&self, record: &ExitRecord) {
        debug!(
            target: EXCHANGE_TARGET,
            exchange_id = %record.exchange_id,
            client_ip = %record.client_ip,
            method = %record.method,
            path = %record.path,
            status = record.status,
            duration_ms = record.duration_ms,
            "☆☆☆ 요청 종료"
        );
    }
}

fn pretty<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("<직렬화 실패: {}>", e))
}

/// 진행 중인 교환의 식별자와 시작 시각
#[derive(Debug)]
pub struct ExchangeTimer {
    exchange_id: String,
    started: Instant,
}

/// 교환 로거
#[derive(Clone)]
pub struct ExchangeLogger {
    verbose: bool,
    include_body: bool,
    sink: Arc<dyn ExchangeSink>,
}

impl ExchangeLogger {
    pub fn new(verbose: bool, sink: Arc<dyn ExchangeSink>) -> Self {
        Self {
            verbose,
            include_body: false,
            sink,
        }
    }

    /// 시작 기록에 요청 본문을 포함합니다.
    pub fn with_body(mut self, include_body: bool) -> Self {
        self.include_body = include_body;
        self
    }

    pub fn includes_body(&self) -> bool {
        self.include_body
    }

    pub fn is_enabled(&self) -> bool {
        self.verbose && self.sink.enabled()
    }

    /// 시작 기록. 로깅이 꺼져 있으면 요청에 전혀 접근하지 않고 `None` 을 반환합니다.
    pub fn log_entry(&self, view: &dyn ExchangeView) -> Option<ExchangeTimer> {
        if !self.is_enabled() {
            return None;
        }

        let timer = ExchangeTimer {
            exchange_id: Uuid::new_v4().to_string(),
            started: Instant::now(),
        };

        let record = EntryRecord {
            exchange_id: timer.exchange_id.clone(),
            client_ip: view.client_ip(),
            method: view.method().to_string(),
            path: view.path().to_string(),
            content_length: view.content_length(),
            headers: view.header_snapshot(),
            cookies: view.cookie_snapshot(),
            parameters: view.parameter_snapshot(),
            body: self.include_body.then(|| view.body_text()),
        };
        self.sink.entry(&record);

        Some(timer)
    }

    /// 종료 기록. 시작 기록이 없었으면 아무것도 하지 않습니다.
    pub fn log_exit(&self, view: &dyn ExchangeView, timer: Option<ExchangeTimer>, status: StatusCode) {
        let Some(timer) = timer else {
            return;
        };

        let record = ExitRecord {
            exchange_id: timer.exchange_id,
            client_ip: view.client_ip(),
            method: view.method().to_string(),
            path: view.path().to_string(),
            status: status.as_u16(),
            duration_ms: timer.started.elapsed().as_secs_f64() * 1000.0,
        };
        self.sink.exit(&record);
    }
}
