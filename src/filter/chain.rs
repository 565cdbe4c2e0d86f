use std::sync::Arc;
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Body;
use hyper::{Request, Response};
use tracing::{error, trace};
use crate::request::InterceptedRequest;
use crate::response::{HttpResponse, TransportResponse};
use super::{handle_filter_error, BoxError, Filter, FilterError, Handler};

/// 남은 필터와 핸들러
pub struct Next<'a> {
    filters: &'a [Arc<dyn Filter>],
    handler: &'a dyn Handler,
}

impl<'a> Next<'a> {
    pub fn new(filters: &'a [Arc<dyn Filter>], handler: &'a dyn Handler) -> Self {
        Self { filters, handler }
    }

    /// 다음 필터를 실행합니다. 남은 필터가 없으면 핸들러를 호출합니다.
    pub async fn run(self, req: &InterceptedRequest, res: &mut dyn HttpResponse) -> Result<(), FilterError> {
        match self.filters.split_first() {
            Some((filter, rest)) => {
                trace!(filter = filter.name(), "필터 진입");
                filter.do_filter(req, res, Next::new(rest, self.handler)).await
            }
            None => self.handler.handle(req, res).await,
        }
    }
}

#[derive(Clone)]
pub struct FilterChain {
    filters: Vec<Arc<dyn Filter>>,
    handler: Arc<dyn Handler>,
}

impl FilterChain {
    pub fn new(handler: Arc<dyn Handler>) -> Self {
        Self {
            filters: Vec::new(),
            handler,
        }
    }

    pub fn add<F: Filter + 'static>(&mut self, filter: F) {
        self.filters.push(Arc::new(filter));
    }

    pub fn add_shared(&mut self, filter: Arc<dyn Filter>) {
        self.filters.push(filter);
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn filter_names(&self) -> Vec<&str> {
        self.filters.iter().map(|filter| filter.name()).collect()
    }

    /// 이미 감싼 요청을 체인에 통과시킵니다.
    pub async fn execute(&self, req: &InterceptedRequest, res: &mut dyn HttpResponse) -> Result<(), FilterError> {
        Next::new(&self.filters, self.handler.as_ref()).run(req, res).await
    }

    /// 요청 하나를 처음부터 끝까지 처리합니다.
    ///
    /// 본문 읽기에 실패하면 필터와 핸들러는 실행되지 않습니다.
    /// 체인 도중 실패하면 쓰던 응답은 버리고 에러 응답을 반환합니다.
    pub async fn dispatch<B>(&self, req: Request<B>) -> Response<Full<Bytes>>
    where
        B: Body,
        B::Error: Into<BoxError>,
    {
        let req = match InterceptedRequest::from_request(req).await {
            Ok(req) => req,
            Err(e) => {
                error!(error = %e, "요청 래핑 실패");
                return handle_filter_error(e);
            }
        };

        let mut res = TransportResponse::new();
        match self.execute(&req, &mut res).await {
            Ok(()) => res.into_response(),
            Err(e) => {
                error!(error = %e, method = %req.method(), path = %req.path(), "필터 체인 처리 실패");
                handle_filter_error(e)
            }
        }
    }
}
