use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error};
use crate::exchange_log::{ExchangeLogger, ExchangeSink, TracingSink};
use crate::minify::MinifyOptions;
use crate::settings::LogSettings;
use super::{Filter, FilterChain, FilterConfig, FilterError, FilterType, Handler, LoggingFilter, MinifyFilter};

/// 설정으로부터 필터 체인을 구성합니다.
#[derive(Clone)]
pub struct FilterManager {
    verbose: bool,
    sink: Arc<dyn ExchangeSink>,
}

impl FilterManager {
    pub fn new(log_settings: &LogSettings) -> Self {
        Self {
            verbose: log_settings.verbose,
            sink: Arc::new(TracingSink),
        }
    }

    /// 교환 기록을 받을 sink 를 바꿉니다.
    pub fn with_sink(mut self, sink: Arc<dyn ExchangeSink>) -> Self {
        self.sink = sink;
        self
    }

    /// 필터 설정으로부터 필터 인스턴스를 생성합니다.
    pub fn create_filter(&self, config: &FilterConfig) -> Result<Arc<dyn Filter>, FilterError> {
        debug!("필터 생성 시작: type={:?}, settings={:?}", config.filter_type, config.settings);

        match config.filter_type {
            FilterType::Logging => {
                let logger = ExchangeLogger::new(self.verbose, self.sink.clone());
                Ok(Arc::new(LoggingFilter::new(logger)))
            }
            FilterType::RequestLogging => {
                let logger = ExchangeLogger::new(self.verbose, self.sink.clone()).with_body(true);
                Ok(Arc::new(LoggingFilter::new(logger)))
            }
            FilterType::Minify => {
                let options: MinifyOptions = serde_json::from_value(
                    serde_json::to_value(&config.settings)?
                )?;
                Ok(Arc::new(MinifyFilter::new(options)?))
            }
        }
    }

    /// 활성화된 필터를 `order` 순으로 체인에 추가합니다.
    ///
    /// 생성에 실패한 필터는 에러를 남기고 건너뜁니다.
    pub fn build_chain(&self, configs: &HashMap<String, FilterConfig>, handler: Arc<dyn Handler>) -> FilterChain {
        let mut chain = FilterChain::new(handler);

        // 정렬을 위해 Vec으로 변환
        let mut ordered_configs: Vec<_> = configs.iter()
            .filter(|(_, config)| config.enabled)
            .collect();
        ordered_configs.sort_by(|(a_name, a), (b_name, b)| a.order.cmp(&b.order).then_with(|| a_name.cmp(b_name)));

        for (name, config) in ordered_configs {
            match self.create_filter(config) {
                Ok(filter) => {
                    debug!(name = %name, filter = filter.name(), order = config.order, "필터 추가");
                    chain.add_shared(filter);
                }
                Err(e) => {
                    error!(name = %name, error = %e, "필터 생성 실패");
                    continue;
                }
            }
        }

        chain
    }
}
