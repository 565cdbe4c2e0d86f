use std::fmt::Write as _;
use std::io::Write as _;
use std::sync::Arc;
use async_trait::async_trait;
use hyper::{Method, StatusCode};
use tracing::{error, info};
use web_filters::filter::{FilterError, FilterManager, Handler};
use web_filters::logging::init_logging;
use web_filters::request::InterceptedRequest;
use web_filters::response::HttpResponse;
use web_filters::server::FilterServer;
use web_filters::settings::Settings;

const PIXEL_PNG: [u8; 67] = [
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4,
    0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE,
    0x42, 0x60, 0x82,
];

/// 필터 체인 동작을 확인하기 위한 간단한 페이지들
struct DemoPages;

impl DemoPages {
    fn write_html(res: &mut dyn HttpResponse, body: &str) -> Result<(), FilterError> {
        res.set_content_type("text/html; charset=utf-8")?;
        let mut writer = res.writer()?;
        write!(
            writer,
            "<!DOCTYPE html>\n<html>\n  <head>\n    <title>web_filters</title>\n  </head>\n  <body>\n    {}\n  </body>\n</html>\n",
            body
        )
        .map_err(|e| FilterError::Handler(e.to_string()))
    }
}

#[async_trait]
impl Handler for DemoPages {
    async fn handle(&self, req: &InterceptedRequest, res: &mut dyn HttpResponse) -> Result<(), FilterError> {
        match (req.method(), req.path()) {
            (&Method::GET, "/") => Self::write_html(
                res,
                "<form method=\"post\" action=\"/submit\">\n      <input name=\"name\">\n      <input name=\"age\">\n      <button>전송</button>\n    </form>",
            ),
            (&Method::POST, "/submit") => {
                let name = req.parameter("name").unwrap_or("이름 없음");
                let age = req.parameter("age").unwrap_or("-");
                Self::write_html(res, &format!("<p>  {} ({})  </p>", name, age))
            }
            (&Method::GET, "/status") => {
                res.set_content_type("application/json")?;
                res.writer()?.push_str("{\n  \"status\": \"ok\"\n}\n");
                Ok(())
            }
            (&Method::GET, "/pixel.png") => {
                res.set_content_type("image/png")?;
                res.output_stream()?.write_all(&PIXEL_PNG)?;
                Ok(())
            }
            _ => {
                res.set_status(StatusCode::NOT_FOUND);
                res.set_content_type("text/plain; charset=utf-8")?;
                res.writer()?.push_str("Not Found");
                Ok(())
            }
        }
    }
}

#[tokio::main]
async fn main() {
    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("설정 로드 실패: {}", e);
            std::process::exit(1);
        }
    };

    let _guard = init_logging(&settings.logging);

    let manager = FilterManager::new(&settings.logging);
    let chain = manager.build_chain(&settings.effective_filters(), Arc::new(DemoPages));
    info!(filters = ?chain.filter_names(), verbose = settings.logging.verbose, "필터 체인 구성 완료");

    let server = match FilterServer::bind(&settings.server, chain).await {
        Ok(server) => server,
        Err(e) => {
            error!(error = %e, "서버 시작 실패");
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run().await {
        error!(error = %e, "서버 실행 중 오류");
    }
}
