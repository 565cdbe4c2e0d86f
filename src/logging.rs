use std::ffi::OsStr;
use std::path::Path;
use time::format_description::well_known::Rfc3339;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt::time::UtcTime, EnvFilter};
use crate::settings::{LogFormat, LogOutput, LogSettings};

const DEFAULT_LOG_FILE: &str = "web_filters.log";

/// 전역 subscriber 를 설치합니다.
///
/// 반환된 guard 는 프로그램이 끝날 때까지 들고 있어야 버퍼링된 로그가 모두 기록됩니다.
/// `RUST_LOG` 지시어가 있으면 설정된 레벨보다 우선합니다.
pub fn init_logging(settings: &LogSettings) -> WorkerGuard {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(settings.level).into())
        .from_env_lossy();

    let (writer, guard) = match &settings.output {
        LogOutput::Stdout => tracing_appender::non_blocking(std::io::stdout()),
        LogOutput::File(path) => {
            let path = Path::new(path);
            let directory = path
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path.file_name().unwrap_or_else(|| OsStr::new(DEFAULT_LOG_FILE));
            tracing_appender::non_blocking(tracing_appender::rolling::never(directory, file_name))
        }
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::new(Rfc3339))
        .with_writer(writer)
        .with_target(true)
        .with_thread_ids(true);

    let result = match settings.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if let Err(e) = result {
        eprintln!("로깅 초기화 실패: {}", e);
    }

    guard
}
