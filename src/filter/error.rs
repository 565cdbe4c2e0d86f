use crate::minify::MinifyError;
use crate::response::WriteSurface;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error("요청 본문 읽기 실패: {0}")]
    BodyRead(#[source] BoxError),

    #[error("알 수 없는 문자 인코딩: {0}")]
    Encoding(String),

    #[error("응답 변환 실패: {0}")]
    Transform(#[from] MinifyError),

    #[error("응답 출력 방식 혼용: {requested} 요청, 이미 {active} 사용 중")]
    WriteSurfaceMisuse {
        requested: WriteSurface,
        active: WriteSurface,
    },

    #[error("이미 해제된 응답 캡처에 접근했습니다")]
    CaptureReleased,

    #[error("핸들러 처리 오류: {0}")]
    Handler(String),

    #[error("설정 오류: {0}")]
    Config(String),

    #[error("설정 파싱 오류: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
