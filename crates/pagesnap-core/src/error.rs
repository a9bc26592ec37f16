//! PAGESNAP 핵심 에러 타입.
//!
//! 입력 미준비(가이드/소스 치수 미확정)와 메트릭 실패는 에러가 아니다 —
//! 틱 스킵 또는 진단 사유로 처리한다. 여기서는 설정/추출/소스 장애 등
//! 실제로 호출자에게 보고해야 하는 조건만 정의한다.

use thiserror::Error;

/// 코어 레이어 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// JSON 직렬화/역직렬화 실패
    #[error("직렬화 에러: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 설정값 오류
    #[error("설정 에러: {0}")]
    Config(String),

    /// 필드 유효성 검증 실패
    #[error("유효성 검증 실패 — {field}: {message}")]
    Validation {
        /// 검증 실패한 필드명
        field: String,
        /// 실패 사유
        message: String,
    },

    /// 캡처 추출(크롭/인코딩) 실패 — 세션은 계속 진행 가능 (비치명)
    #[error("캡처 추출 실패: {0}")]
    Encode(String),

    /// 비디오 소스 획득 실패/끊김 — 세션 종료가 필요한 치명 조건
    #[error("비디오 소스 사용 불가: {0}")]
    SourceUnavailable(String),

    /// I/O 에러
    #[error("I/O 에러: {0}")]
    Io(#[from] std::io::Error),

    /// 내부 에러 (예상치 못한 상황)
    #[error("내부 에러: {0}")]
    Internal(String),
}

impl CoreError {
    /// 세션을 종료해야 하는 에러인지 여부.
    ///
    /// `SourceUnavailable`만 치명 — 추출 실패는 재시도 가능하다.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CoreError::SourceUnavailable(_))
    }
}
