//! 프레임 품질 메트릭 모델.
//!
//! 매 틱 새로 계산되어 교체되는 불변 값 객체. 게이트 판정과 진단 표시가
//! 모두 이 구조체를 읽는다.

use serde::{Deserialize, Serialize};

/// 4개 경계 밴드의 에지 픽셀 비율 (각 0.0 ~ 1.0)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeRatios {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl EdgeRatios {
    /// 네 밴드 중 최소 비율
    pub fn min(&self) -> f64 {
        self.top.min(self.bottom).min(self.left).min(self.right)
    }
}

/// 한 틱의 품질 메트릭 집합
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSet {
    /// 선명도 (라플라시안 응답의 모분산)
    pub sharpness: f64,
    /// 밝기 충족 비율 (0.0 ~ 1.0)
    pub fill_ratio: f64,
    /// 경계 밴드 에지 비율
    pub edge: EdgeRatios,
    /// 프레임 간 움직임 (평균 절대 휘도차, 첫 프레임은 센티널 255)
    pub motion: f64,
    /// 영역 비율이 기대 문서 비율 범위 내인지
    pub aspect_ok: bool,
    /// 세션 시작 후 최소 경과 시간 충족 여부
    pub elapsed_ok: bool,
}

/// 게이트 불합격 사유 — 사용자 피드백/진단용
///
/// variant 순서가 곧 보고 순서다 (결정적 출력).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailReason {
    /// 선명도 미달 (초점 안 맞음)
    OutOfFocus,
    /// 밝기 충족 비율 미달 (어두움/가림)
    TooDark,
    /// 프레임 간 움직임 과다
    MotionDetected,
    /// 문서 가장자리가 가이드 경계에서 감지되지 않음
    EdgesNotDetected,
    /// 영역 비율이 기대 문서 비율을 벗어남
    AspectMismatch,
    /// 세션 시작 직후 안정화 대기 중
    Stabilizing,
}

impl std::fmt::Display for FailReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            FailReason::OutOfFocus => "초점이 맞지 않음",
            FailReason::TooDark => "화면이 너무 어두움",
            FailReason::MotionDetected => "움직임이 감지됨",
            FailReason::EdgesNotDetected => "문서 가장자리가 보이지 않음",
            FailReason::AspectMismatch => "문서 비율이 맞지 않음",
            FailReason::Stabilizing => "카메라 안정화 중",
        };
        f.write_str(message)
    }
}
