//! 캡처 판정 상태 머신.
//!
//! 매 틱의 메트릭을 임계값과 비교해 연속 합격 카운터를 유지하고, 요구
//! 횟수에 도달하면 캡처를 발동한다. 디바운스는 오직 연속 프레임 요구로만
//! 달성한다 — 불합격 한 번이면 카운터는 즉시 0으로 돌아간다.

use pagesnap_core::config::GateConfig;
use pagesnap_core::models::metrics::{FailReason, MetricSet};
use tracing::debug;

use crate::diagnostics;

/// 게이트 국면
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatePhase {
    /// 세션 시작 직후, 경과 시간 게이트 미충족
    Warming,
    /// 정상 프레임별 판정 중
    Evaluating,
    /// 캡처 추출 진행 중 — 새 발동 억제
    Capturing,
}

/// 한 틱의 게이트 판정 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateAction {
    /// 하나 이상의 검사 실패 — 카운터 리셋됨
    Reject {
        /// 실패 사유 (결정적 순서)
        reasons: Vec<FailReason>,
    },
    /// 전 검사 합격, 연속 카운터 증가
    Accumulate {
        /// 현재 연속 합격 수
        count: u32,
    },
    /// 연속 합격 요구 충족 — 캡처 발동
    Trigger,
    /// 캡처 추출 진행 중 — 판정 억제 (카운터 변화 없음)
    InFlight,
}

/// 캡처 게이트 — 연속 합격 카운터 + 국면 머신
#[derive(Debug)]
pub struct CaptureGate {
    config: GateConfig,
    phase: GatePhase,
    consecutive_pass: u32,
}

impl CaptureGate {
    /// 새 게이트 생성 (`Warming` 국면에서 시작)
    pub fn new(config: GateConfig) -> Self {
        Self {
            config,
            phase: GatePhase::Warming,
            consecutive_pass: 0,
        }
    }

    pub fn phase(&self) -> GatePhase {
        self.phase
    }

    /// 현재 연속 합격 수
    pub fn consecutive_pass(&self) -> u32 {
        self.consecutive_pass
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// 한 틱의 메트릭으로 게이트 전진
    ///
    /// 기하 매핑이 실패해 메트릭 자체가 없는 틱은 이 메서드를 호출하지
    /// 않아야 한다 — 그런 틱은 카운터를 전진도 리셋도 하지 않는다.
    pub fn update(&mut self, metrics: &MetricSet) -> GateAction {
        // 추출 진행 중엔 재발동 금지. 메트릭은 이미 계산되어 사용자
        // 피드백으로 쓰였고, 카운터는 건드리지 않는다.
        if self.phase == GatePhase::Capturing {
            return GateAction::InFlight;
        }

        let reasons = diagnostics::failure_reasons(metrics, &self.config);

        if !metrics.elapsed_ok {
            self.phase = GatePhase::Warming;
            self.consecutive_pass = 0;
            return GateAction::Reject { reasons };
        }
        self.phase = GatePhase::Evaluating;

        if !reasons.is_empty() {
            if self.consecutive_pass > 0 {
                debug!("연속 합격 {}회 후 리셋: {:?}", self.consecutive_pass, reasons);
            }
            self.consecutive_pass = 0;
            return GateAction::Reject { reasons };
        }

        self.consecutive_pass =
            (self.consecutive_pass + 1).min(self.config.consecutive_frames_required);
        if self.consecutive_pass >= self.config.consecutive_frames_required {
            GateAction::Trigger
        } else {
            GateAction::Accumulate {
                count: self.consecutive_pass,
            }
        }
    }

    /// 캡처 추출 시작 표시 — 이후 틱의 발동 억제
    pub fn begin_capture(&mut self) {
        self.phase = GatePhase::Capturing;
    }

    /// 캡처 추출 종료 표시 — 성공/실패와 무관하게 카운터 0, `Evaluating` 복귀
    pub fn finish_capture(&mut self) {
        self.consecutive_pass = 0;
        self.phase = GatePhase::Evaluating;
    }
}
