//! 게이트 진단.
//!
//! 실패한 검사 항목을 사용자 피드백용 사유 목록으로 투영한다. 판정에는
//! 어떤 영향도 주지 않는 읽기 전용 뷰이며, 출력 순서는 항상 동일하다.

use pagesnap_core::config::GateConfig;
use pagesnap_core::models::metrics::{FailReason, MetricSet};

/// 메트릭 집합에서 불합격 사유 도출 (결정적 순서)
///
/// 빈 벡터면 모든 검사 통과.
pub fn failure_reasons(metrics: &MetricSet, config: &GateConfig) -> Vec<FailReason> {
    let mut reasons = Vec::new();
    if metrics.sharpness < config.sharpness_min {
        reasons.push(FailReason::OutOfFocus);
    }
    if metrics.fill_ratio < config.fill_min {
        reasons.push(FailReason::TooDark);
    }
    if metrics.motion > config.motion_max {
        reasons.push(FailReason::MotionDetected);
    }
    if metrics.edge.min() < config.edge_ratio_min {
        reasons.push(FailReason::EdgesNotDetected);
    }
    if !metrics.aspect_ok {
        reasons.push(FailReason::AspectMismatch);
    }
    if !metrics.elapsed_ok {
        reasons.push(FailReason::Stabilizing);
    }
    reasons
}
