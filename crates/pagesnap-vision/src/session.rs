//! 캡처 세션 오케스트레이터.
//!
//! 틱마다 기하 매핑 → 샘플링 → 메트릭 → 게이트 판정 → (발동 시) 추출을
//! 순서대로 실행한다. 세션이 모든 가변 상태(게이트, 직전 휘도 버퍼,
//! 시작 시각)를 소유하며, 세션 드랍이 곧 상태 폐기다.

use chrono::{DateTime, Utc};
use image::{DynamicImage, GenericImageView};
use pagesnap_core::config::AppConfig;
use pagesnap_core::error::CoreError;
use pagesnap_core::models::frame::{CaptureArtifact, FrameMetadata};
use pagesnap_core::models::metrics::{FailReason, MetricSet};
use pagesnap_core::ports::vision::GuideRegionProvider;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::analysis;
use crate::extractor::{FrameExtractor, WebpExtractor};
use crate::gate::{CaptureGate, GateAction};
use crate::geometry;
use crate::sampler::{self, LumaBuffer};

/// 프레임 소스 포트 — 비디오 스트림이 구현
///
/// `Ok(None)` 또는 0 치수는 스트림 워밍업 중을 의미하며 해당 틱은
/// 스킵된다. `Err`는 소스 장애(권한 거부, 스트림 끊김 등)로, 세션을
/// 종료해야 하는 치명 조건이다.
pub trait FrameSource {
    /// 현재 전체 해상도 프레임 반환
    fn current_frame(&mut self) -> Result<Option<&DynamicImage>, CoreError>;
}

/// 한 틱의 처리 결과
#[derive(Debug)]
pub enum TickStatus {
    /// 입력 미준비 (소스/가이드/기하 매핑 불가) — 카운터 변화 없음
    Skipped,
    /// 메트릭 불합격 — 카운터 리셋
    Rejected,
    /// 전 검사 합격, 연속 카운터 누적 중
    Accumulating(u32),
    /// 캡처 발동, 산출물 생성
    Captured(Box<CaptureArtifact>),
    /// 추출 진행 중이라 판정 억제됨
    InFlight,
    /// 1회 캡처 세션 완료 — 더 이상 처리 없음
    Finished,
}

/// 한 틱의 보고서 — 상태 + 사용자 피드백용 메트릭/사유
#[derive(Debug)]
pub struct TickReport {
    pub status: TickStatus,
    /// 이 틱에서 계산된 메트릭 (스킵 틱은 `None`)
    pub metrics: Option<MetricSet>,
    /// 불합격 사유 (결정적 순서, 합격/스킵이면 빈 벡터)
    pub reasons: Vec<FailReason>,
}

impl TickReport {
    fn skipped() -> Self {
        Self {
            status: TickStatus::Skipped,
            metrics: None,
            reasons: Vec::new(),
        }
    }
}

/// 캡처 세션 — 비디오 세션 1개당 1개 생성
pub struct CaptureSession {
    id: Uuid,
    config: AppConfig,
    gate: CaptureGate,
    extractor: Box<dyn FrameExtractor>,
    /// 직전 틱의 휘도 버퍼 — 움직임 계산용, 틱 종료 시 소유권 이전
    prev_luma: Option<LumaBuffer>,
    started_at: DateTime<Utc>,
    capture_count: u32,
    finished: bool,
}

impl CaptureSession {
    /// 새 세션 시작 (WebP 추출기 사용)
    ///
    /// 설정 검증에 실패하면 세션을 만들지 않는다.
    pub fn start(config: AppConfig, now: DateTime<Utc>) -> Result<Self, CoreError> {
        let extractor = Box::new(WebpExtractor::new(config.capture.webp_quality));
        Self::with_extractor(config, extractor, now)
    }

    /// 추출기를 주입하여 세션 시작
    pub fn with_extractor(
        config: AppConfig,
        extractor: Box<dyn FrameExtractor>,
        now: DateTime<Utc>,
    ) -> Result<Self, CoreError> {
        config.validate()?;
        let id = Uuid::new_v4();
        info!("캡처 세션 시작: {id}");
        Ok(Self {
            id,
            gate: CaptureGate::new(config.gate.clone()),
            config,
            extractor,
            prev_luma: None,
            started_at: now,
            capture_count: 0,
            finished: false,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// 지금까지 생성된 캡처 수
    pub fn capture_count(&self) -> u32 {
        self.capture_count
    }

    /// 1회 캡처 세션이 완료되었는지
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn gate(&self) -> &CaptureGate {
        &self.gate
    }

    /// 한 틱 실행 — 전체 파이프라인
    ///
    /// 반환 에러 중 치명(`is_fatal`)은 `SourceUnavailable`뿐이다. 추출
    /// 실패(`Encode`)는 게이트가 이미 `Evaluating`으로 복귀한 뒤
    /// 보고되므로 세션은 계속 진행해 재시도할 수 있다.
    pub fn tick(
        &mut self,
        source: &mut dyn FrameSource,
        guide_provider: &dyn GuideRegionProvider,
        now: DateTime<Utc>,
    ) -> Result<TickReport, CoreError> {
        if self.finished {
            return Ok(TickReport {
                status: TickStatus::Finished,
                metrics: None,
                reasons: Vec::new(),
            });
        }

        // 입력 미준비는 에러가 아니다 — 카운터를 건드리지 않고 스킵
        let Some(frame) = source.current_frame()? else {
            return Ok(TickReport::skipped());
        };
        let (frame_w, frame_h) = frame.dimensions();
        if frame_w == 0 || frame_h == 0 {
            return Ok(TickReport::skipped());
        }
        let Some(guide) = guide_provider.guide_region() else {
            return Ok(TickReport::skipped());
        };
        let Some(region) = geometry::map_guide_to_frame(&guide, frame_w, frame_h) else {
            return Ok(TickReport::skipped());
        };

        let luma = sampler::sample_region(frame, &region, self.config.capture.analysis_width)?;
        let elapsed = (now - self.started_at).num_milliseconds() as f64 / 1000.0;
        let metrics = analysis::evaluate(
            &luma,
            self.prev_luma.as_ref(),
            &region,
            self.gate.config(),
            elapsed,
        );

        let action = self.gate.update(&metrics);
        // 틱 종료 시점의 소유권 이전: 현재 버퍼가 다음 틱의 "직전" 버퍼가 된다
        self.prev_luma = Some(luma);

        match action {
            GateAction::Reject { reasons } => {
                debug!("게이트 불합격: {:?}", reasons);
                Ok(TickReport {
                    status: TickStatus::Rejected,
                    metrics: Some(metrics),
                    reasons,
                })
            }
            GateAction::Accumulate { count } => Ok(TickReport {
                status: TickStatus::Accumulating(count),
                metrics: Some(metrics),
                reasons: Vec::new(),
            }),
            GateAction::InFlight => Ok(TickReport {
                status: TickStatus::InFlight,
                metrics: Some(metrics),
                reasons: Vec::new(),
            }),
            GateAction::Trigger => {
                self.gate.begin_capture();
                let metadata = FrameMetadata {
                    capture_id: Uuid::new_v4(),
                    session_id: self.id,
                    timestamp: now,
                    resolution: (frame_w, frame_h),
                };
                let result = self.extractor.extract(frame, &region, metadata);
                // 성공/실패와 무관하게 게이트 복구 — 실패해도 세션은 재시도 가능
                self.gate.finish_capture();

                match result {
                    Ok(artifact) => {
                        self.capture_count += 1;
                        info!(
                            "캡처 완료: 세션 {} ({}번째, {} bytes)",
                            self.id,
                            self.capture_count,
                            artifact.data.len()
                        );
                        if !self.config.capture.repeat_capture {
                            self.finished = true;
                        }
                        Ok(TickReport {
                            status: TickStatus::Captured(Box::new(artifact)),
                            metrics: Some(metrics),
                            reasons: Vec::new(),
                        })
                    }
                    Err(e) => {
                        warn!("캡처 추출 실패 (세션 유지): {e}");
                        Err(e)
                    }
                }
            }
        }
    }
}
