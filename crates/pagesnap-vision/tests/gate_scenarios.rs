//! 세션 단위 종단 시나리오.
//!
//! 합성 프레임(체커보드/균일 회색)으로 전체 파이프라인을 돌려 디바운스,
//! 워밍업, 추출 실패 복구, 반복 캡처 동작을 검증한다. 분석 버퍼 너비를
//! 영역 너비와 같게 맞춰 리샘플링 없이 결정적인 휘도 값을 얻는다.

use std::cell::Cell;

use assert_matches::assert_matches;
use chrono::{DateTime, Duration, Utc};
use image::{DynamicImage, RgbaImage};
use pagesnap_core::config::{AppConfig, CaptureConfig, EdgeThreshold, GateConfig};
use pagesnap_core::error::CoreError;
use pagesnap_core::models::frame::{CaptureArtifact, FrameMetadata, GuideRegion, PixelRegion};
use pagesnap_core::ports::vision::{FixedGuide, GuideRegionProvider};
use pagesnap_vision::{
    CaptureSession, FrameExtractor, FrameSource, TickStatus, WebpExtractor,
};

const W: u32 = 640;
const H: u32 = 480;

/// 교체 가능한 프레임 소스
struct StubSource {
    frame: Option<DynamicImage>,
}

impl StubSource {
    fn new(frame: DynamicImage) -> Self {
        Self { frame: Some(frame) }
    }
}

impl FrameSource for StubSource {
    fn current_frame(&mut self) -> Result<Option<&DynamicImage>, CoreError> {
        Ok(self.frame.as_ref())
    }
}

/// 틱 사이에 가이드를 끌 수 있는 공급자
struct SwitchableGuide {
    region: Cell<Option<GuideRegion>>,
}

impl GuideRegionProvider for SwitchableGuide {
    fn guide_region(&self) -> Option<GuideRegion> {
        self.region.get()
    }
}

/// 처음 `failures_left`번 실패한 뒤 실제 WebP 추출로 위임
struct FlakyExtractor {
    inner: WebpExtractor,
    failures_left: Cell<u32>,
}

impl FrameExtractor for FlakyExtractor {
    fn extract(
        &self,
        frame: &DynamicImage,
        region: &PixelRegion,
        metadata: FrameMetadata,
    ) -> Result<CaptureArtifact, CoreError> {
        if self.failures_left.get() > 0 {
            self.failures_left.set(self.failures_left.get() - 1);
            return Err(CoreError::Encode("주입된 인코딩 실패".to_string()));
        }
        self.inner.extract(frame, region, metadata)
    }
}

/// 타일 8 흑백 체커보드 — 선명도/에지/밝기 전부 합격하는 프레임
fn checker_frame() -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_fn(W, H, |x, y| {
        if ((x / 8) + (y / 8)) % 2 == 0 {
            image::Rgba([255, 255, 255, 255])
        } else {
            image::Rgba([0, 0, 0, 255])
        }
    }))
}

/// 균일 회색 — 선명도 0, 에지 없음으로 불합격하는 프레임
fn gray_frame() -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        W,
        H,
        image::Rgba([128, 128, 128, 255]),
    ))
}

fn full_guide() -> FixedGuide {
    FixedGuide(GuideRegion {
        x: 0.0,
        y: 0.0,
        w: f64::from(W),
        h: f64::from(H),
        container_w: f64::from(W),
        container_h: f64::from(H),
    })
}

/// 체커보드 프레임이 모든 검사를 통과하는 설정
///
/// `motion_max` 255는 센티널도 통과시켜 움직임 게이트를 사실상 끈다.
fn scenario_config(consecutive: u32, motion_max: f64, min_elapsed: f64) -> AppConfig {
    AppConfig {
        gate: GateConfig {
            consecutive_frames_required: consecutive,
            sharpness_min: 30.0,
            fill_min: 0.1,
            motion_max,
            edge_band_fraction: 0.12,
            edge_ratio_min: 0.1,
            min_elapsed_seconds: min_elapsed,
            aspect_target: 4.0 / 3.0,
            aspect_tolerance: 0.05,
            edge_threshold: EdgeThreshold::MaxFraction { fraction: 0.25 },
        },
        capture: CaptureConfig {
            analysis_width: W,
            webp_quality: 90.0,
            repeat_capture: false,
        },
    }
}

fn start(config: AppConfig) -> (CaptureSession, DateTime<Utc>) {
    let t0 = Utc::now();
    let session = CaptureSession::start(config, t0).unwrap();
    (session, t0)
}

#[test]
fn one_shot_capture_after_consecutive_passes() {
    // 움직임 게이트 활성: 첫 분석 프레임은 센티널 때문에 항상 불합격
    let (mut session, t0) = start(scenario_config(3, 10.0, 0.0));
    let mut source = StubSource::new(checker_frame());
    let guide = full_guide();

    let prime = session.tick(&mut source, &guide, t0).unwrap();
    assert_matches!(prime.status, TickStatus::Rejected);
    assert!(prime
        .reasons
        .contains(&pagesnap_core::models::metrics::FailReason::MotionDetected));

    // 동일 프레임 반복: 움직임 0, 연속 합격 누적
    let r = session.tick(&mut source, &guide, t0).unwrap();
    assert_matches!(r.status, TickStatus::Accumulating(1));
    let r = session.tick(&mut source, &guide, t0).unwrap();
    assert_matches!(r.status, TickStatus::Accumulating(2));

    let r = session.tick(&mut source, &guide, t0).unwrap();
    let TickStatus::Captured(artifact) = r.status else {
        panic!("캡처 미발동: {:?}", r.status);
    };
    assert_eq!(artifact.format, "webp");
    assert_eq!(&artifact.data[0..4], b"RIFF");
    assert_eq!(
        artifact.region,
        PixelRegion {
            x: 0,
            y: 0,
            w: W,
            h: H
        }
    );
    assert_eq!(artifact.metadata.session_id, session.id());
    assert_eq!(artifact.metadata.resolution, (W, H));

    // 1회 캡처 세션: 이후 틱은 전부 종료 상태
    assert_eq!(session.capture_count(), 1);
    assert!(session.is_finished());
    let r = session.tick(&mut source, &guide, t0).unwrap();
    assert_matches!(r.status, TickStatus::Finished);
}

#[test]
fn failed_frame_resets_consecutive_counter() {
    let (mut session, t0) = start(scenario_config(3, 255.0, 0.0));
    let mut source = StubSource::new(checker_frame());
    let guide = full_guide();

    // 움직임 게이트 꺼짐: 첫 틱부터 누적 시작
    assert_matches!(
        session.tick(&mut source, &guide, t0).unwrap().status,
        TickStatus::Accumulating(1)
    );
    assert_matches!(
        session.tick(&mut source, &guide, t0).unwrap().status,
        TickStatus::Accumulating(2)
    );

    // 2회 합격 뒤 흐린 프레임 1장 — 카운터는 0으로
    source.frame = Some(gray_frame());
    let r = session.tick(&mut source, &guide, t0).unwrap();
    assert_matches!(r.status, TickStatus::Rejected);
    assert_eq!(session.gate().consecutive_pass(), 0);

    // 다시 처음부터 3회 필요
    source.frame = Some(checker_frame());
    assert_matches!(
        session.tick(&mut source, &guide, t0).unwrap().status,
        TickStatus::Accumulating(1)
    );
    assert_matches!(
        session.tick(&mut source, &guide, t0).unwrap().status,
        TickStatus::Accumulating(2)
    );
    assert_matches!(
        session.tick(&mut source, &guide, t0).unwrap().status,
        TickStatus::Captured(_)
    );
    assert_eq!(session.capture_count(), 1);
}

#[test]
fn no_capture_before_minimum_elapsed_time() {
    let (mut session, t0) = start(scenario_config(3, 255.0, 5.0));
    let mut source = StubSource::new(checker_frame());
    let guide = full_guide();

    // 5초 전에는 프레임 품질이 완벽해도 전부 안정화 대기
    for s in 0..5 {
        let now = t0 + Duration::seconds(s);
        let r = session.tick(&mut source, &guide, now).unwrap();
        assert_matches!(r.status, TickStatus::Rejected);
        assert!(r
            .reasons
            .contains(&pagesnap_core::models::metrics::FailReason::Stabilizing));
        assert_eq!(session.gate().consecutive_pass(), 0);
    }
    assert_eq!(session.capture_count(), 0);

    // 경과 게이트 충족 후 연속 3회
    assert_matches!(
        session
            .tick(&mut source, &guide, t0 + Duration::seconds(5))
            .unwrap()
            .status,
        TickStatus::Accumulating(1)
    );
    assert_matches!(
        session
            .tick(&mut source, &guide, t0 + Duration::seconds(6))
            .unwrap()
            .status,
        TickStatus::Accumulating(2)
    );
    assert_matches!(
        session
            .tick(&mut source, &guide, t0 + Duration::seconds(7))
            .unwrap()
            .status,
        TickStatus::Captured(_)
    );
}

#[test]
fn skipped_tick_preserves_counter() {
    let (mut session, t0) = start(scenario_config(3, 255.0, 0.0));
    let mut source = StubSource::new(checker_frame());
    let guide = SwitchableGuide {
        region: Cell::new(full_guide().guide_region()),
    };

    session.tick(&mut source, &guide, t0).unwrap();
    session.tick(&mut source, &guide, t0).unwrap();
    assert_eq!(session.gate().consecutive_pass(), 2);

    // 가이드 레이아웃 일시 소실 — 스킵이지 리셋이 아니다
    guide.region.set(None);
    let r = session.tick(&mut source, &guide, t0).unwrap();
    assert_matches!(r.status, TickStatus::Skipped);
    assert_eq!(session.gate().consecutive_pass(), 2);

    guide.region.set(full_guide().guide_region());
    assert_matches!(
        session.tick(&mut source, &guide, t0).unwrap().status,
        TickStatus::Captured(_)
    );
}

#[test]
fn extraction_failure_recovers_and_retries() {
    let config = scenario_config(1, 255.0, 0.0);
    let t0 = Utc::now();
    let extractor = FlakyExtractor {
        inner: WebpExtractor::new(90.0),
        failures_left: Cell::new(1),
    };
    let mut session = CaptureSession::with_extractor(config, Box::new(extractor), t0).unwrap();
    let mut source = StubSource::new(checker_frame());
    let guide = full_guide();

    // 첫 발동은 추출 실패 — 정확히 1회 에러로 보고, 치명 아님
    let err = session.tick(&mut source, &guide, t0).unwrap_err();
    assert_matches!(err, CoreError::Encode(_));
    assert!(!err.is_fatal());
    assert_eq!(session.capture_count(), 0);
    assert!(!session.is_finished());
    assert_eq!(session.gate().consecutive_pass(), 0);

    // 세션은 살아 있고 다음 발동은 성공
    let r = session.tick(&mut source, &guide, t0).unwrap();
    assert_matches!(r.status, TickStatus::Captured(_));
    assert_eq!(session.capture_count(), 1);
}

#[test]
fn repeat_capture_produces_multiple_artifacts() {
    let mut config = scenario_config(1, 255.0, 0.0);
    config.capture.repeat_capture = true;
    let (mut session, t0) = start(config);
    let mut source = StubSource::new(checker_frame());
    let guide = full_guide();

    assert_matches!(
        session.tick(&mut source, &guide, t0).unwrap().status,
        TickStatus::Captured(_)
    );
    assert_matches!(
        session.tick(&mut source, &guide, t0).unwrap().status,
        TickStatus::Captured(_)
    );
    assert_eq!(session.capture_count(), 2);
    assert!(!session.is_finished());
}
