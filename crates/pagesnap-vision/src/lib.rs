//! PAGESNAP 비전 파이프라인.
//!
//! 뷰파인더 프레임의 품질을 평가해 자동 캡처를 판정하는 모듈 집합이다.
//! 입력은 전체 해상도 프레임과 화면 좌표 가이드 사각형, 출력은 틱별
//! 판정 보고서와 (발동 시) WebP 캡처 산출물이다.
//!
//! - [`geometry`]: 가이드 사각형 → 프레임 픽셀 영역 역변환
//! - [`sampler`]: ROI 다운샘플링 + BT.601 휘도 버퍼
//! - [`analysis`]: 선명도/밝기/에지/움직임 메트릭
//! - [`diagnostics`]: 불합격 사유 투영
//! - [`gate`]: 연속 합격 디바운스 상태 머신
//! - [`extractor`]: 캡처 영역 WebP 인코딩
//! - [`session`]: 위 전부를 묶는 틱 오케스트레이터

pub mod analysis;
pub mod diagnostics;
pub mod extractor;
pub mod gate;
pub mod geometry;
pub mod sampler;
pub mod session;

pub use extractor::{FrameExtractor, WebpExtractor};
pub use gate::{CaptureGate, GateAction, GatePhase};
pub use sampler::LumaBuffer;
pub use session::{CaptureSession, FrameSource, TickReport, TickStatus};
