//! 캡처 추출기.
//!
//! 발동 시 전체 해상도 프레임에서 매핑된 영역을 잘라 WebP로 인코딩한다.
//! 분석용 다운샘플 버퍼가 아니라 원본 스냅샷을 사용한다.

use image::{DynamicImage, GenericImageView};
use pagesnap_core::error::CoreError;
use pagesnap_core::models::frame::{CaptureArtifact, FrameMetadata, PixelRegion};
use tracing::debug;

/// 캡처 추출 포트 — 테스트에서 실패 주입 가능하도록 trait 분리
pub trait FrameExtractor {
    /// 프레임에서 영역을 잘라 인코딩된 산출물 생성
    ///
    /// 실패는 명시적 에러 값으로 보고된다. 호출자(세션)는 실패 시에도
    /// 게이트를 `Evaluating`으로 복귀시켜 재시도를 허용해야 한다.
    fn extract(
        &self,
        frame: &DynamicImage,
        region: &PixelRegion,
        metadata: FrameMetadata,
    ) -> Result<CaptureArtifact, CoreError>;
}

/// WebP 손실 인코딩 추출기 (기본 구현)
#[derive(Debug, Clone, Copy)]
pub struct WebpExtractor {
    /// WebP 품질 (0 ~ 100)
    quality: f32,
}

impl WebpExtractor {
    pub fn new(quality: f32) -> Self {
        Self { quality }
    }
}

impl FrameExtractor for WebpExtractor {
    fn extract(
        &self,
        frame: &DynamicImage,
        region: &PixelRegion,
        metadata: FrameMetadata,
    ) -> Result<CaptureArtifact, CoreError> {
        let (frame_w, frame_h) = frame.dimensions();
        if frame_w == 0 || frame_h == 0 {
            return Err(CoreError::Encode("프레임 크기 0".to_string()));
        }
        if !region.fits_within(frame_w, frame_h) {
            return Err(CoreError::Encode(format!(
                "영역이 프레임 경계를 벗어남: {:?} in {}x{}",
                region, frame_w, frame_h
            )));
        }

        let crop = frame
            .crop_imm(region.x, region.y, region.w, region.h)
            .to_rgba8();
        let encoder = webp::Encoder::from_rgba(&crop, region.w, region.h);
        let data = encoder.encode(self.quality).to_vec();
        if data.is_empty() {
            return Err(CoreError::Encode("WebP 인코딩 결과 비어 있음".to_string()));
        }

        debug!(
            "캡처 추출: {:?} → {} bytes (품질 {})",
            region,
            data.len(),
            self.quality
        );

        Ok(CaptureArtifact {
            data,
            format: "webp".to_string(),
            region: *region,
            metadata,
        })
    }
}
