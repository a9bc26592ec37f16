//! 프레임 영역 샘플러.
//!
//! ROI를 고정 분석 해상도로 다운샘플링한 뒤 BT.601 휘도 버퍼로 변환한다.
//! 분석 해상도를 고정하면 이후 픽셀 단위 패스 비용이 소스 해상도와
//! 무관하게 작은 상수로 묶인다.

use fast_image_resize::{images::Image as FirImage, ResizeAlg, ResizeOptions, Resizer};
use image::{DynamicImage, GenericImageView};
use pagesnap_core::error::CoreError;
use pagesnap_core::models::frame::PixelRegion;
use tracing::debug;

/// 단일 채널(휘도) 분석 버퍼
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LumaBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl LumaBuffer {
    /// 원시 샘플에서 버퍼 생성. 길이가 `width * height`와 다르면 `None`.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        if data.len() != (width as usize) * (height as usize) {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// 휘도 샘플 슬라이스 (행 우선)
    pub fn samples(&self) -> &[u8] {
        &self.data
    }

    /// (x, y) 샘플 값. 경계 검증은 호출자 책임 (분석 루프는 치수를 안다).
    #[inline]
    pub fn at(&self, x: u32, y: u32) -> u8 {
        self.data[(y as usize) * (self.width as usize) + (x as usize)]
    }

    /// 두 버퍼가 같은 치수인지
    pub fn same_dimensions(&self, other: &LumaBuffer) -> bool {
        self.width == other.width && self.height == other.height
    }
}

/// ROI를 `target_width` 폭의 휘도 버퍼로 샘플링
///
/// 높이는 `max(1, round(h · W / w))`로 영역 비율을 보존한다. 리샘플링은
/// bilinear convolution, 휘도 변환은 BT.601 (`0.299R + 0.587G + 0.114B`,
/// u8로 절사).
pub fn sample_region(
    frame: &DynamicImage,
    region: &PixelRegion,
    target_width: u32,
) -> Result<LumaBuffer, CoreError> {
    let (frame_w, frame_h) = frame.dimensions();
    if !region.fits_within(frame_w, frame_h) {
        return Err(CoreError::Internal(format!(
            "영역이 프레임 경계를 벗어남: {:?} in {}x{}",
            region, frame_w, frame_h
        )));
    }
    if target_width == 0 {
        return Err(CoreError::Internal("분석 버퍼 너비 0".to_string()));
    }

    let target_height = ((f64::from(region.h) * f64::from(target_width) / f64::from(region.w))
        .round() as u32)
        .max(1);

    let crop = frame
        .crop_imm(region.x, region.y, region.w, region.h)
        .to_rgba8();

    // 동일 크기면 리사이저 생략 (결정성 + 비용 절약)
    let resized: Vec<u8> = if region.w == target_width && region.h == target_height {
        crop.into_raw()
    } else {
        let src_image = FirImage::from_vec_u8(
            region.w,
            region.h,
            crop.into_raw(),
            fast_image_resize::PixelType::U8x4,
        )
        .map_err(|e| CoreError::Internal(format!("소스 이미지 생성 실패: {e}")))?;

        let mut dst_image = FirImage::new(
            target_width,
            target_height,
            fast_image_resize::PixelType::U8x4,
        );

        let mut resizer = Resizer::new();
        let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(
            fast_image_resize::FilterType::Bilinear,
        ));

        resizer
            .resize(&src_image, &mut dst_image, &options)
            .map_err(|e| CoreError::Internal(format!("리사이즈 실패: {e}")))?;

        dst_image.into_vec()
    };

    // BT.601 휘도 변환, u8 절사
    let mut luma = Vec::with_capacity((target_width as usize) * (target_height as usize));
    for px in resized.chunks_exact(4) {
        let y = 0.299 * f64::from(px[0]) + 0.587 * f64::from(px[1]) + 0.114 * f64::from(px[2]);
        luma.push(y as u8);
    }

    debug!(
        "영역 샘플링: {:?} → {}x{} 휘도 버퍼",
        region, target_width, target_height
    );

    LumaBuffer::from_raw(target_width, target_height, luma)
        .ok_or_else(|| CoreError::Internal("휘도 버퍼 생성 실패".to_string()))
}
