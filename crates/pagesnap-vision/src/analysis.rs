//! 품질 메트릭 엔진.
//!
//! 휘도 버퍼에서 선명도(라플라시안 분산), 밝기 충족 비율, 경계 밴드 에지
//! 비율(Sobel), 프레임 간 움직임을 계산한다. 전부 고전적 픽셀 통계 —
//! 결정적이며 입력 버퍼를 변경하지 않는다.

use pagesnap_core::config::{EdgeThreshold, GateConfig};
use pagesnap_core::models::frame::PixelRegion;
use pagesnap_core::models::metrics::{EdgeRatios, MetricSet};

use crate::sampler::LumaBuffer;

/// 밝기 충족 하한 (0 ~ 255 스케일)
const BRIGHTNESS_FLOOR: u8 = 60;

/// 첫 프레임/치수 변경 시 움직임 센티널 — 안정성 게이트를 절대 통과하지 못하는 값
pub const MOTION_SENTINEL: f64 = 255.0;

/// 한 틱의 전체 메트릭 계산
///
/// `prev_luma`는 직전 틱의 버퍼 — 읽기만 하고 변경하지 않는다.
pub fn evaluate(
    luma: &LumaBuffer,
    prev_luma: Option<&LumaBuffer>,
    region: &PixelRegion,
    config: &GateConfig,
    elapsed_seconds: f64,
) -> MetricSet {
    MetricSet {
        sharpness: sharpness(luma),
        fill_ratio: fill_ratio(luma),
        edge: edge_band_ratios(luma, config.edge_band_fraction, config.edge_threshold),
        motion: motion(luma, prev_luma),
        aspect_ok: (region.aspect_ratio() - config.aspect_target).abs()
            <= config.aspect_tolerance,
        elapsed_ok: elapsed_seconds >= config.min_elapsed_seconds,
    }
}

/// 선명도 — 내부 픽셀 라플라시안 응답의 모분산
///
/// 커널 `[[0,1,0],[1,-4,1],[0,1,0]]`, 1픽셀 경계 제외. 고주파 디테일이
/// 많을수록(초점이 맞을수록) 커진다. `W<=2 || H<=2`면 0.
pub fn sharpness(luma: &LumaBuffer) -> f64 {
    let (w, h) = (luma.width(), luma.height());
    if w <= 2 || h <= 2 {
        return 0.0;
    }

    let n = ((w - 2) as usize) * ((h - 2) as usize);
    let mut responses = Vec::with_capacity(n);
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let center = i32::from(luma.at(x, y));
            let response = i32::from(luma.at(x, y - 1))
                + i32::from(luma.at(x, y + 1))
                + i32::from(luma.at(x - 1, y))
                + i32::from(luma.at(x + 1, y))
                - 4 * center;
            responses.push(f64::from(response));
        }
    }

    let mean = responses.iter().sum::<f64>() / n as f64;
    responses.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n as f64
}

/// 밝기 충족 비율 — 하한(60)을 엄격히 초과하는 샘플의 비율
pub fn fill_ratio(luma: &LumaBuffer) -> f64 {
    let samples = luma.samples();
    if samples.is_empty() {
        return 0.0;
    }
    let lit = samples.iter().filter(|&&s| s > BRIGHTNESS_FLOOR).count();
    lit as f64 / samples.len() as f64
}

/// 프레임 간 움직임 — 평균 절대 휘도차
///
/// 직전 버퍼가 없거나 치수가 다르면 센티널(255) — 세션 첫 분석 프레임이
/// 안정성 게이트를 우연히 통과하는 일을 막는다.
pub fn motion(luma: &LumaBuffer, prev: Option<&LumaBuffer>) -> f64 {
    let Some(prev) = prev else {
        return MOTION_SENTINEL;
    };
    if !luma.same_dimensions(prev) {
        return MOTION_SENTINEL;
    }

    let current = luma.samples();
    let previous = prev.samples();
    let sum: u64 = current
        .iter()
        .zip(previous)
        .map(|(&a, &b)| u64::from(a.abs_diff(b)))
        .sum();
    sum as f64 / current.len() as f64
}

/// 경계 밴드 에지 비율 — 문서 가장자리가 가이드 경계를 따라 보이는지의 근사
///
/// 내부 픽셀에 Sobel `|Gx| + |Gy|`를 적용하고, 설정된 전략으로 임계값을
/// 정한 뒤 상/하/좌/우 경계 밴드에서 임계값 초과 픽셀 비율을 구한다.
pub fn edge_band_ratios(
    luma: &LumaBuffer,
    band_fraction: f64,
    threshold_mode: EdgeThreshold,
) -> EdgeRatios {
    let (w, h) = (luma.width(), luma.height());
    if w <= 2 || h <= 2 {
        return EdgeRatios::default();
    }

    // 경계 행/열은 응답 0 (커널 미적용)
    let mut magnitude = vec![0.0f64; (w as usize) * (h as usize)];
    let mut interior = Vec::with_capacity(((w - 2) as usize) * ((h - 2) as usize));
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let p = |dx: i32, dy: i32| {
                i32::from(luma.at((x as i32 + dx) as u32, (y as i32 + dy) as u32))
            };
            let gx = -p(-1, -1) + p(1, -1) - 2 * p(-1, 0) + 2 * p(1, 0) - p(-1, 1) + p(1, 1);
            let gy = -p(-1, -1) - 2 * p(0, -1) - p(1, -1) + p(-1, 1) + 2 * p(0, 1) + p(1, 1);
            let mag = f64::from(gx.abs() + gy.abs());
            magnitude[(y as usize) * (w as usize) + (x as usize)] = mag;
            interior.push(mag);
        }
    }

    let threshold = match threshold_mode {
        EdgeThreshold::MeanStd { k } => {
            let n = interior.len() as f64;
            let mean = interior.iter().sum::<f64>() / n;
            let variance = interior.iter().map(|m| (m - mean).powi(2)).sum::<f64>() / n;
            mean + k * variance.sqrt()
        }
        EdgeThreshold::MaxFraction { fraction } => {
            let max = interior.iter().cloned().fold(0.0f64, f64::max);
            fraction * max
        }
    };

    let band = ((band_fraction * f64::from(w.min(h))).round() as u32).max(1);
    let band_ratio = |x0: u32, y0: u32, x1: u32, y1: u32| -> f64 {
        let mut above = 0usize;
        let mut total = 0usize;
        for y in y0..y1 {
            for x in x0..x1 {
                if magnitude[(y as usize) * (w as usize) + (x as usize)] > threshold {
                    above += 1;
                }
                total += 1;
            }
        }
        above as f64 / total as f64
    };

    EdgeRatios {
        top: band_ratio(0, 0, w, band.min(h)),
        bottom: band_ratio(0, h - band.min(h), w, h),
        left: band_ratio(0, 0, band.min(w), h),
        right: band_ratio(w - band.min(w), 0, w, h),
    }
}
