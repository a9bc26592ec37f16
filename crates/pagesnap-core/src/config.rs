//! 애플리케이션 설정 구조체.
//!
//! 프레임 품질 게이트 임계값과 캡처 동작을 정의한다. 임계값 기본값은
//! 현장 튜닝으로 변동이 있었던 값들이라 전부 설정으로 노출하며,
//! 어느 것도 코드에 하드코딩하지 않는다.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// 품질 게이트 임계값 설정
    #[serde(default)]
    pub gate: GateConfig,
    /// 캡처(샘플링/인코딩) 설정
    #[serde(default)]
    pub capture: CaptureConfig,
}

// ============================================================
// 게이트 설정
// ============================================================

/// 에지 임계값 산출 전략
///
/// 조명 변화에 강한 `MeanStd`가 기본값. `MaxFraction`은 초기 버전과의
/// 호환을 위해 유지한다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum EdgeThreshold {
    /// `mean + k·stddev` (그래디언트 크기 전체 분포 기준)
    MeanStd {
        /// 표준편차 배수
        k: f64,
    },
    /// 관측 최대 그래디언트의 고정 비율
    MaxFraction {
        /// 최대값 대비 비율 (0.0 ~ 1.0)
        fraction: f64,
    },
}

impl Default for EdgeThreshold {
    fn default() -> Self {
        EdgeThreshold::MeanStd { k: 1.2 }
    }
}

/// 품질 게이트 임계값 — 프레임별 합격/불합격 판정 기준
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    /// 캡처 발동에 필요한 연속 합격 프레임 수 (디바운스 길이)
    #[serde(default = "default_consecutive_frames")]
    pub consecutive_frames_required: u32,
    /// 선명도 하한 (라플라시안 분산)
    #[serde(default = "default_sharpness_min")]
    pub sharpness_min: f64,
    /// 밝기 충족 비율 하한 (0.0 ~ 1.0)
    #[serde(default = "default_fill_min")]
    pub fill_min: f64,
    /// 프레임 간 움직임 상한 (평균 절대 휘도차)
    #[serde(default = "default_motion_max")]
    pub motion_max: f64,
    /// 경계 밴드 두께 — 분석 버퍼 짧은 변 대비 비율 (0.0 ~ 1.0)
    #[serde(default = "default_edge_band_fraction")]
    pub edge_band_fraction: f64,
    /// 4개 경계 밴드 각각의 에지 픽셀 비율 하한 (0.0 ~ 1.0)
    #[serde(default = "default_edge_ratio_min")]
    pub edge_ratio_min: f64,
    /// 세션 시작 후 캡처 허용까지의 최소 경과 시간 (초)
    #[serde(default = "default_min_elapsed_seconds")]
    pub min_elapsed_seconds: f64,
    /// 기대 문서 비율 (너비/높이, 여권 페이지 ≈ 0.70)
    #[serde(default = "default_aspect_target")]
    pub aspect_target: f64,
    /// 비율 허용 오차 (±)
    #[serde(default = "default_aspect_tolerance")]
    pub aspect_tolerance: f64,
    /// 에지 임계값 산출 전략
    #[serde(default)]
    pub edge_threshold: EdgeThreshold,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            consecutive_frames_required: default_consecutive_frames(),
            sharpness_min: default_sharpness_min(),
            fill_min: default_fill_min(),
            motion_max: default_motion_max(),
            edge_band_fraction: default_edge_band_fraction(),
            edge_ratio_min: default_edge_ratio_min(),
            min_elapsed_seconds: default_min_elapsed_seconds(),
            aspect_target: default_aspect_target(),
            aspect_tolerance: default_aspect_tolerance(),
            edge_threshold: EdgeThreshold::default(),
        }
    }
}

impl GateConfig {
    /// 설정값 범위 검증
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.consecutive_frames_required == 0 {
            return Err(validation("consecutive_frames_required", "1 이상이어야 함"));
        }
        if !(self.fill_min > 0.0 && self.fill_min < 1.0) {
            return Err(validation("fill_min", "(0, 1) 범위여야 함"));
        }
        if self.motion_max < 0.0 {
            return Err(validation("motion_max", "0 이상이어야 함"));
        }
        if !(self.edge_band_fraction > 0.0 && self.edge_band_fraction < 1.0) {
            return Err(validation("edge_band_fraction", "(0, 1) 범위여야 함"));
        }
        if !(0.0..=1.0).contains(&self.edge_ratio_min) {
            return Err(validation("edge_ratio_min", "[0, 1] 범위여야 함"));
        }
        if self.min_elapsed_seconds < 0.0 {
            return Err(validation("min_elapsed_seconds", "0 이상이어야 함"));
        }
        if self.aspect_target <= 0.0 {
            return Err(validation("aspect_target", "양수여야 함"));
        }
        if self.aspect_tolerance < 0.0 {
            return Err(validation("aspect_tolerance", "0 이상이어야 함"));
        }
        match self.edge_threshold {
            EdgeThreshold::MeanStd { k } if k < 0.0 => {
                return Err(validation("edge_threshold.k", "0 이상이어야 함"));
            }
            EdgeThreshold::MaxFraction { fraction } if !(0.0..=1.0).contains(&fraction) => {
                return Err(validation("edge_threshold.fraction", "[0, 1] 범위여야 함"));
            }
            _ => {}
        }
        Ok(())
    }
}

// ============================================================
// 캡처 설정
// ============================================================

/// 캡처(샘플링/인코딩) 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// 분석 버퍼 너비 (픽셀) — 높이는 영역 비율에 따라 유도
    #[serde(default = "default_analysis_width")]
    pub analysis_width: u32,
    /// 캡처 이미지 WebP 품질 (0 ~ 100)
    #[serde(default = "default_webp_quality")]
    pub webp_quality: f32,
    /// true면 캡처 후에도 세션 유지 (반복 캡처), false면 1회 캡처 후 종료
    #[serde(default)]
    pub repeat_capture: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            analysis_width: default_analysis_width(),
            webp_quality: default_webp_quality(),
            repeat_capture: false,
        }
    }
}

impl CaptureConfig {
    /// 설정값 범위 검증
    pub fn validate(&self) -> Result<(), CoreError> {
        if !(16..=2048).contains(&self.analysis_width) {
            return Err(validation("analysis_width", "16 ~ 2048 범위여야 함"));
        }
        if !(0.0..=100.0).contains(&self.webp_quality) {
            return Err(validation("webp_quality", "0 ~ 100 범위여야 함"));
        }
        Ok(())
    }
}

impl AppConfig {
    /// 기본 설정값 반환
    pub fn default_config() -> Self {
        Self::default()
    }

    /// 전체 설정 검증
    pub fn validate(&self) -> Result<(), CoreError> {
        self.gate.validate()?;
        self.capture.validate()
    }
}

fn validation(field: &str, message: &str) -> CoreError {
    CoreError::Validation {
        field: field.to_string(),
        message: message.to_string(),
    }
}

// ============================================================
// 기본값 함수
// ============================================================

fn default_consecutive_frames() -> u32 {
    3
}
fn default_sharpness_min() -> f64 {
    32.0
}
fn default_fill_min() -> f64 {
    0.5
}
fn default_motion_max() -> f64 {
    9.0
}
fn default_edge_band_fraction() -> f64 {
    0.12
}
fn default_edge_ratio_min() -> f64 {
    0.12
}
fn default_min_elapsed_seconds() -> f64 {
    1.5
}
fn default_aspect_target() -> f64 {
    0.70
}
fn default_aspect_tolerance() -> f64 {
    0.12
}
fn default_analysis_width() -> u32 {
    400
}
fn default_webp_quality() -> f32 {
    90.0
}
