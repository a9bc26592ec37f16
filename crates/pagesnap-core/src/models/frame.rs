//! 프레임/영역 모델.
//!
//! 뷰파인더 가이드 영역, 소스 프레임 픽셀 영역, 캡처 산출물 메타데이터를
//! 정의한다.

use base64::{engine::general_purpose::STANDARD as B64, Engine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 뷰파인더 가이드 영역 — 화면(컨테이너) 좌표계
///
/// UI 렌더러가 매 틱 공급한다. 아직 레이아웃되지 않았으면 공급자가
/// `None`을 반환하므로 이 구조체는 항상 측정 완료 상태를 의미한다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuideRegion {
    /// 가이드 사각형 좌상단 x (컨테이너 좌표)
    pub x: f64,
    /// 가이드 사각형 좌상단 y (컨테이너 좌표)
    pub y: f64,
    /// 가이드 사각형 너비
    pub w: f64,
    /// 가이드 사각형 높이
    pub h: f64,
    /// 표시 컨테이너 너비
    pub container_w: f64,
    /// 표시 컨테이너 높이
    pub container_h: f64,
}

/// 소스 프레임 내 픽셀 영역 (ROI)
///
/// 항상 소스 프레임 경계 안에 완전히 포함되며 `w, h >= 1`을 만족한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRegion {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl PixelRegion {
    /// 너비/높이 비율
    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.w) / f64::from(self.h)
    }

    /// 영역이 주어진 프레임 치수 안에 완전히 포함되는지 여부
    pub fn fits_within(&self, frame_w: u32, frame_h: u32) -> bool {
        self.w >= 1
            && self.h >= 1
            && self.x.checked_add(self.w).is_some_and(|r| r <= frame_w)
            && self.y.checked_add(self.h).is_some_and(|b| b <= frame_h)
    }
}

/// 캡처 산출물 메타데이터
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameMetadata {
    /// 캡처 식별자
    pub capture_id: Uuid,
    /// 캡처를 생성한 세션 식별자
    pub session_id: Uuid,
    /// 캡처 시각
    pub timestamp: DateTime<Utc>,
    /// 소스 프레임 원본 해상도 (width, height)
    pub resolution: (u32, u32),
}

/// 캡처 산출물 — 트리거당 정확히 1개 생성, 불변으로 소비자에게 전달
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureArtifact {
    /// 인코딩된 이미지 바이트
    #[serde(with = "serde_bytes_b64")]
    pub data: Vec<u8>,
    /// 이미지 포맷 (예: "webp")
    pub format: String,
    /// 원본 프레임에서 잘라낸 픽셀 영역
    pub region: PixelRegion,
    /// 캡처 메타데이터
    pub metadata: FrameMetadata,
}

impl CaptureArtifact {
    /// 전송용 Base64 문자열 반환
    pub fn to_base64(&self) -> String {
        B64.encode(&self.data)
    }
}

/// 이미지 바이트를 JSON에서 Base64 문자열로 직렬화
mod serde_bytes_b64 {
    use base64::{engine::general_purpose::STANDARD as B64, Engine};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&B64.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        B64.decode(s).map_err(serde::de::Error::custom)
    }
}
