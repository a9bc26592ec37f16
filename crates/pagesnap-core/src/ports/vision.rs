//! 비전(프레임 품질 게이트) 포트.
//!
//! 구현: `pagesnap-vision` crate. 프레임 소스/추출기 포트는 픽셀 버퍼
//! 타입에 묶여 있어 `pagesnap-vision` 쪽에 정의한다.

use crate::models::frame::GuideRegion;

/// 가이드 영역 공급자 — 뷰파인더 렌더러가 구현
///
/// 코어는 렌더링 기술을 가정하지 않는다. 가이드 요소나 컨테이너가 아직
/// 레이아웃되지 않았으면 `None`을 반환하고, 해당 틱은 스킵된다.
pub trait GuideRegionProvider {
    /// 현재 가이드 사각형과 컨테이너 치수 반환
    fn guide_region(&self) -> Option<GuideRegion>;
}

/// 고정 가이드 영역 공급자 — 레이아웃이 변하지 않는 UI 및 테스트용
#[derive(Debug, Clone, Copy)]
pub struct FixedGuide(pub GuideRegion);

impl GuideRegionProvider for FixedGuide {
    fn guide_region(&self) -> Option<GuideRegion> {
        Some(self.0)
    }
}
