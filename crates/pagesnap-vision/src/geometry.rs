//! 가이드 영역 → 프레임 픽셀 좌표 매핑.
//!
//! 비디오는 컨테이너 안에 균등 "contain" 방식으로 축소/확대되어 중앙
//! 정렬된다고 가정한다 (레터박스 포함). 이 변환을 역산하여 화면 좌표의
//! 가이드 사각형을 소스 프레임 픽셀 사각형으로 옮긴다.

use pagesnap_core::models::frame::{GuideRegion, PixelRegion};

/// 가이드 사각형을 소스 프레임 픽셀 영역으로 역변환
///
/// 소스 치수나 가이드/컨테이너가 아직 유효하지 않으면 `None` — 해당 틱은
/// 스킵 대상이다. 반환된 영역은 항상 프레임 경계 안에 있고 `w, h >= 1`.
pub fn map_guide_to_frame(
    guide: &GuideRegion,
    source_w: u32,
    source_h: u32,
) -> Option<PixelRegion> {
    if source_w == 0 || source_h == 0 {
        return None;
    }
    if guide.w <= 0.0 || guide.h <= 0.0 || guide.container_w <= 0.0 || guide.container_h <= 0.0 {
        return None;
    }

    let sw = f64::from(source_w);
    let sh = f64::from(source_h);

    // contain 스케일: 두 축 중 작은 배율, 중앙 정렬 오프셋
    let scale = (guide.container_w / sw).min(guide.container_h / sh);
    if !scale.is_finite() || scale <= 0.0 {
        return None;
    }
    let offset_x = (guide.container_w - sw * scale) / 2.0;
    let offset_y = (guide.container_h - sh * scale) / 2.0;

    let x = ((guide.x - offset_x) / scale).round().clamp(0.0, sw - 1.0);
    let y = ((guide.y - offset_y) / scale).round().clamp(0.0, sh - 1.0);
    let w = (guide.w / scale).round().clamp(1.0, sw - x);
    let h = (guide.h / scale).round().clamp(1.0, sh - y);

    Some(PixelRegion {
        x: x as u32,
        y: y as u32,
        w: w as u32,
        h: h as u32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guide(x: f64, y: f64, w: f64, h: f64, cw: f64, ch: f64) -> GuideRegion {
        GuideRegion {
            x,
            y,
            w,
            h,
            container_w: cw,
            container_h: ch,
        }
    }

    #[test]
    fn full_view_round_trips_to_full_frame() {
        // 컨테이너가 비디오 표시 영역과 정확히 일치 → 전체 프레임
        let g = guide(0.0, 0.0, 640.0, 480.0, 640.0, 480.0);
        let region = map_guide_to_frame(&g, 640, 480).unwrap();
        assert_eq!(
            region,
            PixelRegion {
                x: 0,
                y: 0,
                w: 640,
                h: 480
            }
        );
    }

    #[test]
    fn letterboxed_video_round_trip() {
        // 640x480 소스를 1280x720 컨테이너에 contain: scale 1.5, 좌우 160px 레터박스
        let g = guide(160.0, 0.0, 960.0, 720.0, 1280.0, 720.0);
        let region = map_guide_to_frame(&g, 640, 480).unwrap();
        assert_eq!(
            region,
            PixelRegion {
                x: 0,
                y: 0,
                w: 640,
                h: 480
            }
        );
    }

    #[test]
    fn centered_guide_maps_inside_frame() {
        // 1280x720 컨테이너 중앙의 420x600 가이드, 1920x1080 소스 (scale = 2/3)
        let g = guide(430.0, 60.0, 420.0, 600.0, 1280.0, 720.0);
        let region = map_guide_to_frame(&g, 1920, 1080).unwrap();
        assert!(region.fits_within(1920, 1080));
        assert_eq!(region.w, 630);
        assert_eq!(region.h, 900);
        assert_eq!(region.x, 645);
        assert_eq!(region.y, 90);
    }

    #[test]
    fn guide_outside_display_is_clamped() {
        // 가이드가 비디오 표시 영역 왼쪽 바깥으로 삐져나간 경우
        let g = guide(-100.0, -50.0, 500.0, 400.0, 640.0, 480.0);
        let region = map_guide_to_frame(&g, 640, 480).unwrap();
        assert!(region.fits_within(640, 480));
        assert_eq!(region.x, 0);
        assert_eq!(region.y, 0);
    }

    #[test]
    fn guide_fully_right_of_frame_still_within_bounds() {
        let g = guide(10_000.0, 10_000.0, 50.0, 50.0, 640.0, 480.0);
        let region = map_guide_to_frame(&g, 640, 480).unwrap();
        assert!(region.fits_within(640, 480));
        assert!(region.w >= 1 && region.h >= 1);
    }

    #[test]
    fn unknown_source_dimensions_skip() {
        let g = guide(0.0, 0.0, 100.0, 100.0, 640.0, 480.0);
        assert!(map_guide_to_frame(&g, 0, 480).is_none());
        assert!(map_guide_to_frame(&g, 640, 0).is_none());
    }

    #[test]
    fn unmeasured_guide_skip() {
        let g = guide(0.0, 0.0, 0.0, 0.0, 640.0, 480.0);
        assert!(map_guide_to_frame(&g, 640, 480).is_none());
        let g = guide(0.0, 0.0, 100.0, 100.0, 0.0, 0.0);
        assert!(map_guide_to_frame(&g, 640, 480).is_none());
    }

    #[test]
    fn mapped_region_never_escapes_bounds() {
        // 다양한 치수 조합에서 경계 불변식 확인
        let sizes = [(640u32, 480u32), (1920, 1080), (720, 1280), (3, 5)];
        let guides = [
            guide(12.5, 30.0, 300.0, 430.0, 800.0, 600.0),
            guide(700.0, 500.0, 300.0, 300.0, 800.0, 600.0),
            guide(0.0, 0.0, 800.0, 600.0, 800.0, 600.0),
        ];
        for (sw, sh) in sizes {
            for g in &guides {
                let region = map_guide_to_frame(g, sw, sh).unwrap();
                assert!(
                    region.fits_within(sw, sh),
                    "영역 이탈: {:?} in {}x{}",
                    region,
                    sw,
                    sh
                );
            }
        }
    }
}
