// Geometry engine properties

use its::transform::geometry::{apply_no_scale_up, fit_window, resize_target};
use its::transform::FocalPoint;
use rstest::rstest;

const MAX: u64 = 89_478_485;

#[rstest]
#[case((800, 600), Some(100), None, (100, 75))]
#[case((800, 600), None, Some(60), (80, 60))]
#[case((800, 600), Some(400), Some(400), (400, 300))]
#[case((600, 800), Some(400), Some(400), (300, 400))]
#[case((100, 100), Some(250), Some(50), (50, 50))]
fn test_resize_target(
    #[case] source: (u32, u32),
    #[case] width: Option<u32>,
    #[case] height: Option<u32>,
    #[case] expected: (u32, u32),
) {
    assert_eq!(resize_target(source, width, height, MAX).unwrap(), expected);
}

#[test]
fn test_resize_target_rejects_zero_source() {
    assert!(resize_target((0, 10), Some(5), None, MAX).is_err());
}

#[test]
fn test_resize_target_rejects_empty_result() {
    // 1000x1 scaled to width 10 would have zero height
    assert!(resize_target((1000, 1), Some(10), None, MAX).is_err());
}

#[rstest]
#[case((40, 30), (100, 100))]
#[case((40, 30), (40, 30))]
#[case((40, 30), (41, 10))]
fn test_no_scale_up_never_exceeds_source(#[case] source: (u32, u32), #[case] target: (u32, u32)) {
    let result = apply_no_scale_up(source, target);
    assert!(result.0 <= source.0 && result.1 <= source.1);
}

#[rstest]
#[case(0.0, 0)]
#[case(50.0, 50)]
#[case(100.0, 100)]
fn test_fit_window_follows_focal_x(#[case] focal_x: f64, #[case] expected_left: u32) {
    let window = fit_window((200, 100), (50, 50), FocalPoint::new(focal_x, 50.0).unwrap(), None);
    assert_eq!((window.width, window.height), (100, 100));
    assert_eq!(window.left, expected_left);
    assert_eq!(window.top, 0);
}

#[test]
fn test_fit_window_stays_inside_source() {
    for fx in [0.0, 13.0, 77.0, 100.0] {
        for fy in [0.0, 42.0, 100.0] {
            let window = fit_window((321, 123), (40, 90), FocalPoint::new(fx, fy).unwrap(), None);
            assert!(window.left + window.width <= 321);
            assert!(window.top + window.height <= 123);
        }
    }
}

#[test]
fn test_focal_point_range_checked() {
    assert!(FocalPoint::new(101.0, 0.0).is_err());
    assert!(FocalPoint::new(0.0, -1.0).is_err());
}
