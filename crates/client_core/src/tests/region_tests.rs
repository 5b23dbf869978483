use super::*;
use proptest::prelude::*;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn empty_point_set_is_rejected() {
    let err = frame_points(Vec::new()).expect_err("empty set");
    assert_eq!(err, RegionError::EmptyPointSet);
}

#[test]
fn non_finite_point_is_rejected() {
    let points = vec![
        Coordinates::new(18.5, 73.8),
        Coordinates::new(f64::NAN, 73.9),
    ];
    assert_eq!(frame_points(points), Err(RegionError::NonFinite));
    assert_eq!(
        frame_single(Coordinates::new(18.5, f64::INFINITY)),
        Err(RegionError::NonFinite)
    );
}

#[test]
fn single_point_set_gets_minimum_span_and_max_zoom() {
    let framing = frame_points([Coordinates::new(19.0, 74.0)]).expect("framing");
    assert_eq!(framing.region.latitude_delta, MIN_DELTA);
    assert_eq!(framing.region.longitude_delta, MIN_DELTA);
    assert_eq!(framing.zoom(), MAX_ZOOM);
    assert_eq!(framing.camera.pitch, 0.0);
}

#[test]
fn center_is_mean_and_span_has_margin() {
    let points = [
        Coordinates::new(18.0, 73.0),
        Coordinates::new(19.0, 73.5),
        Coordinates::new(20.0, 74.0),
    ];
    let framing = frame_points(points).expect("framing");

    assert!(approx(framing.region.latitude, 19.0));
    assert!(approx(framing.region.longitude, 73.5));
    assert!(approx(framing.region.latitude_delta, 3.0));
    assert!(approx(framing.region.longitude_delta, 1.5));
    // spread 2.0 -> 14 - log2(200) = 6.35 -> clamped to the floor
    assert_eq!(framing.zoom(), MIN_ZOOM);
}

#[test]
fn zoom_follows_log_formula_inside_bounds() {
    // 0.05 * 100 = 5 -> log2 = 2.32 -> floor(11.68) = 11
    assert_eq!(zoom_for_spread(0.05), 11);
    // 0.02 * 100 = 2 -> log2 = 1 -> 13
    assert_eq!(zoom_for_spread(0.02), 13);
    // 0.01 * 100 = 1 -> log2 = 0 -> 14
    assert_eq!(zoom_for_spread(0.01), 14);
    assert_eq!(zoom_for_spread(0.0), MAX_ZOOM);
    assert_eq!(zoom_for_spread(50.0), MIN_ZOOM);
}

#[test]
fn close_up_uses_fixed_camera() {
    let framing = frame_single(Coordinates::new(20.0414915, 73.85056513)).expect("framing");
    assert_eq!(framing.region.latitude_delta, CLOSE_UP_DELTA);
    assert_eq!(framing.region.longitude_delta, CLOSE_UP_DELTA);
    assert_eq!(framing.camera.zoom, 15);
    assert_eq!(framing.camera.pitch, 25.0);
    assert_eq!(framing.camera.heading, 0.0);
    assert_eq!(framing.camera.center, framing.region.center());
}

#[test]
fn user_fix_region_is_wider_than_close_up() {
    let region = user_fix_region(Coordinates::new(18.52, 73.85)).expect("region");
    assert_eq!(region.latitude_delta, 0.5);
    assert_eq!(region.longitude_delta, 0.5);
}

fn finite_point() -> impl Strategy<Value = Coordinates> {
    (-90.0f64..=90.0, -180.0f64..=180.0).prop_map(|(lat, lng)| Coordinates::new(lat, lng))
}

proptest! {
    #[test]
    fn identical_points_never_give_degenerate_span(point in finite_point(), count in 1usize..20) {
        let framing = frame_points(std::iter::repeat(point).take(count)).expect("framing");
        prop_assert!(framing.region.latitude_delta >= MIN_DELTA);
        prop_assert!(framing.region.longitude_delta >= MIN_DELTA);
    }

    #[test]
    fn zoom_stays_within_bounds(points in prop::collection::vec(finite_point(), 1..30)) {
        let framing = frame_points(points).expect("framing");
        prop_assert!((MIN_ZOOM..=MAX_ZOOM).contains(&framing.zoom()));
    }

    #[test]
    fn region_center_lies_inside_bounding_box(points in prop::collection::vec(finite_point(), 1..30)) {
        let framing = frame_points(points.clone()).expect("framing");
        let min_lat = points.iter().map(|p| p.latitude).fold(f64::INFINITY, f64::min);
        let max_lat = points.iter().map(|p| p.latitude).fold(f64::NEG_INFINITY, f64::max);
        prop_assert!(framing.region.latitude >= min_lat - 1e-9);
        prop_assert!(framing.region.latitude <= max_lat + 1e-9);
    }
}
