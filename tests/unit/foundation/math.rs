use super::*;

#[test]
fn lerp_hits_endpoints_exactly() {
    assert_eq!(lerp(3.0, 9.0, 0.0), 3.0);
    assert_eq!(lerp(3.0, 9.0, 1.0), 9.0);
    assert_eq!(lerp(0.0, 100.0, 0.05), 5.0);
}

#[test]
fn clamp_bounds_and_nan() {
    assert_eq!(clamp(-0.5, 0.0, 1.0), 0.0);
    assert_eq!(clamp(1.5, 0.0, 1.0), 1.0);
    assert_eq!(clamp(0.25, 0.0, 1.0), 0.25);
    assert_eq!(clamp(f64::NAN, 0.0, 1.0), 0.0);
    assert_eq!(clamp(f64::INFINITY, 0.0, 1.0), 1.0);
}
