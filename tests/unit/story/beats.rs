use super::*;

const EPS: f64 = 1e-9;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < EPS
}

fn animator() -> BeatAnimator {
    BeatAnimator::from_config(&StoryConfig::default())
}

fn style(progress: f64, id: &str) -> BeatStyle {
    let a = animator();
    let beat = a.beats().iter().find(|b| b.id == id).unwrap().clone();
    a.style_for(&beat, progress)
}

#[test]
fn triangular_intensity_for_b_range() {
    assert!(close(beat_intensity(0.35, 0.25, 0.45), 1.0));
    assert!(close(beat_intensity(0.25, 0.25, 0.45), 0.0));
    assert!(close(beat_intensity(0.45, 0.25, 0.45), 0.0));
    assert_eq!(beat_intensity(0.10, 0.25, 0.45), 0.0);
    assert!(close(beat_intensity(0.30, 0.25, 0.45), 0.5));
    assert_eq!(beat_intensity(0.90, 0.25, 0.45), 0.0);
}

#[test]
fn empty_range_has_no_intensity() {
    assert_eq!(beat_intensity(0.3, 0.3, 0.3), 0.0);
}

#[test]
fn style_slides_and_hides() {
    let center = style(0.35, "b");
    assert!(close(center.opacity, 1.0));
    assert!(close(center.transform.offset().y, 0.0));
    assert_eq!(center.visibility, Visibility::Visible);

    let half = style(0.30, "b");
    assert!(close(half.opacity, 0.5));
    match half.transform {
        BeatTransform::Slide { offset_y } => assert!(close(offset_y, 15.0)),
        BeatTransform::Centered => panic!("expected slide"),
    }

    let out = style(0.10, "b");
    assert_eq!(out.opacity, 0.0);
    assert_eq!(out.transform, BeatTransform::Slide { offset_y: 30.0 });
    assert_eq!(out.visibility, Visibility::Hidden);
}

#[test]
fn intensity_at_or_below_epsilon_is_hidden() {
    // 0.2505 in [0.25, 0.45] gives intensity 0.005 (hidden); 0.2520 gives 0.02 (visible).
    let a = animator();
    let b = BeatSpec::new("b", 0.25, 0.45);
    assert_eq!(a.style_for(&b, 0.2505).visibility, Visibility::Hidden);
    assert_eq!(a.style_for(&b, 0.2520).visibility, Visibility::Visible);
}

#[test]
fn final_hold_applies_only_above_threshold() {
    // At or below 0.85 the generic triangle governs d = [0.75, 1.0].
    let at = style(0.85, "d");
    assert!(close(at.opacity, beat_intensity(0.85, 0.75, 1.0)));
    assert!(matches!(at.transform, BeatTransform::Slide { .. }));

    let held = style(0.90, "d");
    assert!(close(held.opacity, 0.75));
    assert!(!close(held.opacity, beat_intensity(0.90, 0.75, 1.0)));
    assert_eq!(held.transform, BeatTransform::Centered);
    assert_eq!(held.visibility, Visibility::Visible);

    let end = style(1.0, "d");
    assert_eq!(end.opacity, 1.0);
    assert_eq!(end.visibility, Visibility::Visible);
}

#[test]
fn hold_does_not_touch_other_beats() {
    let a = style(0.95, "a");
    assert_eq!(a.opacity, 0.0);
    assert_eq!(a.visibility, Visibility::Hidden);
}

#[test]
fn no_hold_configured_keeps_triangle_at_end() {
    let cfg = StoryConfig {
        final_hold: None,
        ..StoryConfig::default()
    };
    let a = BeatAnimator::from_config(&cfg);
    let states = a.styles(1.0);
    let d = states.iter().find(|s| s.id == "d").unwrap();
    assert!(close(d.style.opacity, 0.0));
    assert_eq!(d.style.visibility, Visibility::Hidden);
}

#[test]
fn styles_follow_display_order() {
    let ids: Vec<_> = animator().styles(0.5).into_iter().map(|s| s.id).collect();
    assert_eq!(ids, ["a", "b", "c", "d"]);
}

#[test]
fn css_transforms() {
    assert_eq!(
        BeatTransform::Slide { offset_y: 30.0 }.css(),
        "translate(-50%, calc(-50% + 30px))"
    );
    assert_eq!(BeatTransform::Centered.css(), "translate(-50%, -50%)");
}

#[test]
fn style_serializes_to_json() {
    let json = serde_json::to_value(style(0.90, "d")).unwrap();
    assert_eq!(json["transform"]["kind"], "centered");
    assert_eq!(json["visibility"], "visible");
}
