use super::*;

#[test]
fn default_reproduces_hero_constants() {
    let cfg = StoryConfig::default();
    cfg.validate().unwrap();
    assert_eq!(cfg.frame_count, 192);
    assert_eq!(cfg.lerp_factor, 0.05);
    assert_eq!(cfg.scroll_height, 5000.0);
    assert_eq!(cfg.frame_path.locate(0), "assets/sequence/frame_0.jpg");
    assert_eq!(cfg.frame_path.locate(191), "assets/sequence/frame_191.jpg");
    let ids: Vec<_> = cfg.beats.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, ["a", "b", "c", "d"]);
    assert_eq!(cfg.final_hold.as_ref().map(|h| h.beat.as_str()), Some("d"));
}

#[test]
fn json_fills_missing_fields_with_defaults() {
    let cfg = StoryConfig::from_reader(
        r#"{ "frame_count": 12, "frame_path": "seq/f_{index}.png" }"#.as_bytes(),
    )
    .unwrap();
    assert_eq!(cfg.frame_count, 12);
    assert_eq!(cfg.frame_path.locate(7), "seq/f_7.png");
    assert_eq!(cfg.beats.len(), 4);
    assert_eq!(cfg.snap_threshold, 0.5);
}

#[test]
fn final_hold_defaults_when_only_beat_given() {
    let cfg =
        StoryConfig::from_reader(r#"{ "final_hold": { "beat": "c" } }"#.as_bytes()).unwrap();
    assert_eq!(cfg.final_hold, Some(FinalHold::on("c")));
}

#[test]
fn rejects_zero_frames() {
    let cfg = StoryConfig {
        frame_count: 0,
        ..StoryConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn rejects_bad_lerp_factor() {
    for f in [0.0, -0.1, 1.5, f64::NAN] {
        let cfg = StoryConfig {
            lerp_factor: f,
            ..StoryConfig::default()
        };
        assert!(cfg.validate().is_err(), "factor {f} should be rejected");
    }
    let cfg = StoryConfig {
        lerp_factor: 1.0,
        ..StoryConfig::default()
    };
    cfg.validate().unwrap();
}

#[test]
fn rejects_template_without_placeholder() {
    assert!(FramePath::new("assets/frame.jpg").is_err());
    assert!(
        StoryConfig::from_reader(r#"{ "frame_path": "assets/frame.jpg" }"#.as_bytes()).is_err()
    );
}

#[test]
fn rejects_inverted_or_duplicate_beats() {
    let cfg = StoryConfig {
        beats: vec![BeatSpec::new("a", 0.4, 0.2)],
        final_hold: None,
        ..StoryConfig::default()
    };
    assert!(cfg.validate().is_err());

    let cfg = StoryConfig {
        beats: vec![BeatSpec::new("a", 0.0, 0.2), BeatSpec::new("a", 0.3, 0.5)],
        final_hold: None,
        ..StoryConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn rejects_hold_on_unknown_beat() {
    let cfg = StoryConfig {
        final_hold: Some(FinalHold::on("z")),
        ..StoryConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn from_path_reports_missing_file() {
    let err = StoryConfig::from_path("target/definitely/missing/story.json").unwrap_err();
    assert!(err.to_string().contains("open story config"));
}
