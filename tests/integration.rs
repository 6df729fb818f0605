use journey_engine::document::SceneDocument;
use journey_engine::geom::{Point3, Tolerance};
use journey_engine::presets;
use journey_engine::quality::{CapabilitySignal, QualityTier, resolve_quality};
use journey_engine::scene::{CameraMode, FrameEvent, SceneDirector, SelectionState};

const FRAME: f64 = 1.0 / 60.0;

fn railway(tier: QualityTier) -> SceneDirector {
    presets::journey_railway().build(tier).expect("railway preset")
}

fn run_until_event(director: &mut SceneDirector) -> Option<FrameEvent> {
    (0..600).find_map(|_| director.update(FRAME).event)
}

#[test]
fn two_leg_path_crosses_the_corner_without_leaving_either_plane() {
    let doc: SceneDocument = serde_json::from_str(
        r#"{
            "segments": [
                { "start": [0, 0, 0], "end": [10, 0, 0] },
                { "start": [10, 0, 0], "end": [10, 0, 10] }
            ]
        }"#,
    )
    .expect("document");
    let director = doc.build(QualityTier::Medium).expect("scene");
    let path = director.path();

    let before = path.position_at_progress(0.49);
    assert!(before.x > 9.0 && before.x < 10.0);
    assert_eq!(before.y, 0.0);
    assert!(before.z.abs() < 1e-9);

    let corner = path.position_at_progress(0.5);
    assert!(Tolerance::DEFAULT.approx_eq_point3(corner, Point3::new(10.0, 0.0, 0.0)));
    assert_eq!(path.segment_at_progress(0.5).index, 1);

    let after = path.position_at_progress(0.51);
    assert!((after.x - 10.0).abs() < 1e-9);
    assert!(after.z > 0.0 && after.z < 1.0);

    assert_eq!(path.position_at_progress(0.0), Point3::ORIGIN);
    assert_eq!(path.position_at_progress(1.0), Point3::new(10.0, 0.0, 10.0));
}

#[test]
fn close_from_idle_changes_nothing() {
    let mut director = railway(QualityTier::Low);
    let pose = director.camera().pose();
    assert!(!director.close_detail());
    assert_eq!(director.selection(), &SelectionState::Idle);
    assert_eq!(director.camera().pose(), pose);
    assert_eq!(director.camera().mode(), &CameraMode::Follow);
}

#[test]
fn detail_round_trip_returns_to_the_pre_zoom_pose() {
    let mut director = railway(QualityTier::High);
    director.set_scroll(400.0, 3000.0, 1000.0);
    for _ in 0..45 {
        director.update(FRAME);
    }
    let before = director.camera().pose();

    assert!(director.click("internship"));
    assert!(matches!(
        run_until_event(&mut director),
        Some(FrameEvent::DetailReached { .. })
    ));
    assert!(director.close_detail());
    assert_eq!(run_until_event(&mut director), Some(FrameEvent::FollowResumed));
    assert_eq!(director.camera().pose(), before);
}

#[test]
fn switching_selection_keeps_the_first_snapshot() {
    let mut director = railway(QualityTier::Medium);
    director.update(FRAME);
    let before = director.camera().pose();

    director.click("school");
    run_until_event(&mut director);
    assert_eq!(director.selection(), &SelectionState::Selected("school".into()));

    director.click("today");
    assert_eq!(director.selection(), &SelectionState::Selected("today".into()));
    assert_eq!(director.camera().saved_pose(), Some(before));
    assert!(matches!(
        run_until_event(&mut director),
        Some(FrameEvent::DetailReached { ref node }) if node == "today"
    ));

    director.close_detail();
    assert_eq!(run_until_event(&mut director), Some(FrameEvent::FollowResumed));
    assert_eq!(director.camera().pose(), before);
}

#[test]
fn hover_is_reported_in_the_frame() {
    let mut director = railway(QualityTier::Low);
    director.pointer_enter("university");
    let frame = director.update(FRAME);
    assert_eq!(frame.hovered.as_deref(), Some("university"));
    assert_eq!(frame.selected, None);

    director.pointer_leave("university");
    assert_eq!(director.update(FRAME).hovered, None);
}

#[test]
fn frame_state_serialises_for_the_host() {
    let mut director = railway(QualityTier::Medium);
    director.set_scroll(500.0, 2000.0, 1000.0);
    let frame = director.update(FRAME);
    let json = serde_json::to_value(&frame).expect("serialise frame");

    assert_eq!(json["progress"], 0.5);
    assert_eq!(json["cameraMode"], "follow");
    assert!(json["camera"]["lookAt"].is_array());
    assert!(json["mover"]["segmentTag"].is_string());
    assert!(json.get("selected").is_none());
}

#[test]
fn static_geometry_is_tagged_by_scene_kind() {
    let railway = railway(QualityTier::High);
    let json = serde_json::to_value(railway.static_geometry()).expect("serialise");
    assert_eq!(json["type"], "railway");
    assert_eq!(json["tier"], "high");
    assert!(!json["track"]["ties"].as_array().expect("ties").is_empty());

    let constellation = presets::tech_constellation()
        .build(QualityTier::Low)
        .expect("constellation preset");
    let json = serde_json::to_value(constellation.static_geometry()).expect("serialise");
    assert_eq!(json["type"], "constellation");
    let first = &json["connections"][0];
    assert_eq!(first["points"].as_array().expect("points").len(), 21);
    assert!(constellation.flow_markers().is_empty());
}

#[test]
fn quality_resolution_is_deterministic_and_fails_low() {
    let signal: CapabilitySignal =
        serde_json::from_str(r#"{ "deviceMemoryGb": 8, "hardwareConcurrency": 8, "isMobile": true }"#)
            .expect("signal");
    let tier = resolve_quality(Some(&signal));
    assert_eq!(tier, QualityTier::Medium);
    assert_eq!(resolve_quality(Some(&signal)), tier);
    assert_eq!(resolve_quality(None), QualityTier::Low);
}

#[test]
fn constellation_orbit_rotates_and_pauses_on_selection() {
    let mut director = presets::tech_constellation()
        .build(QualityTier::Medium)
        .expect("constellation preset");
    let start = director.update(FRAME).mover.position;
    for _ in 0..120 {
        director.update(FRAME);
    }
    let moved = director.update(FRAME);
    assert_ne!(moved.mover.position, start);
    assert_eq!(moved.camera.look_at, [0.0, 0.0, 0.0]);

    director.click("rust");
    let progress = director.progress();
    for _ in 0..120 {
        director.update(FRAME);
    }
    assert_eq!(director.progress(), progress);
}

#[test]
fn teardown_restores_pose_and_ignores_input() {
    let mut director = railway(QualityTier::Medium);
    let before = director.camera().pose();
    director.click("school");
    for _ in 0..20 {
        director.update(FRAME);
    }
    director.teardown();
    assert_eq!(director.camera().pose(), before);
    assert_eq!(director.selected_node(), None);
    assert!(director.is_torn_down());

    assert!(!director.click("school"));
    let frame = director.update(FRAME);
    assert_eq!(director.selected_node(), None);
    assert_eq!(frame.camera_mode, "follow");
    assert_eq!(director.camera().pose(), before);
}
