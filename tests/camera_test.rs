use flow_tour::{InnerSpace, camera::CameraRig, path::PathModel};

use crate::common::test_utils::straight_config;

mod common;

fn rig_on_straight_path() -> (CameraRig, PathModel) {
    let config = straight_config(100.0, 1000);
    let path = PathModel::new(&config.control_points, config.tension, config.sample_count);
    (CameraRig::new(&config, &path), path)
}

#[test]
fn scrolling_clamps_to_the_path_ends() {
    let (mut rig, path) = rig_on_straight_path();

    rig.on_scroll(-1.0, &path);
    assert_eq!(rig.path_position(), 0.0);

    rig.set_path_position(0.9995, &path);
    rig.on_scroll(1.0, &path);
    assert_eq!(rig.path_position(), 1.0);
    rig.on_scroll(120.0, &path);
    assert_eq!(rig.path_position(), 1.0);
}

#[test]
fn scroll_uses_only_the_sign() {
    let (mut rig, path) = rig_on_straight_path();

    rig.on_scroll(0.01, &path);
    let small = rig.path_position();
    rig.on_scroll(500.0, &path);
    assert!((small - 0.001).abs() < 1e-6);
    assert!((rig.path_position() - 0.002).abs() < 1e-6);

    rig.on_scroll(0.0, &path);
    assert!((rig.path_position() - 0.002).abs() < 1e-6);
}

#[test]
fn camera_rides_above_the_path_and_looks_ahead() {
    let (mut rig, path) = rig_on_straight_path();
    rig.set_path_position(0.5, &path);

    let pose = rig.pose();
    let on_path = path.point_at_index(path.index_for(0.5));
    assert!((pose.position.y - 2.0).abs() < 1e-5);
    assert!((pose.position.x - on_path.x).abs() < 1e-4);
    // 10 units ahead on a straight line
    assert!(pose.target.x > pose.position.x + 9.0);
    assert!((pose.forward().x - 1.0).abs() < 1e-4);
}

#[test]
fn pose_at_the_end_still_has_a_direction() {
    let (mut rig, path) = rig_on_straight_path();
    rig.set_path_position(1.0, &path);

    let pose = rig.pose();
    assert!((pose.target - pose.position).magnitude() > 0.5);
    assert!(pose.forward().x > 0.99);
}

#[test]
fn dragging_never_changes_progress() {
    let (mut rig, path) = rig_on_straight_path();
    rig.set_path_position(0.3, &path);
    let before = rig.pose();

    rig.on_drag_start(100.0, 100.0, &path);
    rig.on_drag_move(150.0, 80.0, &path);
    rig.on_drag_move(200.0, 60.0, &path);
    rig.on_drag_end();

    assert_eq!(rig.path_position(), 0.3);
    let after = rig.pose();
    assert!((after.position - before.position).magnitude() > 0.1);
    // right of +X travel is +Z, dragging up lifts the camera
    assert!(after.position.z > before.position.z);
    assert!(after.position.y > before.position.y);
}

#[test]
fn moves_without_a_drag_are_ignored() {
    let (mut rig, path) = rig_on_straight_path();
    let before = rig.pose();

    rig.on_drag_move(400.0, 400.0, &path);
    assert_eq!(rig.pose(), before);
    assert!(!rig.is_dragging());
}

#[test]
fn drag_offset_survives_until_the_next_gesture_or_scroll() {
    let (mut rig, path) = rig_on_straight_path();
    let rest = rig.pose();

    rig.on_drag_start(0.0, 0.0, &path);
    rig.on_drag_move(100.0, 0.0, &path);
    rig.on_drag_end();
    let dragged = rig.pose();
    assert_ne!(dragged, rest);

    rig.on_drag_start(100.0, 0.0, &path);
    assert_eq!(rig.pose(), rest);

    rig.on_drag_move(200.0, 0.0, &path);
    rig.on_drag_end();
    rig.on_scroll(1.0, &path);
    rig.on_scroll(-1.0, &path);
    assert!((rig.pose().position - rest.position).magnitude() < 1e-4);
}
