use flow_tour::{
    Point3, Rad, Vector3,
    clock::Clock,
    context::TourConfig,
    data_structures::{
        instance::Instance,
        scene_graph::{Scene, SceneGraph, SceneNode},
    },
    effect::{JobKind, TransitionEffect},
    placement::{Placement, Side},
    swap::{Completion, Phase, SlotId, SlotRegistry, SwapState, SwapStateMachine, Variant},
};

use crate::common::test_utils::{Harness, cube};

mod common;

const FAR: Point3<f32> = Point3::new(0.0, 0.0, 0.0);
const NEAR: Point3<f32> = Point3::new(5.0, 0.0, 0.0);

fn house_placement() -> Placement {
    Placement {
        name: "house".to_string(),
        sample_index: 0,
        side: Side::Right,
        anchor: Point3::new(5.0, 0.0, 3.0),
        transform: Instance::placed(Vector3::new(5.0, 0.0, 3.0), Rad(0.0), 2.0),
    }
}

/// The anchor is sqrt(34) ~ 5.83 from `FAR` and 3 from `NEAR`, so the
/// radius has to sit between those two.
fn config() -> TourConfig {
    TourConfig {
        swap_threshold: 5.0,
        particle_seed: Some(11),
        ..TourConfig::default()
    }
}

fn harness_with(original: SceneNode, renewal: Option<SceneNode>) -> Harness {
    let config = config();
    let mut scene = SceneGraph::new();
    let mut registry = SlotRegistry::new();
    registry.register(&house_placement(), original, renewal, &mut scene);
    Harness::new(
        scene,
        TransitionEffect::new(&config),
        SwapStateMachine::new(registry, &config),
    )
}

fn harness() -> Harness {
    harness_with(cube("house/original"), Some(cube("house/renewed")))
}

fn state(h: &Harness) -> SwapState {
    h.machine.registry().get(SlotId(0)).map(|slot| slot.state).unwrap()
}

fn transitioning(to: Variant, phase: Phase) -> SwapState {
    SwapState::Transitioning { to, phase }
}

#[test]
fn nothing_happens_outside_the_radius() {
    let mut h = harness();
    h.run_for(3000, FAR);

    assert_eq!(state(&h), SwapState::Original);
    assert_eq!(h.machine.swaps_started("house"), 0);
    assert!(h.effect.is_empty());
    assert_eq!(h.visible_names(), vec!["house/original"]);
}

#[test]
fn swap_steps_happen_in_order_and_on_time() {
    let mut h = harness();

    h.tick_at(0, NEAR);
    assert_eq!(state(&h), transitioning(Variant::Renewed, Phase::Disintegrating));
    assert_eq!(h.effect.len(), 1);
    assert_eq!(h.machine.swaps_started("house"), 1);

    h.tick_at(799, NEAR);
    assert_eq!(state(&h), transitioning(Variant::Renewed, Phase::Disintegrating));

    // disintegration done: old model hidden but still in the scene
    h.tick_at(800, NEAR);
    assert_eq!(state(&h), transitioning(Variant::Renewed, Phase::AwaitingRemoval));
    assert!(h.effect.is_empty());
    assert_eq!(h.scene.len(), 1);
    assert!(h.visible_names().is_empty());

    h.tick_at(1999, NEAR);
    assert_eq!(state(&h), transitioning(Variant::Renewed, Phase::AwaitingRemoval));

    // old model gone, new one present but invisible
    h.tick_at(2000, NEAR);
    assert_eq!(state(&h), transitioning(Variant::Renewed, Phase::AwaitingReconstruction));
    assert_eq!(h.scene.len(), 1);
    let slot = h.machine.registry().get(SlotId(0)).unwrap();
    let incoming = h.scene.get(slot.incoming.unwrap()).unwrap();
    assert_eq!(incoming.name, "house/renewed");
    assert!(!incoming.visible);

    h.tick_at(2100, NEAR);
    assert_eq!(state(&h), transitioning(Variant::Renewed, Phase::Reconstructing));
    assert_eq!(h.effect.len(), 1);
    let job = h.effect.jobs().next().unwrap();
    assert_eq!(job.kind(), JobKind::Reconstruction);
    assert_eq!(job.source(), "house/renewed");

    h.tick_at(2900, NEAR);
    assert_eq!(state(&h), SwapState::Renewed);
    assert_eq!(h.visible_names(), vec!["house/renewed"]);
    assert!(h.effect.is_empty());
    assert_eq!(h.machine.pending_steps(), 0);
}

#[test]
fn approach_and_leave_restores_the_original() {
    let mut h = harness();

    h.tick_at(0, FAR);
    assert_eq!(state(&h), SwapState::Original);

    h.run_for(3500, NEAR);
    assert_eq!(state(&h), SwapState::Renewed);
    assert_eq!(h.machine.swaps_started("house"), 1);

    h.run_for(3500, FAR);
    assert_eq!(state(&h), SwapState::Original);
    assert_eq!(h.machine.swaps_started("house"), 2);

    // the visible model is a fresh clone of the original, at the placement
    let slot = h.machine.registry().get(SlotId(0)).unwrap();
    let shown = h.scene.get(slot.active).unwrap();
    let mut expected = cube("house/original");
    expected.transform = house_placement().transform;
    assert_eq!(shown, &expected);
    assert_eq!(h.scene.len(), 1);
    assert_eq!(h.disintegrations(), 2);
    assert_eq!(h.reconstructions(), 2);
}

#[test]
fn jittering_around_the_radius_starts_one_swap_at_a_time() {
    let mut h = harness();

    let mut max_jobs = 0;
    for frame in 0..200u64 {
        let probe = if frame % 2 == 0 { NEAR } else { FAR };
        h.tick_at(frame * 10, probe);
        max_jobs = max_jobs.max(h.effect.len());
    }
    assert_eq!(max_jobs, 1);
    assert_eq!(h.machine.swaps_started("house"), 1);
    assert_eq!((h.disintegrations(), h.reconstructions()), (1, 0));

    h.run_for(2000, NEAR);
    assert_eq!(state(&h), SwapState::Renewed);
    assert_eq!(h.machine.swaps_started("house"), 1);
}

#[test]
fn a_started_swap_is_not_cancelled_by_leaving() {
    let mut h = harness();

    h.tick_at(0, NEAR);
    h.tick_at(100, FAR);
    assert_eq!(state(&h), transitioning(Variant::Renewed, Phase::Disintegrating));

    // the forward swap completes, then the restore starts on the next evaluation
    h.run_for(2900, FAR);
    assert_eq!(h.reconstructions(), 1);
    assert_eq!(h.machine.swaps_started("house"), 2);
    assert!(state(&h).is_transitioning());

    h.run_for(3500, FAR);
    assert_eq!(state(&h), SwapState::Original);
    assert_eq!(h.machine.swaps_started("house"), 2);
}

#[test]
fn each_cycle_uses_exactly_one_job_pair() {
    let mut h = harness();

    h.run_for(3500, NEAR);
    assert_eq!((h.disintegrations(), h.reconstructions()), (1, 1));

    // staying close changes nothing
    h.run_for(3500, NEAR);
    assert_eq!((h.disintegrations(), h.reconstructions()), (1, 1));
    assert_eq!(h.machine.swaps_started("house"), 1);
}

#[test]
fn stray_completions_are_ignored() {
    let mut h = harness();
    let now = h.clock.now();

    h.machine.on_job_complete(
        Completion {
            slot: SlotId(0),
            kind: JobKind::Reconstruction,
        },
        now,
        &mut h.scene,
    );
    h.machine.on_job_complete(
        Completion {
            slot: SlotId(7),
            kind: JobKind::Disintegration,
        },
        now,
        &mut h.scene,
    );
    assert_eq!(state(&h), SwapState::Original);
    assert_eq!(h.visible_names(), vec!["house/original"]);
    assert_eq!(h.machine.pending_steps(), 0);
}

#[test]
fn without_a_renewal_the_slot_never_swaps() {
    let mut h = harness_with(cube("house/original"), None);

    h.run_for(5000, NEAR);
    let slot = h.machine.registry().get_by_name("house").unwrap();
    assert!(!slot.has_renewal);
    assert_eq!(slot.state, SwapState::Original);
    assert_eq!(h.machine.swaps_started("house"), 0);
    assert!(h.effect.is_empty());
}

#[test]
fn models_without_geometry_still_finish_the_swap() {
    let mut h = harness_with(SceneNode::container("house/original"), Some(cube("house/renewed")));

    h.tick_at(0, NEAR);
    assert_eq!(state(&h), transitioning(Variant::Renewed, Phase::AwaitingRemoval));
    assert!(h.effect.is_empty());

    h.run_for(3000, NEAR);
    assert_eq!(state(&h), SwapState::Renewed);
    assert_eq!(h.visible_names(), vec!["house/renewed"]);

    let mut both_empty = harness_with(
        SceneNode::container("house/original"),
        Some(SceneNode::container("house/renewed")),
    );
    both_empty.run_for(1500, NEAR);
    assert_eq!(state(&both_empty), SwapState::Renewed);
    assert_eq!(both_empty.reconstructions(), 0);
}

#[test]
fn teardown_removes_every_model() {
    let mut h = harness();
    h.tick_at(0, NEAR);
    h.tick_at(2000, NEAR);
    assert_eq!(h.scene.len(), 1);

    h.machine.teardown(&mut h.scene);
    assert!(h.scene.is_empty());
    assert_eq!(h.machine.pending_steps(), 0);
}
