//! Proximity-driven model swapping.
//!
//! Every placed building owns a [`ModelSlot`]. Slots whose asset has a
//! renewed variant flip between [`SwapState::Original`] and
//! [`SwapState::Renewed`] as the camera's proximity probe enters and leaves
//! the swap radius around their anchor. A flip is a fixed sequence of steps:
//!
//! 1. disintegrate the visible model (particle job)
//! 2. hide it and, after `removal_delay`, remove it from the scene and add a
//!    clone of the other variant, invisible, with the same transform
//! 3. after `reconstruction_delay`, reconstruct the clone (particle job)
//! 4. make the clone visible; the slot settles in its new state
//!
//! While a slot is [`SwapState::Transitioning`] it ignores the camera
//! completely, so no second sequence can be started for it. A sequence is
//! never interrupted: if the camera has already turned around by the time
//! it finishes, the next evaluation simply starts the reverse flip.

use std::collections::HashMap;

use cgmath::{MetricSpace, Point3};
use instant::Duration;

use crate::{
    context::TourConfig,
    data_structures::{
        instance::Instance,
        scene_graph::{NodeId, Scene, SceneNode},
    },
    effect::{JobKind, TransitionEffect},
    placement::Placement,
    scheduler::Scheduler,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Variant {
    Original,
    Renewed,
}

impl Variant {
    pub fn other(self) -> Self {
        match self {
            Variant::Original => Variant::Renewed,
            Variant::Renewed => Variant::Original,
        }
    }
}

/// Step of an in-flight swap, in the order they happen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Disintegrating,
    AwaitingRemoval,
    AwaitingReconstruction,
    Reconstructing,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwapState {
    Original,
    Renewed,
    Transitioning { to: Variant, phase: Phase },
}

impl SwapState {
    fn settled(variant: Variant) -> Self {
        match variant {
            Variant::Original => SwapState::Original,
            Variant::Renewed => SwapState::Renewed,
        }
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self, SwapState::Transitioning { .. })
    }
}

#[derive(Clone, Debug)]
pub struct ModelSlot {
    pub name: String,
    pub anchor: Point3<f32>,
    pub state: SwapState,
    /// The model currently shown for this slot.
    pub active: NodeId,
    /// The not yet visible model of an in-flight swap.
    pub incoming: Option<NodeId>,
    pub has_renewal: bool,
    transform: Instance,
    swaps_started: u32,
}

impl ModelSlot {
    /// Number of swap sequences this slot has begun.
    pub fn swaps_started(&self) -> u32 {
        self.swaps_started
    }

    pub fn transform(&self) -> &Instance {
        &self.transform
    }
}

/// Routed back from the particle jobs a slot requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Completion {
    pub slot: SlotId,
    pub kind: JobKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Continuation {
    RemoveOutgoing(SlotId),
    StartReconstruction(SlotId),
}

struct Prototypes {
    original: SceneNode,
    renewal: Option<SceneNode>,
}

impl Prototypes {
    fn for_variant(&self, variant: Variant) -> &SceneNode {
        match variant {
            Variant::Original => &self.original,
            Variant::Renewed => self.renewal.as_ref().unwrap_or(&self.original),
        }
    }
}

/// Owned mapping from asset name to its slot, together with the loaded
/// prototypes that incoming models are cloned from.
#[derive(Default)]
pub struct SlotRegistry {
    slots: Vec<ModelSlot>,
    prototypes: Vec<Prototypes>,
    by_name: HashMap<String, SlotId>,
}

impl SlotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts a clone of `original` into the scene at the placement and creates its slot.
    pub fn register<S: Scene>(
        &mut self,
        placement: &Placement,
        original: SceneNode,
        renewal: Option<SceneNode>,
        scene: &mut S,
    ) -> SlotId {
        let mut shown = original.clone();
        shown.transform = placement.transform.clone();
        shown.visible = true;
        let active = scene.add(shown);

        let id = SlotId(self.slots.len());
        if self.by_name.insert(placement.name.clone(), id).is_some() {
            log::warn!("{} was placed twice, the name now refers to the later slot", placement.name);
        }
        self.slots.push(ModelSlot {
            name: placement.name.clone(),
            anchor: placement.anchor,
            state: SwapState::Original,
            active,
            incoming: None,
            has_renewal: renewal.is_some(),
            transform: placement.transform.clone(),
            swaps_started: 0,
        });
        self.prototypes.push(Prototypes { original, renewal });
        id
    }

    pub fn get(&self, id: SlotId) -> Option<&ModelSlot> {
        self.slots.get(id.0)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&ModelSlot> {
        self.by_name.get(name).and_then(|id| self.get(*id))
    }

    pub fn id_of(&self, name: &str) -> Option<SlotId> {
        self.by_name.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &ModelSlot)> {
        self.slots.iter().enumerate().map(|(i, slot)| (SlotId(i), slot))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

pub struct SwapStateMachine {
    registry: SlotRegistry,
    pending: Scheduler<Continuation>,
    threshold: f32,
    removal_delay: Duration,
    reconstruction_delay: Duration,
}

impl SwapStateMachine {
    pub fn new(registry: SlotRegistry, config: &TourConfig) -> Self {
        Self {
            registry,
            pending: Scheduler::new(),
            threshold: config.swap_threshold,
            removal_delay: config.removal_delay,
            reconstruction_delay: config.reconstruction_delay,
        }
    }

    pub fn registry(&self) -> &SlotRegistry {
        &self.registry
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// How many swap sequences the named building has begun, 0 if unknown.
    pub fn swaps_started(&self, name: &str) -> u32 {
        self.registry
            .get_by_name(name)
            .map_or(0, ModelSlot::swaps_started)
    }

    /// Number of scheduled steps still waiting for their delay.
    pub fn pending_steps(&self) -> usize {
        self.pending.len()
    }

    /// True while any slot is somewhere inside a swap sequence.
    pub fn is_busy(&self) -> bool {
        self.registry
            .slots
            .iter()
            .any(|slot| slot.state.is_transitioning())
    }

    /// Starts a swap for every settled slot whose proximity changed.
    pub fn evaluate<S: Scene>(
        &mut self,
        look_ahead: Point3<f32>,
        now: Duration,
        scene: &mut S,
        effect: &mut TransitionEffect<Completion>,
    ) {
        for i in 0..self.registry.slots.len() {
            let slot = &self.registry.slots[i];
            if !slot.has_renewal {
                continue;
            }
            let near = look_ahead.distance(slot.anchor) < self.threshold;
            let to = match (slot.state, near) {
                (SwapState::Original, true) => Variant::Renewed,
                (SwapState::Renewed, false) => Variant::Original,
                _ => continue,
            };
            self.begin(SlotId(i), to, now, scene, effect);
        }
    }

    /// Feeds a finished particle job back into its slot's sequence.
    pub fn on_job_complete<S: Scene>(&mut self, completion: Completion, now: Duration, scene: &mut S) {
        match completion.kind {
            JobKind::Disintegration => self.disintegrated(completion.slot, now, scene),
            JobKind::Reconstruction => self.reconstructed(completion.slot, scene),
        }
    }

    /// Runs every delayed step that is due.
    pub fn run_due<S: Scene>(
        &mut self,
        now: Duration,
        scene: &mut S,
        effect: &mut TransitionEffect<Completion>,
    ) {
        for step in self.pending.drain_due(now) {
            match step {
                Continuation::RemoveOutgoing(slot) => self.swap_models(slot, now, scene),
                Continuation::StartReconstruction(slot) => {
                    self.reconstruct(slot, now, scene, effect)
                }
            }
        }
    }

    /// Removes every model this machine put into the scene.
    pub fn teardown<S: Scene>(&mut self, scene: &mut S) {
        for slot in self.registry.slots.iter_mut() {
            scene.remove(slot.active);
            if let Some(incoming) = slot.incoming.take() {
                scene.remove(incoming);
            }
        }
        self.pending = Scheduler::new();
    }

    fn begin<S: Scene>(
        &mut self,
        id: SlotId,
        to: Variant,
        now: Duration,
        scene: &mut S,
        effect: &mut TransitionEffect<Completion>,
    ) {
        let slot = &mut self.registry.slots[id.0];
        slot.state = SwapState::Transitioning {
            to,
            phase: Phase::Disintegrating,
        };
        slot.swaps_started += 1;
        log::info!("{} turning {:?}", slot.name, to);

        let completion = Completion {
            slot: id,
            kind: JobKind::Disintegration,
        };
        let started = scene
            .get(slot.active)
            .and_then(|node| effect.start_disintegration(node, now, completion));
        if started.is_none() {
            self.disintegrated(id, now, scene);
        }
    }

    fn disintegrated<S: Scene>(&mut self, id: SlotId, now: Duration, scene: &mut S) {
        let Some(slot) = slot_in_phase(&mut self.registry.slots, id, Phase::Disintegrating) else {
            return;
        };
        if let Some(node) = scene.get_mut(slot.active) {
            node.set_visible(false);
        }
        set_phase(slot, Phase::AwaitingRemoval);
        self.pending
            .schedule(now + self.removal_delay, Continuation::RemoveOutgoing(id));
    }

    fn swap_models<S: Scene>(&mut self, id: SlotId, now: Duration, scene: &mut S) {
        let Some(slot) = slot_in_phase(&mut self.registry.slots, id, Phase::AwaitingRemoval) else {
            return;
        };
        let SwapState::Transitioning { to, .. } = slot.state else {
            return;
        };
        let transform = scene
            .remove(slot.active)
            .map(|outgoing| outgoing.transform)
            .unwrap_or_else(|| slot.transform.clone());

        let mut incoming = self.registry.prototypes[id.0].for_variant(to).clone();
        incoming.transform = transform;
        incoming.visible = false;
        slot.incoming = Some(scene.add(incoming));
        set_phase(slot, Phase::AwaitingReconstruction);
        self.pending.schedule(
            now + self.reconstruction_delay,
            Continuation::StartReconstruction(id),
        );
    }

    fn reconstruct<S: Scene>(
        &mut self,
        id: SlotId,
        now: Duration,
        scene: &mut S,
        effect: &mut TransitionEffect<Completion>,
    ) {
        let Some(slot) = slot_in_phase(&mut self.registry.slots, id, Phase::AwaitingReconstruction) else {
            return;
        };
        set_phase(slot, Phase::Reconstructing);
        let completion = Completion {
            slot: id,
            kind: JobKind::Reconstruction,
        };
        let started = slot
            .incoming
            .and_then(|incoming| scene.get(incoming))
            .and_then(|node| effect.start_reconstruction(node, now, completion));
        if started.is_none() {
            self.reconstructed(id, scene);
        }
    }

    fn reconstructed<S: Scene>(&mut self, id: SlotId, scene: &mut S) {
        let Some(slot) = slot_in_phase(&mut self.registry.slots, id, Phase::Reconstructing) else {
            return;
        };
        let SwapState::Transitioning { to, .. } = slot.state else {
            return;
        };
        if let Some(incoming) = slot.incoming.take() {
            if let Some(node) = scene.get_mut(incoming) {
                node.set_visible(true);
            }
            slot.active = incoming;
        }
        slot.state = SwapState::settled(to);
        log::info!("{} is now {:?}", slot.name, to);
    }
}

/// The slot, if it is mid-swap in `phase`. Anything else means a stale or
/// duplicate step, which is logged and dropped.
fn slot_in_phase(slots: &mut [ModelSlot], id: SlotId, phase: Phase) -> Option<&mut ModelSlot> {
    let slot = slots.get_mut(id.0)?;
    match slot.state {
        SwapState::Transitioning { phase: current, .. } if current == phase => Some(slot),
        state => {
            log::warn!("ignoring {:?} step for {} in state {:?}", phase, slot.name, state);
            None
        }
    }
}

fn set_phase(slot: &mut ModelSlot, phase: Phase) {
    if let SwapState::Transitioning { to, .. } = slot.state {
        slot.state = SwapState::Transitioning { to, phase };
    }
}
