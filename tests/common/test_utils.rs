#![allow(dead_code)]

use std::collections::HashMap;

use flow_tour::{
    Point3,
    clock::{Clock, ManualClock},
    context::TourConfig,
    data_structures::scene_graph::{Mesh, Scene, SceneGraph, SceneNode},
    effect::{JobKind, TransitionEffect},
    flow::{Frame, Renderer},
    resources::{AssetLoader, LoadedAsset},
    swap::{Completion, SwapStateMachine, Variant},
};
use futures::future::LocalBoxFuture;
use instant::Duration;

/// Config for a straight path along +X of the given length.
pub fn straight_config(length: f32, samples: usize) -> TourConfig {
    TourConfig {
        control_points: vec![Point3::new(0.0, 0.0, 0.0), Point3::new(length, 0.0, 0.0)],
        sample_count: samples,
        particle_seed: Some(7),
        ..TourConfig::default()
    }
}

/// Unit cube corners, named after the model they belong to.
pub fn cube(name: &str) -> SceneNode {
    let mut positions = Vec::new();
    for x in [-0.5, 0.5] {
        for y in [0.0, 1.0] {
            for z in [-0.5, 0.5] {
                positions.push([x, y, z]);
            }
        }
    }
    SceneNode::with_mesh(name, Mesh::new(name, positions, vec![0, 1, 2, 1, 3, 2]))
}

pub fn asset(name: &str, with_renewal: bool) -> LoadedAsset {
    LoadedAsset {
        name: name.to_string(),
        original: cube(&format!("{}/original", name)),
        renewal: with_renewal.then(|| cube(&format!("{}/renewed", name))),
    }
}

pub fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

/// Serves models out of memory; missing entries fail like a missing file.
#[derive(Default)]
pub struct MemoryLoader {
    originals: HashMap<String, SceneNode>,
    renewals: HashMap<String, SceneNode>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_original(mut self, name: &str) -> Self {
        self.originals
            .insert(name.to_string(), cube(&format!("{}/original", name)));
        self
    }

    pub fn with_renewal(mut self, name: &str) -> Self {
        self.renewals
            .insert(name.to_string(), cube(&format!("{}/renewed", name)));
        self
    }
}

impl AssetLoader for MemoryLoader {
    fn load<'a>(
        &'a self,
        name: &'a str,
        variant: Variant,
    ) -> LocalBoxFuture<'a, anyhow::Result<SceneNode>> {
        Box::pin(async move {
            let models = match variant {
                Variant::Original => &self.originals,
                Variant::Renewed => &self.renewals,
            };
            models
                .get(name)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("{} not found", name))
        })
    }
}

/// Drives a swap machine without a tour around it and counts finished jobs.
pub struct Harness {
    pub scene: SceneGraph,
    pub effect: TransitionEffect<Completion>,
    pub machine: SwapStateMachine,
    pub clock: ManualClock,
    disintegrations: u32,
    reconstructions: u32,
}

impl Harness {
    pub fn new(scene: SceneGraph, effect: TransitionEffect<Completion>, machine: SwapStateMachine) -> Self {
        Self {
            scene,
            effect,
            machine,
            clock: ManualClock::new(),
            disintegrations: 0,
            reconstructions: 0,
        }
    }

    /// One frame at the clock's current time with the probe at `probe`.
    pub fn tick(&mut self, probe: Point3<f32>) {
        let now = self.clock.now();
        for completion in self.effect.update(now) {
            match completion.kind {
                JobKind::Disintegration => self.disintegrations += 1,
                JobKind::Reconstruction => self.reconstructions += 1,
            }
            self.machine
                .on_job_complete(completion, now, &mut self.scene);
        }
        self.machine.run_due(now, &mut self.scene, &mut self.effect);
        self.machine
            .evaluate(probe, now, &mut self.scene, &mut self.effect);
    }

    pub fn tick_at(&mut self, millis: u64, probe: Point3<f32>) {
        self.clock.set(ms(millis));
        self.tick(probe);
    }

    /// Ticks every 16 ms for `millis` milliseconds.
    pub fn run_for(&mut self, millis: u64, probe: Point3<f32>) {
        let end = self.clock.now() + ms(millis);
        while self.clock.now() < end {
            self.clock.advance(ms(16));
            self.tick(probe);
        }
    }

    pub fn disintegrations(&self) -> u32 {
        self.disintegrations
    }

    pub fn reconstructions(&self) -> u32 {
        self.reconstructions
    }

    pub fn visible_names(&self) -> Vec<String> {
        self.scene
            .visible()
            .map(|(_, node)| node.name.clone())
            .collect()
    }
}

/// Renderer that only remembers what it was shown.
#[derive(Default)]
pub struct State {
    frame_counter: u32,
    visible_models: usize,
    particles: usize,
    translations: Vec<[f32; 3]>,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame_counter(&self) -> u32 {
        self.frame_counter
    }

    pub fn visible_models(&self) -> usize {
        self.visible_models
    }

    pub fn particles(&self) -> usize {
        self.particles
    }

    /// Translation column of each instance handed over in the last frame.
    pub fn translations(&self) -> &[[f32; 3]] {
        &self.translations
    }
}

impl Renderer for State {
    fn render(&mut self, frame: &Frame<'_>) {
        self.frame_counter += 1;
        self.visible_models = frame
            .scene
            .visible()
            .filter(|(id, _)| *id != frame.ribbon)
            .count();
        self.particles = frame.effect.particle_vertices().len();
        self.translations = frame
            .instances()
            .into_iter()
            .filter(|(id, _)| *id != frame.ribbon)
            .map(|(_, raw)| [raw.model[3][0], raw.model[3][1], raw.model[3][2]])
            .collect();
        assert!(frame.scene.get(frame.ribbon).is_some());
    }
}
