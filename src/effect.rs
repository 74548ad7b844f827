//! Particle transitions.
//!
//! A model swap is shown as two particle jobs. A disintegration job takes
//! every world-space vertex of the outgoing model and lets it drift to a
//! random point in a small cube around it. A reconstruction job does the
//! reverse for the incoming model: particles start scattered and settle on
//! the model's vertices.
//!
//! Particles follow an exponential ease: every tick they cover a fixed
//! fraction of their remaining distance. The job's duration only decides
//! when it is considered finished, so particles may not have fully arrived
//! at that moment.
//!
//! Each job carries a payload of type `T` that [`TransitionEffect::update`]
//! hands back exactly once, when the job finishes. The tour uses it to route
//! completions back to the swap state machine.

use cgmath::{Point3, Vector3};
use instant::Duration;
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{context::TourConfig, data_structures::scene_graph::SceneNode};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct JobHandle(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JobKind {
    Disintegration,
    Reconstruction,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Blend {
    Normal,
    Additive,
}

/// How a renderer should draw the particles of a job.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleStyle {
    pub size: f32,
    pub opacity: f32,
    pub blend: Blend,
    pub depth_test: bool,
}

impl JobKind {
    pub fn style(self) -> ParticleStyle {
        ParticleStyle {
            size: 0.03,
            opacity: 0.1,
            blend: match self {
                JobKind::Disintegration => Blend::Normal,
                JobKind::Reconstruction => Blend::Additive,
            },
            depth_test: false,
        }
    }
}

/// GPU-ready particle.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

/// One in-flight particle animation. Owns its particle buffers.
#[derive(Debug)]
pub struct TransitionJob<T> {
    handle: JobHandle,
    kind: JobKind,
    source: String,
    positions: Vec<Point3<f32>>,
    targets: Vec<Point3<f32>>,
    colors: Vec<[f32; 3]>,
    started: Duration,
    duration: Duration,
    payload: T,
}

impl<T> TransitionJob<T> {
    pub fn handle(&self) -> JobHandle {
        self.handle
    }

    pub fn kind(&self) -> JobKind {
        self.kind
    }

    /// Name of the model the particles were taken from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn positions(&self) -> &[Point3<f32>] {
        &self.positions
    }

    pub fn targets(&self) -> &[Point3<f32>] {
        &self.targets
    }

    pub fn started(&self) -> Duration {
        self.started
    }

    /// Elapsed fraction of the job's duration, in `[0, 1]`.
    pub fn progress(&self, now: Duration) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.started);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    fn is_finished(&self, now: Duration) -> bool {
        now.saturating_sub(self.started) >= self.duration
    }

    fn step(&mut self, damping: f32) {
        for (p, t) in self.positions.iter_mut().zip(self.targets.iter()) {
            *p = *p + (*t - *p) * damping;
        }
    }
}

pub struct TransitionEffect<T> {
    jobs: Vec<TransitionJob<T>>,
    rng: StdRng,
    next_handle: u64,
    duration: Duration,
    damping: f32,
    scatter_radius: f32,
}

impl<T> TransitionEffect<T> {
    pub fn new(config: &TourConfig) -> Self {
        Self::with_params(
            config.transition_duration,
            config.damping,
            config.scatter_radius,
            config.particle_seed,
        )
    }

    pub fn with_params(
        duration: Duration,
        damping: f32,
        scatter_radius: f32,
        seed: Option<u64>,
    ) -> Self {
        let seed = seed.unwrap_or_else(rand::random);
        Self {
            jobs: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
            next_handle: 0,
            duration,
            damping: damping.clamp(0.0, 1.0),
            scatter_radius: scatter_radius.abs(),
        }
    }

    /// Scatters the vertices of `mesh` outwards. Returns `None` (and drops
    /// `payload`) when the model has no geometry.
    pub fn start_disintegration(
        &mut self,
        mesh: &SceneNode,
        now: Duration,
        payload: T,
    ) -> Option<JobHandle> {
        let vertices = mesh.world_positions();
        if vertices.is_empty() {
            log::debug!("{} has no geometry, skipping disintegration", mesh.name);
            return None;
        }
        let targets = vertices.iter().map(|v| self.scatter(*v)).collect();
        Some(self.push(JobKind::Disintegration, &mesh.name, vertices, targets, now, payload))
    }

    /// Assembles the vertices of `target` out of a scatter cloud. Returns
    /// `None` (and drops `payload`) when the model has no geometry.
    pub fn start_reconstruction(
        &mut self,
        target: &SceneNode,
        now: Duration,
        payload: T,
    ) -> Option<JobHandle> {
        let targets = target.world_positions();
        if targets.is_empty() {
            log::debug!("{} has no geometry, skipping reconstruction", target.name);
            return None;
        }
        let positions = targets.iter().map(|v| self.scatter(*v)).collect();
        Some(self.push(JobKind::Reconstruction, &target.name, positions, targets, now, payload))
    }

    /// Advances every job by one tick and returns the payloads of the jobs
    /// that finished. Finished jobs are dropped together with their buffers.
    pub fn update(&mut self, now: Duration) -> Vec<T> {
        let damping = self.damping;
        for job in self.jobs.iter_mut() {
            job.step(damping);
        }

        let mut finished = Vec::new();
        let mut i = 0;
        while i < self.jobs.len() {
            if self.jobs[i].is_finished(now) {
                let job = self.jobs.remove(i);
                log::debug!("{:?} of {} finished", job.kind, job.source);
                finished.push(job.payload);
            } else {
                i += 1;
            }
        }
        finished
    }

    pub fn job(&self, handle: JobHandle) -> Option<&TransitionJob<T>> {
        self.jobs.iter().find(|job| job.handle == handle)
    }

    pub fn jobs(&self) -> impl Iterator<Item = &TransitionJob<T>> {
        self.jobs.iter()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// All live particles, packed for upload.
    pub fn particle_vertices(&self) -> Vec<ParticleVertex> {
        self.jobs
            .iter()
            .flat_map(|job| {
                job.positions
                    .iter()
                    .zip(job.colors.iter())
                    .map(|(p, c)| ParticleVertex {
                        position: (*p).into(),
                        color: *c,
                    })
            })
            .collect()
    }

    fn scatter(&mut self, v: Point3<f32>) -> Point3<f32> {
        let r = self.scatter_radius;
        v + Vector3::new(
            self.rng.gen_range(-r..=r),
            self.rng.gen_range(-r..=r),
            self.rng.gen_range(-r..=r),
        )
    }

    fn push(
        &mut self,
        kind: JobKind,
        source: &str,
        positions: Vec<Point3<f32>>,
        targets: Vec<Point3<f32>>,
        now: Duration,
        payload: T,
    ) -> JobHandle {
        let handle = JobHandle(self.next_handle);
        self.next_handle += 1;
        let colors = (0..positions.len())
            .map(|_| [self.rng.r#gen(), self.rng.r#gen(), self.rng.r#gen()])
            .collect();
        self.jobs.push(TransitionJob {
            handle,
            kind,
            source: source.to_string(),
            positions,
            targets,
            colors,
            started: now,
            duration: self.duration,
            payload,
        });
        handle
    }
}
