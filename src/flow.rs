//! Tour session and application event loop.
//!
//! [`Tour`] is the whole interactive state: path, camera, placed buildings,
//! their swap sequences and the particle jobs. It is advanced by
//! [`Tour::tick`] once per frame and fed input through
//! [`Tour::handle_input`]. It never draws; a [`Renderer`] receives a
//! [`Frame`] that borrows everything needed to draw one picture.
//!
//! [`run`] wires a tour to a winit window. Nothing is loaded, ticked or
//! reacted to until the intro signals it is done via [`IntroHandle::finish`].
//!
//! # Frame lifecycle
//!
//! 1. finished particle jobs are handed back to their swap sequences
//! 2. swap steps whose delay expired run
//! 3. the proximity probe ahead of the camera starts new swaps
//! 4. the renderer draws the frame

use std::{rc::Rc, sync::Arc};

use cgmath::{Matrix4, Point3};
use instant::Duration;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    window::{Window, WindowId},
};

use crate::{
    camera::{CameraPose, CameraRig},
    clock::{Clock, InstantClock},
    context::{Projection, TourConfig},
    data_structures::{
        instance::InstanceRaw,
        scene_graph::{NodeId, Scene, SceneGraph, SceneNode},
    },
    effect::TransitionEffect,
    input::{InputEvent, InputTranslator},
    path::PathModel,
    placement::{Placement, place_models},
    resources::{AssetLoader, DEFAULT_MODEL_NAMES, LoadedAssets, load_assets},
    swap::{Completion, SlotRegistry, SwapStateMachine},
};

/// Everything a renderer needs for one picture. Only valid for the frame it
/// was taken in.
pub struct Frame<'a, S: Scene = SceneGraph> {
    pub scene: &'a S,
    pub pose: CameraPose,
    pub projection: &'a Projection,
    pub effect: &'a TransitionEffect<Completion>,
    pub ribbon: NodeId,
    /// Spotlight position and target pairs along the path.
    pub lights: &'a [(Point3<f32>, Point3<f32>)],
}

impl<S: Scene> Frame<'_, S> {
    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection.calc_matrix() * self.pose.view_matrix()
    }
}

impl Frame<'_, SceneGraph> {
    /// Model matrix of every visible object, ready for an instance buffer.
    pub fn instances(&self) -> Vec<(NodeId, InstanceRaw)> {
        self.scene
            .visible()
            .map(|(id, node)| (id, node.transform.to_raw()))
            .collect()
    }
}

pub trait Renderer<S: Scene = SceneGraph> {
    fn render(&mut self, frame: &Frame<'_, S>);
}

pub struct Tour<S: Scene = SceneGraph> {
    config: TourConfig,
    path: PathModel,
    rig: CameraRig,
    projection: Projection,
    placements: Vec<Placement>,
    swaps: SwapStateMachine,
    effect: TransitionEffect<Completion>,
    scene: S,
    ribbon: NodeId,
    lights: Vec<(Point3<f32>, Point3<f32>)>,
}

impl<S: Scene> Tour<S> {
    /// Lays out the path and puts the original of every asset into `scene`.
    pub fn new(config: TourConfig, assets: LoadedAssets, mut scene: S) -> Self {
        let path = PathModel::new(&config.control_points, config.tension, config.sample_count);
        let rig = CameraRig::new(&config, &path);
        let projection = Projection::from_config(&config, 1, 1);

        let ribbon = scene.add(SceneNode::with_mesh(
            "path ribbon",
            path.ribbon(
                config.ribbon_segments,
                config.ribbon_width,
                config.ribbon_height_offset,
            ),
        ));
        let lights = path.light_anchors(config.light_spacing, config.light_height);

        let names: Vec<&str> = assets.iter().map(|asset| asset.name.as_str()).collect();
        let placements = place_models(&path, &names, &config);

        // placement indices grow with the asset index, so dropped assets are a suffix
        let mut registry = SlotRegistry::new();
        for (asset, placement) in assets.into_iter().zip(placements.iter()) {
            registry.register(placement, asset.original, asset.renewal, &mut scene);
        }
        log::info!(
            "placed {} buildings along a path of length {:.1}",
            registry.len(),
            path.length()
        );

        let swaps = SwapStateMachine::new(registry, &config);
        let effect = TransitionEffect::new(&config);
        Self {
            config,
            path,
            rig,
            projection,
            placements,
            swaps,
            effect,
            scene,
            ribbon,
            lights,
        }
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::Scroll { delta_y } => self.rig.on_scroll(delta_y, &self.path),
            InputEvent::DragStart { x, y } => self.rig.on_drag_start(x, y, &self.path),
            InputEvent::DragMove { x, y } => self.rig.on_drag_move(x, y, &self.path),
            InputEvent::DragEnd => self.rig.on_drag_end(),
            InputEvent::Resize { width, height } => self.projection.resize(width, height),
        }
    }

    /// Advances particles and swap sequences to `now`.
    pub fn tick(&mut self, now: Duration) {
        for completion in self.effect.update(now) {
            self.swaps.on_job_complete(completion, now, &mut self.scene);
        }
        self.swaps.run_due(now, &mut self.scene, &mut self.effect);

        let probe = self
            .path
            .look_ahead_point(self.rig.path_position(), self.config.swap_look_ahead);
        self.swaps
            .evaluate(probe, now, &mut self.scene, &mut self.effect);
    }

    pub fn frame(&self) -> Frame<'_, S> {
        Frame {
            scene: &self.scene,
            pose: self.rig.pose(),
            projection: &self.projection,
            effect: &self.effect,
            ribbon: self.ribbon,
            lights: &self.lights,
        }
    }

    /// Removes everything the tour added to the scene and hands the scene back.
    pub fn teardown(mut self) -> S {
        self.swaps.teardown(&mut self.scene);
        self.scene.remove(self.ribbon);
        self.scene
    }

    pub fn config(&self) -> &TourConfig {
        &self.config
    }

    pub fn path(&self) -> &PathModel {
        &self.path
    }

    pub fn rig(&self) -> &CameraRig {
        &self.rig
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn swaps(&self) -> &SwapStateMachine {
        &self.swaps
    }

    pub fn effect(&self) -> &TransitionEffect<Completion> {
        &self.effect
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn lights(&self) -> &[(Point3<f32>, Point3<f32>)] {
        &self.lights
    }
}

#[derive(Debug)]
pub enum TourEvent {
    IntroFinished,
    Loaded(LoadedAssets),
}

/// Lets the intro tell the event loop that the tour may start.
#[derive(Clone)]
pub struct IntroHandle {
    proxy: EventLoopProxy<TourEvent>,
}

impl IntroHandle {
    pub fn finish(&self) {
        if self.proxy.send_event(TourEvent::IntroFinished).is_err() {
            log::warn!("intro finished after the event loop was closed");
        }
    }
}

struct App<L: AssetLoader + 'static, R: Renderer> {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    #[cfg(target_arch = "wasm32")]
    proxy: EventLoopProxy<TourEvent>,
    config: TourConfig,
    loader: Rc<L>,
    renderer: R,
    window: Option<Arc<Window>>,
    input: InputTranslator,
    clock: InstantClock,
    intro_finished: bool,
    loading: bool,
    tour: Option<Tour>,
}

impl<L: AssetLoader + 'static, R: Renderer> App<L, R> {
    fn new(
        event_loop: &EventLoop<TourEvent>,
        config: TourConfig,
        loader: L,
        renderer: R,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime: tokio::runtime::Runtime::new()?,
            #[cfg(target_arch = "wasm32")]
            proxy: event_loop.create_proxy(),
            config,
            loader: Rc::new(loader),
            renderer,
            window: None,
            input: InputTranslator::new(),
            clock: InstantClock::new(),
            intro_finished: false,
            loading: false,
            tour: None,
        })
    }

    fn start_loading(&mut self) {
        if self.loading || self.tour.is_some() {
            return;
        }
        self.loading = true;
        log::info!("intro finished, loading {} buildings", DEFAULT_MODEL_NAMES.len());

        #[cfg(not(target_arch = "wasm32"))]
        {
            let assets = self
                .async_runtime
                .block_on(load_assets(&*self.loader, &DEFAULT_MODEL_NAMES));
            self.start_tour(assets);
        }

        #[cfg(target_arch = "wasm32")]
        {
            let loader = self.loader.clone();
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let assets = load_assets(&*loader, &DEFAULT_MODEL_NAMES).await;
                if proxy.send_event(TourEvent::Loaded(assets)).is_err() {
                    log::warn!("buildings loaded after the event loop was closed");
                }
            });
        }
    }

    fn start_tour(&mut self, assets: LoadedAssets) {
        self.loading = false;
        let mut tour = Tour::new(self.config.clone(), assets, SceneGraph::new());
        if let Some(window) = &self.window {
            let size = window.inner_size();
            tour.handle_input(InputEvent::Resize {
                width: size.width,
                height: size.height,
            });
            window.request_redraw();
        }
        self.tour = Some(tour);
    }
}

impl<L: AssetLoader + 'static, R: Renderer> ApplicationHandler<TourEvent> for App<L, R> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title("flow tour");

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let canvas = web_sys::window()
                .and_then(|window| window.document())
                .and_then(|document| document.get_element_by_id(CANVAS_ID))
                .map(|canvas| canvas.unchecked_into());
            if canvas.is_none() {
                log::warn!("no #{} element, letting winit create a canvas", CANVAS_ID);
            }
            window_attributes = window_attributes.with_canvas(canvas);
        }

        match event_loop.create_window(window_attributes) {
            Ok(window) => self.window = Some(Arc::new(window)),
            Err(e) => {
                log::error!("Cannot create the main window: {}", e);
                event_loop.exit();
                return;
            }
        }
        if self.intro_finished {
            self.start_loading();
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: TourEvent) {
        match event {
            TourEvent::IntroFinished => {
                self.intro_finished = true;
                if self.window.is_some() {
                    self.start_loading();
                }
            }
            TourEvent::Loaded(assets) => self.start_tour(assets),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        if let WindowEvent::CloseRequested = event {
            if let Some(tour) = self.tour.take() {
                tour.teardown();
            }
            event_loop.exit();
            return;
        }

        // input is tracked even before the tour exists so the button state stays right
        let input = self.input.translate(&event);
        let Some(tour) = &mut self.tour else {
            return;
        };
        if let Some(input) = input {
            tour.handle_input(input);
        }

        if let WindowEvent::RedrawRequested = event {
            tour.tick(self.clock.now());
            self.renderer.render(&tour.frame());
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
    }
}

/// Opens the window and runs the tour until it is closed.
///
/// `intro` receives the handle used to signal that the intro is over; it may
/// call [`IntroHandle::finish`] right away or keep the handle for later.
pub fn run<L, R>(
    config: TourConfig,
    loader: L,
    renderer: R,
    intro: impl FnOnce(IntroHandle),
) -> anyhow::Result<()>
where
    L: AssetLoader + 'static,
    R: Renderer,
{
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("Could not initialize logger: {}", e).into());
        }
    }

    let event_loop: EventLoop<TourEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop, config, loader, renderer)?;
    intro(IntroHandle {
        proxy: event_loop.create_proxy(),
    });

    event_loop.run_app(&mut app)?;

    Ok(())
}
