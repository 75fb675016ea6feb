//! The viewer lifecycle: intro, fade-in, active gallery, teardown.
//!
//! Everything that exists only while the gallery is on screen lives in an
//! [`ActiveViewer`]: the scene, the camera, the input router, the frame loop,
//! the input listener and the render backend. Releasing it (explicitly or by
//! dropping it) stops the loop, detaches the listener and frees the backend, in
//! that order, exactly once.

use std::time::Instant;

use glam::Vec2;

use crate::camera_controller::{CameraBounds, CameraController};
use crate::config::ViewerConfig;
use crate::error::{TeardownError, ViewerError};
use crate::exhibits::{ExhibitId, ExhibitRecord, ExhibitRegistry};
use crate::input::{InputEvent, InputRouter, InputState};
use crate::picking;
use crate::render_loop::{self, FrameRequest, FrameScheduler, RenderLoop};
use crate::renderer::RenderBackend;
use crate::scene::{GalleryLayout, GalleryScene, build_gallery};

/// Where the viewer is in its enter/exit cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewerLifecycle {
    /// No 3D resources exist.
    Intro,
    /// Fading in; the gallery is built once the entry delay has passed.
    Entering { since: Instant },
    /// The gallery is built and the frame loop is running.
    Active,
    /// Releasing per-viewer resources.
    Teardown,
}

impl ViewerLifecycle {
    pub fn name(&self) -> &'static str {
        match self {
            ViewerLifecycle::Intro => "intro",
            ViewerLifecycle::Entering { .. } => "entering",
            ViewerLifecycle::Active => "active",
            ViewerLifecycle::Teardown => "tearing down",
        }
    }
}

/// A registered input listener. Detaching consumes it.
pub trait InputSubscription {
    fn id(&self) -> u64;
    fn detach(self: Box<Self>) -> Result<(), TeardownError>;
}

/// What the host environment provides to an active viewer.
pub trait Platform {
    fn frame_scheduler(&mut self) -> Box<dyn FrameScheduler>;
    fn subscribe_input(&mut self) -> Result<Box<dyn InputSubscription>, ViewerError>;
    fn create_backend(&mut self, scene: &GalleryScene)
    -> Result<Box<dyn RenderBackend>, ViewerError>;
    /// Size of the interactive surface in pixels.
    fn viewport(&self) -> (u32, u32);
}

/// Called with the selected exhibit, or `None` when a click hit nothing.
pub type SelectionCallback = Box<dyn FnMut(Option<&ExhibitRecord>)>;

/// Per-activation state. Owned by exactly one [`Viewer`].
pub struct ActiveViewer {
    scene: GalleryScene,
    camera: CameraController,
    router: InputRouter,
    render_loop: RenderLoop<Box<dyn FrameScheduler>>,
    subscription: Option<Box<dyn InputSubscription>>,
    backend: Option<Box<dyn RenderBackend>>,
    started: Instant,
    released: bool,
}

impl ActiveViewer {
    fn activate<P: Platform>(
        platform: &mut P,
        config: &ViewerConfig,
        layout: &GalleryLayout,
        now: Instant,
    ) -> Result<Self, ViewerError> {
        let scene = build_gallery(layout)?;

        let settings = config.camera.clone();
        let bounds = CameraBounds::from_dimensions(&scene.dimensions, &settings.clearance);
        let mut camera = CameraController::new(settings, bounds);
        let (width, height) = platform.viewport();
        if width > 0 && height > 0 {
            camera.set_aspect(width as f32 / height as f32);
        }
        let router = InputRouter::new(config.camera.click_threshold);

        let mut active = Self {
            scene,
            camera,
            router,
            render_loop: RenderLoop::new(platform.frame_scheduler()),
            subscription: None,
            backend: None,
            started: now,
            released: false,
        };

        // An early return drops `active`, which releases whatever was acquired.
        active.backend = Some(platform.create_backend(&active.scene)?);
        active.subscription = Some(platform.subscribe_input()?);
        active.render_loop.start();
        Ok(active)
    }

    pub fn scene(&self) -> &GalleryScene {
        &self.scene
    }

    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    pub fn input(&self) -> &InputState {
        self.router.state()
    }

    pub fn is_running(&self) -> bool {
        self.render_loop.is_running()
    }

    /// Stop the loop, detach the listener, free the backend.
    ///
    /// Runs once; later calls return no errors and release nothing.
    pub fn release(&mut self) -> Vec<TeardownError> {
        if self.released {
            return Vec::new();
        }
        self.released = true;

        let mut errors = Vec::new();
        self.render_loop.stop();
        self.router.reset();

        if let Some(subscription) = self.subscription.take() {
            let id = subscription.id();
            match subscription.detach() {
                Ok(()) => log::debug!("input listener {id} detached"),
                Err(e) => errors.push(e),
            }
        }
        if let Some(backend) = self.backend.take() {
            if let Err(e) = backend.release() {
                errors.push(e);
            }
        }
        self.scene.graph.clear();

        for error in &errors {
            log::warn!("teardown: {error}");
        }
        errors
    }
}

impl Drop for ActiveViewer {
    fn drop(&mut self) {
        self.release();
    }
}

/// The gallery engine as the host sees it.
///
/// ```ignore
/// let mut viewer = Viewer::new(platform, ViewerConfig::default());
/// viewer.on_select(|record| println!("{record:?}"));
/// viewer.enter_viewer(Instant::now())?;
/// // every host tick:
/// viewer.poll(Instant::now())?;
/// ```
pub struct Viewer<P: Platform> {
    platform: P,
    config: ViewerConfig,
    layout: GalleryLayout,
    registry: ExhibitRegistry,
    lifecycle: ViewerLifecycle,
    active: Option<ActiveViewer>,
    selected: Option<ExhibitId>,
    on_select: Option<SelectionCallback>,
}

impl<P: Platform> Viewer<P> {
    /// A viewer in intro showing the default six-relic gallery.
    pub fn new(platform: P, config: ViewerConfig) -> Self {
        Self {
            platform,
            config,
            layout: GalleryLayout::default(),
            registry: ExhibitRegistry::gallery(),
            lifecycle: ViewerLifecycle::Intro,
            active: None,
            selected: None,
            on_select: None,
        }
    }

    pub fn with_layout(mut self, layout: GalleryLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_registry(mut self, registry: ExhibitRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn on_select(&mut self, callback: impl FnMut(Option<&ExhibitRecord>) + 'static) {
        self.on_select = Some(Box::new(callback));
    }

    pub fn lifecycle(&self) -> ViewerLifecycle {
        self.lifecycle
    }

    /// True once the gallery has been built; hosts swap out their loading view on this.
    pub fn is_ready(&self) -> bool {
        self.lifecycle == ViewerLifecycle::Active && self.active.is_some()
    }

    pub fn active(&self) -> Option<&ActiveViewer> {
        self.active.as_ref()
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn registry(&self) -> &ExhibitRegistry {
        &self.registry
    }

    /// The exhibit of the last click, if it hit one.
    pub fn selected(&self) -> Option<&ExhibitId> {
        self.selected.as_ref()
    }

    /// Start the fade-in. Entering twice is harmless.
    pub fn enter_viewer(&mut self, now: Instant) -> Result<(), ViewerError> {
        match self.lifecycle {
            ViewerLifecycle::Intro => {
                log::info!("entering gallery");
                self.lifecycle = ViewerLifecycle::Entering { since: now };
                Ok(())
            }
            ViewerLifecycle::Entering { .. } => Ok(()),
            state => Err(ViewerError::InvalidTransition {
                action: "enter",
                state: state.name(),
            }),
        }
    }

    /// Advance time-driven transitions. Returns [`is_ready`](Self::is_ready).
    ///
    /// A construction or backend error sends the viewer back to intro.
    pub fn poll(&mut self, now: Instant) -> Result<bool, ViewerError> {
        if let ViewerLifecycle::Entering { since } = self.lifecycle {
            if now.saturating_duration_since(since) >= self.config.entry_delay {
                match ActiveViewer::activate(&mut self.platform, &self.config, &self.layout, now) {
                    Ok(active) => {
                        log::info!(
                            "gallery ready: {} nodes, {} exhibits",
                            active.scene.graph.len(),
                            active.scene.exhibits.len()
                        );
                        self.active = Some(active);
                        self.lifecycle = ViewerLifecycle::Active;
                    }
                    Err(e) => {
                        log::error!("could not open gallery: {e}");
                        self.lifecycle = ViewerLifecycle::Intro;
                        return Err(e);
                    }
                }
            }
        }
        Ok(self.is_ready())
    }

    /// Leave the gallery and release everything it held.
    ///
    /// Teardown failures are logged and returned but never keep the viewer out of intro.
    pub fn exit_viewer(&mut self) -> Vec<TeardownError> {
        let errors = match self.lifecycle {
            ViewerLifecycle::Intro => return Vec::new(),
            ViewerLifecycle::Entering { .. } => Vec::new(),
            ViewerLifecycle::Active | ViewerLifecycle::Teardown => {
                self.lifecycle = ViewerLifecycle::Teardown;
                self.active
                    .take()
                    .map(|mut active| active.release())
                    .unwrap_or_default()
            }
        };
        self.selected = None;
        self.lifecycle = ViewerLifecycle::Intro;
        log::info!("left gallery");
        errors
    }

    /// Route one input event. Returns true if it issued a pick query.
    ///
    /// Ignored unless the gallery is active.
    pub fn handle_input(&mut self, event: InputEvent) -> bool {
        let Some(active) = self.active.as_mut() else {
            return false;
        };

        let outcome = active.router.handle(event, &mut active.camera);
        if let Some((width, height)) = outcome.resize {
            if let Some(backend) = active.backend.as_mut() {
                backend.resize(width, height);
            }
        }

        let Some(point) = outcome.pick else {
            return false;
        };
        let (width, height) = self.platform.viewport();
        let hit = picking::pick(
            &active.scene.graph,
            &active.scene.pickable_roots(),
            &active.camera.camera(),
            point,
            Vec2::new(width as f32, height as f32),
        );
        self.select(hit);
        true
    }

    fn select(&mut self, hit: Option<ExhibitId>) {
        let record = hit.as_ref().and_then(|id| self.registry.lookup(id).ok());
        match record {
            Some(record) => log::info!("selected {} ({})", record.id, record.title),
            None => log::debug!("selection cleared"),
        }
        self.selected = record.map(|r| r.id.clone());
        if let Some(callback) = self.on_select.as_mut() {
            callback(record);
        }
    }

    /// A scheduled frame fired. Runs one tick if the request is still current.
    ///
    /// A draw failure tears the viewer down and is returned.
    pub fn on_frame(&mut self, request: FrameRequest, now: Instant) -> Result<(), ViewerError> {
        let Some(active) = self.active.as_mut() else {
            return Ok(());
        };
        if !active.render_loop.on_frame(request) {
            return Ok(());
        }

        let elapsed = now.saturating_duration_since(active.started).as_secs_f32();
        let Some(backend) = active.backend.as_deref_mut() else {
            return Ok(());
        };
        let result = render_loop::tick(
            &mut active.camera,
            active.router.state(),
            &mut active.scene,
            backend,
            elapsed,
        );

        if let Err(e) = result {
            log::error!("frame failed: {e}");
            self.exit_viewer();
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConstructionError;
    use crate::scene::{DesignVariant, ExhibitPlacement, GalleryDimensions};
    use crate::testing::TestPlatform;
    use glam::Vec3;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;
    use winit::event::MouseButton;

    fn active_viewer(platform: TestPlatform) -> (Viewer<TestPlatform>, Instant) {
        let mut viewer = Viewer::new(platform, ViewerConfig::default());
        let t0 = Instant::now();
        viewer.enter_viewer(t0).unwrap();
        let ready = viewer.poll(t0 + Duration::from_millis(150)).unwrap();
        assert!(ready);
        (viewer, t0)
    }

    fn run_frames(viewer: &mut Viewer<TestPlatform>, frames: usize, now: Instant) {
        for _ in 0..frames {
            let request = viewer.platform().scheduler.fire().unwrap();
            viewer.on_frame(request, now).unwrap();
        }
    }

    fn click(viewer: &mut Viewer<TestPlatform>, at: Vec2) -> bool {
        viewer.handle_input(InputEvent::PointerPressed {
            button: MouseButton::Left,
            position: at,
        });
        viewer.handle_input(InputEvent::PointerReleased {
            button: MouseButton::Left,
            position: at,
        })
    }

    #[test]
    fn readiness_waits_for_the_entry_delay() {
        let mut viewer = Viewer::new(TestPlatform::new(), ViewerConfig::default());
        let t0 = Instant::now();
        assert!(!viewer.is_ready());

        viewer.enter_viewer(t0).unwrap();
        assert!(!viewer.poll(t0 + Duration::from_millis(50)).unwrap());
        assert!(viewer.active().is_none());
        assert_eq!(viewer.platform().journal.count("create backend"), 0);

        assert!(viewer.poll(t0 + Duration::from_millis(100)).unwrap());
        assert_eq!(viewer.lifecycle(), ViewerLifecycle::Active);
        assert!(viewer.active().unwrap().is_running());
        assert_eq!(viewer.platform().live_listeners.get(), 1);
    }

    #[test]
    fn teardown_stops_the_loop_then_detaches_then_releases() {
        let (mut viewer, _) = active_viewer(TestPlatform::new());
        let errors = viewer.exit_viewer();
        assert!(errors.is_empty());
        assert_eq!(viewer.lifecycle(), ViewerLifecycle::Intro);

        let journal = &viewer.platform().journal;
        let cancel = journal.last_position("cancel frame").unwrap();
        let detach = journal.last_position("detach input").unwrap();
        let release = journal.last_position("release backend").unwrap();
        assert!(cancel < detach && detach < release, "{:?}", journal.entries());
    }

    #[test]
    fn repeated_enter_exit_leaks_nothing() {
        let mut viewer = Viewer::new(TestPlatform::new(), ViewerConfig::default());
        let mut now = Instant::now();
        for _ in 0..5 {
            viewer.enter_viewer(now).unwrap();
            now += Duration::from_millis(200);
            viewer.poll(now).unwrap();
            run_frames(&mut viewer, 3, now);
            viewer.exit_viewer();
        }

        let platform = viewer.platform();
        assert_eq!(platform.live_listeners.get(), 0);
        assert_eq!(platform.live_backends.get(), 0);
        assert_eq!(platform.scheduler.outstanding(), 0);
        assert_eq!(platform.journal.count("release backend"), 5);
        assert_eq!(platform.journal.count("detach input"), 5);
    }

    #[test]
    fn exiting_twice_releases_once() {
        let (mut viewer, _) = active_viewer(TestPlatform::new());
        viewer.exit_viewer();
        assert!(viewer.exit_viewer().is_empty());
        assert_eq!(viewer.platform().journal.count("release backend"), 1);
        assert_eq!(viewer.platform().journal.count("cancel frame"), 1);
    }

    #[test]
    fn dropping_the_viewer_releases_everything() {
        let platform = TestPlatform::new();
        let listeners = platform.live_listeners.clone();
        let backends = platform.live_backends.clone();
        {
            let (_viewer, _) = active_viewer(platform);
            assert_eq!(listeners.get(), 1);
        }
        assert_eq!(listeners.get(), 0);
        assert_eq!(backends.get(), 0);
    }

    #[test]
    fn invalid_layout_keeps_the_viewer_in_intro() {
        let layout = GalleryLayout::new(GalleryDimensions::default())
            .place(ExhibitPlacement::new("relic1", Vec3::ZERO, DesignVariant::Geometry))
            .place(ExhibitPlacement::new("relic1", Vec3::X, DesignVariant::Future));
        let mut viewer =
            Viewer::new(TestPlatform::new(), ViewerConfig::default()).with_layout(layout);
        let t0 = Instant::now();
        viewer.enter_viewer(t0).unwrap();

        let err = viewer.poll(t0 + Duration::from_secs(1)).unwrap_err();
        assert!(matches!(
            err,
            ViewerError::Construction(ConstructionError::DuplicateExhibit(_))
        ));
        assert_eq!(viewer.lifecycle(), ViewerLifecycle::Intro);
        assert_eq!(viewer.platform().journal.count("create backend"), 0);
        assert_eq!(viewer.platform().scheduler.outstanding(), 0);
    }

    #[test]
    fn backend_failure_releases_what_was_acquired() {
        let mut platform = TestPlatform::new();
        platform.fail_backend = true;
        let mut viewer = Viewer::new(platform, ViewerConfig::default());
        let t0 = Instant::now();
        viewer.enter_viewer(t0).unwrap();
        assert!(matches!(
            viewer.poll(t0 + Duration::from_secs(1)),
            Err(ViewerError::Backend(_))
        ));
        assert_eq!(viewer.lifecycle(), ViewerLifecycle::Intro);
        assert_eq!(viewer.platform().live_listeners.get(), 0);
    }

    #[test]
    fn release_failure_is_reported_but_does_not_block_exit() {
        let mut platform = TestPlatform::new();
        platform.fail_release = true;
        let (mut viewer, t0) = active_viewer(platform);
        let errors = viewer.exit_viewer();
        assert_eq!(
            errors,
            vec![TeardownError::BackendRelease("buffer still mapped".into())]
        );
        assert_eq!(viewer.lifecycle(), ViewerLifecycle::Intro);
        assert_eq!(viewer.platform().live_listeners.get(), 0);

        // And the viewer can be entered again.
        viewer.platform_mut().fail_release = false;
        viewer.enter_viewer(t0).unwrap();
        assert!(viewer.poll(t0 + Duration::from_secs(1)).unwrap());
    }

    #[test]
    fn draw_failure_tears_the_viewer_down() {
        let mut platform = TestPlatform::new();
        platform.fail_draw = true;
        let (mut viewer, t0) = active_viewer(platform);
        let request = viewer.platform().scheduler.fire().unwrap();
        assert!(viewer.on_frame(request, t0).is_err());
        assert_eq!(viewer.lifecycle(), ViewerLifecycle::Intro);
        assert_eq!(viewer.platform().live_backends.get(), 0);
        assert_eq!(viewer.platform().scheduler.outstanding(), 0);
    }

    #[test]
    fn entering_while_active_is_rejected() {
        let (mut viewer, t0) = active_viewer(TestPlatform::new());
        assert!(matches!(
            viewer.enter_viewer(t0),
            Err(ViewerError::InvalidTransition { action: "enter", state: "active" })
        ));
    }

    #[test]
    fn input_is_ignored_until_active() {
        let mut viewer = Viewer::new(TestPlatform::new(), ViewerConfig::default());
        assert!(!click(&mut viewer, Vec2::new(400.0, 300.0)));
        assert!(!viewer.handle_input(InputEvent::Resized {
            width: 10,
            height: 10
        }));
    }

    #[test]
    fn resize_reaches_the_backend() {
        let (mut viewer, _) = active_viewer(TestPlatform::new());
        viewer.handle_input(InputEvent::Resized {
            width: 1024,
            height: 768,
        });
        assert_eq!(viewer.platform().journal.count("resize 1024x768"), 1);
    }

    #[test]
    fn clicks_only_pick_once_the_camera_is_free() {
        let (mut viewer, t0) = active_viewer(TestPlatform::new());
        let center = Vec2::new(400.0, 300.0);
        assert!(!click(&mut viewer, center));

        run_frames(&mut viewer, 250, t0);
        assert!(viewer.active().unwrap().camera().is_free());
        assert!(click(&mut viewer, center));
    }

    #[test]
    fn clicking_a_frame_selects_its_record() {
        let (mut viewer, t0) = active_viewer(TestPlatform::new());
        let seen: Rc<RefCell<Vec<Option<&'static str>>>> = Rc::default();
        let sink = seen.clone();
        viewer.on_select(move |record| sink.borrow_mut().push(record.map(|r| r.title)));
        run_frames(&mut viewer, 250, t0);

        // Turn toward relic3 with a drag, then click the middle of the screen.
        let active = viewer.active().unwrap();
        let root = active.scene().exhibit_root(&"relic3".into()).unwrap();
        let target = active
            .scene()
            .graph
            .global_transform(root)
            .unwrap()
            .transform_point3(Vec3::ZERO);
        let camera = active.camera();
        let to = (target - camera.position()).normalize();
        let k = camera.settings().look_sensitivity;
        let dx = -(to.x.atan2(-to.z) - camera.yaw()) / k;
        let dy = -(to.y.asin() - camera.pitch()) / k;

        let start = Vec2::new(100.0, 300.0);
        viewer.handle_input(InputEvent::PointerPressed {
            button: MouseButton::Left,
            position: start,
        });
        viewer.handle_input(InputEvent::PointerMoved {
            position: start + Vec2::new(dx, dy),
        });
        assert!(!viewer.handle_input(InputEvent::PointerReleased {
            button: MouseButton::Left,
            position: start + Vec2::new(dx, dy),
        }));

        assert!(click(&mut viewer, Vec2::new(400.0, 300.0)));
        assert_eq!(viewer.selected(), Some(&"relic3".into()));

        // Empty space clears the selection.
        viewer.handle_input(InputEvent::PointerPressed {
            button: MouseButton::Left,
            position: start,
        });
        viewer.handle_input(InputEvent::PointerMoved {
            position: start + Vec2::new(-dx, 0.0),
        });
        viewer.handle_input(InputEvent::PointerReleased {
            button: MouseButton::Left,
            position: start + Vec2::new(-dx, 0.0),
        });
        // Looking down at the floor: nothing pickable.
        viewer.handle_input(InputEvent::PointerPressed {
            button: MouseButton::Left,
            position: start,
        });
        viewer.handle_input(InputEvent::PointerMoved {
            position: start + Vec2::new(0.0, 400.0),
        });
        viewer.handle_input(InputEvent::PointerReleased {
            button: MouseButton::Left,
            position: start + Vec2::new(0.0, 400.0),
        });
        assert!(click(&mut viewer, Vec2::new(400.0, 300.0)));
        assert_eq!(viewer.selected(), None);

        assert_eq!(
            *seen.borrow(),
            vec![Some("Relic III: Sacred Geometry"), None]
        );
    }
}
