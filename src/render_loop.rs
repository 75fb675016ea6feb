//! Frame scheduling and the per-frame tick.
//!
//! [`RenderLoop`] keeps at most one frame request outstanding with its
//! [`FrameScheduler`] and re-arms itself each time a frame fires. [`tick`] is the
//! body of one frame: camera first, then idle motion, then the draw.

use crate::camera_controller::CameraController;
use crate::error::ViewerError;
use crate::input::InputState;
use crate::renderer::RenderBackend;
use crate::scene::GalleryScene;

/// Handle for one scheduled frame callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameRequest(pub u64);

/// A cancellable "call me on the next display refresh" primitive.
pub trait FrameScheduler {
    /// Schedule one callback and return its handle.
    fn request_frame(&mut self) -> FrameRequest;

    /// Cancel a callback that has not fired yet. Unknown handles are ignored.
    fn cancel_frame(&mut self, request: FrameRequest);
}

impl<S: FrameScheduler + ?Sized> FrameScheduler for Box<S> {
    fn request_frame(&mut self) -> FrameRequest {
        (**self).request_frame()
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        (**self).cancel_frame(request)
    }
}

/// Start/stop state of the continuous frame loop.
///
/// Dropping a running loop stops it.
pub struct RenderLoop<S: FrameScheduler> {
    scheduler: S,
    pending: Option<FrameRequest>,
    running: bool,
    frames: u64,
}

impl<S: FrameScheduler> RenderLoop<S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            scheduler,
            pending: None,
            running: false,
            frames: 0,
        }
    }

    /// Begin requesting frames. Starting a running loop does nothing.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.pending = Some(self.scheduler.request_frame());
        log::debug!("render loop started");
    }

    /// Cancel the outstanding request. Returns false if the loop was not running.
    pub fn stop(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        if let Some(request) = self.pending.take() {
            self.scheduler.cancel_frame(request);
        }
        log::debug!("render loop stopped after {} frames", self.frames);
        true
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn pending(&self) -> Option<FrameRequest> {
        self.pending
    }

    /// Frames accepted since construction.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// A scheduled callback fired. Returns true if the caller should run a tick.
    ///
    /// Stale or cancelled handles are rejected. An accepted frame re-arms the loop
    /// before the tick runs, so a tick that stops the loop cancels the new request.
    pub fn on_frame(&mut self, request: FrameRequest) -> bool {
        if !self.running || self.pending != Some(request) {
            return false;
        }
        self.frames += 1;
        self.pending = Some(self.scheduler.request_frame());
        true
    }
}

impl<S: FrameScheduler> Drop for RenderLoop<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// One simulation and draw step.
///
/// Returns true on the tick where the entry flythrough hands over to free
/// navigation.
pub fn tick(
    camera: &mut CameraController,
    input: &InputState,
    scene: &mut GalleryScene,
    backend: &mut dyn RenderBackend,
    elapsed: f32,
) -> Result<bool, ViewerError> {
    let entered = camera.update(input);
    scene.animate(elapsed);
    backend.draw(scene, &camera.camera())?;
    Ok(entered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera_controller::CameraBounds;
    use crate::config::CameraSettings;
    use crate::scene::{GalleryLayout, build_gallery};
    use crate::testing::{Journal, ManualScheduler, RecordingBackend};

    #[test]
    fn start_keeps_a_single_request_outstanding() {
        let journal = Journal::default();
        let mut render_loop = RenderLoop::new(ManualScheduler::new(&journal));
        render_loop.start();
        render_loop.start();
        assert_eq!(render_loop.scheduler().outstanding(), 1);

        for _ in 0..5 {
            let request = render_loop.scheduler().fire().unwrap();
            assert_eq!(render_loop.pending(), Some(request));
            assert!(render_loop.on_frame(request));
            assert_eq!(render_loop.scheduler().outstanding(), 1);
        }
        assert_eq!(render_loop.frames(), 5);
    }

    #[test]
    fn stop_twice_is_a_no_op() {
        let journal = Journal::default();
        let mut render_loop = RenderLoop::new(ManualScheduler::new(&journal));
        render_loop.start();
        assert!(render_loop.stop());
        assert!(!render_loop.stop());
        assert_eq!(journal.count("cancel frame"), 1);
        assert_eq!(render_loop.scheduler().outstanding(), 0);
    }

    #[test]
    fn cancelled_request_never_ticks() {
        let journal = Journal::default();
        let mut render_loop = RenderLoop::new(ManualScheduler::new(&journal));
        render_loop.start();
        let request = render_loop.pending().unwrap();
        render_loop.stop();
        assert!(!render_loop.on_frame(request));
        assert_eq!(render_loop.frames(), 0);
    }

    #[test]
    fn stale_request_is_rejected() {
        let journal = Journal::default();
        let mut render_loop = RenderLoop::new(ManualScheduler::new(&journal));
        render_loop.start();
        let first = render_loop.scheduler().fire().unwrap();
        assert!(render_loop.on_frame(first));
        assert!(!render_loop.on_frame(first));
    }

    #[test]
    fn dropping_a_running_loop_cancels_its_request() {
        let journal = Journal::default();
        let scheduler = ManualScheduler::new(&journal);
        {
            let mut render_loop = RenderLoop::new(scheduler.clone());
            render_loop.start();
        }
        assert_eq!(scheduler.outstanding(), 0);
        assert_eq!(journal.count("cancel frame"), 1);
    }

    #[test]
    fn tick_updates_the_camera_before_drawing() {
        let settings = CameraSettings::default();
        let mut scene = build_gallery(&GalleryLayout::default()).unwrap();
        let bounds = CameraBounds::from_dimensions(&scene.dimensions, &settings.clearance);
        let mut camera = CameraController::new(settings, bounds);
        let journal = Journal::default();
        let mut backend = RecordingBackend::new(&journal);
        let input = InputState::new();

        let start = camera.position();
        tick(&mut camera, &input, &mut scene, &mut backend, 0.0).unwrap();

        // The drawn pose is the one after this tick's update.
        assert_ne!(backend.last_camera().unwrap().position, start);
        assert_eq!(backend.last_camera().unwrap().position, camera.position());
        assert_eq!(journal.count("draw"), 1);
    }
}
