//! In-memory stand-ins for the frame scheduler, input surface and render backend.
//!
//! Every double writes to a shared [`Journal`] so tests can assert the order in
//! which resources are acquired and released.

use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::rc::Rc;

use crate::camera::Camera;
use crate::error::{TeardownError, ViewerError};
use crate::render_loop::{FrameRequest, FrameScheduler};
use crate::renderer::RenderBackend;
use crate::scene::GalleryScene;
use crate::viewer::{InputSubscription, Platform};

/// Shared, ordered log of lifecycle events.
#[derive(Clone, Debug, Default)]
pub struct Journal(Rc<RefCell<Vec<String>>>);

impl Journal {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.borrow_mut().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    /// Entries starting with `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.0.borrow().iter().filter(|e| e.starts_with(prefix)).count()
    }

    /// Index of the last entry starting with `prefix`.
    pub fn last_position(&self, prefix: &str) -> Option<usize> {
        self.0.borrow().iter().rposition(|e| e.starts_with(prefix))
    }
}

#[derive(Debug, Default)]
struct SchedulerState {
    next: u64,
    outstanding: BTreeSet<u64>,
}

/// Frame scheduler fired by hand.
#[derive(Clone, Debug)]
pub struct ManualScheduler {
    state: Rc<RefCell<SchedulerState>>,
    journal: Journal,
}

impl ManualScheduler {
    pub fn new(journal: &Journal) -> Self {
        Self {
            state: Rc::default(),
            journal: journal.clone(),
        }
    }

    /// Requests neither fired nor cancelled.
    pub fn outstanding(&self) -> usize {
        self.state.borrow().outstanding.len()
    }

    /// Take the newest outstanding request, as a display refresh would.
    pub fn fire(&self) -> Option<FrameRequest> {
        let mut state = self.state.borrow_mut();
        let id = state.outstanding.iter().next_back().copied()?;
        state.outstanding.remove(&id);
        Some(FrameRequest(id))
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameRequest {
        let mut state = self.state.borrow_mut();
        state.next += 1;
        let id = state.next;
        state.outstanding.insert(id);
        FrameRequest(id)
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        if self.state.borrow_mut().outstanding.remove(&request.0) {
            self.journal.push(format!("cancel frame {}", request.0));
        }
    }
}

/// Input listener that counts itself in and out.
pub struct RecordingSubscription {
    id: u64,
    live: Rc<Cell<i64>>,
    journal: Journal,
}

impl InputSubscription for RecordingSubscription {
    fn id(&self) -> u64 {
        self.id
    }

    fn detach(self: Box<Self>) -> Result<(), TeardownError> {
        self.live.set(self.live.get() - 1);
        self.journal.push(format!("detach input {}", self.id));
        Ok(())
    }
}

/// Backend that records draws instead of drawing.
pub struct RecordingBackend {
    journal: Journal,
    live: Rc<Cell<i64>>,
    last_camera: Option<Camera>,
    fail_draw: bool,
    fail_release: bool,
}

impl RecordingBackend {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            live: Rc::default(),
            last_camera: None,
            fail_draw: false,
            fail_release: false,
        }
    }

    pub fn last_camera(&self) -> Option<Camera> {
        self.last_camera
    }
}

impl RenderBackend for RecordingBackend {
    fn resize(&mut self, width: u32, height: u32) {
        self.journal.push(format!("resize {width}x{height}"));
    }

    fn draw(&mut self, _scene: &GalleryScene, camera: &Camera) -> Result<(), ViewerError> {
        if self.fail_draw {
            return Err(ViewerError::Backend("device lost".into()));
        }
        self.last_camera = Some(*camera);
        self.journal.push("draw");
        Ok(())
    }

    fn release(self: Box<Self>) -> Result<(), TeardownError> {
        self.live.set(self.live.get() - 1);
        self.journal.push("release backend");
        if self.fail_release {
            Err(TeardownError::BackendRelease("buffer still mapped".into()))
        } else {
            Ok(())
        }
    }
}

/// A [`Platform`] made of the recording doubles above.
pub struct TestPlatform {
    pub journal: Journal,
    pub scheduler: ManualScheduler,
    pub viewport: (u32, u32),
    pub live_listeners: Rc<Cell<i64>>,
    pub live_backends: Rc<Cell<i64>>,
    pub fail_backend: bool,
    pub fail_draw: bool,
    pub fail_release: bool,
    next_listener: u64,
}

impl TestPlatform {
    pub fn new() -> Self {
        let journal = Journal::default();
        Self {
            scheduler: ManualScheduler::new(&journal),
            journal,
            viewport: (800, 600),
            live_listeners: Rc::default(),
            live_backends: Rc::default(),
            fail_backend: false,
            fail_draw: false,
            fail_release: false,
            next_listener: 0,
        }
    }
}

impl Platform for TestPlatform {
    fn frame_scheduler(&mut self) -> Box<dyn FrameScheduler> {
        Box::new(self.scheduler.clone())
    }

    fn subscribe_input(&mut self) -> Result<Box<dyn InputSubscription>, ViewerError> {
        self.next_listener += 1;
        self.live_listeners.set(self.live_listeners.get() + 1);
        self.journal.push(format!("attach input {}", self.next_listener));
        Ok(Box::new(RecordingSubscription {
            id: self.next_listener,
            live: self.live_listeners.clone(),
            journal: self.journal.clone(),
        }))
    }

    fn create_backend(
        &mut self,
        _scene: &GalleryScene,
    ) -> Result<Box<dyn RenderBackend>, ViewerError> {
        if self.fail_backend {
            return Err(ViewerError::Backend("no adapter".into()));
        }
        self.live_backends.set(self.live_backends.get() + 1);
        self.journal.push("create backend");
        let mut backend = RecordingBackend::new(&self.journal);
        backend.live = self.live_backends.clone();
        backend.fail_draw = self.fail_draw;
        backend.fail_release = self.fail_release;
        Ok(Box::new(backend))
    }

    fn viewport(&self) -> (u32, u32) {
        self.viewport
    }
}
