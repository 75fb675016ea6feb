//! The winit host: one window, an intro state, and the gallery viewer.
//!
//! Enter walks into the gallery, Escape walks back out (or quits from the
//! intro). Selections are reported through the log.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorIcon, Window, WindowAttributes, WindowId};

use crate::config::ViewerConfig;
use crate::error::{TeardownError, ViewerError};
use crate::exhibits::ExhibitRecord;
use crate::input::WindowEventTranslator;
use crate::render_loop::{FrameRequest, FrameScheduler};
use crate::renderer::{GpuRenderer, RenderBackend};
use crate::scene::GalleryScene;
use crate::viewer::{InputSubscription, Platform, Viewer, ViewerLifecycle};

/// Redraw requests double as frame callbacks. winit cannot cancel a redraw, so
/// cancelling forgets the handle and the redraw arrives with nothing to run.
#[derive(Debug, Default)]
struct RedrawSlot {
    next: u64,
    pending: Option<FrameRequest>,
}

struct RedrawScheduler {
    window: Arc<Window>,
    slot: Rc<RefCell<RedrawSlot>>,
}

impl FrameScheduler for RedrawScheduler {
    fn request_frame(&mut self) -> FrameRequest {
        let mut slot = self.slot.borrow_mut();
        slot.next += 1;
        let request = FrameRequest(slot.next);
        slot.pending = Some(request);
        self.window.request_redraw();
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        let mut slot = self.slot.borrow_mut();
        if slot.pending == Some(request) {
            slot.pending = None;
        }
    }
}

/// Window events reach the viewer only while a subscription is attached.
struct WindowSubscription {
    id: u64,
    attached: Rc<Cell<Option<u64>>>,
}

impl InputSubscription for WindowSubscription {
    fn id(&self) -> u64 {
        self.id
    }

    fn detach(self: Box<Self>) -> Result<(), TeardownError> {
        if self.attached.get() == Some(self.id) {
            self.attached.set(None);
            Ok(())
        } else {
            Err(TeardownError::ListenerNotAttached(self.id))
        }
    }
}

struct WinitPlatform {
    window: Arc<Window>,
    redraw: Rc<RefCell<RedrawSlot>>,
    attached: Rc<Cell<Option<u64>>>,
    next_listener: u64,
}

impl WinitPlatform {
    fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            redraw: Rc::default(),
            attached: Rc::default(),
            next_listener: 0,
        }
    }

    fn listening(&self) -> bool {
        self.attached.get().is_some()
    }

    fn take_frame(&self) -> Option<FrameRequest> {
        self.redraw.borrow_mut().pending.take()
    }
}

impl Platform for WinitPlatform {
    fn frame_scheduler(&mut self) -> Box<dyn FrameScheduler> {
        Box::new(RedrawScheduler {
            window: self.window.clone(),
            slot: self.redraw.clone(),
        })
    }

    fn subscribe_input(&mut self) -> Result<Box<dyn InputSubscription>, ViewerError> {
        if let Some(id) = self.attached.get() {
            return Err(ViewerError::Backend(format!(
                "input listener {id} is still attached"
            )));
        }
        self.next_listener += 1;
        self.attached.set(Some(self.next_listener));
        Ok(Box::new(WindowSubscription {
            id: self.next_listener,
            attached: self.attached.clone(),
        }))
    }

    fn create_backend(
        &mut self,
        scene: &GalleryScene,
    ) -> Result<Box<dyn RenderBackend>, ViewerError> {
        Ok(Box::new(GpuRenderer::new(self.window.clone(), scene)?))
    }

    fn viewport(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }
}

/// Open the window and run until it is closed.
///
/// ```no_run
/// vitrine::run(vitrine::ViewerConfig::new().title("Gallery")).unwrap();
/// ```
pub fn run(config: ViewerConfig) -> Result<(), ViewerError> {
    let event_loop = EventLoop::new().map_err(|e| ViewerError::Backend(e.to_string()))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = VitrineApp::Pending {
        config: Some(config),
    };
    event_loop
        .run_app(&mut app)
        .map_err(|e| ViewerError::Backend(e.to_string()))
}

enum VitrineApp {
    Pending {
        config: Option<ViewerConfig>,
    },
    Running {
        window: Arc<Window>,
        viewer: Viewer<WinitPlatform>,
        translator: WindowEventTranslator,
        cursor: CursorIcon,
    },
}

fn log_selection(record: Option<&ExhibitRecord>) {
    match record {
        Some(r) => log::info!(
            "{} ({}) | {} | {} | {}",
            r.title,
            r.year,
            r.materials,
            r.dimensions,
            r.description
        ),
        None => log::info!("nothing selected"),
    }
}

impl ApplicationHandler for VitrineApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let VitrineApp::Pending { config } = self else {
            return;
        };
        let Some(config) = config.take() else {
            return;
        };

        let window_attrs = WindowAttributes::default()
            .with_title(&config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("could not create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let mut viewer = Viewer::new(WinitPlatform::new(window.clone()), config);
        viewer.on_select(log_selection);
        log::info!("press Enter to walk into the gallery, Escape to leave");

        *self = VitrineApp::Running {
            window,
            viewer,
            translator: WindowEventTranslator::new(),
            cursor: CursorIcon::Default,
        };
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let VitrineApp::Running {
            window,
            viewer,
            translator,
            cursor,
        } = self
        else {
            return;
        };

        if let WindowEvent::KeyboardInput { event: key, .. } = &event {
            if key.state == ElementState::Pressed && !key.repeat {
                match (key.physical_key, viewer.lifecycle()) {
                    (PhysicalKey::Code(KeyCode::Enter), ViewerLifecycle::Intro) => {
                        if let Err(e) = viewer.enter_viewer(Instant::now()) {
                            log::warn!("{e}");
                        }
                    }
                    (PhysicalKey::Code(KeyCode::Escape), ViewerLifecycle::Intro) => {
                        event_loop.exit();
                    }
                    (PhysicalKey::Code(KeyCode::Escape), _) => {
                        viewer.exit_viewer();
                    }
                    _ => {}
                }
            }
        }

        if viewer.platform().listening() {
            if let Some(input) = translator.translate(&event) {
                viewer.handle_input(input);
            }
        } else {
            // Keep the cursor position current for the first click after entering.
            translator.translate(&event);
        }

        match event {
            WindowEvent::CloseRequested => {
                viewer.exit_viewer();
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                if let Some(request) = viewer.platform().take_frame() {
                    if let Err(e) = viewer.on_frame(request, Instant::now()) {
                        log::error!("{e}");
                    }
                }
            }
            _ => {}
        }

        let wanted = match viewer.active() {
            Some(active) if active.input().is_dragging() => CursorIcon::Grabbing,
            Some(_) => CursorIcon::Grab,
            None => CursorIcon::Default,
        };
        if wanted != *cursor {
            window.set_cursor(wanted);
            *cursor = wanted;
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let VitrineApp::Running { viewer, .. } = self {
            if let Err(e) = viewer.poll(Instant::now()) {
                log::error!("{e}");
            }
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let VitrineApp::Running { viewer, .. } = self {
            viewer.exit_viewer();
        }
    }
}
