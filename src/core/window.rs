use std::sync::Arc;
use std::time::Duration;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::config::DisplayConfig;
use crate::error::DisplayError;

/// How long construction waits for the platform to hand out the window
const STARTUP_PUMP_LIMIT: usize = 100;
const STARTUP_PUMP_TIMEOUT: Duration = Duration::from_millis(10);

/// Framebuffer dimensions in device pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FramebufferSize {
    pub width: u32,
    pub height: u32,
}

impl FramebufferSize {
    /// Create new framebuffer size
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Zero-sized while the window is minimized
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn aspect_ratio(&self) -> Option<f32> {
        if self.is_empty() {
            return None;
        }
        Some(self.width as f32 / self.height as f32)
    }
}

impl From<PhysicalSize<u32>> for FramebufferSize {
    fn from(size: PhysicalSize<u32>) -> Self {
        Self::new(size.width, size.height)
    }
}

/// What one pass of the event pump observed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpOutcome {
    pub close_requested: bool,
    pub resized: Option<FramebufferSize>,
}

/// winit handler state shared between pumps
struct WindowEvents {
    attributes: WindowAttributes,
    window: Option<Arc<Window>>,
    create_error: Option<String>,
    close_requested: bool,
    resized: Option<FramebufferSize>,
}

impl ApplicationHandler for WindowEvents {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.create_error.is_some() {
            return;
        }
        match event_loop.create_window(self.attributes.clone()) {
            Ok(window) => self.window = Some(Arc::new(window)),
            Err(e) => self.create_error = Some(e.to_string()),
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.close_requested = true,
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => self.close_requested = true,
            WindowEvent::Resized(size) => self.resized = Some(size.into()),
            _ => {}
        }
    }
}

/// The OS window plus the event loop that feeds it
pub struct PresentationWindow {
    // window handle must go before the loop that created it
    events: WindowEvents,
    event_loop: EventLoop<()>,
}

impl PresentationWindow {
    /// Create the event loop and block until the window exists
    pub fn open(config: &DisplayConfig) -> Result<Self, DisplayError> {
        let mut event_loop = EventLoop::new().map_err(|e| DisplayError::EventLoop(e.to_string()))?;

        let attributes = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(LogicalSize::new(config.width, config.height))
            .with_resizable(config.resizable);

        let mut events = WindowEvents {
            attributes,
            window: None,
            create_error: None,
            close_requested: false,
            resized: None,
        };

        for _ in 0..STARTUP_PUMP_LIMIT {
            let status = event_loop.pump_app_events(Some(STARTUP_PUMP_TIMEOUT), &mut events);
            if let Some(err) = events.create_error.take() {
                return Err(DisplayError::Window(err));
            }
            if events.window.is_some() {
                break;
            }
            if let PumpStatus::Exit(code) = status {
                return Err(DisplayError::EventLoop(format!(
                    "event loop exited with code {code} before the window opened"
                )));
            }
        }

        if events.window.is_none() {
            return Err(DisplayError::Window(
                "platform never resumed the application".to_string(),
            ));
        }

        log::info!("window '{}' opened", config.title);
        Ok(Self { events, event_loop })
    }

    /// Shared window handle for surface creation
    pub fn handle(&self) -> Option<Arc<Window>> {
        self.events.window.clone()
    }

    /// Current inner size in physical pixels, zero while minimized
    pub fn framebuffer_size(&self) -> FramebufferSize {
        self.events
            .window
            .as_ref()
            .map(|w| w.inner_size().into())
            .unwrap_or_default()
    }

    /// Drain pending window events without blocking
    pub fn pump(&mut self) -> PumpOutcome {
        let status = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.events);
        if matches!(status, PumpStatus::Exit(_)) {
            self.events.close_requested = true;
        }

        PumpOutcome {
            close_requested: self.events.close_requested,
            resized: self.events.resized.take(),
        }
    }
}
