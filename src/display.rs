use crate::config::DisplayConfig;
use crate::core::{
    texture_format_for, FrameStage, GpuContext, PresentSurface, PresentationWindow, QuadPipeline,
};
use crate::error::DisplayError;
use crate::types::ImageFrame;

type Result<T> = std::result::Result<T, DisplayError>;

/// Live view window for camera frames
///
/// Each [`update`](Display::update) converts the frame to RGB, uploads it,
/// draws it letterboxed and presents. [`process_events`](Display::process_events)
/// must be called once per cycle; it returns false once the user asked to close.
pub struct Display {
    // declared in release order
    stage: Option<FrameStage>,
    pipeline: Option<QuadPipeline>,
    surface: Option<PresentSurface>,
    gpu: Option<GpuContext>,
    window: Option<PresentationWindow>,
}

impl Display {
    /// Open the window and build the GPU pipeline. Any failure is fatal and
    /// releases whatever had been created.
    pub fn new(config: DisplayConfig) -> Result<Self> {
        let window = PresentationWindow::open(&config)?;
        let handle = window
            .handle()
            .ok_or_else(|| DisplayError::Window("window closed during startup".to_string()))?;

        let instance = config.profile.instance();
        let surface = instance.create_surface(handle)?;
        let gpu = pollster::block_on(GpuContext::new_with_surface(
            &instance,
            &surface,
            config.profile,
        ))?;

        let surface = PresentSurface::new(
            surface,
            &gpu,
            window.framebuffer_size(),
            config.present_mode(),
        )?;
        let pipeline = QuadPipeline::new(&gpu, surface.format())?;
        let stage = FrameStage::new(&gpu, &pipeline, texture_format_for(surface.format()))?;

        log::info!("display initialized ({} profile)", config.profile);

        Ok(Self {
            stage: Some(stage),
            pipeline: Some(pipeline),
            surface: Some(surface),
            gpu: Some(gpu),
            window: Some(window),
        })
    }

    /// Show a new frame. The pixel data is fully consumed before returning.
    ///
    /// A rejected frame returns [`DisplayError::Frame`] and leaves the
    /// previous image on screen.
    pub fn update(&mut self, frame: &ImageFrame<'_>) -> Result<()> {
        let (Some(stage), Some(pipeline), Some(gpu)) =
            (self.stage.as_mut(), self.pipeline.as_ref(), self.gpu.as_ref())
        else {
            return Err(DisplayError::Released);
        };

        stage.accept(gpu, pipeline, frame)?;
        self.render()
    }

    /// Pump window events. Returns false once closing was requested or the
    /// display has been destroyed.
    pub fn process_events(&mut self) -> bool {
        let Some(window) = self.window.as_mut() else {
            return false;
        };

        let outcome = window.pump();
        if let (Some(size), Some(surface), Some(gpu)) =
            (outcome.resized, self.surface.as_mut(), self.gpu.as_ref())
        {
            surface.configure(gpu, size);
        }

        !outcome.close_requested
    }

    /// Release the texture, geometry, shader, surface and window in that
    /// order. Safe to call more than once; also runs on drop.
    pub fn destroy(&mut self) {
        if self.is_released() {
            return;
        }

        if let Some(mut stage) = self.stage.take() {
            stage.release();
        }
        if let Some(mut pipeline) = self.pipeline.take() {
            pipeline.release();
        }
        if self.surface.take().is_some() {
            log::debug!("released surface");
        }
        if self.gpu.take().is_some() {
            log::debug!("released device");
        }
        if self.window.take().is_some() {
            log::debug!("released window");
        }
        log::info!("display released");
    }

    fn is_released(&self) -> bool {
        self.stage.is_none()
            && self.pipeline.is_none()
            && self.surface.is_none()
            && self.gpu.is_none()
            && self.window.is_none()
    }

    fn render(&mut self) -> Result<()> {
        let (Some(stage), Some(pipeline), Some(surface), Some(gpu), Some(window)) = (
            self.stage.as_ref(),
            self.pipeline.as_mut(),
            self.surface.as_mut(),
            self.gpu.as_ref(),
            self.window.as_ref(),
        ) else {
            return Err(DisplayError::Released);
        };

        let framebuffer = window.framebuffer_size();
        if framebuffer.is_empty() {
            return Ok(());
        }
        if framebuffer != surface.size() {
            surface.configure(gpu, framebuffer);
        }

        let Some(frame) = surface.acquire(gpu)? else {
            return Ok(());
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });
        pipeline.draw(
            gpu,
            &mut encoder,
            &view,
            surface.size(),
            stage.image_aspect(),
            stage.texture(),
        )?;

        gpu.queue().submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

impl Drop for Display {
    fn drop(&mut self) {
        self.destroy();
    }
}
