use wgpu::{Surface, SurfaceCapabilities, SurfaceConfiguration, SurfaceTexture, TextureFormat};

use super::gpu_context::GpuContext;
use super::window::FramebufferSize;
use crate::error::DisplayError;

/// Swapchain for the presentation window
pub struct PresentSurface {
    surface: Surface<'static>,
    config: SurfaceConfiguration,
    configured: bool,
}

impl PresentSurface {
    pub fn new(
        surface: Surface<'static>,
        gpu: &GpuContext,
        size: FramebufferSize,
        present_mode: wgpu::PresentMode,
    ) -> Result<Self, DisplayError> {
        let caps = surface.get_capabilities(gpu.adapter());
        let format = choose_surface_format(&caps).ok_or(DisplayError::SurfaceUnsupported)?;

        let config = SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode: choose_present_mode(&caps, present_mode),
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let mut surface = Self {
            surface,
            config,
            configured: false,
        };
        surface.configure(gpu, size);
        log::info!(
            "surface configured: {:?}, {:?}",
            surface.config.format,
            surface.config.present_mode
        );
        Ok(surface)
    }

    /// Texture format of the swapchain images
    pub fn format(&self) -> TextureFormat {
        self.config.format
    }

    /// Size the surface was last configured for
    pub fn size(&self) -> FramebufferSize {
        FramebufferSize::new(self.config.width, self.config.height)
    }

    /// Reconfigure for a new framebuffer size. Zero sizes are ignored.
    pub fn configure(&mut self, gpu: &GpuContext, size: FramebufferSize) {
        if size.is_empty() {
            return;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(gpu.device(), &self.config);
        self.configured = true;
    }

    /// Next texture to render into, `None` when this frame should be skipped
    pub fn acquire(&mut self, gpu: &GpuContext) -> Result<Option<SurfaceTexture>, DisplayError> {
        if !self.configured {
            return Ok(None);
        }
        match self.surface.get_current_texture() {
            Ok(texture) => Ok(Some(texture)),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("surface lost or outdated, reconfiguring");
                self.surface.configure(gpu.device(), &self.config);
                Ok(None)
            }
            Err(err @ (wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other)) => {
                log::warn!("skipping frame: {err}");
                Ok(None)
            }
            Err(err) => Err(DisplayError::Surface(err)),
        }
    }
}

/// Prefer an sRGB format, otherwise whatever the surface lists first
pub(crate) fn choose_surface_format(caps: &SurfaceCapabilities) -> Option<TextureFormat> {
    caps.formats
        .iter()
        .copied()
        .find(|f| f.is_srgb())
        .or_else(|| caps.formats.first().copied())
}

pub(crate) fn choose_present_mode(
    caps: &SurfaceCapabilities,
    requested: wgpu::PresentMode,
) -> wgpu::PresentMode {
    // the Auto* modes resolve themselves at configure time
    let is_auto = matches!(
        requested,
        wgpu::PresentMode::AutoVsync | wgpu::PresentMode::AutoNoVsync
    );
    if is_auto || caps.present_modes.contains(&requested) {
        requested
    } else {
        wgpu::PresentMode::Fifo
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(formats: Vec<TextureFormat>, present_modes: Vec<wgpu::PresentMode>) -> SurfaceCapabilities {
        SurfaceCapabilities {
            formats,
            present_modes,
            ..Default::default()
        }
    }

    #[test]
    fn srgb_format_preferred() {
        let caps = caps(
            vec![TextureFormat::Bgra8Unorm, TextureFormat::Bgra8UnormSrgb],
            vec![],
        );
        assert_eq!(choose_surface_format(&caps), Some(TextureFormat::Bgra8UnormSrgb));
    }

    #[test]
    fn falls_back_to_first_format() {
        let caps = caps(vec![TextureFormat::Rgba16Float], vec![]);
        assert_eq!(choose_surface_format(&caps), Some(TextureFormat::Rgba16Float));
        assert_eq!(choose_surface_format(&SurfaceCapabilities::default()), None);
    }

    #[test]
    fn unsupported_present_mode_falls_back_to_fifo() {
        let caps = caps(vec![], vec![wgpu::PresentMode::Fifo]);
        assert_eq!(
            choose_present_mode(&caps, wgpu::PresentMode::Mailbox),
            wgpu::PresentMode::Fifo
        );
        assert_eq!(
            choose_present_mode(&caps, wgpu::PresentMode::AutoNoVsync),
            wgpu::PresentMode::AutoNoVsync
        );
    }
}
