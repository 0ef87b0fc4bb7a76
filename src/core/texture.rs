use wgpu::{BindGroup, Texture, TextureFormat, TextureView};

use super::gpu_context::GpuContext;
use super::render_pipeline::QuadPipeline;
use crate::convert::{convert_to_rgb, validate, Conversion};
use crate::error::{DisplayError, FrameError};
use crate::types::{FrameHeader, ImageFrame, ImageSize};

type Result<T> = std::result::Result<T, DisplayError>;

struct TextureSlot {
    bind_group: BindGroup,
    view: TextureView,
    texture: Texture,
}

impl TextureSlot {
    fn create(
        gpu: &GpuContext,
        pipeline: &QuadPipeline,
        format: TextureFormat,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let texture = gpu.device().create_texture(&wgpu::TextureDescriptor {
            label: Some("Frame Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = pipeline.create_texture_bind_group(gpu, &view)?;

        Ok(Self {
            bind_group,
            view,
            texture,
        })
    }

    fn release(self) {
        let Self {
            bind_group,
            view,
            texture,
        } = self;
        drop(bind_group);
        drop(view);
        texture.destroy();
    }
}

/// The single GPU texture holding the latest frame
///
/// wgpu has no three-channel texel format, so packed RGB is widened to RGBA
/// in a staging buffer that is reused across uploads.
pub struct FrameTexture {
    slot: Option<TextureSlot>,
    format: TextureFormat,
    staging: Vec<u8>,
}

impl FrameTexture {
    /// Create a 1x1 black texture that stands in until the first frame
    pub fn new(gpu: &GpuContext, pipeline: &QuadPipeline, format: TextureFormat) -> Result<Self> {
        let slot = TextureSlot::create(gpu, pipeline, format, 1, 1)?;
        let mut texture = Self {
            slot: Some(slot),
            format,
            staging: Vec::new(),
        };
        texture.write(gpu, &[0, 0, 0], 1, 1)?;
        Ok(texture)
    }

    /// Replace the whole texture with `rgb`, re-creating it if the size changed
    pub fn upload(
        &mut self,
        gpu: &GpuContext,
        pipeline: &QuadPipeline,
        rgb: &[u8],
        size: ImageSize,
    ) -> Result<()> {
        if self.slot.is_none() {
            return Err(DisplayError::Released);
        }

        let expected = size.rgb_len();
        if rgb.len() != expected {
            return Err(DisplayError::UploadSize {
                size,
                expected,
                actual: rgb.len(),
            });
        }
        if size.is_empty() {
            log::debug!("skipping upload of empty {size} frame");
            return Ok(());
        }

        check_fits(gpu, size)?;
        let (width, height) = (u32::from(size.width), u32::from(size.height));

        if self.size() != Some((width, height)) {
            log::debug!("re-creating frame texture at {size}");
            if let Some(old) = self.slot.take() {
                old.release();
            }
            self.slot = Some(TextureSlot::create(gpu, pipeline, self.format, width, height)?);
        }

        self.write(gpu, rgb, width, height)
    }

    fn write(&mut self, gpu: &GpuContext, rgb: &[u8], width: u32, height: u32) -> Result<()> {
        let slot = self.slot.as_ref().ok_or(DisplayError::Released)?;
        expand_rgb_to_rgba(rgb, &mut self.staging);

        gpu.queue().write_texture(
            slot.texture.as_image_copy(),
            &self.staging,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        Ok(())
    }

    /// Bind group for the current texture, `None` once released
    pub fn bind_group(&self) -> Option<&BindGroup> {
        self.slot.as_ref().map(|s| &s.bind_group)
    }

    /// Texture extent, `None` once released
    pub fn size(&self) -> Option<(u32, u32)> {
        self.slot.as_ref().map(|s| (s.texture.width(), s.texture.height()))
    }

    pub fn is_released(&self) -> bool {
        self.slot.is_none()
    }

    /// Destroy the texture. Safe to repeat.
    pub fn release(&mut self) {
        if let Some(slot) = self.slot.take() {
            slot.release();
            log::debug!("released frame texture");
        }
        self.staging = Vec::new();
    }
}

/// Reject frames the device cannot hold in a single 2D texture
fn check_fits(gpu: &GpuContext, size: ImageSize) -> std::result::Result<(), FrameError> {
    let max = gpu.device().limits().max_texture_dimension_2d;
    if u32::from(size.width) > max || u32::from(size.height) > max {
        return Err(FrameError::TooLarge { size, max });
    }
    Ok(())
}

/// Converted frame on its way to the screen.
///
/// Owns the frame texture, the RGB buffer it is filled from and the aspect
/// ratio the quad is drawn with. A frame is checked in full before anything
/// is touched, so a rejected frame leaves the previous image and its aspect
/// ratio in place.
pub struct FrameStage {
    texture: FrameTexture,
    rgb: Vec<u8>,
    image_aspect: f32,
    last_header: Option<FrameHeader>,
}

impl FrameStage {
    /// Start with the 1x1 black placeholder and a square aspect ratio
    pub fn new(gpu: &GpuContext, pipeline: &QuadPipeline, format: TextureFormat) -> Result<Self> {
        Ok(Self {
            texture: FrameTexture::new(gpu, pipeline, format)?,
            rgb: Vec::new(),
            image_aspect: 1.0,
            last_header: None,
        })
    }

    /// Convert `frame`, upload it and adopt its aspect ratio.
    ///
    /// Empty frames pass but leave texture and aspect ratio unchanged.
    pub fn accept(
        &mut self,
        gpu: &GpuContext,
        pipeline: &QuadPipeline,
        frame: &ImageFrame<'_>,
    ) -> Result<Conversion> {
        if self.texture.is_released() {
            return Err(DisplayError::Released);
        }

        let header = frame.header;
        validate(&header, frame.pixels.len())?;
        check_fits(gpu, header.size)?;

        if !self
            .last_header
            .is_some_and(|last| last.matches_format(&header))
        {
            log::info!("receiving {} frames in {}", header.size, header.format);
        }

        let conversion = convert_to_rgb(frame, &mut self.rgb)?;
        if let Conversion::Unsupported(format) = conversion {
            log::debug!("frame at {} shown as error pattern ({format})", header.timestamp);
        }
        self.texture.upload(gpu, pipeline, &self.rgb, header.size)?;

        if let Some(aspect) = header.size.aspect_ratio() {
            self.image_aspect = aspect;
        }
        self.last_header = Some(header);
        Ok(conversion)
    }

    pub fn texture(&self) -> &FrameTexture {
        &self.texture
    }

    /// Aspect ratio of the image currently in the texture
    pub fn image_aspect(&self) -> f32 {
        self.image_aspect
    }

    /// Destroy the texture and drop the RGB buffer. Safe to repeat.
    pub fn release(&mut self) {
        self.texture.release();
        self.rgb = Vec::new();
        self.last_header = None;
    }

    pub fn is_released(&self) -> bool {
        self.texture.is_released()
    }
}

/// Texture format matching the render target's encoding, so frame bytes
/// reach the screen unchanged
pub fn texture_format_for(target: TextureFormat) -> TextureFormat {
    if target.is_srgb() {
        TextureFormat::Rgba8UnormSrgb
    } else {
        TextureFormat::Rgba8Unorm
    }
}

/// Widen packed RGB to RGBA with opaque alpha, reusing `rgba`'s allocation
pub fn expand_rgb_to_rgba(rgb: &[u8], rgba: &mut Vec<u8>) {
    rgba.clear();
    rgba.reserve(rgb.len() / 3 * 4);
    for pixel in rgb.chunks_exact(3) {
        rgba.extend_from_slice(&[pixel[0], pixel[1], pixel[2], 255]);
    }
}
