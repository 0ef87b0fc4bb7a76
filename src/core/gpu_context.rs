use std::sync::Arc;
use wgpu::{Adapter, Buffer, Device, DeviceDescriptor, Features, Instance, Queue, Surface};

use crate::config::GraphicsProfile;
use crate::error::DisplayError;

type Result<T> = std::result::Result<T, DisplayError>;

/// Device and queue for one graphics profile
///
/// Cheap to clone (Arc) so the texture stage and the render pipeline can
/// share it.
#[derive(Clone)]
pub struct GpuContext {
    adapter: Arc<Adapter>,
    device: Arc<Device>,
    queue: Arc<Queue>,
}

impl GpuContext {
    /// Create a context without a surface (offscreen rendering)
    pub async fn new(profile: GraphicsProfile) -> Result<Self> {
        let instance = profile.instance();
        let adapter = Self::request_adapter(&instance, None, profile).await?;
        Self::from_adapter(adapter, profile).await
    }

    /// Create a context whose adapter can present to `surface`
    ///
    /// `instance` must be the one the surface was created from.
    pub async fn new_with_surface(
        instance: &Instance,
        surface: &Surface<'_>,
        profile: GraphicsProfile,
    ) -> Result<Self> {
        let adapter = Self::request_adapter(instance, Some(surface), profile).await?;
        Self::from_adapter(adapter, profile).await
    }

    async fn from_adapter(adapter: Adapter, profile: GraphicsProfile) -> Result<Self> {
        let info = adapter.get_info();
        log::info!(
            "using adapter '{}' ({:?}) for {} profile",
            info.name,
            info.backend,
            profile
        );

        let (device, queue) = Self::request_device(&adapter, profile).await?;

        Ok(Self {
            adapter: Arc::new(adapter),
            device: Arc::new(device),
            queue: Arc::new(queue),
        })
    }

    /// Adapter the device was requested from, needed for surface capabilities
    pub fn adapter(&self) -> &Adapter {
        &self.adapter
    }

    /// Logical device for resource creation
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Queue used for texture and vertex uploads and for submission
    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    /// Map a MAP_READ buffer and copy its contents out (blocking)
    pub fn read_buffer_sync(&self, buffer: &Buffer) -> Result<Vec<u8>> {
        let buffer_slice = buffer.slice(..);

        let (sender, receiver) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            sender.send(result).ok();
        });

        self.device
            .poll(wgpu::PollType::Wait {
                submission_index: None,
                timeout: None,
            })
            .map_err(|e| DisplayError::Readback(e.to_string()))?;

        match receiver.recv() {
            Ok(Ok(())) => {
                let data = buffer_slice.get_mapped_range();
                let result = data.to_vec();
                drop(data);
                buffer.unmap();
                Ok(result)
            }
            Ok(Err(e)) => Err(DisplayError::Readback(format!("buffer mapping failed: {e:?}"))),
            Err(_) => Err(DisplayError::Readback(
                "channel closed before receiving result".to_string(),
            )),
        }
    }

    async fn request_adapter(
        instance: &Instance,
        surface: Option<&Surface<'_>>,
        profile: GraphicsProfile,
    ) -> Result<Adapter> {
        instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: surface,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|source| DisplayError::Adapter { profile, source })
    }

    async fn request_device(adapter: &Adapter, profile: GraphicsProfile) -> Result<(Device, Queue)> {
        let device = adapter
            .request_device(&DeviceDescriptor {
                label: Some("Frame Viewer Device"),
                required_features: Features::empty(),
                required_limits: profile.limits(&adapter.limits()),
                memory_hints: Default::default(),
                experimental_features: Default::default(),
                trace: Default::default(),
            })
            .await?;
        Ok(device)
    }
}
