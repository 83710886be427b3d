use crate::core::{RenderError, RenderResult};
use crate::resource::{GpuResource, NativeResource};
use crate::target::{RenderTarget, RenderTextureDesc, TargetKind};

use super::device::DeviceSlot;

/// Colour texture backing a render texture.
pub(super) struct TextureNative {
    slot: DeviceSlot,
    label: String,
    size: wgpu::Extent3d,
    format: wgpu::TextureFormat,
    texture: Option<wgpu::Texture>,
    view: Option<wgpu::TextureView>,
}

impl TextureNative {
    pub(super) fn create(
        slot: DeviceSlot,
        desc: &RenderTextureDesc,
        format: wgpu::TextureFormat,
    ) -> RenderResult<Self> {
        let mut native = Self {
            slot,
            label: format!("kestrel render texture `{}`", desc.name),
            size: wgpu::Extent3d {
                width: desc.width,
                height: desc.height,
                depth_or_array_layers: 1,
            },
            format,
            texture: None,
            view: None,
        };
        native.recreate()?;
        Ok(native)
    }

    /// Records a clear of the whole texture.
    fn encode_clear(&self, color: wgpu::Color) -> RenderResult<wgpu::CommandBuffer> {
        let view = self.view.as_ref().ok_or(RenderError::DeviceLost)?;
        let gpu = self.slot.handles();

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("kestrel render texture encoder"),
            });

        // The pass only clears; dropping it ends it.
        let pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("kestrel render texture clear"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(color),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        drop(pass);

        Ok(encoder.finish())
    }
}

impl NativeResource for TextureNative {
    fn release(&mut self) {
        self.view = None;
        if let Some(texture) = self.texture.take() {
            texture.destroy();
        }
    }

    fn recreate(&mut self) -> RenderResult<()> {
        if self.slot.is_lost() {
            return Err(RenderError::DeviceLost);
        }

        let gpu = self.slot.handles();
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&self.label),
            size: self.size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        self.view = Some(texture.create_view(&wgpu::TextureViewDescriptor::default()));
        self.texture = Some(texture);
        Ok(())
    }
}

/// Off-screen target: `update` records a clear, `swap_buffers` submits it.
pub(super) struct WgpuRenderTexture {
    name: String,
    priority: u8,
    size: (u32, u32),
    active: bool,
    clear_color: wgpu::Color,
    slot: DeviceSlot,
    resource: GpuResource<TextureNative>,
    pending: Option<wgpu::CommandBuffer>,
}

impl WgpuRenderTexture {
    pub(super) fn new(
        desc: &RenderTextureDesc,
        clear_color: wgpu::Color,
        slot: DeviceSlot,
        resource: GpuResource<TextureNative>,
    ) -> Self {
        Self {
            name: desc.name.clone(),
            priority: desc.priority,
            size: (desc.width, desc.height),
            active: true,
            clear_color,
            slot,
            resource,
            pending: None,
        }
    }
}

impl RenderTarget for WgpuRenderTexture {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> u8 {
        self.priority
    }

    fn kind(&self) -> TargetKind {
        TargetKind::Texture
    }

    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn update(&mut self) -> RenderResult<()> {
        if self.slot.is_lost() {
            return Err(RenderError::DeviceLost);
        }
        let color = self.clear_color;
        let commands = self.resource.with_device(|native| native.encode_clear(color))??;
        self.pending = Some(commands);
        Ok(())
    }

    fn swap_buffers(&mut self, _wait_for_vsync: bool) -> RenderResult<()> {
        let Some(commands) = self.pending.take() else {
            return Ok(());
        };
        if self.slot.is_lost() {
            return Err(RenderError::DeviceLost);
        }
        self.slot.handles().queue.submit(std::iter::once(commands));
        Ok(())
    }
}
