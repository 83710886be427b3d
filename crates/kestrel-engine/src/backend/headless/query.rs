use crate::backend::OcclusionQuery;
use crate::core::{RenderError, RenderResult};
use crate::resource::{GpuResource, NativeResource};

use super::device::DeviceSlot;

pub(super) struct QuerySetNative {
    slot: DeviceSlot,
    query_set: Option<wgpu::QuerySet>,
}

impl QuerySetNative {
    pub(super) fn create(slot: DeviceSlot) -> RenderResult<Self> {
        let mut native = Self {
            slot,
            query_set: None,
        };
        native.recreate()?;
        Ok(native)
    }
}

impl NativeResource for QuerySetNative {
    fn release(&mut self) {
        self.query_set = None;
    }

    fn recreate(&mut self) -> RenderResult<()> {
        if self.slot.is_lost() {
            return Err(RenderError::DeviceLost);
        }
        let gpu = self.slot.handles();
        self.query_set = Some(gpu.device.create_query_set(&wgpu::QuerySetDescriptor {
            label: Some("kestrel occlusion query"),
            ty: wgpu::QueryType::Occlusion,
            count: 1,
        }));
        Ok(())
    }
}

/// Occlusion query backed by a one-slot `QuerySet`.
///
/// Results are not read back yet, so no pixel count is ever reported.
pub(super) struct WgpuOcclusionQuery {
    resource: GpuResource<QuerySetNative>,
    open: bool,
}

impl WgpuOcclusionQuery {
    pub(super) fn new(resource: GpuResource<QuerySetNative>) -> Self {
        Self {
            resource,
            open: false,
        }
    }
}

impl OcclusionQuery for WgpuOcclusionQuery {
    fn begin(&mut self) -> RenderResult<()> {
        if self.open {
            return Err(RenderError::internal("occlusion query begun twice"));
        }
        self.resource.with_device(|_| ())?;
        self.open = true;
        Ok(())
    }

    fn end(&mut self) -> RenderResult<()> {
        if !self.open {
            return Err(RenderError::internal("occlusion query ended without begin"));
        }
        self.open = false;
        Ok(())
    }

    fn is_still_outstanding(&self) -> bool {
        false
    }

    fn last_pixel_count(&self) -> Option<u64> {
        None
    }
}
