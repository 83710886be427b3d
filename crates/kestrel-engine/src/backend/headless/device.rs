use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use anyhow::{Context, Result};
use parking_lot::RwLock;

use super::WgpuBackendInit;

#[derive(Clone)]
pub(super) struct DeviceHandles {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

/// Current logical device, shared by the backend and every tracked resource.
///
/// A reset swaps the handles in place, so resources recreate against the new
/// device without being rebuilt by their owners. Loss callbacks of replaced
/// devices are ignored through the generation counter.
#[derive(Clone)]
pub(super) struct DeviceSlot {
    handles: Arc<RwLock<DeviceHandles>>,
    lost: Arc<AtomicBool>,
    generation: Arc<AtomicU64>,
}

impl DeviceSlot {
    pub(super) fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        let slot = Self {
            handles: Arc::new(RwLock::new(DeviceHandles {
                device: device.clone(),
                queue,
            })),
            lost: Arc::new(AtomicBool::new(false)),
            generation: Arc::new(AtomicU64::new(0)),
        };
        slot.watch(&device, 0);
        slot
    }

    #[inline]
    pub(super) fn handles(&self) -> DeviceHandles {
        self.handles.read().clone()
    }

    #[inline]
    pub(super) fn is_lost(&self) -> bool {
        self.lost.load(Ordering::Acquire)
    }

    pub(super) fn mark_lost(&self) {
        self.lost.store(true, Ordering::Release);
    }

    /// Installs a freshly created device after a loss.
    pub(super) fn replace(&self, device: wgpu::Device, queue: wgpu::Queue) {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.watch(&device, generation);
        *self.handles.write() = DeviceHandles { device, queue };
        self.lost.store(false, Ordering::Release);
    }

    fn watch(&self, device: &wgpu::Device, generation: u64) {
        let lost = Arc::clone(&self.lost);
        let current = Arc::clone(&self.generation);
        device.set_device_lost_callback(move |reason, message| {
            if current.load(Ordering::Acquire) != generation {
                return;
            }
            log::error!("wgpu device lost ({reason:?}): {message}");
            lost.store(true, Ordering::Release);
        });
    }
}

/// Requests a logical device from `adapter`.
///
/// Adapter/device acquisition is asynchronous under wgpu.
pub(super) async fn request_device(
    adapter: &wgpu::Adapter,
    init: &WgpuBackendInit,
) -> Result<(wgpu::Device, wgpu::Queue)> {
    adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("kestrel-engine device"),
            required_features: init.required_features,
            required_limits: init.required_limits.clone(),
            experimental_features: wgpu::ExperimentalFeatures::disabled(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::Off,
        })
        .await
        .context("failed to create wgpu device/queue")
}
