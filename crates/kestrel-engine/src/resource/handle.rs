use std::sync::Arc;

use parking_lot::Mutex;

use crate::core::{RenderError, RenderResult};

use super::{ResourceId, ResourceRegistry};

/// Native half of a tracked resource.
///
/// Both hooks run with the device-access lock held.
pub trait NativeResource: Send + 'static {
    /// Drops the native handle after the device was lost.
    fn release(&mut self);

    /// Rebuilds the native handle once the device has been reset.
    fn recreate(&mut self) -> RenderResult<()>;
}

/// Lifecycle phase of a tracked resource.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ResourcePhase {
    Live,
    Lost,
    Destroyed,
}

/// Type-erased view the registry walks during recovery.
pub(crate) trait TrackedResource: Send + Sync {
    fn label(&self) -> &str;
    fn phase(&self) -> ResourcePhase;
    fn release(&self);
    fn recreate(&self) -> RenderResult<()>;
}

struct CellState<R> {
    /// `None` once destroyed.
    native: Option<R>,
    phase: ResourcePhase,
    recovery_failed: bool,
}

pub(crate) struct ResourceCell<R> {
    label: String,
    state: Mutex<CellState<R>>,
}

impl<R: NativeResource> ResourceCell<R> {
    pub(crate) fn new(label: String, native: R) -> Self {
        Self {
            label,
            state: Mutex::new(CellState {
                native: Some(native),
                phase: ResourcePhase::Live,
                recovery_failed: false,
            }),
        }
    }

    /// Cell for a resource created while the device is lost. The handle is
    /// released at once; the next reset walk recreates it.
    pub(crate) fn new_lost(label: String, mut native: R) -> Self {
        native.release();
        Self {
            label,
            state: Mutex::new(CellState {
                native: Some(native),
                phase: ResourcePhase::Lost,
                recovery_failed: false,
            }),
        }
    }
}

impl<R: NativeResource> TrackedResource for ResourceCell<R> {
    fn label(&self) -> &str {
        &self.label
    }

    fn phase(&self) -> ResourcePhase {
        self.state.lock().phase
    }

    fn release(&self) {
        let mut state = self.state.lock();
        if state.phase != ResourcePhase::Live {
            return;
        }
        if let Some(native) = state.native.as_mut() {
            native.release();
        }
        state.phase = ResourcePhase::Lost;
    }

    fn recreate(&self) -> RenderResult<()> {
        let mut state = self.state.lock();
        if state.phase != ResourcePhase::Lost {
            return Ok(());
        }
        let Some(native) = state.native.as_mut() else {
            return Ok(());
        };

        match native.recreate() {
            Ok(()) => {
                state.phase = ResourcePhase::Live;
                state.recovery_failed = false;
                Ok(())
            }
            Err(e) => {
                state.recovery_failed = true;
                Err(e)
            }
        }
    }
}

/// Owning handle of a tracked GPU resource.
///
/// Created through [`ResourceRegistry::track`] or
/// [`ResourceRegistry::create_with`]; dropping it destroys the native handle
/// under the device lock and removes the registry entry.
pub struct GpuResource<R: NativeResource> {
    id: ResourceId,
    cell: Arc<ResourceCell<R>>,
    registry: ResourceRegistry,
}

impl<R: NativeResource> GpuResource<R> {
    pub(crate) fn new(id: ResourceId, cell: Arc<ResourceCell<R>>, registry: ResourceRegistry) -> Self {
        Self { id, cell, registry }
    }

    #[inline]
    pub fn id(&self) -> ResourceId {
        self.id
    }

    #[inline]
    pub fn label(&self) -> &str {
        &self.cell.label
    }

    pub fn phase(&self) -> ResourcePhase {
        self.cell.state.lock().phase
    }

    /// `true` when the last recovery attempt left this resource lost.
    pub fn is_recovery_failed(&self) -> bool {
        self.cell.state.lock().recovery_failed
    }

    /// Runs `f` on the native handle with exclusive device access.
    ///
    /// Fails with `DeviceLost` while the resource waits for a reset, and with
    /// `ResourceLost` once a reset failed to bring it back.
    pub fn with_device<T>(&self, f: impl FnOnce(&mut R) -> T) -> RenderResult<T> {
        let _access = self.registry.lock_device();
        let mut state = self.cell.state.lock();
        if state.phase != ResourcePhase::Live {
            if state.recovery_failed {
                return Err(RenderError::ResourceLost(self.cell.label.clone()));
            }
            return Err(RenderError::DeviceLost);
        }
        let native = state
            .native
            .as_mut()
            .ok_or_else(|| RenderError::internal(format!("resource `{}` already destroyed", self.cell.label)))?;
        Ok(f(native))
    }
}

impl<R: NativeResource> Drop for GpuResource<R> {
    fn drop(&mut self) {
        let _access = self.registry.lock_device();
        {
            let mut state = self.cell.state.lock();
            state.phase = ResourcePhase::Destroyed;
            drop(state.native.take());
        }
        self.registry.notify_destroyed(self.id);
    }
}

impl<R: NativeResource> std::fmt::Debug for GpuResource<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpuResource")
            .field("id", &self.id)
            .field("label", &self.cell.label)
            .field("phase", &self.phase())
            .finish()
    }
}
