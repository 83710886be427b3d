use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, ReentrantMutex, ReentrantMutexGuard};
use slotmap::SlotMap;

use crate::core::{RenderError, RenderResult};

use super::handle::{ResourceCell, TrackedResource};
use super::{GpuResource, NativeResource, ResourcePhase};

slotmap::new_key_type! {
    /// Registry key of a tracked resource.
    pub struct ResourceId;
}

/// Scoped exclusive access to the native device.
///
/// Reentrant on the owning thread, so a resource dropped inside a device
/// section does not deadlock.
pub struct DeviceAccess<'a> {
    _guard: ReentrantMutexGuard<'a, ()>,
}

/// A resource that stayed lost after a recovery walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedResource {
    pub id: ResourceId,
    pub label: String,
    pub error: RenderError,
}

/// Outcome of a device-reset walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryReport {
    /// Resources brought back to `Live`.
    pub recovered: usize,
    /// Resources left `Lost`; the walk continued past each of them.
    pub failed: Vec<FailedResource>,
}

impl RecoveryReport {
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn failed_ids(&self) -> impl Iterator<Item = ResourceId> + '_ {
        self.failed.iter().map(|f| f.id)
    }
}

struct Shared {
    device: ReentrantMutex<()>,
    live: Mutex<SlotMap<ResourceId, Arc<dyn TrackedResource>>>,
    /// Set by `release_all`, cleared by `recreate_all`. Written under the device lock.
    lost: AtomicBool,
}

/// Exhaustive set of live GPU resources of one device.
///
/// Cloning yields another handle to the same registry. Lock order is always
/// device lock, then the live set.
#[derive(Clone)]
pub struct ResourceRegistry {
    shared: Arc<Shared>,
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                device: ReentrantMutex::new(()),
                live: Mutex::new(SlotMap::with_key()),
                lost: AtomicBool::new(false),
            }),
        }
    }

    /// Acquires the device-access lock for the guard's lifetime.
    pub fn lock_device(&self) -> DeviceAccess<'_> {
        DeviceAccess {
            _guard: self.shared.device.lock(),
        }
    }

    /// Starts tracking an already created native resource.
    ///
    /// Between `release_all` and `recreate_all` the resource is registered as
    /// `Lost` with its handle released, so the reset walk rebuilds it.
    pub fn track<R: NativeResource>(&self, label: impl Into<String>, native: R) -> GpuResource<R> {
        let _access = self.lock_device();
        self.register(label.into(), native)
    }

    /// Creates the native resource under the device lock and tracks it.
    ///
    /// Nothing is registered if `create` fails.
    pub fn create_with<R, F>(&self, label: impl Into<String>, create: F) -> RenderResult<GpuResource<R>>
    where
        R: NativeResource,
        F: FnOnce() -> RenderResult<R>,
    {
        let _access = self.lock_device();
        let native = create()?;
        Ok(self.register(label.into(), native))
    }

    fn register<R: NativeResource>(&self, label: String, native: R) -> GpuResource<R> {
        let cell = if self.is_device_lost() {
            log::debug!("resource `{label}` created while the device is lost");
            Arc::new(ResourceCell::new_lost(label, native))
        } else {
            Arc::new(ResourceCell::new(label, native))
        };
        let tracked: Arc<dyn TrackedResource> = cell.clone();
        let id = self.shared.live.lock().insert(tracked);
        log::trace!("resource {id:?} `{}` created", cell.label());
        GpuResource::new(id, cell, self.clone())
    }

    pub(crate) fn notify_destroyed(&self, id: ResourceId) {
        if self.shared.live.lock().remove(id).is_none() {
            log::warn!("resource {id:?} destroyed but was not registered");
        }
    }

    /// `true` between a `release_all` and the following `recreate_all`.
    pub fn is_device_lost(&self) -> bool {
        self.shared.lost.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.shared.live.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.live.lock().is_empty()
    }

    pub fn contains(&self, id: ResourceId) -> bool {
        self.shared.live.lock().contains_key(id)
    }

    pub fn phase(&self, id: ResourceId) -> Option<ResourcePhase> {
        let entry = self.shared.live.lock().get(id).cloned()?;
        Some(entry.phase())
    }

    /// Number of resources currently in the `Lost` phase.
    pub fn lost_count(&self) -> usize {
        self.snapshot()
            .iter()
            .filter(|(_, r)| r.phase() == ResourcePhase::Lost)
            .count()
    }

    /// Releases the native handle of every live resource. Returns how many were released.
    pub fn release_all(&self) -> usize {
        let _access = self.lock_device();
        self.shared.lost.store(true, Ordering::Release);
        let mut released = 0;
        for (_, resource) in self.snapshot() {
            if resource.phase() == ResourcePhase::Live {
                resource.release();
                released += 1;
            }
        }
        log::debug!("released {released} resource(s) after device loss");
        released
    }

    /// Recreates every lost resource.
    ///
    /// Failures are collected; the walk always visits every entry.
    pub fn recreate_all(&self) -> RecoveryReport {
        let _access = self.lock_device();
        let mut report = RecoveryReport::default();

        for (id, resource) in self.snapshot() {
            if resource.phase() != ResourcePhase::Lost {
                continue;
            }
            match resource.recreate() {
                Ok(()) => report.recovered += 1,
                Err(error) => {
                    log::warn!("resource `{}` ({id:?}) failed to recover: {error}", resource.label());
                    report.failed.push(FailedResource {
                        id,
                        label: resource.label().to_owned(),
                        error,
                    });
                }
            }
        }
        self.shared.lost.store(false, Ordering::Release);

        report
    }

    // Cloned so hooks never run with the live-set lock held.
    fn snapshot(&self) -> Vec<(ResourceId, Arc<dyn TrackedResource>)> {
        self.shared
            .live
            .lock()
            .iter()
            .map(|(id, r)| (id, Arc::clone(r)))
            .collect()
    }
}

impl std::fmt::Debug for ResourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceRegistry")
            .field("live", &self.len())
            .finish()
    }
}
