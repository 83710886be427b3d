use std::collections::{BTreeMap, HashMap};

use crate::core::{RenderError, RenderResult};

use super::{PriorityKey, RenderTarget, MAX_PRIORITY_GROUPS};

struct Entry {
    key: PriorityKey,
    target: Box<dyn RenderTarget>,
}

/// Owner of every render target, keyed by name and ordered by priority.
///
/// Performance characteristics:
/// - name lookup is O(1)
/// - ordered traversal walks a `BTreeMap` keyed by [`PriorityKey`], so ties
///   keep attach order without any sorting at update time
#[derive(Default)]
pub struct RenderTargetRegistry {
    targets: HashMap<String, Entry>,
    ordered: BTreeMap<PriorityKey, String>,
    next_order: u64,
    primary: Option<String>,
}

impl RenderTargetRegistry {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes ownership of `target`.
    ///
    /// Fails without side effects on an out-of-range priority, a duplicate
    /// name, or a second primary target.
    pub fn attach(&mut self, target: Box<dyn RenderTarget>) -> RenderResult<()> {
        let name = target.name().to_owned();
        let priority = target.priority();

        if priority >= MAX_PRIORITY_GROUPS {
            return Err(RenderError::configuration(format!(
                "render target `{name}` has priority {priority}, must be below {MAX_PRIORITY_GROUPS}"
            )));
        }
        if self.targets.contains_key(&name) {
            return Err(RenderError::configuration(format!(
                "duplicate target name: a render target named `{name}` already exists"
            )));
        }
        if target.is_primary() {
            if let Some(existing) = &self.primary {
                return Err(RenderError::configuration(format!(
                    "render target `{name}` cannot be primary; `{existing}` already is"
                )));
            }
            self.primary = Some(name.clone());
        }

        let key = PriorityKey::new(priority, self.next_order);
        self.next_order += 1;

        self.ordered.insert(key, name.clone());
        self.targets.insert(name, Entry { key, target });
        Ok(())
    }

    /// Removes the target from both maps and hands it back. `None` if unknown.
    pub fn detach(&mut self, name: &str) -> Option<Box<dyn RenderTarget>> {
        let entry = self.targets.remove(name)?;
        self.ordered.remove(&entry.key);
        if self.primary.as_deref() == Some(name) {
            self.primary = None;
        }
        Some(entry.target)
    }

    pub fn get(&self, name: &str) -> Option<&dyn RenderTarget> {
        self.targets.get(name).map(|e| e.target.as_ref())
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut (dyn RenderTarget + 'static)> {
        self.targets.get_mut(name).map(|e| e.target.as_mut())
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.targets.contains_key(name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn primary(&self) -> Option<&str> {
        self.primary.as_deref()
    }

    /// Target names in update order.
    pub fn names_in_order(&self) -> impl Iterator<Item = &str> {
        self.ordered.values().map(String::as_str)
    }

    /// Updates every active target in priority order.
    ///
    /// With `swap_buffers`, each target swaps right after its own update, so
    /// render-to-texture groups finish before the windows that show them.
    pub fn update_all(&mut self, swap_buffers: bool, wait_for_vsync: bool) -> RenderResult<()> {
        for name in self.ordered.values() {
            let Some(entry) = self.targets.get_mut(name) else {
                continue;
            };
            let target = entry.target.as_mut();
            if !target.is_active() {
                continue;
            }
            if skip_lost_resource(name, target.update())? {
                continue;
            }
            if swap_buffers {
                skip_lost_resource(name, target.swap_buffers(wait_for_vsync))?;
            }
        }
        Ok(())
    }

    /// Swaps every active target in priority order without updating.
    pub fn swap_all(&mut self, wait_for_vsync: bool) -> RenderResult<()> {
        for name in self.ordered.values() {
            let Some(entry) = self.targets.get_mut(name) else {
                continue;
            };
            if entry.target.is_active() {
                skip_lost_resource(name, entry.target.swap_buffers(wait_for_vsync))?;
            }
        }
        Ok(())
    }

    /// Destroys every target, the primary one last.
    ///
    /// Non-primary targets go in update order; they may still reference
    /// primary-target state while tearing down.
    pub fn destroy_all(&mut self) {
        let primary = self.primary.take();
        let names: Vec<String> = std::mem::take(&mut self.ordered).into_values().collect();

        for name in names.iter().filter(|n| Some(*n) != primary.as_ref()) {
            if let Some(entry) = self.targets.remove(name) {
                log::debug!("destroying render target `{name}`");
                drop(entry.target);
            }
        }

        if let Some(name) = primary {
            if let Some(entry) = self.targets.remove(&name) {
                log::debug!("destroying primary render target `{name}`");
                drop(entry.target);
            }
        }

        debug_assert!(self.targets.is_empty());
        self.targets.clear();
    }
}

/// Returns `Ok(true)` when the target was skipped because one of its
/// resources failed to recover; the rest of the walk carries on.
fn skip_lost_resource(name: &str, result: RenderResult<()>) -> RenderResult<bool> {
    match result {
        Ok(()) => Ok(false),
        Err(RenderError::ResourceLost(label)) => {
            log::warn!("skipping render target `{name}`: resource `{label}` is lost");
            Ok(true)
        }
        Err(e) => Err(e),
    }
}
