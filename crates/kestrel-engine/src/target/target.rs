use crate::core::RenderResult;

/// Kind of drawable surface behind a target.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TargetKind {
    Window,
    Texture,
}

/// A drawable surface owned by the render-target registry.
///
/// Backends implement this for their windows and textures. Dropping the boxed
/// target destroys its native surface.
pub trait RenderTarget {
    fn name(&self) -> &str;

    /// Update bucket; lower values are updated and swapped first.
    fn priority(&self) -> u8;

    fn kind(&self) -> TargetKind;

    /// Size in physical pixels.
    fn size(&self) -> (u32, u32);

    /// Inactive targets are skipped by update and swap passes.
    fn is_active(&self) -> bool;

    fn set_active(&mut self, active: bool);

    /// The primary target (normally the main window) is destroyed last.
    fn is_primary(&self) -> bool {
        false
    }

    /// Renders the target's content for this frame.
    fn update(&mut self) -> RenderResult<()>;

    /// Presents (windows) or resolves (textures) the rendered content.
    fn swap_buffers(&mut self, wait_for_vsync: bool) -> RenderResult<()>;
}
