use crate::core::RenderResult;

slotmap::new_key_type! {
    /// Handle of an occlusion query owned by the render system.
    pub struct QueryId;
}

/// Hardware occlusion query created by a backend.
pub trait OcclusionQuery {
    fn begin(&mut self) -> RenderResult<()>;

    fn end(&mut self) -> RenderResult<()>;

    /// `true` between `end` and the moment the result becomes available.
    fn is_still_outstanding(&self) -> bool;

    /// Fragment count of the last completed query, if one is available.
    fn last_pixel_count(&self) -> Option<u64>;
}
