use crate::backend::{RenderBackend, RenderCapabilities};
use crate::core::{RenderError, RenderResult};

use super::{FilterType, TextureBindingType, TextureId, TextureUnitState};

/// Highest number of texture units the layer addresses.
pub const MAX_TEXTURE_LAYERS: usize = 16;

/// Decides how texture units are bound on a backend.
///
/// Units at or above `disabled_from` are assumed to be disabled already, so
/// `disable_units_from` only touches units enabled since the previous call.
#[derive(Debug, Default)]
pub struct TextureUnitPolicy {
    disabled_from: usize,
}

impl TextureUnitPolicy {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `texture` to `unit` and applies the sampler settings of `state`.
    ///
    /// With separate vertex units, the stage that does not use the texture gets
    /// an empty binding at the same index.
    pub fn apply<B>(
        &mut self,
        backend: &mut B,
        caps: &RenderCapabilities,
        unit: usize,
        texture: Option<TextureId>,
        state: &TextureUnitState,
    ) -> RenderResult<()>
    where
        B: RenderBackend + ?Sized,
    {
        check_unit(unit)?;

        if caps.has_separate_vertex_units() {
            let (vertex_tex, fragment_tex) = match state.binding_type {
                TextureBindingType::Vertex => (texture, None),
                TextureBindingType::Fragment => (None, texture),
            };

            let sampler = backend.vertex_texture_sampler().ok_or_else(|| {
                RenderError::unsupported(
                    "backend has no separate vertex texture samplers; \
                     bind through the shared fragment units instead",
                )
            })?;
            sampler.set_vertex_texture(unit, vertex_tex);
            backend.set_texture(unit, true, fragment_tex);
        } else {
            backend.set_texture(unit, true, texture);
        }

        for ty in [FilterType::Min, FilterType::Mag, FilterType::Mip] {
            backend.set_texture_unit_filtering(unit, ty, state.filtering(ty));
        }
        backend.set_texture_anisotropy(unit, state.max_anisotropy);
        backend.set_texture_mipmap_bias(unit, state.mipmap_bias);
        backend.set_texture_addressing_mode(unit, &state.addressing);

        Ok(())
    }

    pub fn disable_unit<B>(&mut self, backend: &mut B, unit: usize) -> RenderResult<()>
    where
        B: RenderBackend + ?Sized,
    {
        check_unit(unit)?;
        backend.set_texture(unit, false, None);
        Ok(())
    }

    /// Disables every unit from `unit` up to the previous high-water mark.
    pub fn disable_units_from<B>(&mut self, backend: &mut B, unit: usize)
    where
        B: RenderBackend + ?Sized,
    {
        let disable_to = MAX_TEXTURE_LAYERS.min(self.disabled_from);
        self.disabled_from = unit;
        for i in unit..disable_to {
            backend.set_texture(i, false, None);
        }
    }

    #[inline]
    pub fn disabled_from(&self) -> usize {
        self.disabled_from
    }
}

fn check_unit(unit: usize) -> RenderResult<()> {
    if unit >= MAX_TEXTURE_LAYERS {
        return Err(RenderError::InvalidParameters(format!(
            "texture unit {unit} out of range (max {MAX_TEXTURE_LAYERS})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Capabilities;
    use crate::test_support::RecordingBackend;

    fn caps(flags: Capabilities) -> RenderCapabilities {
        RenderCapabilities {
            flags,
            ..RenderCapabilities::default()
        }
    }

    fn vertex_state() -> TextureUnitState {
        TextureUnitState {
            binding_type: TextureBindingType::Vertex,
            ..TextureUnitState::default()
        }
    }

    // ── binding ───────────────────────────────────────────────────────────

    #[test]
    fn shared_units_bind_fragment_texture_only() {
        let mut backend = RecordingBackend::new();
        let mut policy = TextureUnitPolicy::new();
        let caps = caps(Capabilities::VERTEX_TEXTURE_FETCH | Capabilities::VERTEX_TEXTURE_UNITS_SHARED);

        policy
            .apply(&mut backend, &caps, 2, Some(TextureId(7)), &vertex_state())
            .unwrap();

        let calls = backend.calls();
        assert_eq!(calls[0], "set_texture:2:on:7");
        assert!(!calls.iter().any(|c| c.starts_with("vertex_texture")));
    }

    #[test]
    fn separate_units_route_vertex_binding_to_sampler() {
        let mut backend = RecordingBackend::new().with_vertex_sampler();
        let mut policy = TextureUnitPolicy::new();
        let caps = caps(Capabilities::VERTEX_TEXTURE_FETCH);

        policy
            .apply(&mut backend, &caps, 1, Some(TextureId(3)), &vertex_state())
            .unwrap();

        let calls = backend.calls();
        assert_eq!(calls[0], "vertex_texture:1:3");
        assert_eq!(calls[1], "set_texture:1:on:-");
    }

    #[test]
    fn separate_units_clear_vertex_slot_for_fragment_binding() {
        let mut backend = RecordingBackend::new().with_vertex_sampler();
        let mut policy = TextureUnitPolicy::new();
        let caps = caps(Capabilities::VERTEX_TEXTURE_FETCH);

        policy
            .apply(&mut backend, &caps, 0, Some(TextureId(9)), &TextureUnitState::default())
            .unwrap();

        let calls = backend.calls();
        assert_eq!(calls[0], "vertex_texture:0:-");
        assert_eq!(calls[1], "set_texture:0:on:9");
    }

    #[test]
    fn missing_vertex_sampler_is_unsupported() {
        let mut backend = RecordingBackend::new();
        let mut policy = TextureUnitPolicy::new();
        let caps = caps(Capabilities::VERTEX_TEXTURE_FETCH);

        let err = policy
            .apply(&mut backend, &caps, 0, Some(TextureId(1)), &vertex_state())
            .unwrap_err();
        assert!(matches!(err, RenderError::UnsupportedOperation(_)));
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn sampler_settings_follow_binding() {
        let mut backend = RecordingBackend::new();
        let mut policy = TextureUnitPolicy::new();

        policy
            .apply(&mut backend, &RenderCapabilities::default(), 0, None, &TextureUnitState::default())
            .unwrap();

        let calls = backend.calls();
        assert_eq!(calls.len(), 7);
        assert_eq!(calls[1], "filter:0:Min:Linear");
        assert_eq!(calls[3], "filter:0:Mip:Point");
        assert_eq!(calls[4], "anisotropy:0:1");
    }

    #[test]
    fn out_of_range_unit_is_rejected() {
        let mut backend = RecordingBackend::new();
        let mut policy = TextureUnitPolicy::new();
        let err = policy.disable_unit(&mut backend, MAX_TEXTURE_LAYERS).unwrap_err();
        assert!(matches!(err, RenderError::InvalidParameters(_)));
    }

    // ── disable_units_from ────────────────────────────────────────────────

    #[test]
    fn disable_from_only_touches_units_above_previous_mark() {
        let mut backend = RecordingBackend::new();
        let mut policy = TextureUnitPolicy::new();

        // Nothing recorded as enabled yet.
        policy.disable_units_from(&mut backend, 4);
        assert!(backend.calls().is_empty());
        assert_eq!(policy.disabled_from(), 4);

        policy.disable_units_from(&mut backend, 1);
        assert_eq!(
            backend.calls(),
            vec!["set_texture:1:off:-", "set_texture:2:off:-", "set_texture:3:off:-"]
        );
        assert_eq!(policy.disabled_from(), 1);
    }
}
