/// Opaque reference to a texture owned by the texture manager.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct TextureId(pub u64);

/// Pipeline stage a texture unit feeds.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum TextureBindingType {
    #[default]
    Fragment,
    Vertex,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum FilterType {
    Min,
    Mag,
    Mip,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum FilterOptions {
    None,
    Point,
    Linear,
    Anisotropic,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum TextureAddressingMode {
    #[default]
    Wrap,
    Mirror,
    Clamp,
    Border,
}

/// Addressing mode per texture coordinate axis.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct UvwAddressing {
    pub u: TextureAddressingMode,
    pub v: TextureAddressingMode,
    pub w: TextureAddressingMode,
}

impl UvwAddressing {
    #[inline]
    pub const fn uniform(mode: TextureAddressingMode) -> Self {
        Self { u: mode, v: mode, w: mode }
    }
}

/// Sampler settings of one texture unit.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureUnitState {
    pub binding_type: TextureBindingType,
    pub min_filter: FilterOptions,
    pub mag_filter: FilterOptions,
    pub mip_filter: FilterOptions,
    pub max_anisotropy: u32,
    pub mipmap_bias: f32,
    pub addressing: UvwAddressing,
}

impl TextureUnitState {
    pub fn filtering(&self, ty: FilterType) -> FilterOptions {
        match ty {
            FilterType::Min => self.min_filter,
            FilterType::Mag => self.mag_filter,
            FilterType::Mip => self.mip_filter,
        }
    }
}

impl Default for TextureUnitState {
    fn default() -> Self {
        Self {
            binding_type: TextureBindingType::Fragment,
            min_filter: FilterOptions::Linear,
            mag_filter: FilterOptions::Linear,
            mip_filter: FilterOptions::Point,
            max_anisotropy: 1,
            mipmap_bias: 0.0,
            addressing: UvwAddressing::default(),
        }
    }
}
