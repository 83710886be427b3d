/// Number of priority buckets. Target priorities must be strictly below this.
pub const MAX_PRIORITY_GROUPS: u8 = 10;

/// Priority given to windows unless specified otherwise.
pub const DEFAULT_WINDOW_PRIORITY: u8 = 4;

/// Priority given to render textures unless specified otherwise.
///
/// Lower than windows so off-screen content is ready before it is presented.
pub const DEFAULT_TEXTURE_PRIORITY: u8 = 2;

/// Request for a new render window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderWindowDesc {
    /// Unique target name.
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub full_screen: bool,
    pub priority: u8,
}

impl RenderWindowDesc {
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            full_screen: false,
            priority: DEFAULT_WINDOW_PRIORITY,
        }
    }

    pub fn full_screen(mut self, full_screen: bool) -> Self {
        self.full_screen = full_screen;
        self
    }

    pub fn priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }
}

/// Request for a new off-screen render texture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderTextureDesc {
    /// Unique target name.
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub priority: u8,
}

impl RenderTextureDesc {
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            priority: DEFAULT_TEXTURE_PRIORITY,
        }
    }

    pub fn priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }
}
