use serde::{Deserialize, Serialize};

/// Device or frame orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Landscape,
    Portrait,
}

impl Orientation {
    /// Display rotation handed to the encoder for this orientation.
    pub fn rotation_degrees(self) -> u16 {
        match self {
            Self::Landscape => 0,
            Self::Portrait => 90,
        }
    }

    pub fn is_landscape(self) -> bool {
        matches!(self, Self::Landscape)
    }

    pub fn is_portrait(self) -> bool {
        matches!(self, Self::Portrait)
    }
}

/// A frame size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Square frames count as landscape.
    pub fn orientation(self) -> Orientation {
        if self.width >= self.height {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }

    pub fn swapped(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }

    /// Returns this size laid out in `orientation`, swapping sides if needed.
    pub fn oriented(self, orientation: Orientation) -> Self {
        if self.orientation() == orientation {
            self
        } else {
            self.swapped()
        }
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn aspect(self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

/// Centered crop rectangle, expressed as percentages of the source frame.
///
/// Width and height never reach 100: the renderer divides by `100 - value`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CropGeometry {
    pub offset_x_percent: f64,
    pub offset_y_percent: f64,
    pub width_percent: f64,
    pub height_percent: f64,
}

impl CropGeometry {
    /// Largest percentage the renderer accepts for a full dimension.
    pub const MAX_PERCENT: f64 = 99.9999;

    /// No crop: the whole source frame.
    pub const FULL: Self = Self {
        offset_x_percent: 0.0,
        offset_y_percent: 0.0,
        width_percent: Self::MAX_PERCENT,
        height_percent: Self::MAX_PERCENT,
    };
}
