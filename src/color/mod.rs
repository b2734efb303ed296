pub(crate) mod params;

pub use params::{ConversionParameters, InverseTransform, ParameterCache, ParameterError};

/// YpCbCr to RGB matrix, described by its luma weights of red and blue
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YpCbCrMatrix {
    pub kr: f32,
    pub kb: f32,
}

impl YpCbCrMatrix {
    /// Rec. ITU-R BT.601-4
    pub const ITU_R_601_4: Self = Self {
        kr: 0.299,
        kb: 0.114,
    };

    pub(crate) fn kg(&self) -> f32 {
        1.0 - self.kr - self.kb
    }
}

/// Biases and valid ranges of the luma and chroma components
///
/// All values are 8 bit code values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRange {
    pub y_bias: u8,
    pub cbcr_bias: u8,

    pub y_min: u8,
    pub y_max: u8,
    pub cbcr_min: u8,
    pub cbcr_max: u8,
}

impl PixelRange {
    /// Standard (video) range
    ///
    /// - Y  16..=235
    /// - Cb, Cr 16..=240
    pub const VIDEO: Self = Self {
        y_bias: 16,
        cbcr_bias: 128,
        y_min: 16,
        y_max: 235,
        cbcr_min: 16,
        cbcr_max: 240,
    };

    pub(crate) fn y_range(&self) -> u8 {
        self.y_max.saturating_sub(self.y_min)
    }

    pub(crate) fn cbcr_range(&self) -> u8 {
        self.cbcr_max.saturating_sub(self.cbcr_min)
    }
}
