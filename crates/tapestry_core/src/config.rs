//! Engine configuration

/// Knobs shared by the layout differ and the collage renderer
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Device pixels per device-independent pixel, applied to drawing surfaces
    pub device_pixel_ratio: f32,
    /// Use the surface's native dash support when it reports one
    pub native_line_dash: bool,
    /// Allow a pass to schedule one redraw when an image asset finishes loading
    pub retrigger_assets: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            device_pixel_ratio: 1.0,
            native_line_dash: true,
            retrigger_assets: true,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the device pixel ratio. Non-finite or non-positive ratios fall back to 1.
    pub fn with_device_pixel_ratio(mut self, ratio: f32) -> Self {
        self.device_pixel_ratio = if ratio.is_finite() && ratio > 0.0 {
            ratio
        } else {
            1.0
        };
        self
    }

    pub fn with_native_line_dash(mut self, enabled: bool) -> Self {
        self.native_line_dash = enabled;
        self
    }

    pub fn with_retrigger_assets(mut self, enabled: bool) -> Self {
        self.retrigger_assets = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_guard() {
        assert_eq!(EngineConfig::new().with_device_pixel_ratio(2.0).device_pixel_ratio, 2.0);
        assert_eq!(EngineConfig::new().with_device_pixel_ratio(f32::NAN).device_pixel_ratio, 1.0);
        assert_eq!(EngineConfig::new().with_device_pixel_ratio(0.0).device_pixel_ratio, 1.0);
    }
}
