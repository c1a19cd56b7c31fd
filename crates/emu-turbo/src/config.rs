//! Board tuning.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurboConfig {
    /// Playback rate of the engine sample with the accelerator released.
    pub accel_base_rate: u32,
    /// Accelerator value that doubles the engine sample rate, scaled so
    /// the full 6-bit range reaches about 13x.
    pub accel_divisor: f64,
    /// First displayed scanline.
    pub first_visible_line: usize,
    /// Last displayed scanline (inclusive).
    pub last_visible_line: usize,
}

impl Default for TurboConfig {
    fn default() -> Self {
        Self {
            accel_base_rate: 44_100,
            accel_divisor: 5.25,
            first_visible_line: 16,
            last_visible_line: 239,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: TurboConfig =
            serde_json::from_str(r#"{ "accel_base_rate": 22050 }"#).expect("valid json");
        assert_eq!(config.accel_base_rate, 22_050);
        assert_eq!(config.last_visible_line, 239);
    }
}
