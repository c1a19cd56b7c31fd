//! Board variants and their per-revision tuning.

use arcade_video::{CellFormat, ColorRule, TransparentRule};
use serde::{Deserialize, Serialize};

use crate::protection::ProtectionTable;

/// Supported board revisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Variant {
    PunchOut,
    SuperPunchOut,
    ArmWrestling,
}

/// Pixel alignment constants for the big sprite composite.
///
/// These were fitted against screenshots of specific ROM revisions and
/// have no hardware derivation; recalibrate them if a revision's sprites
/// sit off by a few pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calibration {
    /// Added to the big sprite #1 source x, in units of the zoom value.
    pub big1_x_bias: i64,
    /// Subtracted from the big sprite #1 source y, in units of the zoom value.
    pub big1_y_bias: i64,
    /// Added to the big sprite #1 screen y.
    pub big1_y_offset: i32,
    /// Subtracted from the big sprite #2 screen x.
    pub big2_x_offset: i32,
    /// Added to the big sprite #2 screen y.
    pub big2_y_offset: i32,
    /// Fixed horizontal offset of the bottom tile layer.
    pub scroll_bias: i32,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            big1_x_bias: 3740,
            big1_y_bias: 178,
            big1_y_offset: 12,
            big2_x_offset: 55,
            big2_y_offset: 3,
            scroll_bias: 58,
        }
    }
}

/// Everything that differs between revisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PunchOutConfig {
    pub variant: Variant,
    pub top_colors: ColorRule,
    pub bottom_colors: ColorRule,
    pub big1_colors: ColorRule,
    pub big2_colors: ColorRule,
    pub big1_format: CellFormat,
    #[serde(default)]
    pub calibration: Calibration,
    /// Protection chip rules; `None` on boards without the chip.
    #[serde(default)]
    pub protection: Option<ProtectionTable>,
}

const fn rule(xor: u16, offset: u16, transparent: Option<TransparentRule>) -> ColorRule {
    ColorRule {
        entries: 512,
        xor,
        offset,
        transparent,
    }
}

const fn every(period: u16, residue: u16) -> Option<TransparentRule> {
    Some(TransparentRule { period, residue })
}

/// First pen of the bottom monitor's half of the palette.
pub const BOTTOM_PENS: u16 = 512;

impl PunchOutConfig {
    /// The top monitor (tiles and big sprite #1) draws from pens 0-511,
    /// the bottom monitor (tiles and big sprite #2) from pens 512-1023.
    /// Big sprites key on the raw pen an erased ROM reads as: 7 for the
    /// 3-plane sprite, 3 for the 2-plane one.
    #[must_use]
    pub fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::PunchOut | Variant::SuperPunchOut => Self {
                variant,
                top_colors: rule(3, 0, None),
                bottom_colors: rule(3, BOTTOM_PENS, None),
                big1_colors: rule(7, 0, every(8, 7)),
                big2_colors: rule(3, BOTTOM_PENS, every(4, 3)),
                big1_format: CellFormat::sprite_cell(16, 32, 0x1F, 0x1F),
                calibration: Calibration::default(),
                protection: (variant == Variant::SuperPunchOut)
                    .then(ProtectionTable::super_punchout),
            },
            // Arm Wrestling's tile and big sprite #1 ROMs are not inverted
            // and its big sprite #1 is a wide 32x16 cell grid.
            Variant::ArmWrestling => Self {
                variant,
                top_colors: rule(0, 0, None),
                bottom_colors: rule(0, BOTTOM_PENS, None),
                big1_colors: rule(0, 0, every(8, 7)),
                big2_colors: rule(3, BOTTOM_PENS, every(4, 3)),
                big1_format: CellFormat::sprite_cell(32, 16, 0x1F, 0x1F),
                calibration: Calibration::default(),
                protection: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_super_punchout_has_protection() {
        assert!(PunchOutConfig::for_variant(Variant::PunchOut).protection.is_none());
        assert!(PunchOutConfig::for_variant(Variant::SuperPunchOut).protection.is_some());
        assert!(PunchOutConfig::for_variant(Variant::ArmWrestling).protection.is_none());
    }

    const MARKER: u16 = 1024;

    fn pens(rule: &ColorRule) -> Vec<u16> {
        let table = rule.build(MARKER);
        (0..table.len()).map(|raw| table.pen(raw)).filter(|&p| p != MARKER).collect()
    }

    #[test]
    fn monitors_use_separate_palette_halves() {
        for variant in [Variant::PunchOut, Variant::ArmWrestling] {
            let config = PunchOutConfig::for_variant(variant);
            for rule in [&config.top_colors, &config.big1_colors] {
                assert!(pens(rule).iter().all(|&p| p < BOTTOM_PENS), "{variant:?}");
            }
            for rule in [&config.bottom_colors, &config.big2_colors] {
                assert!(pens(rule).iter().all(|&p| (BOTTOM_PENS..MARKER).contains(&p)), "{variant:?}");
            }
            assert!(pens(&config.big2_colors).contains(&1023));
        }
    }

    #[test]
    fn erased_big_sprite_pixels_are_transparent() {
        for variant in [Variant::PunchOut, Variant::ArmWrestling] {
            let config = PunchOutConfig::for_variant(variant);
            let big1 = config.big1_colors.build(MARKER);
            let big2 = config.big2_colors.build(MARKER);
            // All planes set, any colour.
            assert_eq!(big1.pen(5 * 8 + 7), MARKER);
            assert_eq!(big2.pen(9 * 4 + 3), MARKER);
            assert_ne!(big2.pen(9 * 4), MARKER);
        }
        let big2 = PunchOutConfig::for_variant(Variant::PunchOut).big2_colors.build(MARKER);
        assert_eq!(big2.pen(0), BOTTOM_PENS + 3);
    }

    #[test]
    fn calibration_override_from_json() {
        let mut json = serde_json::to_value(PunchOutConfig::for_variant(Variant::PunchOut))
            .expect("config serializes");
        json["calibration"]["big2_x_offset"] = serde_json::json!(60);
        let config: PunchOutConfig = serde_json::from_value(json).expect("config deserializes");
        assert_eq!(config.calibration.big2_x_offset, 60);
        assert_eq!(config.calibration.scroll_bias, 58);
    }
}
