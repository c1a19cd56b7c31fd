//! Master clock configuration.

/// Master clock configuration for a board.
///
/// Each board has a master crystal that drives all timing. The CPUs and the
/// pixel clock run at integer divisions of it.
#[derive(Debug, Clone, Copy)]
pub struct MasterClock {
    /// Crystal frequency in Hz (e.g., `19_968_000` for Turbo).
    pub frequency_hz: u64,
}

impl MasterClock {
    #[must_use]
    pub const fn new(frequency_hz: u64) -> Self {
        Self { frequency_hz }
    }

    /// Frequency after dividing the crystal by `divider`.
    #[must_use]
    pub const fn divided(&self, divider: u64) -> u64 {
        self.frequency_hz / divider
    }

    /// Cycles of a `divider`-divided clock per frame at the given refresh
    /// rate (integer division).
    #[must_use]
    pub const fn cycles_per_frame(&self, divider: u64, frames_per_second: u64) -> u64 {
        self.frequency_hz / divider / frames_per_second
    }
}
