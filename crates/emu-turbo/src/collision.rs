//! Collision latch: OR-accumulated by the video hardware, polled and
//! cleared by the CPU.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

/// Bits 0-1: sprite against sprite, bit 2: sprite on slippery surface,
/// bit 3: sprite off the road.
#[derive(Debug, Default)]
pub struct CollisionLatch {
    bits: AtomicU8,
}

impl CollisionLatch {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// OR in newly detected bits. Bits only ever get set here.
    pub fn accumulate(&self, bits: u8) {
        if bits != 0 {
            self.bits.fetch_or(bits & 0x0F, Ordering::AcqRel);
        }
    }

    #[must_use]
    pub fn read(&self) -> u8 {
        self.bits.load(Ordering::Acquire)
    }

    pub fn clear(&self) {
        self.bits.store(0, Ordering::Release);
    }
}
