//! Memory and I/O bus interface.

/// Result of a bus read: the data byte plus any wait states the access cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadResult {
    pub data: u8,
    pub wait: u8,
}

impl ReadResult {
    /// A read with no wait states.
    #[must_use]
    pub const fn new(data: u8) -> Self {
        Self { data, wait: 0 }
    }

    /// A read that stalls the CPU for `wait` cycles.
    #[must_use]
    pub const fn with_wait(data: u8, wait: u8) -> Self {
        Self { data, wait }
    }
}

/// Memory and I/O bus interface.
///
/// A CPU core accesses memory and peripherals through this trait. The bus
/// handles address decoding and routing to the appropriate device. Z80
/// boards use the separate I/O space; addresses are passed as `u32` so the
/// same trait serves wider CPUs.
pub trait Bus {
    /// Read a byte from memory space.
    fn read(&mut self, addr: u32) -> ReadResult;

    /// Write a byte to memory space. Returns wait states.
    fn write(&mut self, addr: u32, value: u8) -> u8;

    /// Read a byte from I/O space.
    fn io_read(&mut self, addr: u32) -> ReadResult;

    /// Write a byte to I/O space. Returns wait states.
    fn io_write(&mut self, addr: u32, value: u8) -> u8;
}
