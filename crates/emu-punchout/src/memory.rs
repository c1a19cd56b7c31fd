//! Main CPU work RAM and battery-backed NVRAM.

use crate::protection::MainMemory;

pub const NVRAM_BASE: u16 = 0xC000;
pub const NVRAM_SIZE: usize = 0x400;
pub const RAM_BASE: u16 = 0xD000;
pub const RAM_SIZE: usize = 0x800;

/// Plain read/write memory of the main CPU.
#[derive(Debug, Clone)]
pub struct MainRam {
    nvram: [u8; NVRAM_SIZE],
    ram: [u8; RAM_SIZE],
}

impl MainRam {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nvram: [0; NVRAM_SIZE],
            ram: [0; RAM_SIZE],
        }
    }

    fn slot(&mut self, addr: u16) -> Option<&mut u8> {
        match addr {
            0xC000..=0xC3FF => self.nvram.get_mut(usize::from(addr - NVRAM_BASE)),
            0xD000..=0xD7FF => self.ram.get_mut(usize::from(addr - RAM_BASE)),
            _ => None,
        }
    }

    /// Byte at `addr`, or `None` when no RAM is decoded there.
    #[must_use]
    pub fn get(&self, addr: u16) -> Option<u8> {
        match addr {
            0xC000..=0xC3FF => Some(self.nvram[usize::from(addr - NVRAM_BASE)]),
            0xD000..=0xD7FF => Some(self.ram[usize::from(addr - RAM_BASE)]),
            _ => None,
        }
    }

    /// Store a byte; returns false when no RAM is decoded at `addr`.
    pub fn set(&mut self, addr: u16, data: u8) -> bool {
        match self.slot(addr) {
            Some(byte) => {
                *byte = data;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn nvram(&self) -> &[u8] {
        &self.nvram
    }

    pub fn nvram_mut(&mut self) -> &mut [u8] {
        &mut self.nvram
    }
}

impl Default for MainRam {
    fn default() -> Self {
        Self::new()
    }
}

impl MainMemory for MainRam {
    fn read_main(&self, addr: u16) -> u8 {
        self.get(addr).unwrap_or(0)
    }

    fn write_main(&mut self, addr: u16, data: u8) {
        if !self.set(addr, data) {
            log::debug!("protection write to undecoded main address {addr:#06X}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decoded_ranges() {
        let mut mem = MainRam::new();
        assert!(mem.set(0xC3FF, 1));
        assert!(mem.set(0xD7C1, 2));
        assert!(!mem.set(0xC400, 3));
        assert_eq!(mem.nvram()[0x3FF], 1);
        assert_eq!(mem.read_main(0xD7C1), 2);
        assert_eq!(mem.read_main(0xC400), 0);
    }
}
