//! Intel 8279 keyboard/display controller.
//!
//! Only the display RAM side is emulated: the boards that use it drive
//! seven-segment score LEDs and read the DIP switches through the data
//! port. Sixteen display bytes are stored as 32 nibbles.

use emu_core::{Observable, Value};

/// Number of display nibbles.
pub const SEGMENTS: usize = 32;

/// Status register value: display unavailable bit clear, FIFO empty.
const STATUS: u8 = 0x10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intel8279 {
    addr: u8,
    auto_increment: bool,
    segments: [u8; SEGMENTS],
}

impl Intel8279 {
    #[must_use]
    pub fn new() -> Self {
        Self {
            addr: 0,
            auto_increment: false,
            segments: [0; SEGMENTS],
        }
    }

    /// Read a register. Offset 0 is the data port, which on these boards
    /// returns the sensor byte presented by the host; offset 1 is status.
    #[must_use]
    pub fn read(&self, offset: usize, sensor: u8) -> u8 {
        if offset & 1 == 0 { sensor } else { STATUS }
    }

    /// Write a register. Offset 0 writes display RAM, offset 1 is a command.
    pub fn write(&mut self, offset: usize, data: u8) {
        if offset & 1 == 0 {
            let base = usize::from(self.addr) * 2;
            self.segments[base] = data & 0x0F;
            self.segments[base + 1] = data >> 4;
            if self.auto_increment {
                self.addr = (self.addr + 1) & 0x0F;
            }
            return;
        }

        match data & 0xE0 {
            // Write display RAM: address in bits 0-3, auto-increment in bit 4.
            0x80 => {
                self.addr = data & 0x0F;
                self.auto_increment = data & 0x10 != 0;
            }
            // Clear display RAM.
            0xC0 => self.segments = [0; SEGMENTS],
            _ => log::trace!("8279: ignored command {data:#04X}"),
        }
    }

    /// The display RAM as nibbles, low nibble of each byte first.
    #[must_use]
    pub fn segments(&self) -> &[u8; SEGMENTS] {
        &self.segments
    }
}

impl Default for Intel8279 {
    fn default() -> Self {
        Self::new()
    }
}

impl Observable for Intel8279 {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "addr" => Some(self.addr.into()),
            "auto_increment" => Some(self.auto_increment.into()),
            "segments" => Some(self.segments.as_slice().into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &["addr", "auto_increment", "segments"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_write_splits_nibbles() {
        let mut chip = Intel8279::new();
        chip.write(1, 0x83);
        chip.write(0, 0x5A);
        assert_eq!(chip.segments()[6], 0x0A);
        assert_eq!(chip.segments()[7], 0x05);
    }

    #[test]
    fn auto_increment_wraps_at_sixteen() {
        let mut chip = Intel8279::new();
        chip.write(1, 0x9F);
        chip.write(0, 0x21);
        chip.write(0, 0x43);
        assert_eq!(&chip.segments()[30..32], &[0x01, 0x02]);
        assert_eq!(&chip.segments()[0..2], &[0x03, 0x04]);
    }

    #[test]
    fn without_auto_increment_address_stays() {
        let mut chip = Intel8279::new();
        chip.write(1, 0x82);
        chip.write(0, 0x11);
        chip.write(0, 0x22);
        assert_eq!(&chip.segments()[4..6], &[0x02, 0x02]);
        assert_eq!(chip.segments()[6], 0);
    }

    #[test]
    fn clear_command_zeroes_display() {
        let mut chip = Intel8279::new();
        chip.write(1, 0x90);
        for _ in 0..16 {
            chip.write(0, 0xFF);
        }
        chip.write(1, 0xC0);
        assert!(chip.segments().iter().all(|&s| s == 0));
    }

    #[test]
    fn reads_return_sensor_and_status() {
        let chip = Intel8279::new();
        assert_eq!(chip.read(0, 0xA7), 0xA7);
        assert_eq!(chip.read(1, 0xA7), 0x10);
    }
}
