//! Intel 8255 Programmable Peripheral Interface (PPI).
//!
//! Three 8-bit ports (A, B, C) plus a control register. Only mode 0 (basic
//! input/output) is modelled; that is all the arcade boards using this crate
//! ever program.
//!
//! # Registers (offset 0-3)
//!
//! | Off | Name    | Description                                    |
//! |-----|---------|------------------------------------------------|
//! | 0   | Port A  | 8-bit data, direction from control bit 4       |
//! | 1   | Port B  | 8-bit data, direction from control bit 1       |
//! | 2   | Port C  | upper nibble: control bit 3, lower: bit 0      |
//! | 3   | Control | bit 7 set: mode set; clear: port C bit set/reset |
//!
//! Direction masks use 0xFF (or 0xF0/0x0F for port C halves) for input and
//! 0x00 for output. A port read while configured as input asks the board via
//! [`PortHandler::port_read`]; every write reports the externally visible
//! value through [`PortHandler::port_write`].
//!
//! Accesses to a chip or port that does not exist are silently ignored
//! (reads return 0). Boards occasionally decode such combinations and real
//! hardware simply floats.

use emu_core::{Observable, Value};

/// Power-on value of the control register.
pub const CONTROL_POWER_ON: u8 = 0x1B;

/// Offset of the control register.
pub const CONTROL: usize = 3;

/// The three data ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Port {
    A,
    B,
    C,
}

impl Port {
    /// Map a register offset (0-2) to a port.
    #[must_use]
    pub fn from_offset(offset: usize) -> Option<Self> {
        match offset {
            0 => Some(Port::A),
            1 => Some(Port::B),
            2 => Some(Port::C),
            _ => None,
        }
    }

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Port::A => 0,
            Port::B => 1,
            Port::C => 2,
        }
    }
}

/// External wiring of a bank of PPIs.
///
/// Both methods default to "nothing connected": reads return 0 and writes
/// go nowhere.
pub trait PortHandler {
    /// Value presented on the pins of an input port.
    fn port_read(&mut self, _chip: usize, _port: Port) -> u8 {
        0
    }

    /// A port's output pins changed (or were re-driven).
    fn port_write(&mut self, _chip: usize, _port: Port, _value: u8) {}
}

/// A board with nothing wired to its PPI ports.
pub struct Unconnected;

impl PortHandler for Unconnected {}

/// One 8255 chip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ppi8255 {
    group_a_mode: u8,
    group_b_mode: u8,
    /// Direction per port: set bits are inputs.
    io: [u8; 3],
    /// Last value written to each port.
    latch: [u8; 3],
    control: u8,
}

impl Ppi8255 {
    /// A chip in its reset state: every port an input, latches cleared.
    #[must_use]
    pub fn new() -> Self {
        Self {
            group_a_mode: 0,
            group_b_mode: 0,
            io: [0xFF; 3],
            latch: [0; 3],
            control: CONTROL_POWER_ON,
        }
    }

    /// Direction mask of a port (set bits are inputs).
    #[must_use]
    pub fn direction(&self, port: Port) -> u8 {
        self.io[port.index()]
    }

    /// Last value latched for a port.
    #[must_use]
    pub fn latch(&self, port: Port) -> u8 {
        self.latch[port.index()]
    }

    #[must_use]
    pub fn control(&self) -> u8 {
        self.control
    }

    /// Value driven onto the pins of a port. Bits configured as input read
    /// back as 1 on the external side.
    #[must_use]
    pub fn output(&self, port: Port) -> u8 {
        let n = port.index();
        (self.latch[n] & !self.io[n]) | (0xFF & self.io[n])
    }

    fn read<H: PortHandler + ?Sized>(&self, chip: usize, offset: usize, handler: &mut H) -> u8 {
        match offset {
            0 | 1 => {
                if self.io[offset] == 0 {
                    self.latch[offset]
                } else {
                    let port = if offset == 0 { Port::A } else { Port::B };
                    handler.port_read(chip, port)
                }
            }
            2 => {
                if self.io[2] == 0 {
                    self.latch[2]
                } else {
                    // Each half of port C has its own direction.
                    let external = handler.port_read(chip, Port::C);
                    (self.latch[2] & !self.io[2]) | (external & self.io[2])
                }
            }
            // The control register is write-only; the bus floats high.
            CONTROL => 0xFF,
            _ => 0,
        }
    }

    fn write<H: PortHandler + ?Sized>(
        &mut self,
        chip: usize,
        offset: usize,
        data: u8,
        handler: &mut H,
    ) {
        if let Some(port) = Port::from_offset(offset) {
            self.latch[offset] = data;
            handler.port_write(chip, port, self.output(port));
            return;
        }
        if offset != CONTROL {
            return;
        }

        self.control = data;
        if data & 0x80 != 0 {
            self.mode_set(chip, data, handler);
        } else {
            // Bit set/reset: bits 1-3 select the port C bit, bit 0 the level.
            let bit = (data >> 1) & 0x07;
            if data & 0x01 != 0 {
                self.latch[2] |= 1 << bit;
            } else {
                self.latch[2] &= !(1 << bit);
            }
            handler.port_write(chip, Port::C, self.output(Port::C));
        }
    }

    fn mode_set<H: PortHandler + ?Sized>(&mut self, chip: usize, data: u8, handler: &mut H) {
        self.group_a_mode = (data >> 5) & 0x03;
        self.group_b_mode = (data >> 2) & 0x01;
        if self.group_a_mode != 0 || self.group_b_mode != 0 {
            log::warn!(
                "8255 #{chip}: strobed mode requested (control {data:#04X}), handled as mode 0"
            );
        }

        self.io[0] = if data & 0x10 != 0 { 0xFF } else { 0x00 };
        self.io[1] = if data & 0x02 != 0 { 0xFF } else { 0x00 };
        let upper = if data & 0x08 != 0 { 0xF0 } else { 0x00 };
        let lower = if data & 0x01 != 0 { 0x0F } else { 0x00 };
        self.io[2] = upper | lower;

        // A mode set clears all output latches and re-drives every port.
        self.latch = [0; 3];
        for port in [Port::A, Port::B, Port::C] {
            handler.port_write(chip, port, self.output(port));
        }
    }
}

impl Default for Ppi8255 {
    fn default() -> Self {
        Self::new()
    }
}

/// A bank of 8255s addressed by chip index, as decoded on a board.
#[derive(Debug, Clone)]
pub struct PpiBank {
    chips: Vec<Ppi8255>,
}

impl PpiBank {
    /// Create `count` chips, all in their reset state.
    #[must_use]
    pub fn new(count: usize) -> Self {
        Self {
            chips: vec![Ppi8255::new(); count],
        }
    }

    /// Number of chips in the bank.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chips.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chips.is_empty()
    }

    /// Inspect one chip.
    #[must_use]
    pub fn chip(&self, index: usize) -> Option<&Ppi8255> {
        self.chips.get(index)
    }

    /// Read register `offset` (0-3) of chip `index`.
    pub fn read<H: PortHandler + ?Sized>(&self, index: usize, offset: usize, handler: &mut H) -> u8 {
        match self.chips.get(index) {
            Some(chip) => chip.read(index, offset, handler),
            None => 0,
        }
    }

    /// Write register `offset` (0-3) of chip `index`.
    pub fn write<H: PortHandler + ?Sized>(
        &mut self,
        index: usize,
        offset: usize,
        data: u8,
        handler: &mut H,
    ) {
        if let Some(chip) = self.chips.get_mut(index) {
            chip.write(index, offset, data, handler);
        }
    }
}

impl Observable for PpiBank {
    fn query(&self, path: &str) -> Option<Value> {
        let (index, field) = path.split_once('.')?;
        let chip = self.chips.get(index.parse::<usize>().ok()?)?;
        match field {
            "control" => Some(chip.control.into()),
            "mode_a" => Some(chip.group_a_mode.into()),
            "mode_b" => Some(chip.group_b_mode.into()),
            "io" => Some(Value::Bytes(chip.io.to_vec())),
            "latch" => Some(Value::Bytes(chip.latch.to_vec())),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &["<n>.control", "<n>.mode_a", "<n>.mode_b", "<n>.io", "<n>.latch"]
    }
}
