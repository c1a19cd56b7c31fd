//! Super Punch-Out!! protection chip.
//!
//! The chip sits on I/O ports `0x07 | (offset << 4)` and holds sixteen
//! scratch registers plus a mode selector latched by writing offset 13.
//! What an access does depends on the offset and the current mode: some
//! combinations read or write fixed main-CPU RAM addresses, some return
//! constants, the rest go to the scratch registers.
//!
//! Behaviour is a reverse-engineered black box, so it is expressed as an
//! ordered rule table ([`ProtectionTable`]) rather than code. The first rule
//! matching `(offset, mode)` wins; accesses no rule covers use the scratch
//! register and are logged. Hosts can replace the table (it is serde
//! serializable) when a revision needs different answers.

use emu_core::{Observable, Value};
use serde::{Deserialize, Serialize};

/// Raw access to the main CPU address space, without side effects.
pub trait MainMemory {
    fn read_main(&self, addr: u16) -> u8;
    fn write_main(&mut self, addr: u16, data: u8);
}

/// Which mode selector values a rule applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModeMatch {
    Any,
    Is(i32),
    OneOf(Vec<i32>),
}

impl ModeMatch {
    #[must_use]
    pub fn matches(&self, mode: i32) -> bool {
        match self {
            ModeMatch::Any => true,
            ModeMatch::Is(m) => *m == mode,
            ModeMatch::OneOf(modes) => modes.contains(&mode),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadAction {
    /// Read a fixed main-CPU address.
    MainMemory(u16),
    /// The scratch register at this offset.
    Scratch,
    /// The scratch register ANDed with a mask.
    ScratchMasked(u8),
    /// Another scratch register shifted left.
    ScratchShifted { register: usize, shift: u8 },
    Constant(u8),
    /// The mode selector itself.
    ModeSelector,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteAction {
    /// Write a fixed main-CPU address.
    MainMemory(u16),
    Scratch,
    /// Latch the written value as the new mode selector.
    LatchMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadRule {
    pub offset: usize,
    pub mode: ModeMatch,
    pub action: ReadAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteRule {
    pub offset: usize,
    pub mode: ModeMatch,
    pub action: WriteAction,
}

/// Ordered read and write rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectionTable {
    pub reads: Vec<ReadRule>,
    pub writes: Vec<WriteRule>,
}

fn read(offset: usize, mode: ModeMatch, action: ReadAction) -> ReadRule {
    ReadRule {
        offset,
        mode,
        action,
    }
}

fn write(offset: usize, mode: ModeMatch, action: WriteAction) -> WriteRule {
    WriteRule {
        offset,
        mode,
        action,
    }
}

impl ProtectionTable {
    /// Behaviour observed on Super Punch-Out!!.
    #[must_use]
    pub fn super_punchout() -> Self {
        use ModeMatch::{Any, Is, OneOf};
        use ReadAction as R;
        use WriteAction as W;

        let reads = vec![
            read(0x00, Is(0x0A), R::MainMemory(0xD012)),
            read(0x00, OneOf(vec![0x0B, 0x23]), R::MainMemory(0xD7C1)),
            read(0x00, Any, R::Scratch),
            read(0x01, Is(0x08), R::Constant(0x00)),
            // Uncertain: the game ORs this value with 0x90 or 0x50 before
            // use, so only the low bits are known to matter.
            read(0x02, Is(0x0B), R::Constant(0x09)),
            read(0x02, Is(0x09), R::Scratch),
            read(0x03, Is(0x09), R::ScratchMasked(0x07)),
            read(0x05, Is(0x09), R::ScratchMasked(0x03)),
            read(0x06, Is(0x0B), R::Constant(0x0A)),
            read(0x06, Is(0x09), R::ScratchMasked(0x07)),
            read(0x09, Is(0x09), R::ScratchShifted { register: 0x0F, shift: 4 }),
            read(0x0A, Is(0x0B), R::Constant(0x05)),
            read(0x0A, Is(0x09), R::ScratchMasked(0x01)),
            read(0x0B, Is(0x0B), R::Constant(0x03)),
            // Uncertain: always 0 in every trace; the real chip may
            // return status bits here.
            read(0x0C, Any, R::Constant(0x00)),
            read(0x0D, Any, R::ModeSelector),
        ];

        let writes = vec![
            write(0x00, Is(0x0A), W::MainMemory(0xD012)),
            write(0x00, OneOf(vec![0x0B, 0x23]), W::MainMemory(0xD7C1)),
            write(0x00, Any, W::Scratch),
            write(0x02, Is(0x09), W::Scratch),
            write(0x03, Is(0x09), W::Scratch),
            write(0x05, Any, W::Scratch),
            write(0x06, Is(0x09), W::Scratch),
            write(0x0B, Any, W::Scratch),
            write(0x0D, Any, W::LatchMode),
            write(0x0F, Any, W::Scratch),
        ];

        Self { reads, writes }
    }
}

/// Protection chip state.
#[derive(Debug, Clone)]
pub struct Protection {
    table: ProtectionTable,
    /// -1 until the game first latches a mode.
    mode: i32,
    registers: [u8; 16],
}

impl Protection {
    #[must_use]
    pub fn new(table: ProtectionTable) -> Self {
        Self {
            table,
            mode: -1,
            registers: [0; 16],
        }
    }

    /// Map an I/O port to a protection offset (`x7` ports only).
    #[must_use]
    pub fn port_offset(port: u8) -> Option<usize> {
        (port & 0x0F == 0x07).then_some(usize::from(port >> 4))
    }

    #[must_use]
    pub fn mode(&self) -> i32 {
        self.mode
    }

    #[must_use]
    pub fn registers(&self) -> &[u8; 16] {
        &self.registers
    }

    pub fn read<M: MainMemory + ?Sized>(&self, offset: usize, memory: &M) -> u8 {
        let offset = offset & 0x0F;
        let rule = self
            .table
            .reads
            .iter()
            .find(|r| r.offset == offset && r.mode.matches(self.mode));
        let Some(rule) = rule else {
            log::debug!("protection: unmapped read offset {offset:#X} mode {}", self.mode);
            return self.registers[offset];
        };
        match rule.action {
            ReadAction::MainMemory(addr) => memory.read_main(addr),
            ReadAction::Scratch => self.registers[offset],
            ReadAction::ScratchMasked(mask) => self.registers[offset] & mask,
            // Shifts of 8 or more clear the byte.
            ReadAction::ScratchShifted { register, shift } => self.registers[register & 0x0F]
                .checked_shl(u32::from(shift))
                .unwrap_or(0),
            ReadAction::Constant(value) => value,
            ReadAction::ModeSelector => self.mode as u8,
        }
    }

    pub fn write<M: MainMemory + ?Sized>(&mut self, offset: usize, data: u8, memory: &mut M) {
        let offset = offset & 0x0F;
        let rule = self
            .table
            .writes
            .iter()
            .find(|r| r.offset == offset && r.mode.matches(self.mode));
        let Some(rule) = rule else {
            log::debug!(
                "protection: unmapped write offset {offset:#X} mode {} data {data:#04X}",
                self.mode
            );
            self.registers[offset] = data;
            return;
        };
        match rule.action {
            WriteAction::MainMemory(addr) => memory.write_main(addr, data),
            WriteAction::Scratch => self.registers[offset] = data,
            WriteAction::LatchMode => self.mode = i32::from(data),
        }
    }
}

impl Observable for Protection {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "mode" => Some(self.mode.into()),
            "registers" => Some(self.registers.as_slice().into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &["mode", "registers"]
    }
}
