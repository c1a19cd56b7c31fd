//! The Turbo main board: memory map, PPI wiring and frame entry points.

use std::sync::Arc;

use arcade_video::{
    Bitmap, CollisionOnly, FullDraw, Palette, Pixel, RomError, RomSet, ScreenUpdate,
};
use emu_core::{Bus, InputPorts, MasterClock, Observable, ReadResult, Value, parse_query_address};
use intel_8255::{Port, PortHandler, PpiBank};
use intel_8279::Intel8279;

use crate::collision::CollisionLatch;
use crate::config::TurboConfig;
use crate::road::RoadRegisters;
use crate::sound::{SampleBank, TurboSound};
use crate::sprites::{POSITION_RAM_SIZE, SPRITE_RAM_SIZE};
use crate::video::TurboVideo;

/// Board crystal; the Z80 runs at a quarter of it.
pub const MASTER_CLOCK: MasterClock = MasterClock::new(19_968_000);

const PROGRAM_SIZE: usize = 0x6000;
const RAM_SIZE: usize = 0x800;

/// Input port indices handed to [`InputPorts`].
pub mod input {
    /// FD00: coins, start, gear shift.
    pub const SYSTEM: usize = 0;
    /// 8279 data port: DIP switch bank 1.
    pub const DSW1: usize = 1;
    /// PPI #3 port A: DIP switch bank 2.
    pub const DSW2: usize = 2;
    /// PPI #3 port B: steering wheel.
    pub const WHEEL: usize = 3;
    /// FE00 high nibble: DIP switch bank 3.
    pub const DSW3: usize = 4;
}

/// Everything the four PPIs are wired to.
struct Wiring {
    regs: RoadRegisters,
    sound: TurboSound,
    inputs: Box<dyn InputPorts>,
}

impl PortHandler for Wiring {
    fn port_read(&mut self, chip: usize, port: Port) -> u8 {
        match (chip, port) {
            (3, Port::A) => self.inputs.read_input(input::DSW2),
            (3, Port::B) => self.inputs.read_input(input::WHEEL),
            _ => 0,
        }
    }

    fn port_write(&mut self, chip: usize, port: Port, value: u8) {
        match (chip, port) {
            (0, Port::A) => self.regs.opa = value,
            (0, Port::B) => self.regs.opb = value,
            (0, Port::C) => self.regs.opc = value,
            (1, Port::A) => self.regs.ipa = value,
            (1, Port::B) => self.regs.ipb = value,
            (1, Port::C) => self.regs.ipc = value,
            (2, Port::A) => self.sound.write_a(value),
            (2, Port::B) => self.sound.write_b(value),
            (2, Port::C) => self.sound.write_c(value),
            (3, Port::C) => {
                self.regs.fbcol = value & 0x0F;
                self.regs.prbank = (value >> 4) & 0x03;
            }
            _ => {}
        }
    }
}

pub struct Turbo<P: Pixel = u8> {
    program: Vec<u8>,
    ram: Vec<u8>,
    sprite_ram: Vec<u8>,
    position_ram: Vec<u8>,
    video: TurboVideo<P>,
    ppi: PpiBank,
    display: Intel8279,
    wiring: Wiring,
    collision: Arc<CollisionLatch>,
    coin_lamp: u8,
}

impl<P: Pixel> Turbo<P> {
    /// Build the board from its ROM set. Fails if any region is missing or
    /// too small.
    pub fn new(
        config: &TurboConfig,
        roms: &RomSet,
        inputs: Box<dyn InputPorts>,
        samples: Box<dyn SampleBank>,
    ) -> Result<Self, RomError> {
        let program = roms.region("program", PROGRAM_SIZE)?.to_vec();
        let video = TurboVideo::new(config, roms)?;
        log::info!(
            "Turbo board: visible lines {}-{}",
            config.first_visible_line,
            config.last_visible_line
        );
        Ok(Self {
            program,
            ram: vec![0; RAM_SIZE],
            sprite_ram: vec![0; SPRITE_RAM_SIZE],
            position_ram: vec![0; POSITION_RAM_SIZE],
            video,
            ppi: PpiBank::new(4),
            display: Intel8279::new(),
            wiring: Wiring {
                regs: RoadRegisters::default(),
                sound: TurboSound::new(samples, config),
                inputs,
            },
            collision: CollisionLatch::new(),
            coin_lamp: 0,
        })
    }

    #[must_use]
    pub fn video(&self) -> &TurboVideo<P> {
        &self.video
    }

    /// Road registers as last written through the PPIs.
    #[must_use]
    pub fn road_registers(&self) -> &RoadRegisters {
        &self.wiring.regs
    }

    /// Collision accumulator handle.
    #[must_use]
    pub fn collision(&self) -> Arc<CollisionLatch> {
        Arc::clone(&self.collision)
    }

    /// The 8279's display RAM (score, time and speed LEDs) as nibbles.
    #[must_use]
    pub fn leds(&self) -> &[u8; 32] {
        self.display.segments()
    }

    /// Z80 clock in Hz.
    #[must_use]
    pub fn cpu_clock_hz(&self) -> u64 {
        MASTER_CLOCK.divided(4)
    }

    /// Call once per video frame. A frame the host does not present still
    /// needs its collision pass, since the game polls the latch.
    pub fn end_of_frame(&mut self, displayed: bool) {
        if !displayed {
            self.render_collision_only();
        }
    }

    /// Memory read without side effects. Device registers read as 0.
    #[must_use]
    pub fn peek(&self, addr: u16) -> u8 {
        let a = usize::from(addr);
        match addr {
            0x0000..=0x5FFF => self.program[a],
            0xA000..=0xA1FF => self.position_ram[a - 0xA000],
            0xB000..=0xB1FF => self.sprite_ram[a - 0xB000],
            0xE000..=0xE7FF => self.video.fore().read(a - 0xE000),
            0xF000..=0xF7FF => self.ram[a - 0xF000],
            _ => 0,
        }
    }

    fn read_memory(&mut self, addr: u16) -> u8 {
        let a = usize::from(addr);
        match addr {
            0xF800..=0xFBFF => self.ppi.read((a >> 8) & 3, a & 3, &mut self.wiring),
            0xFC00..=0xFCFF => {
                let sensor = self.wiring.inputs.read_input(input::DSW1);
                self.display.read(a & 1, sensor)
            }
            0xFD00..=0xFDFF => self.wiring.inputs.read_input(input::SYSTEM),
            0xFE00..=0xFEFF => {
                (self.wiring.inputs.read_input(input::DSW3) & 0xF0) | self.collision.read()
            }
            0x0000..=0x5FFF | 0xA000..=0xA1FF | 0xB000..=0xB1FF | 0xE000..=0xE7FF | 0xF000..=0xF7FF => {
                self.peek(addr)
            }
            _ => {
                log::debug!("unmapped read {addr:#06X}");
                0
            }
        }
    }

    fn write_memory(&mut self, addr: u16, data: u8) {
        let a = usize::from(addr);
        match addr {
            0x0000..=0x5FFF => log::trace!("write to ROM {addr:#06X} ignored"),
            0xA000..=0xA1FF => self.position_ram[a - 0xA000] = data,
            0xB000..=0xB1FF => self.sprite_ram[a - 0xB000] = data,
            // Steering wheel counter reset; the wheel is read as absolute.
            0xB800 => {}
            0xE000..=0xE7FF => {
                self.video.fore_mut().write(a - 0xE000, data);
            }
            0xE800 => self.coin_lamp = data,
            0xF000..=0xF7FF => self.ram[a - 0xF000] = data,
            0xF800..=0xFBFF => self.ppi.write((a >> 8) & 3, a & 3, data, &mut self.wiring),
            0xFC00..=0xFCFF => self.display.write(a & 1, data),
            0xFE00..=0xFEFF => self.collision.clear(),
            _ => log::debug!("unmapped write {addr:#06X} = {data:#04X}"),
        }
    }
}

#[cfg(feature = "capture")]
impl<P: Pixel> Turbo<P> {
    /// Save the last rendered frame as a PNG.
    pub fn save_screenshot(&self, path: &std::path::Path) -> Result<(), arcade_video::capture::CaptureError> {
        arcade_video::capture::save_png(self.frame(), self.palette(), path)
    }
}

impl<P: Pixel> Bus for Turbo<P> {
    fn read(&mut self, addr: u32) -> ReadResult {
        ReadResult::new(self.read_memory(addr as u16))
    }

    fn write(&mut self, addr: u32, value: u8) -> u8 {
        self.write_memory(addr as u16, value);
        0
    }

    /// Nothing is decoded on the Z80 I/O space.
    fn io_read(&mut self, addr: u32) -> ReadResult {
        log::debug!("unmapped port read {:#04X}", addr & 0xFF);
        ReadResult::new(0)
    }

    fn io_write(&mut self, addr: u32, value: u8) -> u8 {
        log::debug!("unmapped port write {:#04X} = {value:#04X}", addr & 0xFF);
        0
    }
}

impl<P: Pixel> ScreenUpdate for Turbo<P> {
    type Pixel = P;

    fn render_frame(&mut self, full_refresh: bool) {
        if full_refresh {
            self.video.fore_mut().invalidate();
        }
        self.video.render::<FullDraw>(
            &self.wiring.regs,
            &self.sprite_ram,
            &self.position_ram,
            &self.collision,
        );
    }

    fn render_collision_only(&mut self) {
        self.video.render::<CollisionOnly>(
            &self.wiring.regs,
            &self.sprite_ram,
            &self.position_ram,
            &self.collision,
        );
    }

    fn frame(&self) -> &Bitmap<P> {
        self.video.frame()
    }

    fn palette(&self) -> &Palette {
        self.video.palette()
    }
}

impl<P: Pixel> Observable for Turbo<P> {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("ppi.") {
            return self.ppi.query(rest);
        }
        if let Some(rest) = path.strip_prefix("sound.") {
            return self.wiring.sound.query(rest);
        }
        if let Some(rest) = path.strip_prefix("video.") {
            return self.video.query(rest);
        }
        if let Some(rest) = path.strip_prefix("display.") {
            return self.display.query(rest);
        }
        if let Some(addr) = path.strip_prefix("memory.") {
            return Some(self.peek(parse_query_address(addr)?).into());
        }
        let regs = &self.wiring.regs;
        match path {
            "leds" => self.display.query("segments"),
            "collision" => Some(self.collision.read().into()),
            "coin_lamp" => Some(self.coin_lamp.into()),
            "road.opa" => Some(regs.opa.into()),
            "road.opb" => Some(regs.opb.into()),
            "road.opc" => Some(regs.opc.into()),
            "road.ipa" => Some(regs.ipa.into()),
            "road.ipb" => Some(regs.ipb.into()),
            "road.ipc" => Some(regs.ipc.into()),
            "road.fbcol" => Some(regs.fbcol.into()),
            "road.prbank" => Some(regs.prbank.into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "ppi.<n>.<field>",
            "sound.<path>",
            "video.<path>",
            "display.<path>",
            "memory.<addr>",
            "leds",
            "collision",
            "coin_lamp",
            "road.opa",
            "road.opb",
            "road.opc",
            "road.ipa",
            "road.ipb",
            "road.ipc",
            "road.fbcol",
            "road.prbank",
        ]
    }
}
