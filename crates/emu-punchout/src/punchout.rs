//! The Punch-Out!! main board: memory map, I/O ports and frame entry points.

use std::sync::Arc;

use arcade_video::{Bitmap, Palette, RomError, RomSet, ScreenUpdate};
use emu_core::{Bus, InputPorts, MasterClock, Observable, ReadResult, Value, parse_query_address};

use crate::config::PunchOutConfig;
use crate::memory::{MainRam, NVRAM_SIZE};
use crate::protection::Protection;
use crate::sound::{SoundBridge, SoundLatches, SpeechSynth};
use crate::video::PunchOutVideo;

/// Main CPU crystal; the Z80 runs at half of it.
pub const MAIN_CLOCK: MasterClock = MasterClock::new(8_000_000);
/// Sound board crystal; the 2A03 divides it by 12.
pub const SOUND_CLOCK: MasterClock = MasterClock::new(21_477_272);

const PROGRAM_SIZE: usize = 0xC000;

pub struct PunchOut {
    config: PunchOutConfig,
    program: Vec<u8>,
    memory: MainRam,
    video: PunchOutVideo,
    protection: Option<Protection>,
    sound: SoundBridge,
    inputs: Box<dyn InputPorts>,
    nmi_enabled: bool,
}

impl PunchOut {
    /// Build the board from its ROM set. Fails if any region is missing or
    /// too small.
    pub fn new(
        config: PunchOutConfig,
        roms: &RomSet,
        inputs: Box<dyn InputPorts>,
        speech: Box<dyn SpeechSynth>,
    ) -> Result<Self, RomError> {
        let program = roms.region("program", PROGRAM_SIZE)?.to_vec();
        let video = PunchOutVideo::new(&config, roms)?;
        let protection = config.protection.clone().map(Protection::new);
        log::info!(
            "{:?} board: protection {}",
            config.variant,
            if protection.is_some() { "fitted" } else { "absent" }
        );
        Ok(Self {
            config,
            program,
            memory: MainRam::new(),
            video,
            protection,
            sound: SoundBridge::new(SoundLatches::new(), speech),
            inputs,
            nmi_enabled: false,
        })
    }

    #[must_use]
    pub fn config(&self) -> &PunchOutConfig {
        &self.config
    }

    #[must_use]
    pub fn video(&self) -> &PunchOutVideo {
        &self.video
    }

    /// Latches handle for the host's sound CPU.
    #[must_use]
    pub fn sound_latches(&self) -> Arc<SoundLatches> {
        Arc::clone(self.sound.latches())
    }

    /// Z80 clock in Hz.
    #[must_use]
    pub fn cpu_clock_hz(&self) -> u64 {
        MAIN_CLOCK.divided(2)
    }

    /// Whether the main CPU takes the vblank NMI.
    #[must_use]
    pub fn nmi_enabled(&self) -> bool {
        self.nmi_enabled
    }

    #[must_use]
    pub fn nvram(&self) -> &[u8] {
        self.memory.nvram()
    }

    pub fn nvram_mut(&mut self) -> &mut [u8] {
        self.memory.nvram_mut()
    }

    /// Restore NVRAM from a saved blob; short blobs leave the tail intact,
    /// extra bytes are ignored.
    pub fn load_nvram(&mut self, data: &[u8]) {
        let len = data.len().min(NVRAM_SIZE);
        self.memory.nvram_mut()[..len].copy_from_slice(&data[..len]);
        if data.len() != NVRAM_SIZE {
            log::warn!("NVRAM image is {} bytes, expected {NVRAM_SIZE}", data.len());
        }
    }

    /// Memory read without side effects.
    #[must_use]
    pub fn peek(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0xBFFF => self.program[usize::from(addr)],
            0xC000..=0xD7FF => self.memory.get(addr).unwrap_or(0),
            0xD800..=0xDFFF => self.video.top().read(usize::from(addr - 0xD800)),
            0xE000..=0xE7FF => self.video.big1().read(usize::from(addr - 0xE000)),
            0xE800..=0xEFFF => self.video.big2().read(usize::from(addr - 0xE800)),
            0xF000..=0xFFFF => self.video.bottom().read(usize::from(addr - 0xF000)),
        }
    }

    fn write_memory(&mut self, addr: u16, data: u8) {
        match addr {
            0x0000..=0xBFFF => log::trace!("write to ROM {addr:#06X} ignored"),
            0xC000..=0xC3FF | 0xD000..=0xD7FF => {
                self.memory.set(addr, data);
            }
            0xD800..=0xDFFF => self.write_top(usize::from(addr - 0xD800), data),
            0xE000..=0xE7FF => {
                self.video.big1_mut().write(usize::from(addr - 0xE000), data);
            }
            0xE800..=0xEFFF => {
                self.video.big2_mut().write(usize::from(addr - 0xE800), data);
            }
            // Row scroll table, aliased onto the first bottom tile rows.
            0xF000..=0xF03F => self.video.bottom_mut().poke(usize::from(addr - 0xF000), data),
            0xF040..=0xFFFF => {
                self.video.bottom_mut().write(usize::from(addr - 0xF000), data);
            }
            _ => log::debug!("unmapped write {addr:#06X} = {data:#04X}"),
        }
    }

    /// Control registers overlay the end of the top video RAM. The RAM
    /// behind them is written too but never redrawn for it.
    fn write_top(&mut self, offset: usize, data: u8) {
        match offset {
            0x7F0..=0x7F7 => self.video.write_big1_control(offset - 0x7F0, data),
            0x7F8..=0x7FC => self.video.write_big2_control(offset - 0x7F8, data),
            0x7FD => self.video.write_palette_bank(data),
            _ => {
                self.video.top_mut().write(offset, data);
                return;
            }
        }
        self.video.top_mut().poke(offset, data);
    }

    fn read_port(&mut self, port: u8) -> u8 {
        match port {
            0x00..=0x02 => self.inputs.read_input(usize::from(port)),
            0x03 => {
                let raw = self.inputs.read_input(3);
                self.sound.fold_busy(raw)
            }
            _ => match (Protection::port_offset(port), &self.protection) {
                (Some(offset), Some(prot)) => prot.read(offset, &self.memory),
                _ => {
                    log::debug!("unmapped port read {port:#04X}");
                    0
                }
            },
        }
    }

    fn write_port(&mut self, port: u8, data: u8) {
        let line = data & 1 != 0;
        match port {
            0x02 => self.sound.write_latch(0, data),
            0x03 => self.sound.write_latch(1, data),
            0x04 => self.sound.speech_data(data),
            0x08 => self.nmi_enabled = line,
            0x0B => self.sound.set_sound_cpu_reset(line),
            0x0C => self.sound.speech_reset(line),
            0x0D => self.sound.speech_start(line),
            0x0E => self.sound.speech_vcu(line),
            _ => match (Protection::port_offset(port), &mut self.protection) {
                (Some(offset), Some(prot)) => prot.write(offset, data, &mut self.memory),
                _ => log::debug!("unmapped port write {port:#04X} = {data:#04X}"),
            },
        }
    }
}

#[cfg(feature = "capture")]
impl PunchOut {
    /// Save the last rendered frame (both monitors) as a PNG.
    pub fn save_screenshot(&self, path: &std::path::Path) -> Result<(), arcade_video::capture::CaptureError> {
        arcade_video::capture::save_png(self.frame(), self.palette(), path)
    }
}

impl Bus for PunchOut {
    fn read(&mut self, addr: u32) -> ReadResult {
        ReadResult::new(self.peek(addr as u16))
    }

    fn write(&mut self, addr: u32, value: u8) -> u8 {
        self.write_memory(addr as u16, value);
        0
    }

    fn io_read(&mut self, addr: u32) -> ReadResult {
        ReadResult::new(self.read_port(addr as u8))
    }

    fn io_write(&mut self, addr: u32, value: u8) -> u8 {
        self.write_port(addr as u8, value);
        0
    }
}

impl ScreenUpdate for PunchOut {
    type Pixel = u16;

    fn render_frame(&mut self, full_refresh: bool) {
        self.video.render(full_refresh);
    }

    /// No collision hardware on this board.
    fn render_collision_only(&mut self) {}

    fn frame(&self) -> &Bitmap<u16> {
        self.video.frame()
    }

    fn palette(&self) -> &Palette {
        self.video.palette()
    }
}

impl Observable for PunchOut {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("video.") {
            return self.video.query(rest);
        }
        if let Some(rest) = path.strip_prefix("protection.") {
            return self.protection.as_ref()?.query(rest);
        }
        if let Some(addr) = path.strip_prefix("memory.") {
            return Some(self.peek(parse_query_address(addr)?).into());
        }
        let latches = self.sound.latches();
        match path {
            "soundlatch" => Some(latches.read(0).into()),
            "soundlatch2" => Some(latches.read(1).into()),
            "sound_cpu_reset" => Some(latches.sound_cpu_in_reset().into()),
            "nmi_enabled" => Some(self.nmi_enabled.into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "video.<path>",
            "protection.mode",
            "protection.registers",
            "memory.<addr>",
            "soundlatch",
            "soundlatch2",
            "sound_cpu_reset",
            "nmi_enabled",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Variant;
    use crate::sound::NullSpeech;
    use crate::video::tests::blank_roms;

    fn board(variant: Variant) -> PunchOut {
        PunchOut::new(
            PunchOutConfig::for_variant(variant),
            &blank_roms(),
            Box::new([0x11u8, 0x22, 0x33, 0x00]),
            Box::new(NullSpeech),
        )
        .ok()
        .expect("roms are complete")
    }

    #[test]
    fn scroll_writes_do_not_dirty_bottom_tiles() {
        let mut po = board(Variant::PunchOut);
        po.render_frame(false);
        po.write(0xF004, 0x12);
        po.write(0xF040, 0x34);
        assert_eq!(po.video().bottom().dirty().count(), 1);
        assert_eq!(po.read(0xF004).data, 0x12);
    }

    #[test]
    fn port_3_carries_speech_idle_bit() {
        let mut po = board(Variant::PunchOut);
        assert_eq!(po.io_read(0x00).data, 0x11);
        assert_eq!(po.io_read(0x03).data, 0x10);
    }

    #[test]
    fn protection_ports_only_on_super_punchout() {
        let mut plain = board(Variant::PunchOut);
        plain.io_write(0xD7, 0x0A);
        assert_eq!(plain.io_read(0xD7).data, 0);

        let mut spo = board(Variant::SuperPunchOut);
        spo.io_write(0xD7, 0x0A);
        assert_eq!(spo.io_read(0xD7).data, 0x0A);
        spo.write(0xD012, 0x99);
        assert_eq!(spo.io_read(0x07).data, 0x99);
        assert_eq!(spo.query("protection.mode"), Some(Value::I32(0x0A)));
    }

    #[test]
    fn nvram_round_trip() {
        let mut po = board(Variant::PunchOut);
        po.write(0xC010, 0xAB);
        let saved = po.nvram().to_vec();
        let mut fresh = board(Variant::PunchOut);
        fresh.load_nvram(&saved);
        assert_eq!(fresh.read(0xC010).data, 0xAB);
    }
}
