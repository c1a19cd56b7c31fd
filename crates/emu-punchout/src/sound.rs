//! Main CPU to sound CPU bridge: two command latches, the 2A03 reset line
//! and the VLM5030 speech chip control lines.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Address the 2A03 reads `soundlatch` from.
pub const SOUND_LATCH_ADDR: u16 = 0x4016;
/// Address the 2A03 reads `soundlatch2` from.
pub const SOUND_LATCH2_ADDR: u16 = 0x4017;

/// Mailboxes shared between the two CPUs.
///
/// No handshake: the main CPU overwrites, the sound CPU polls. Byte-wide
/// atomics let a host run the CPUs on separate threads.
#[derive(Debug, Default)]
pub struct SoundLatches {
    latch: [AtomicU8; 2],
    sound_cpu_reset: AtomicBool,
}

impl SoundLatches {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn write(&self, index: usize, data: u8) {
        if let Some(latch) = self.latch.get(index) {
            latch.store(data, Ordering::Release);
        }
    }

    #[must_use]
    pub fn read(&self, index: usize) -> u8 {
        self.latch
            .get(index)
            .map_or(0, |latch| latch.load(Ordering::Acquire))
    }

    /// Sound CPU side of the latches. `None` for addresses that are not
    /// latch reads.
    #[must_use]
    pub fn sound_cpu_read(&self, addr: u16) -> Option<u8> {
        match addr {
            SOUND_LATCH_ADDR => Some(self.read(0)),
            SOUND_LATCH2_ADDR => Some(self.read(1)),
            _ => None,
        }
    }

    /// True while the main CPU holds the 2A03 in reset.
    #[must_use]
    pub fn sound_cpu_in_reset(&self) -> bool {
        self.sound_cpu_reset.load(Ordering::Acquire)
    }

    fn set_sound_cpu_reset(&self, asserted: bool) {
        self.sound_cpu_reset.store(asserted, Ordering::Release);
    }
}

/// A VLM5030 (or any speech chip with the same control lines).
pub trait SpeechSynth {
    fn data(&mut self, _data: u8) {}
    fn reset(&mut self, _level: bool) {}
    fn start(&mut self, _level: bool) {}
    fn vcu(&mut self, _level: bool) {}
    /// BSY output.
    fn busy(&self) -> bool {
        false
    }
}

/// No speech chip fitted: never busy.
#[derive(Debug, Default)]
pub struct NullSpeech;

impl SpeechSynth for NullSpeech {}

/// Main CPU side of the sound hardware.
pub struct SoundBridge {
    latches: Arc<SoundLatches>,
    speech: Box<dyn SpeechSynth>,
}

impl SoundBridge {
    #[must_use]
    pub fn new(latches: Arc<SoundLatches>, speech: Box<dyn SpeechSynth>) -> Self {
        Self { latches, speech }
    }

    #[must_use]
    pub fn latches(&self) -> &Arc<SoundLatches> {
        &self.latches
    }

    pub fn write_latch(&self, index: usize, data: u8) {
        self.latches.write(index, data);
    }

    /// Port 0x0B bit 0: holds the 2A03 in reset while set.
    pub fn set_sound_cpu_reset(&self, asserted: bool) {
        if asserted != self.latches.sound_cpu_in_reset() {
            log::debug!("2A03 reset {}", if asserted { "asserted" } else { "cleared" });
        }
        self.latches.set_sound_cpu_reset(asserted);
    }

    pub fn speech_data(&mut self, data: u8) {
        self.speech.data(data);
    }

    pub fn speech_reset(&mut self, level: bool) {
        self.speech.reset(level);
    }

    pub fn speech_start(&mut self, level: bool) {
        self.speech.start(level);
    }

    pub fn speech_vcu(&mut self, level: bool) {
        self.speech.vcu(level);
    }

    /// Fold the speech busy line into an input byte: bit 4 reads 0 while
    /// speech is playing and 1 when idle.
    #[must_use]
    pub fn fold_busy(&self, input: u8) -> u8 {
        if self.speech.busy() {
            input & !0x10
        } else {
            input | 0x10
        }
    }
}
