//! Sample-triggered analog sound, driven by PPI #2.
//!
//! Effects fire on falling edges of the port bits. The engine sound is a
//! looping sample whose pitch follows the accelerator.

use emu_core::{Observable, Value};

use crate::config::TurboConfig;

/// Sample playback supplied by the host, addressed by channel and sample
/// number.
pub trait SampleBank {
    fn start(&mut self, channel: usize, sample: usize, looped: bool);
    fn stop(&mut self, channel: usize);
    fn set_frequency(&mut self, channel: usize, hz: u32);
    fn is_playing(&self, channel: usize) -> bool;
}

/// No audio output.
#[derive(Debug, Default)]
pub struct SilentSamples;

impl SampleBank for SilentSamples {
    fn start(&mut self, _channel: usize, _sample: usize, _looped: bool) {}
    fn stop(&mut self, _channel: usize) {}
    fn set_frequency(&mut self, _channel: usize, _hz: u32) {}
    fn is_playing(&self, _channel: usize) -> bool {
        false
    }
}

const CH_CRASH: usize = 0;
const CH_TRIGGER: usize = 1;
const CH_SKID: usize = 2;
const CH_CRASH_LONG: usize = 3;
const CH_AMBULANCE: usize = 4;
const CH_ENGINE: usize = 5;

const SAMPLE_CRASH: usize = 5;
const SAMPLE_SLIP: usize = 4;
const SAMPLE_SPIN: usize = 6;
const SAMPLE_ENGINE: usize = 7;
const SAMPLE_AMBULANCE: usize = 8;

pub struct TurboSound {
    samples: Box<dyn SampleBank>,
    last_a: u8,
    last_b: u8,
    osel: u8,
    bsel: u8,
    accel: u8,
    base_rate: u32,
    divisor: f64,
}

impl TurboSound {
    #[must_use]
    pub fn new(samples: Box<dyn SampleBank>, config: &TurboConfig) -> Self {
        Self {
            samples,
            last_a: 0,
            last_b: 0,
            osel: 0,
            bsel: 0,
            accel: 0,
            base_rate: config.accel_base_rate,
            divisor: config.accel_divisor,
        }
    }

    fn start(&mut self, channel: usize, sample: usize, looped: bool) {
        log::trace!("sample {sample} on channel {channel}");
        self.samples.start(channel, sample, looped);
    }

    /// Port A: crash, trigger, slip and long crash strobes (active low).
    pub fn write_a(&mut self, data: u8) {
        let falling = (data ^ self.last_a) & !data;
        self.last_a = data;

        if falling & 0x01 != 0 {
            self.start(CH_CRASH, SAMPLE_CRASH, false);
        }
        for trigger in 0..4 {
            if falling & (0x02 << trigger) != 0 {
                self.start(CH_TRIGGER, trigger, false);
            }
        }
        self.osel = (self.osel & 0x06) | ((data >> 5) & 0x01);
        if falling & 0x40 != 0 {
            self.start(CH_SKID, SAMPLE_SLIP, false);
        }
        if falling & 0x80 != 0 {
            self.start(CH_CRASH_LONG, SAMPLE_CRASH, false);
        }
    }

    /// Port B: accelerator (bits 0-5), ambulance siren and spin strobes.
    pub fn write_b(&mut self, data: u8) {
        let diff = data ^ self.last_b;
        self.last_b = data;
        self.accel = data & 0x3F;

        if diff & 0x40 != 0 {
            if data & 0x40 == 0 {
                self.start(CH_AMBULANCE, SAMPLE_AMBULANCE, true);
            } else {
                self.samples.stop(CH_AMBULANCE);
            }
        }
        if diff & 0x80 != 0 && data & 0x80 == 0 {
            self.start(CH_SKID, SAMPLE_SPIN, false);
        }
        self.update_engine();
    }

    /// Port C: OSEL bits 1-2 and the engine sound select.
    pub fn write_c(&mut self, data: u8) {
        self.osel = (self.osel & 0x01) | ((data & 0x03) << 1);
        self.bsel = (data >> 2) & 0x03;
        self.update_engine();
    }

    /// Engine rate for the current accelerator value.
    #[must_use]
    pub fn engine_rate(&self) -> u32 {
        let base = f64::from(self.base_rate);
        (base * f64::from(self.accel) / self.divisor) as u32 + self.base_rate
    }

    fn update_engine(&mut self) {
        if self.bsel == 3 {
            if self.samples.is_playing(CH_ENGINE) {
                self.samples.stop(CH_ENGINE);
            }
        } else if !self.samples.is_playing(CH_ENGINE) {
            self.start(CH_ENGINE, SAMPLE_ENGINE, true);
        }
        if self.samples.is_playing(CH_ENGINE) {
            let rate = self.engine_rate();
            self.samples.set_frequency(CH_ENGINE, rate);
        }
    }
}

impl Observable for TurboSound {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "osel" => Some(self.osel.into()),
            "bsel" => Some(self.bsel.into()),
            "accel" => Some(self.accel.into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &["osel", "bsel", "accel"]
    }
}
