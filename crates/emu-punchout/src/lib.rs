//! Nintendo Punch-Out!! class arcade board.
//!
//! A Z80 main CPU drives two stacked monitors: the top one shows a tile
//! layer and the zoomable big sprite #1; the bottom one a row-scrolled tile
//! layer and the unzoomed big sprite #2 (big sprite #1 may appear on either
//! monitor). Sound runs on a 2A03 fed through two latches, plus a VLM5030
//! speech chip. Super Punch-Out!! adds a protection chip on the I/O bus.
//!
//! The CPUs are not part of this crate: the host runs a Z80 core against
//! [`PunchOut`] through [`emu_core::Bus`] and a 2A03 core against
//! [`SoundLatches`].

mod config;
mod memory;
pub mod protection;
mod punchout;
mod sound;
mod video;

pub use config::{Calibration, PunchOutConfig, Variant};
pub use memory::MainRam;
pub use protection::{MainMemory, Protection, ProtectionTable};
pub use punchout::{MAIN_CLOCK, PunchOut, SOUND_CLOCK};
pub use sound::{NullSpeech, SoundBridge, SoundLatches, SpeechSynth};
pub use video::{FRAME_HEIGHT, FRAME_WIDTH, PunchOutVideo};
