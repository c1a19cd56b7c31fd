//! Sega Turbo class road-racing arcade board.
//!
//! A Z80 talks to four 8255 PPIs (road registers, sound triggers, DIP
//! switches and the wheel), an 8279 driving the score LEDs, a foreground
//! tile layer and a 16-slot sprite generator. The road itself is computed
//! per pixel from ROM tables, and the same sweep produces the collision
//! bits the game reads back at FE00.
//!
//! The CPU is not part of this crate: the host runs a Z80 core against
//! [`Turbo`] through [`emu_core::Bus`] and plays samples through a
//! [`SampleBank`].

mod collision;
mod config;
pub mod road;
mod sound;
pub mod sprites;
mod turbo;
mod video;

pub use collision::CollisionLatch;
pub use config::TurboConfig;
pub use road::{RoadRegisters, RoadTables};
pub use sound::{SampleBank, SilentSamples, TurboSound};
pub use sprites::{SpriteDrawer, SpriteGroup, SpriteTable};
pub use turbo::{MASTER_CLOCK, Turbo, input};
pub use video::{FRAME_HEIGHT, FRAME_WIDTH, TurboVideo};
