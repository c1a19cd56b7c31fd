//! Core traits and types shared by the chip and board crates.
//!
//! Boards expose their address decoding through [`Bus`]; the CPU core that
//! drives them lives with the host. Every board and chip exposes its state
//! through [`Observable`] for debugging.

mod bus;
mod clock;
mod input;
mod observable;

pub use bus::{Bus, ReadResult};
pub use clock::MasterClock;
pub use input::InputPorts;
pub use observable::{Observable, Value, parse_query_address};

