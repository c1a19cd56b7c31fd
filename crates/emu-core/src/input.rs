//! Input port capability supplied by the host.

/// Buttons, joysticks and DIP switches, read by port index.
///
/// Values are the raw active-low or active-high bytes the board's input
/// buffers present; the board applies no inversion of its own.
pub trait InputPorts {
    fn read_input(&mut self, port: usize) -> u8;
}

/// Fixed port values, e.g. DIP switch banks set once at startup. Ports past
/// the end read as 0xFF (pulled up).
impl<const N: usize> InputPorts for [u8; N] {
    fn read_input(&mut self, port: usize) -> u8 {
        self.get(port).copied().unwrap_or(0xFF)
    }
}

impl InputPorts for Vec<u8> {
    fn read_input(&mut self, port: usize) -> u8 {
        self.get(port).copied().unwrap_or(0xFF)
    }
}
