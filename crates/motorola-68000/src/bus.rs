//! Bus traits with function codes, and the two memory paths.
//!
//! The machine implements [`M68kBus`]. The interpreter never talks to it
//! directly: every access goes through an [`AddressSpace`], which is the
//! seam between the decode/execute engine and the model's memory path.
//!
//! - [`DirectAccess`] is the 68000 path: a 24-bit physical bus.
//! - [`TranslatedAccess`] is the 68030 path: a full 32-bit bus behind an
//!   address translation hook. Translation is currently identity; the MMU
//!   tables plug in here.

/// Function code values from the FC0-FC2 pins.
///
/// These distinguish access types for memory management and bus arbitration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionCode {
    /// User data access (FC=1).
    UserData = 1,
    /// User program access (FC=2).
    UserProgram = 2,
    /// Supervisor data access (FC=5).
    SupervisorData = 5,
    /// Supervisor program access (FC=6).
    SupervisorProgram = 6,
}

impl FunctionCode {
    /// Build a function code from supervisor flag and program/data flag.
    #[must_use]
    pub fn from_flags(supervisor: bool, program: bool) -> Self {
        match (supervisor, program) {
            (false, false) => Self::UserData,
            (false, true) => Self::UserProgram,
            (true, false) => Self::SupervisorData,
            (true, true) => Self::SupervisorProgram,
        }
    }
}

/// Bus trait for 68000-family CPUs.
///
/// Multi-byte accesses are big-endian. There is no fault contract: an
/// unmapped address reads whatever the machine decides and writes are
/// dropped. The bus must not call back into the CPU.
pub trait M68kBus {
    /// Read a byte from the bus.
    fn read_byte(&mut self, addr: u32, fc: FunctionCode) -> u8;

    /// Read a word from the bus.
    fn read_word(&mut self, addr: u32, fc: FunctionCode) -> u16;

    /// Read a long word. Defaults to two word cycles, high word first.
    fn read_long(&mut self, addr: u32, fc: FunctionCode) -> u32 {
        let hi = self.read_word(addr, fc);
        let lo = self.read_word(addr.wrapping_add(2), fc);
        (u32::from(hi) << 16) | u32::from(lo)
    }

    /// Write a byte to the bus.
    fn write_byte(&mut self, addr: u32, value: u8, fc: FunctionCode);

    /// Write a word to the bus.
    fn write_word(&mut self, addr: u32, value: u16, fc: FunctionCode);

    /// Write a long word. Defaults to two word cycles, high word first.
    fn write_long(&mut self, addr: u32, value: u32, fc: FunctionCode) {
        self.write_word(addr, (value >> 16) as u16, fc);
        self.write_word(addr.wrapping_add(2), value as u16, fc);
    }

    /// Assert the RESET line on the bus (RESET instruction).
    fn reset(&mut self) {}

    /// Interrupt acknowledge cycle. Returns the vector number.
    /// Default implementation returns the autovector (24 + level).
    fn interrupt_ack(&mut self, level: u8) -> u8 {
        24 + level
    }
}

/// Memory path the interpreter is instantiated over.
///
/// Each CPU model supplies one implementation; the engine is generic over
/// it so the per-access model checks compile away.
pub trait AddressSpace {
    /// Read a byte.
    fn read_byte(&mut self, addr: u32, fc: FunctionCode) -> u8;
    /// Read a word.
    fn read_word(&mut self, addr: u32, fc: FunctionCode) -> u16;
    /// Read a long word.
    fn read_long(&mut self, addr: u32, fc: FunctionCode) -> u32;
    /// Write a byte.
    fn write_byte(&mut self, addr: u32, value: u8, fc: FunctionCode);
    /// Write a word.
    fn write_word(&mut self, addr: u32, value: u16, fc: FunctionCode);
    /// Write a long word.
    fn write_long(&mut self, addr: u32, value: u32, fc: FunctionCode);
    /// Pulse the external reset line.
    fn reset_devices(&mut self);
    /// Run an interrupt acknowledge cycle for `level`.
    fn acknowledge(&mut self, level: u8) -> u8;
}

/// 68000 memory path: 24 address lines, no translation.
pub struct DirectAccess<'a, B: M68kBus + ?Sized> {
    bus: &'a mut B,
}

impl<'a, B: M68kBus + ?Sized> DirectAccess<'a, B> {
    /// Address lines A0-A23.
    pub const ADDRESS_MASK: u32 = 0x00FF_FFFF;

    /// Wrap a machine bus.
    pub fn new(bus: &'a mut B) -> Self {
        Self { bus }
    }
}

impl<B: M68kBus + ?Sized> AddressSpace for DirectAccess<'_, B> {
    fn read_byte(&mut self, addr: u32, fc: FunctionCode) -> u8 {
        self.bus.read_byte(addr & Self::ADDRESS_MASK, fc)
    }

    fn read_word(&mut self, addr: u32, fc: FunctionCode) -> u16 {
        self.bus.read_word(addr & Self::ADDRESS_MASK, fc)
    }

    fn read_long(&mut self, addr: u32, fc: FunctionCode) -> u32 {
        // Each half wraps independently at the top of the 16MB space
        let hi = self.read_word(addr, fc);
        let lo = self.read_word(addr.wrapping_add(2), fc);
        (u32::from(hi) << 16) | u32::from(lo)
    }

    fn write_byte(&mut self, addr: u32, value: u8, fc: FunctionCode) {
        self.bus.write_byte(addr & Self::ADDRESS_MASK, value, fc);
    }

    fn write_word(&mut self, addr: u32, value: u16, fc: FunctionCode) {
        self.bus.write_word(addr & Self::ADDRESS_MASK, value, fc);
    }

    fn write_long(&mut self, addr: u32, value: u32, fc: FunctionCode) {
        self.write_word(addr, (value >> 16) as u16, fc);
        self.write_word(addr.wrapping_add(2), value as u16, fc);
    }

    fn reset_devices(&mut self) {
        self.bus.reset();
    }

    fn acknowledge(&mut self, level: u8) -> u8 {
        self.bus.interrupt_ack(level)
    }
}

/// 68030 memory path: 32 address lines behind the MMU seam.
pub struct TranslatedAccess<'a, B: M68kBus + ?Sized> {
    bus: &'a mut B,
}

impl<'a, B: M68kBus + ?Sized> TranslatedAccess<'a, B> {
    /// Wrap a machine bus.
    pub fn new(bus: &'a mut B) -> Self {
        Self { bus }
    }

    /// Logical to physical translation. Identity until the MMU is modelled.
    #[inline]
    fn translate(addr: u32, _fc: FunctionCode) -> u32 {
        addr
    }
}

impl<B: M68kBus + ?Sized> AddressSpace for TranslatedAccess<'_, B> {
    fn read_byte(&mut self, addr: u32, fc: FunctionCode) -> u8 {
        self.bus.read_byte(Self::translate(addr, fc), fc)
    }

    fn read_word(&mut self, addr: u32, fc: FunctionCode) -> u16 {
        self.bus.read_word(Self::translate(addr, fc), fc)
    }

    fn read_long(&mut self, addr: u32, fc: FunctionCode) -> u32 {
        self.bus.read_long(Self::translate(addr, fc), fc)
    }

    fn write_byte(&mut self, addr: u32, value: u8, fc: FunctionCode) {
        self.bus.write_byte(Self::translate(addr, fc), value, fc);
    }

    fn write_word(&mut self, addr: u32, value: u16, fc: FunctionCode) {
        self.bus.write_word(Self::translate(addr, fc), value, fc);
    }

    fn write_long(&mut self, addr: u32, value: u32, fc: FunctionCode) {
        self.bus.write_long(Self::translate(addr, fc), value, fc);
    }

    fn reset_devices(&mut self) {
        self.bus.reset();
    }

    fn acknowledge(&mut self, level: u8) -> u8 {
        self.bus.interrupt_ack(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Recorder {
        last: Option<u32>,
    }

    impl M68kBus for Recorder {
        fn read_byte(&mut self, addr: u32, _fc: FunctionCode) -> u8 {
            self.last = Some(addr);
            0
        }
        fn read_word(&mut self, addr: u32, _fc: FunctionCode) -> u16 {
            self.last = Some(addr);
            0
        }
        fn write_byte(&mut self, addr: u32, _value: u8, _fc: FunctionCode) {
            self.last = Some(addr);
        }
        fn write_word(&mut self, addr: u32, _value: u16, _fc: FunctionCode) {
            self.last = Some(addr);
        }
    }

    #[test]
    fn direct_access_drops_upper_address_byte() {
        let mut bus = Recorder { last: None };
        DirectAccess::new(&mut bus).read_byte(0xFF12_3456, FunctionCode::UserData);
        assert_eq!(bus.last, Some(0x0012_3456));
    }

    #[test]
    fn translated_access_keeps_32_bits() {
        let mut bus = Recorder { last: None };
        TranslatedAccess::new(&mut bus).write_word(0xFF12_3456, 0, FunctionCode::SupervisorData);
        assert_eq!(bus.last, Some(0xFF12_3456));
    }

    #[test]
    fn function_codes_encode_space_and_mode() {
        assert_eq!(FunctionCode::from_flags(true, true) as u8, 6);
        assert_eq!(FunctionCode::from_flags(false, false) as u8, 1);
        assert_eq!(M68kBus::interrupt_ack(&mut Recorder { last: None }, 3), 27);
    }
}
