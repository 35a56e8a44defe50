//! Condition code flags and status register bit layout.
//!
//! The flags are kept as discrete booleans and only packed into a CCR/SR
//! value at the boundary (MOVE from SR, exception frames, debuggers).
//!
//! The status register is 16 bits:
//! - Bits 0-4: Condition code register (C, V, Z, N, X)
//! - Bits 5-7: Reserved (always 0)
//! - Bits 8-10: Interrupt mask (I0, I1, I2)
//! - Bit 11: Reserved (always 0)
//! - Bit 12: Master/interrupt state (M, 68030 only)
//! - Bit 13: Supervisor mode (S)
//! - Bit 14: Trace on change of flow (T0, 68030 only)
//! - Bit 15: Trace (T1)

/// Carry flag.
pub const C: u16 = 0x0001;
/// Overflow flag.
pub const V: u16 = 0x0002;
/// Zero flag.
pub const Z: u16 = 0x0004;
/// Negative flag.
pub const N: u16 = 0x0008;
/// Extend flag.
pub const X: u16 = 0x0010;

/// Master stack select (68030).
pub const M: u16 = 0x1000;
/// Supervisor mode flag.
pub const S: u16 = 0x2000;
/// Change-of-flow trace (68030).
pub const T0: u16 = 0x4000;
/// Trace mode flag.
pub const T1: u16 = 0x8000;

/// Valid SR bits on the 68000.
pub const SR_MASK_68000: u16 = 0xA71F;
/// Valid SR bits on the 68030.
pub const SR_MASK_68030: u16 = 0xF71F;

/// The five condition code flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    /// Extend.
    pub x: bool,
    /// Negative.
    pub n: bool,
    /// Zero.
    pub z: bool,
    /// Overflow.
    pub v: bool,
    /// Carry.
    pub c: bool,
}

impl Flags {
    /// Pack into a CCR byte.
    #[must_use]
    pub const fn to_ccr(self) -> u8 {
        (self.x as u8) << 4 | (self.n as u8) << 3 | (self.z as u8) << 2 | (self.v as u8) << 1 | self.c as u8
    }

    /// Unpack from a CCR value; bits 5-7 are ignored.
    #[must_use]
    pub const fn from_ccr(ccr: u8) -> Self {
        Self {
            x: ccr & X as u8 != 0,
            n: ccr & N as u8 != 0,
            z: ccr & Z as u8 != 0,
            v: ccr & V as u8 != 0,
            c: ccr & C as u8 != 0,
        }
    }

    /// Set N and Z from a result of `msb`-bit width (already masked).
    pub fn set_nz(&mut self, value: u32, msb: u32) {
        self.n = value & msb != 0;
        self.z = value == 0;
    }

    /// N and Z from the result, V and C cleared. X is untouched.
    ///
    /// Used by MOVE, the logical ops, TST, CLR, SWAP and EXT.
    pub fn set_logical(&mut self, value: u32, msb: u32) {
        self.set_nz(value, msb);
        self.v = false;
        self.c = false;
    }

    /// Evaluate a condition code (0-15).
    #[must_use]
    pub const fn condition(self, cc: u8) -> bool {
        match cc & 0x0F {
            0x0 => true,                        // T (true)
            0x1 => false,                       // F (false)
            0x2 => !self.c && !self.z,          // HI (high)
            0x3 => self.c || self.z,            // LS (low or same)
            0x4 => !self.c,                     // CC/HS (carry clear)
            0x5 => self.c,                      // CS/LO (carry set)
            0x6 => !self.z,                     // NE (not equal)
            0x7 => self.z,                      // EQ (equal)
            0x8 => !self.v,                     // VC (overflow clear)
            0x9 => self.v,                      // VS (overflow set)
            0xA => !self.n,                     // PL (plus)
            0xB => self.n,                      // MI (minus)
            0xC => self.n == self.v,            // GE
            0xD => self.n != self.v,            // LT
            0xE => !self.z && self.n == self.v, // GT
            _ => self.z || self.n != self.v,    // LE
        }
    }
}

/// Mnemonic suffix for a condition code, as used by Bcc/DBcc/Scc/TRAPcc.
#[must_use]
pub const fn condition_name(cc: u8) -> &'static str {
    match cc & 0x0F {
        0x0 => "T",
        0x1 => "F",
        0x2 => "HI",
        0x3 => "LS",
        0x4 => "CC",
        0x5 => "CS",
        0x6 => "NE",
        0x7 => "EQ",
        0x8 => "VC",
        0x9 => "VS",
        0xA => "PL",
        0xB => "MI",
        0xC => "GE",
        0xD => "LT",
        0xE => "GT",
        _ => "LE",
    }
}

#[cfg(test)]
mod tests {
    use super::Flags;

    #[test]
    fn ccr_pack_ignores_reserved_bits() {
        let flags = Flags::from_ccr(0xFF);
        assert_eq!(flags.to_ccr(), 0x1F);
        assert_eq!(Flags::from_ccr(0x14), Flags { x: true, z: true, ..Flags::default() });
    }

    #[test]
    fn signed_conditions_follow_n_xor_v() {
        let lt = Flags { n: true, ..Flags::default() };
        assert!(lt.condition(0xD));
        assert!(!lt.condition(0xC));
        assert!(lt.condition(0xF));

        let overflowed = Flags { n: true, v: true, ..Flags::default() };
        assert!(overflowed.condition(0xC));
        assert!(overflowed.condition(0xE));
    }

    #[test]
    fn unsigned_conditions() {
        let zero = Flags { z: true, ..Flags::default() };
        assert!(zero.condition(0x3));
        assert!(!zero.condition(0x2));
        assert!(Flags::default().condition(0x2));
        assert!(!Flags::default().condition(0x1));
    }
}
