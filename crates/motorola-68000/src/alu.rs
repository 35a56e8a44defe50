//! Shared ALU operations with flag computation.
//!
//! These functions perform arithmetic on size-masked operands and update the
//! discrete condition flags in place. Operands are passed unmasked; every
//! function masks to `size` first and returns a masked result.

use crate::flags::Flags;

/// Operation size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Size {
    /// 8-bit byte.
    Byte,
    /// 16-bit word.
    Word,
    /// 32-bit long.
    Long,
}

impl Size {
    /// Get size from the standard 2-bit encoding (00=byte, 01=word, 10=long).
    #[must_use]
    pub fn from_bits(bits: u16) -> Option<Self> {
        match bits & 0x03 {
            0 => Some(Self::Byte),
            1 => Some(Self::Word),
            2 => Some(Self::Long),
            _ => None,
        }
    }

    /// Number of bytes for this size.
    #[must_use]
    pub const fn bytes(self) -> u32 {
        match self {
            Self::Byte => 1,
            Self::Word => 2,
            Self::Long => 4,
        }
    }

    /// Number of bits for this size.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.bytes() * 8
    }

    /// MSB mask for this size.
    #[must_use]
    pub const fn msb_mask(self) -> u32 {
        match self {
            Self::Byte => 0x80,
            Self::Word => 0x8000,
            Self::Long => 0x8000_0000,
        }
    }

    /// Value mask for this size.
    #[must_use]
    pub const fn mask(self) -> u32 {
        match self {
            Self::Byte => 0xFF,
            Self::Word => 0xFFFF,
            Self::Long => 0xFFFF_FFFF,
        }
    }

    /// Sign-extend a value of this size to 32 bits.
    #[must_use]
    pub const fn sign_extend(self, value: u32) -> u32 {
        match self {
            Self::Byte => value as u8 as i8 as i32 as u32,
            Self::Word => value as u16 as i16 as i32 as u32,
            Self::Long => value,
        }
    }

    /// Mnemonic suffix.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Byte => ".B",
            Self::Word => ".W",
            Self::Long => ".L",
        }
    }
}

/// Add with flags (ADD, ADDI, ADDQ). Computes `dst + src`.
pub fn add(src: u32, dst: u32, size: Size, flags: &mut Flags) -> u32 {
    let mask = size.mask();
    let msb = size.msb_mask();
    let s = src & mask;
    let d = dst & mask;
    let result = s.wrapping_add(d) & mask;

    flags.set_nz(result, msb);
    // Carry out of the top bit
    let carry = (s & d) | ((s | d) & !result);
    flags.c = carry & msb != 0;
    flags.x = flags.c;
    // Both operands same sign, result different sign
    flags.v = (s ^ result) & (d ^ result) & msb != 0;
    result
}

/// Subtract with flags (SUB, SUBI, SUBQ). Computes `dst - src`.
pub fn sub(src: u32, dst: u32, size: Size, flags: &mut Flags) -> u32 {
    let result = cmp(src, dst, size, flags);
    flags.x = flags.c;
    result
}

/// Compare (CMP, CMPA, CMPI, CMPM): `dst - src` without touching X.
pub fn cmp(src: u32, dst: u32, size: Size, flags: &mut Flags) -> u32 {
    let mask = size.mask();
    let msb = size.msb_mask();
    let s = src & mask;
    let d = dst & mask;
    let result = d.wrapping_sub(s) & mask;

    flags.set_nz(result, msb);
    flags.c = ((!d & s) | ((!d | s) & result)) & msb != 0;
    // Operands different sign, result sign differs from dst
    flags.v = (s ^ d) & (result ^ d) & msb != 0;
    result
}

/// Add with extend (ADDX): `dst + src + X`.
///
/// Z is only cleared, never set, so a multi-precision chain reports zero
/// only when every limb was zero.
pub fn addx(src: u32, dst: u32, size: Size, flags: &mut Flags) -> u32 {
    let mask = size.mask();
    let msb = size.msb_mask();
    let s = src & mask;
    let d = dst & mask;
    let result = d.wrapping_add(s).wrapping_add(u32::from(flags.x)) & mask;

    flags.c = ((s & d) | ((s | d) & !result)) & msb != 0;
    flags.x = flags.c;
    flags.v = (s ^ result) & (d ^ result) & msb != 0;
    flags.n = result & msb != 0;
    flags.z &= result == 0;
    result
}

/// Subtract with extend (SUBX): `dst - src - X`. Z accumulates as in ADDX.
pub fn subx(src: u32, dst: u32, size: Size, flags: &mut Flags) -> u32 {
    let mask = size.mask();
    let msb = size.msb_mask();
    let s = src & mask;
    let d = dst & mask;
    let result = d.wrapping_sub(s).wrapping_sub(u32::from(flags.x)) & mask;

    flags.c = ((!d & s) | ((!d | s) & result)) & msb != 0;
    flags.x = flags.c;
    flags.v = (s ^ d) & (result ^ d) & msb != 0;
    flags.n = result & msb != 0;
    flags.z &= result == 0;
    result
}

/// Negate (NEG): `0 - dst`.
pub fn neg(dst: u32, size: Size, flags: &mut Flags) -> u32 {
    sub(dst, 0, size, flags)
}

/// Negate with extend (NEGX): `0 - dst - X`.
pub fn negx(dst: u32, size: Size, flags: &mut Flags) -> u32 {
    subx(dst, 0, size, flags)
}

/// Packed BCD add with extend (ABCD).
///
/// The correction is computed with bit masks rather than decimal division so
/// that invalid BCD inputs produce the same bytes as the silicon. V follows
/// the documented 68000 behaviour unless `clear_overflow` is set.
pub fn abcd(src: u8, dst: u8, flags: &mut Flags, clear_overflow: bool) -> u8 {
    let ss = dst.wrapping_add(src).wrapping_add(u8::from(flags.x));
    let dc = ((u16::from(ss) + 0x66) ^ u16::from(ss)) >> 1;
    let bc = (dst & src) | ((dst | src) & !ss);
    let corr = (bc | dc as u8) & 0x88;
    let result = ss.wrapping_add(corr).wrapping_sub(corr >> 2);

    flags.v = !clear_overflow && !ss & result & 0x80 != 0;
    flags.c = (bc | (ss & !result)) & 0x80 != 0;
    flags.x = flags.c;
    flags.n = result & 0x80 != 0;
    flags.z &= result == 0;
    result
}

/// Packed BCD subtract with extend (SBCD): `dst - src - X`.
pub fn sbcd(src: u8, dst: u8, flags: &mut Flags, clear_overflow: bool) -> u8 {
    let dd = dst.wrapping_sub(src).wrapping_sub(u8::from(flags.x));
    let bc = ((!dst & src) | ((!dst | src) & dd)) & 0x88;
    let result = dd.wrapping_sub(bc).wrapping_add(bc >> 2);

    flags.v = !clear_overflow && dd & !result & 0x80 != 0;
    flags.c = (bc | (!dd & result)) & 0x80 != 0;
    flags.x = flags.c;
    flags.n = result & 0x80 != 0;
    flags.z &= result == 0;
    result
}

/// Arithmetic shift left. V is set if the sign bit changed at any point.
pub fn asl(value: u32, count: u32, size: Size, flags: &mut Flags) -> u32 {
    let bits = size.bits();
    let d = value & size.mask();
    let result = if count >= bits { 0 } else { (d << count) & size.mask() };

    flags.set_nz(result, size.msb_mask());
    if count == 0 {
        flags.c = false;
        flags.v = false;
        return result;
    }
    flags.c = count <= bits && (d >> (bits - count)) & 1 != 0;
    flags.x = flags.c;
    flags.v = if count >= bits {
        d != 0
    } else {
        // The top count+1 bits must all match or the sign flipped on the way
        let top = (size.mask() >> (bits - count - 1)) << (bits - count - 1);
        let t = d & top;
        t != 0 && t != top
    };
    result
}

/// Arithmetic shift right (sign-filling).
pub fn asr(value: u32, count: u32, size: Size, flags: &mut Flags) -> u32 {
    let bits = size.bits();
    let d = value & size.mask();
    let signed = i64::from(size.sign_extend(d) as i32);
    let result = ((signed >> count.min(63)) as u32) & size.mask();

    flags.set_nz(result, size.msb_mask());
    flags.v = false;
    if count == 0 {
        flags.c = false;
        return result;
    }
    flags.c = if count > bits { d & size.msb_mask() != 0 } else { (signed >> (count - 1)) & 1 != 0 };
    flags.x = flags.c;
    result
}

/// Logical shift left.
pub fn lsl(value: u32, count: u32, size: Size, flags: &mut Flags) -> u32 {
    let bits = size.bits();
    let d = value & size.mask();
    let result = if count >= bits { 0 } else { (d << count) & size.mask() };

    flags.set_nz(result, size.msb_mask());
    flags.v = false;
    if count == 0 {
        flags.c = false;
        return result;
    }
    flags.c = count <= bits && (d >> (bits - count)) & 1 != 0;
    flags.x = flags.c;
    result
}

/// Logical shift right (zero-filling).
pub fn lsr(value: u32, count: u32, size: Size, flags: &mut Flags) -> u32 {
    let bits = size.bits();
    let d = value & size.mask();
    let result = if count >= bits { 0 } else { d >> count };

    flags.set_nz(result, size.msb_mask());
    flags.v = false;
    if count == 0 {
        flags.c = false;
        return result;
    }
    flags.c = count <= bits && (d >> (count - 1)) & 1 != 0;
    flags.x = flags.c;
    result
}

/// Rotate left without extend. X is unaffected.
pub fn rol(value: u32, count: u32, size: Size, flags: &mut Flags) -> u32 {
    let bits = size.bits();
    let d = value & size.mask();
    let s = count % bits;
    let result = if s == 0 { d } else { ((d << s) | (d >> (bits - s))) & size.mask() };

    flags.set_nz(result, size.msb_mask());
    flags.v = false;
    flags.c = count != 0 && result & 1 != 0;
    result
}

/// Rotate right without extend. X is unaffected.
pub fn ror(value: u32, count: u32, size: Size, flags: &mut Flags) -> u32 {
    let bits = size.bits();
    let d = value & size.mask();
    let s = count % bits;
    let result = if s == 0 { d } else { ((d >> s) | (d << (bits - s))) & size.mask() };

    flags.set_nz(result, size.msb_mask());
    flags.v = false;
    flags.c = count != 0 && result & size.msb_mask() != 0;
    result
}

/// Rotate left through X. The rotation is `bits + 1` wide.
///
/// `count` must already be reduced modulo `bits + 1`.
pub fn roxl(value: u32, count: u32, size: Size, flags: &mut Flags) -> u32 {
    let bits = size.bits();
    let width_mask = (1u64 << (bits + 1)) - 1;
    let wide = (u64::from(flags.x) << bits) | u64::from(value & size.mask());
    let rotated = if count == 0 {
        wide
    } else {
        ((wide << count) | (wide >> (bits + 1 - count))) & width_mask
    };
    let result = (rotated as u32) & size.mask();

    flags.set_nz(result, size.msb_mask());
    flags.v = false;
    flags.x = (rotated >> bits) & 1 != 0;
    flags.c = flags.x;
    result
}

/// Rotate right through X. `count` must already be reduced modulo `bits + 1`.
pub fn roxr(value: u32, count: u32, size: Size, flags: &mut Flags) -> u32 {
    let bits = size.bits();
    let width_mask = (1u64 << (bits + 1)) - 1;
    let wide = (u64::from(flags.x) << bits) | u64::from(value & size.mask());
    let rotated = if count == 0 {
        wide
    } else {
        ((wide >> count) | (wide << (bits + 1 - count))) & width_mask
    };
    let result = (rotated as u32) & size.mask();

    flags.set_nz(result, size.msb_mask());
    flags.v = false;
    flags.x = (rotated >> bits) & 1 != 0;
    flags.c = flags.x;
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_sets_carry_and_overflow() {
        let mut flags = Flags::default();
        assert_eq!(add(0x01, 0xFF, Size::Byte, &mut flags), 0x00);
        assert!(flags.c && flags.x && flags.z && !flags.v);

        assert_eq!(add(0x01, 0x7F, Size::Byte, &mut flags), 0x80);
        assert!(flags.v && flags.n && !flags.c);
    }

    #[test]
    fn cmp_leaves_extend_alone() {
        let mut flags = Flags { x: true, ..Flags::default() };
        cmp(2, 1, Size::Word, &mut flags);
        assert!(flags.c && flags.n && flags.x);
        flags.x = false;
        cmp(2, 1, Size::Word, &mut flags);
        assert!(!flags.x);
    }

    #[test]
    fn addx_accumulates_zero() {
        let mut flags = Flags { z: true, x: true, ..Flags::default() };
        assert_eq!(addx(0xFFFF, 0x0000, Size::Word, &mut flags), 0x0000);
        assert!(flags.z && flags.c);

        flags.z = false;
        addx(0, 0, Size::Word, &mut flags);
        assert!(!flags.z);
    }

    #[test]
    fn abcd_adds_decimal_digits() {
        let mut flags = Flags { z: true, ..Flags::default() };
        assert_eq!(abcd(0x01, 0x09, &mut flags, false), 0x10);
        assert!(!flags.c && !flags.x && !flags.z);

        let mut flags = Flags { z: true, ..Flags::default() };
        assert_eq!(abcd(0x01, 0x99, &mut flags, false), 0x00);
        assert!(flags.c && flags.x && flags.z);
    }

    #[test]
    fn sbcd_borrows_decimal_digits() {
        let mut flags = Flags::default();
        assert_eq!(sbcd(0x01, 0x10, &mut flags, false), 0x09);
        assert!(!flags.c);

        let mut flags = Flags::default();
        assert_eq!(sbcd(0x01, 0x00, &mut flags, false), 0x99);
        assert!(flags.c && flags.x);
    }

    #[test]
    fn asl_overflow_tracks_any_sign_change() {
        let mut flags = Flags::default();
        assert_eq!(asl(0x40, 1, Size::Byte, &mut flags), 0x80);
        assert!(flags.v && !flags.c);

        // 0xC0 << 1 keeps the sign, << 2 flips it
        asl(0xC0, 1, Size::Byte, &mut flags);
        assert!(!flags.v && flags.c);
        asl(0xC0, 2, Size::Byte, &mut flags);
        assert!(flags.v);
    }

    #[test]
    fn shift_by_zero_clears_carry_keeps_extend() {
        let mut flags = Flags { x: true, c: true, ..Flags::default() };
        assert_eq!(lsr(0x8000, 0, Size::Word, &mut flags), 0x8000);
        assert!(!flags.c && flags.x && flags.n);
    }

    #[test]
    fn asr_fills_with_sign() {
        let mut flags = Flags::default();
        assert_eq!(asr(0x80, 3, Size::Byte, &mut flags), 0xF0);
        assert!(!flags.c);
        assert_eq!(asr(0x81, 40, Size::Byte, &mut flags), 0xFF);
        assert!(flags.c && flags.x);
    }

    #[test]
    fn lsl_by_full_width_moves_lsb_to_carry() {
        let mut flags = Flags::default();
        assert_eq!(lsl(0x01, 8, Size::Byte, &mut flags), 0);
        assert!(flags.c && flags.z);
        lsl(0x01, 9, Size::Byte, &mut flags);
        assert!(!flags.c);
    }

    #[test]
    fn rotates_leave_extend() {
        let mut flags = Flags { x: true, ..Flags::default() };
        assert_eq!(rol(0x8001, 1, Size::Word, &mut flags), 0x0003);
        assert!(flags.c && flags.x);
        assert_eq!(ror(0x0001, 1, Size::Long, &mut flags), 0x8000_0000);
        assert!(flags.c && flags.n);
    }

    #[test]
    fn roxl_rotates_through_extend() {
        let mut flags = Flags { x: true, ..Flags::default() };
        assert_eq!(roxl(0x80, 1, Size::Byte, &mut flags), 0x01);
        assert!(flags.x && flags.c);

        let mut flags = Flags { x: false, ..Flags::default() };
        assert_eq!(roxr(0x01, 1, Size::Byte, &mut flags), 0x00);
        assert!(flags.x && flags.c && flags.z);
    }

    #[test]
    fn roxl_zero_count_copies_extend_to_carry() {
        let mut flags = Flags { x: true, ..Flags::default() };
        assert_eq!(roxl(0x12, 0, Size::Byte, &mut flags), 0x12);
        assert!(flags.c);
    }
}
