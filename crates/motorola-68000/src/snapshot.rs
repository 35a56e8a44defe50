//! Checkpoint encoding of the register file.
//!
//! The block is plain data: a 4-byte magic, a little-endian version word,
//! then every register in a fixed order. The CPU model is not stored; the
//! owner supplies it on restore.

use std::fmt;

use crate::cpu::Cpu68000;
use crate::flags::Flags;
use crate::model::CpuModel;
use crate::registers::Registers;

/// Block magic.
pub const MAGIC: [u8; 4] = *b"M68K";
/// Current block version.
pub const VERSION: u16 = 1;

/// u32 fields: pc, d0-d7, a0-a7, ssp, usp, msp, vbr, cacr, caar, instruction_pc.
const LONGS: usize = 1 + 8 + 8 + 7;
/// u8 fields: ccr, trace, supervisor, m, interrupt_mask, ipl, sfc, dfc.
const BYTES: usize = 8;

/// Encoded size of [`Registers`].
pub const REGISTERS_LEN: usize = MAGIC.len() + 2 + LONGS * 4 + BYTES;
/// Encoded size of a whole CPU: registers plus the STOP latch.
pub const CPU_LEN: usize = REGISTERS_LEN + 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// The block is not the expected length.
    InvalidSize { expected: usize, actual: usize },
    /// The block does not start with [`MAGIC`].
    BadMagic([u8; 4]),
    /// The block was written by an unknown version.
    UnsupportedVersion(u16),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSize { expected, actual } => {
                write!(f, "invalid CPU checkpoint size: {actual} bytes (expected {expected})")
            }
            Self::BadMagic(magic) => write!(f, "bad CPU checkpoint magic: {magic:02X?}"),
            Self::UnsupportedVersion(v) => write!(f, "unsupported CPU checkpoint version {v} (expected {VERSION})"),
        }
    }
}

impl std::error::Error for SnapshotError {}

/// Little-endian cursor over a validated block.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl Reader<'_> {
    fn u8(&mut self) -> u8 {
        let value = self.data.get(self.pos).copied().unwrap_or(0);
        self.pos += 1;
        value
    }

    fn u32(&mut self) -> u32 {
        let mut bytes = [0; 4];
        for b in &mut bytes {
            *b = self.u8();
        }
        u32::from_le_bytes(bytes)
    }
}

impl Registers {
    /// Encode as a versioned little-endian block.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(REGISTERS_LEN);
        out.extend_from_slice(&MAGIC);
        out.extend_from_slice(&VERSION.to_le_bytes());
        let shadows = [self.ssp, self.usp, self.msp, self.vbr, self.cacr, self.caar, self.instruction_pc];
        for value in std::iter::once(&self.pc).chain(&self.d).chain(&self.a).chain(&shadows) {
            out.extend_from_slice(&value.to_le_bytes());
        }
        out.extend_from_slice(&[
            self.flags.to_ccr(),
            self.trace,
            u8::from(self.supervisor),
            u8::from(self.m),
            self.interrupt_mask,
            self.ipl,
            self.sfc,
            self.dfc,
        ]);
        out
    }

    /// Decode a block written by [`to_bytes`](Self::to_bytes).
    pub fn from_bytes(data: &[u8]) -> Result<Self, SnapshotError> {
        if data.len() != REGISTERS_LEN {
            return Err(SnapshotError::InvalidSize { expected: REGISTERS_LEN, actual: data.len() });
        }
        let magic = [data[0], data[1], data[2], data[3]];
        if magic != MAGIC {
            return Err(SnapshotError::BadMagic(magic));
        }
        let version = u16::from_le_bytes([data[4], data[5]]);
        if version != VERSION {
            return Err(SnapshotError::UnsupportedVersion(version));
        }

        let mut r = Reader { data, pos: 6 };
        let mut regs = Self::new();
        regs.pc = r.u32();
        for d in &mut regs.d {
            *d = r.u32();
        }
        for a in &mut regs.a {
            *a = r.u32();
        }
        regs.ssp = r.u32();
        regs.usp = r.u32();
        regs.msp = r.u32();
        regs.vbr = r.u32();
        regs.cacr = r.u32();
        regs.caar = r.u32();
        regs.instruction_pc = r.u32();
        regs.flags = Flags::from_ccr(r.u8());
        regs.trace = r.u8() & 3;
        regs.supervisor = r.u8() != 0;
        regs.m = r.u8() != 0;
        regs.interrupt_mask = r.u8() & 7;
        regs.ipl = r.u8() & 7;
        regs.sfc = r.u8() & 7;
        regs.dfc = r.u8() & 7;
        Ok(regs)
    }
}

impl Cpu68000 {
    /// Encode the whole CPU state: the register block and the STOP latch.
    #[must_use]
    pub fn checkpoint(&self) -> Vec<u8> {
        let mut out = self.regs.to_bytes();
        out.push(u8::from(self.stopped));
        out
    }

    /// Rebuild a CPU of `model` from a [`checkpoint`](Self::checkpoint).
    pub fn restore(model: CpuModel, data: &[u8]) -> Result<Self, SnapshotError> {
        let Some((&stopped, block)) = data.split_last().filter(|_| data.len() == CPU_LEN) else {
            return Err(SnapshotError::InvalidSize { expected: CPU_LEN, actual: data.len() });
        };
        let mut cpu = Self::from_registers(model, Registers::from_bytes(block)?);
        cpu.stopped = stopped != 0;
        Ok(cpu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_length_matches_layout() {
        assert_eq!(Registers::new().to_bytes().len(), REGISTERS_LEN);
        assert_eq!(Cpu68000::new().checkpoint().len(), CPU_LEN);
    }

    #[test]
    fn rejects_foreign_blocks() {
        let mut block = Registers::new().to_bytes();
        assert_eq!(
            Registers::from_bytes(&block[1..]),
            Err(SnapshotError::InvalidSize { expected: REGISTERS_LEN, actual: REGISTERS_LEN - 1 })
        );

        block[4] = 9;
        assert_eq!(Registers::from_bytes(&block), Err(SnapshotError::UnsupportedVersion(9)));

        block[0] = b'X';
        assert!(matches!(Registers::from_bytes(&block), Err(SnapshotError::BadMagic(_))));
    }

    #[test]
    fn error_messages_name_the_problem() {
        let err = SnapshotError::InvalidSize { expected: CPU_LEN, actual: 3 };
        assert!(err.to_string().contains("3 bytes"));
    }
}
