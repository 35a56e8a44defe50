//! Addressing mode fields and per-instruction legality masks.
//!
//! Every instruction that takes an effective address checks the requested
//! mode against an [`EaMask`] before touching the operand. One bit per
//! mode; the mode 7 sub-variants each get their own bit, so the bit index
//! is `mode + reg` for mode 7 and `mode` otherwise.

/// The effective address mode and register fields of an opcode (bits 5-0).
#[must_use]
pub const fn ea_fields(opcode: u16) -> (u8, u8) {
    (((opcode >> 3) & 7) as u8, (opcode & 7) as u8)
}

/// The register field in bits 11-9.
#[must_use]
pub const fn reg_field(opcode: u16) -> usize {
    ((opcode >> 9) & 7) as usize
}

/// Set of addressing modes an instruction form accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EaMask(u16);

impl EaMask {
    /// Dn
    pub const DN: Self = Self(0x0001);
    /// An
    pub const AN: Self = Self(0x0002);
    /// (An)
    pub const AN_IND: Self = Self(0x0004);
    /// (An)+
    pub const AN_POSTINC: Self = Self(0x0008);
    /// -(An)
    pub const AN_PREDEC: Self = Self(0x0010);
    /// (d16,An)
    pub const AN_DISP: Self = Self(0x0020);
    /// (d8,An,Xn)
    pub const AN_INDEX: Self = Self(0x0040);
    /// (xxx).W
    pub const ABS_SHORT: Self = Self(0x0080);
    /// (xxx).L
    pub const ABS_LONG: Self = Self(0x0100);
    /// (d16,PC)
    pub const PC_DISP: Self = Self(0x0200);
    /// (d8,PC,Xn)
    pub const PC_INDEX: Self = Self(0x0400);
    /// #imm
    pub const IMMEDIATE: Self = Self(0x0800);

    /// Every mode.
    pub const ANY: Self = Self(0x0FFF);
    /// Everything but An.
    pub const DATA: Self = Self::ANY.without(Self::AN);
    /// Memory operands.
    pub const MEMORY: Self = Self::DATA.without(Self::DN);
    /// Memory operands without side effects or immediates.
    pub const CONTROL: Self = Self::MEMORY.without(Self(Self::AN_POSTINC.0 | Self::AN_PREDEC.0 | Self::IMMEDIATE.0));
    /// Writable operands.
    pub const ALTERABLE: Self = Self::ANY.without(Self(Self::PC_DISP.0 | Self::PC_INDEX.0 | Self::IMMEDIATE.0));
    /// Writable data operands.
    pub const DATA_ALTERABLE: Self = Self::DATA.intersect(Self::ALTERABLE);
    /// Writable memory operands.
    pub const MEMORY_ALTERABLE: Self = Self::MEMORY.intersect(Self::ALTERABLE);

    /// Modes in `self` but not in `other`.
    #[must_use]
    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// Modes in both.
    #[must_use]
    pub const fn intersect(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// Modes in either.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Whether the mode/register pair is accepted.
    #[must_use]
    pub const fn allows(self, mode: u8, reg: u8) -> bool {
        let mode = mode & 7;
        let bit = if mode == 7 { 7 + (reg & 7) } else { mode };
        bit < 12 && self.0 & (1 << bit) != 0
    }
}

/// Legality masks, one per instruction form.
pub mod legal {
    use super::EaMask;

    /// ADD/SUB/CMP.B `<ea>,Dn` (no byte access to An).
    pub const ARITH_BYTE_SRC: EaMask = EaMask::ANY.without(EaMask::AN);
    /// ADD/SUB/CMP.W/L `<ea>,Dn`, ADDA/SUBA/CMPA, MOVEA.
    pub const ARITH_SRC: EaMask = EaMask::ANY;
    /// ADD/SUB/AND/OR `Dn,<ea>`.
    pub const RMW_DST: EaMask = EaMask::MEMORY_ALTERABLE;
    /// ADDQ/SUBQ to a non-address destination.
    pub const QUICK_DST: EaMask = EaMask::ALTERABLE.without(EaMask::AN);
    /// ADDI/SUBI/ANDI/ORI/EORI, NEG/NEGX/NOT/CLR, Scc, NBCD, TAS, EOR.
    pub const DATA_ALTERABLE: EaMask = EaMask::DATA_ALTERABLE;
    /// CMPI on the 68000.
    pub const CMPI_DST: EaMask = EaMask::DATA.without(EaMask::IMMEDIATE).without(EaMask::PC_DISP).without(EaMask::PC_INDEX);
    /// CMPI on the 68030 (PC-relative allowed).
    pub const CMPI_DST_030: EaMask = EaMask::DATA.without(EaMask::IMMEDIATE);
    /// TST on the 68000.
    pub const TST: EaMask = EaMask::DATA_ALTERABLE;
    /// TST on the 68030 (An for word/long is checked separately).
    pub const TST_030: EaMask = EaMask::ANY;
    /// AND/OR `<ea>,Dn`, MUL/DIV, CHK, MOVE to SR/CCR.
    pub const DATA_SRC: EaMask = EaMask::DATA;
    /// MOVE.B source.
    pub const MOVE_BYTE_SRC: EaMask = EaMask::ANY.without(EaMask::AN);
    /// MOVE.W/L source.
    pub const MOVE_SRC: EaMask = EaMask::ANY;
    /// MOVE destination.
    pub const MOVE_DST: EaMask = EaMask::DATA_ALTERABLE;
    /// BTST with a dynamic bit number.
    pub const BTST_DYNAMIC: EaMask = EaMask::DATA;
    /// BTST with a static bit number.
    pub const BTST_STATIC: EaMask = EaMask::DATA.without(EaMask::IMMEDIATE);
    /// BCHG/BCLR/BSET.
    pub const BIT_CHANGE: EaMask = EaMask::DATA_ALTERABLE;
    /// JMP/JSR/LEA/PEA.
    pub const CONTROL: EaMask = EaMask::CONTROL;
    /// MOVEM registers to memory.
    pub const MOVEM_TO_MEMORY: EaMask = EaMask::CONTROL.intersect(EaMask::ALTERABLE).union(EaMask::AN_PREDEC);
    /// MOVEM memory to registers.
    pub const MOVEM_TO_REGS: EaMask = EaMask::CONTROL.union(EaMask::AN_POSTINC);
    /// Memory shifts and rotates.
    pub const MEMORY_SHIFT: EaMask = EaMask::MEMORY_ALTERABLE;
}

#[cfg(test)]
mod tests {
    use super::{EaMask, ea_fields, legal, reg_field};

    #[test]
    fn composite_masks_match_architecture() {
        assert_eq!(EaMask::DATA, EaMask::ANY.without(EaMask::AN));
        assert!(!EaMask::MEMORY.allows(0, 0));
        assert!(EaMask::MEMORY.allows(7, 4));
        assert!(EaMask::CONTROL.allows(5, 0) && EaMask::CONTROL.allows(7, 3));
        assert!(EaMask::CONTROL.allows(2, 0));
        assert!(EaMask::ALTERABLE.allows(1, 0) && !EaMask::ALTERABLE.allows(7, 2));
        assert!(!EaMask::DATA_ALTERABLE.allows(1, 0) && EaMask::DATA_ALTERABLE.allows(7, 1));
    }

    #[test]
    fn mode_seven_uses_register_bits() {
        assert!(EaMask::IMMEDIATE.allows(7, 4));
        assert!(!EaMask::IMMEDIATE.allows(7, 3));
        assert!(!EaMask::ANY.allows(7, 5));
        assert!(!EaMask::ANY.allows(7, 7));
    }

    #[test]
    fn control_rejects_side_effect_modes() {
        assert!(!legal::CONTROL.allows(3, 0));
        assert!(!legal::CONTROL.allows(4, 0));
        assert!(legal::CONTROL.allows(7, 2));
        assert!(legal::MOVEM_TO_MEMORY.allows(4, 7));
        assert!(!legal::MOVEM_TO_MEMORY.allows(3, 7));
        assert!(legal::MOVEM_TO_REGS.allows(3, 7));
        assert!(legal::MOVEM_TO_REGS.allows(7, 3));
    }

    #[test]
    fn cmpi_pc_relative_is_model_dependent() {
        assert!(!legal::CMPI_DST.allows(7, 2));
        assert!(legal::CMPI_DST_030.allows(7, 2));
        assert!(!legal::CMPI_DST_030.allows(7, 4));
    }

    #[test]
    fn opcode_field_extraction() {
        // MOVE.W (A3)+,-(A5)
        assert_eq!(ea_fields(0x3B1B), (3, 3));
        assert_eq!(reg_field(0x3B1B), 5);
    }
}
