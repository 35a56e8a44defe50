//! Opcode decoding.
//!
//! [`decode`] maps an opcode word to an [`Instruction`]. The first level
//! switches on bits 15-12; each line then narrows on the 6-bit field in
//! bits 11-6, the 9-bit size/mode field in bits 8-0 or the mode bits,
//! testing literal opcodes and special encodings before the generic forms
//! that share their bit patterns (ORI to CCR before ORI.B, ILLEGAL before
//! TAS, DBcc before Scc, CMPM before EOR, ABCD/EXG before AND).
//!
//! Decoding is pure: it never touches CPU state. The executor consumes the
//! result and re-reads register fields from the opcode itself; the
//! disassembler uses it read-only.

use crate::alu::Size;
use crate::model::CpuModel;

/// Immediate-to-EA operations in line 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImmOp {
    Or,
    And,
    Sub,
    Add,
    Eor,
    Cmp,
}

/// Single-bit operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitOp {
    Test,
    Change,
    Clear,
    Set,
}

/// Shift and rotate families, in opcode field order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftKind {
    /// ASL/ASR
    Arithmetic,
    /// LSL/LSR
    Logical,
    /// ROXL/ROXR
    RotateExtend,
    /// ROL/ROR
    Rotate,
}

impl ShiftKind {
    const fn from_bits(bits: u16) -> Self {
        match bits & 3 {
            0 => Self::Arithmetic,
            1 => Self::Logical,
            2 => Self::RotateExtend,
            _ => Self::Rotate,
        }
    }
}

/// Decoded instruction.
///
/// Register numbers, condition codes and quick data stay in the opcode;
/// variants carry only what selects the behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    // Line 0
    OriToCcr,
    OriToSr,
    AndiToCcr,
    AndiToSr,
    EoriToCcr,
    EoriToSr,
    Immediate { op: ImmOp, size: Size },
    /// `dynamic` takes the bit number from Dn, otherwise from an extension word.
    Bit { op: BitOp, dynamic: bool },
    Movep { size: Size, to_memory: bool },

    // Lines 1-3
    Move(Size),
    Movea(Size),

    // Line 4
    Negx(Size),
    MoveFromSr,
    Clr(Size),
    MoveFromCcr,
    Neg(Size),
    MoveToCcr,
    Not(Size),
    MoveToSr,
    Nbcd,
    LinkLong,
    Swap,
    Pea,
    /// EXT.W (`Word`) or EXT.L (`Long`).
    Ext(Size),
    Extb,
    Movem { size: Size, to_memory: bool },
    Tst(Size),
    Tas,
    /// The ILLEGAL opcode ($4AFC).
    Illegal,
    /// MULU.L/MULS.L; `signed` comes from bit 11 of the extension word.
    MulLong { signed: bool },
    /// DIVU.L/DIVS.L and the DIVxL.L forms, selected like `MulLong`.
    DivLong { signed: bool },
    Trap,
    Link,
    Unlk,
    MoveUsp { to_usp: bool },
    Reset,
    Nop,
    Stop,
    Rte,
    Rtd,
    Rts,
    Trapv,
    Rtr,
    Movec { to_control: bool },
    Jsr,
    Jmp,
    Lea,
    Chk(Size),

    // Line 5
    Addq(Size),
    Subq(Size),
    /// ADDQ.W/L to An: full 32-bit add, no flags.
    AddqAddr,
    /// SUBQ.W/L to An: full 32-bit subtract, no flags.
    SubqAddr,
    Scc,
    Dbcc,
    Trapcc,

    // Lines 6-7
    Bcc,
    Bsr,
    Moveq,

    // Lines 8, 9, B, C, D
    Or { size: Size, to_ea: bool },
    Divu,
    Divs,
    Sbcd { memory: bool },
    Sub { size: Size, to_ea: bool },
    Suba(Size),
    Subx { size: Size, memory: bool },
    Cmp(Size),
    Cmpa(Size),
    Cmpm(Size),
    Eor(Size),
    And { size: Size, to_ea: bool },
    Mulu,
    Muls,
    Abcd { memory: bool },
    Exg,
    Add { size: Size, to_ea: bool },
    Adda(Size),
    Addx { size: Size, memory: bool },

    // Line E
    /// Register shift; `register_count` takes the count from Dx.
    Shift { kind: ShiftKind, left: bool, size: Size, register_count: bool },
    /// Memory shift of a word by one bit.
    ShiftMemory { kind: ShiftKind, left: bool },

    // Emulator traps
    LineA,
    LineF,

    /// Unassigned or unimplemented encoding; raises illegal instruction.
    Undefined,
}

/// Size in bits 7-6 (00 = byte, 01 = word, 10 = long).
fn size_field(opcode: u16) -> Option<Size> {
    Size::from_bits(opcode >> 6)
}

/// Decode `opcode` for `model`.
///
/// `ext` is the word following the opcode. Only the 32-bit multiply and
/// divide forms read it, to pick the signed or unsigned variant.
#[must_use]
pub fn decode(opcode: u16, ext: u16, model: CpuModel) -> Instruction {
    let caps = model.capabilities();
    let mode = (opcode >> 3) & 7;

    match opcode >> 12 {
        0x0 => decode_line0(opcode),
        0x1 => Instruction::Move(Size::Byte),
        0x2 if opcode & 0x01C0 == 0x0040 => Instruction::Movea(Size::Long),
        0x2 => Instruction::Move(Size::Long),
        0x3 if opcode & 0x01C0 == 0x0040 => Instruction::Movea(Size::Word),
        0x3 => Instruction::Move(Size::Word),
        0x4 => decode_line4(opcode, ext, model),
        0x5 => {
            if opcode & 0x00F8 == 0x00C8 {
                return Instruction::Dbcc;
            }
            if opcode & 0x00C0 == 0x00C0 {
                return match opcode & 0x3F {
                    0x3A..=0x3C if caps.long_ops => Instruction::Trapcc,
                    0x3A..=0x3C => Instruction::Undefined,
                    _ => Instruction::Scc,
                };
            }
            match opcode & 0x01F8 {
                0x0048 | 0x0088 => Instruction::AddqAddr,
                0x0148 | 0x0188 => Instruction::SubqAddr,
                _ => match size_field(opcode) {
                    Some(size) if opcode & 0x0100 == 0 => Instruction::Addq(size),
                    Some(size) => Instruction::Subq(size),
                    None => Instruction::Undefined,
                },
            }
        }
        0x6 if opcode & 0x0F00 == 0x0100 => Instruction::Bsr,
        0x6 => Instruction::Bcc,
        0x7 if opcode & 0x0100 == 0 => Instruction::Moveq,
        0x7 => Instruction::Undefined,
        0x8 => {
            // PACK/UNPK (68020+) are not implemented
            let mid = (opcode >> 4) & 0x1F;
            if mid == 0x14 || mid == 0x18 {
                return Instruction::Undefined;
            }
            match opcode & 0x01F8 {
                0x0100 => Instruction::Sbcd { memory: false },
                0x0108 => Instruction::Sbcd { memory: true },
                _ => match (opcode >> 6) & 7 {
                    3 => Instruction::Divu,
                    7 => Instruction::Divs,
                    n => match Size::from_bits(n) {
                        Some(size) => Instruction::Or { size, to_ea: opcode & 0x0100 != 0 },
                        None => Instruction::Undefined,
                    },
                },
            }
        }
        0x9 => match (opcode >> 6) & 7 {
            3 => Instruction::Suba(Size::Word),
            7 => Instruction::Suba(Size::Long),
            n => {
                let Some(size) = Size::from_bits(n) else {
                    return Instruction::Undefined;
                };
                let to_ea = opcode & 0x0100 != 0;
                match mode {
                    0 if to_ea => Instruction::Subx { size, memory: false },
                    1 if to_ea => Instruction::Subx { size, memory: true },
                    _ => Instruction::Sub { size, to_ea },
                }
            }
        },
        0xA => Instruction::LineA,
        0xB => {
            let to_ea = opcode & 0x0100 != 0;
            match (opcode >> 6) & 7 {
                3 => Instruction::Cmpa(Size::Word),
                7 => Instruction::Cmpa(Size::Long),
                n => {
                    let Some(size) = Size::from_bits(n) else {
                        return Instruction::Undefined;
                    };
                    match (to_ea, mode) {
                        (true, 1) => Instruction::Cmpm(size),
                        (true, _) => Instruction::Eor(size),
                        (false, _) => Instruction::Cmp(size),
                    }
                }
            }
        }
        0xC => match (opcode >> 6) & 7 {
            3 => Instruction::Mulu,
            7 => Instruction::Muls,
            4 if mode == 0 => Instruction::Abcd { memory: false },
            4 if mode == 1 => Instruction::Abcd { memory: true },
            5 if mode <= 1 => Instruction::Exg,
            6 if mode == 1 => Instruction::Exg,
            n => match Size::from_bits(n) {
                Some(size) => Instruction::And { size, to_ea: opcode & 0x0100 != 0 },
                None => Instruction::Undefined,
            },
        },
        0xD => match (opcode >> 6) & 7 {
            3 => Instruction::Adda(Size::Word),
            7 => Instruction::Adda(Size::Long),
            n => {
                let Some(size) = Size::from_bits(n) else {
                    return Instruction::Undefined;
                };
                let to_ea = opcode & 0x0100 != 0;
                match mode {
                    0 if to_ea => Instruction::Addx { size, memory: false },
                    1 if to_ea => Instruction::Addx { size, memory: true },
                    _ => Instruction::Add { size, to_ea },
                }
            }
        },
        0xE => decode_line_e(opcode),
        _ => Instruction::LineF,
    }
}

fn decode_line0(opcode: u16) -> Instruction {
    let size = size_field(opcode);
    let imm = |op| size.map_or(Instruction::Undefined, |size| Instruction::Immediate { op, size });

    match (opcode >> 6) & 0x3F {
        0x00 if opcode == 0x003C => Instruction::OriToCcr,
        0x01 if opcode == 0x007C => Instruction::OriToSr,
        0x00..=0x02 => imm(ImmOp::Or),
        0x08 if opcode == 0x023C => Instruction::AndiToCcr,
        0x09 if opcode == 0x027C => Instruction::AndiToSr,
        0x08..=0x0A => imm(ImmOp::And),
        0x10..=0x12 => imm(ImmOp::Sub),
        0x18..=0x1A => imm(ImmOp::Add),
        // Static bit number in an extension word
        0x20 => Instruction::Bit { op: BitOp::Test, dynamic: false },
        0x21 => Instruction::Bit { op: BitOp::Change, dynamic: false },
        0x22 => Instruction::Bit { op: BitOp::Clear, dynamic: false },
        0x23 => Instruction::Bit { op: BitOp::Set, dynamic: false },
        0x28 if opcode == 0x0A3C => Instruction::EoriToCcr,
        0x29 if opcode == 0x0A7C => Instruction::EoriToSr,
        0x28..=0x2A => imm(ImmOp::Eor),
        0x30..=0x32 => imm(ImmOp::Cmp),
        // CHK2/CMP2, RTM/CALLM, CAS/CAS2, MOVES
        0x03 | 0x0B | 0x13 | 0x1B | 0x2B | 0x33 | 0x38..=0x3B => Instruction::Undefined,
        _ => {
            let op = match (opcode >> 6) & 7 {
                4 => BitOp::Test,
                5 => BitOp::Change,
                6 => BitOp::Clear,
                7 => BitOp::Set,
                _ => return Instruction::Undefined,
            };
            if opcode & 0x0038 == 0x0008 {
                let size = if opcode & 0x0040 == 0 { Size::Word } else { Size::Long };
                Instruction::Movep { size, to_memory: opcode & 0x0080 != 0 }
            } else {
                Instruction::Bit { op, dynamic: true }
            }
        }
    }
}

fn decode_line4(opcode: u16, ext: u16, model: CpuModel) -> Instruction {
    let caps = model.capabilities();
    let mode = (opcode >> 3) & 7;
    let size = size_field(opcode);
    let sized = |f: fn(Size) -> Instruction| size.map_or(Instruction::Undefined, f);
    let only_030 = |instr: Instruction| if caps.long_ops { instr } else { Instruction::Undefined };
    let signed = ext & 0x0800 != 0;

    match (opcode >> 6) & 0x3F {
        0x00..=0x02 => sized(Instruction::Negx),
        0x03 => Instruction::MoveFromSr,
        0x08..=0x0A => sized(Instruction::Clr),
        0x0B => only_030(Instruction::MoveFromCcr),
        0x10..=0x12 => sized(Instruction::Neg),
        0x13 => Instruction::MoveToCcr,
        0x18..=0x1A => sized(Instruction::Not),
        0x1B => Instruction::MoveToSr,
        0x20 if mode == 1 => only_030(Instruction::LinkLong),
        0x20 => Instruction::Nbcd,
        0x21 => match mode {
            0 => Instruction::Swap,
            // BKPT
            1 => Instruction::Undefined,
            _ => Instruction::Pea,
        },
        0x22 if mode == 0 => Instruction::Ext(Size::Word),
        0x22 => Instruction::Movem { size: Size::Word, to_memory: true },
        0x23 if mode == 0 => Instruction::Ext(Size::Long),
        0x23 => Instruction::Movem { size: Size::Long, to_memory: true },
        0x27 if mode == 0 && opcode & 0x0E00 == 0x0800 && caps.long_ops => Instruction::Extb,
        0x28..=0x2A => sized(Instruction::Tst),
        0x2B if opcode == 0x4AFC => Instruction::Illegal,
        0x2B => Instruction::Tas,
        0x30 => only_030(Instruction::MulLong { signed }),
        0x31 => only_030(Instruction::DivLong { signed }),
        0x32 => Instruction::Movem { size: Size::Word, to_memory: false },
        0x33 => Instruction::Movem { size: Size::Long, to_memory: false },
        0x39 => decode_misc(opcode, model),
        0x3A => Instruction::Jsr,
        0x3B => Instruction::Jmp,
        field => match field & 7 {
            7 => Instruction::Lea,
            6 => Instruction::Chk(Size::Word),
            4 => only_030(Instruction::Chk(Size::Long)),
            _ => Instruction::Undefined,
        },
    }
}

/// $4E40-$4E7F: traps, returns, stack frames and control registers.
fn decode_misc(opcode: u16, model: CpuModel) -> Instruction {
    let caps = model.capabilities();
    if opcode & 0xFFF0 == 0x4E40 {
        return Instruction::Trap;
    }
    match opcode {
        0x4E70 => Instruction::Reset,
        0x4E71 => Instruction::Nop,
        0x4E72 => Instruction::Stop,
        0x4E73 => Instruction::Rte,
        0x4E74 if caps.long_ops => Instruction::Rtd,
        0x4E75 => Instruction::Rts,
        0x4E76 => Instruction::Trapv,
        0x4E77 => Instruction::Rtr,
        0x4E7A if caps.movec => Instruction::Movec { to_control: false },
        0x4E7B if caps.movec => Instruction::Movec { to_control: true },
        _ => match opcode & 0xFFF8 {
            0x4E50 => Instruction::Link,
            0x4E58 => Instruction::Unlk,
            0x4E60 => Instruction::MoveUsp { to_usp: true },
            0x4E68 => Instruction::MoveUsp { to_usp: false },
            _ => Instruction::Undefined,
        },
    }
}

fn decode_line_e(opcode: u16) -> Instruction {
    // Bit field instructions (68020+) are not implemented
    if (0x08C0..=0x0FC0).contains(&(opcode & 0x0FC0)) && opcode & 0x00C0 == 0x00C0 {
        return Instruction::Undefined;
    }
    let left = opcode & 0x0100 != 0;
    match Size::from_bits(opcode >> 6) {
        Some(size) => Instruction::Shift {
            kind: ShiftKind::from_bits(opcode >> 3),
            left,
            size,
            register_count: opcode & 0x0020 != 0,
        },
        None if opcode & 0x0800 == 0 => Instruction::ShiftMemory { kind: ShiftKind::from_bits(opcode >> 9), left },
        None => Instruction::Undefined,
    }
}
