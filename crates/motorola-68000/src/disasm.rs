//! Mnemonic lookup for debuggers and trace logs.
//!
//! Runs the same [`decode`] tree as the interpreter and never touches CPU
//! state, so it is safe to call on arbitrary memory.

use crate::alu::Size;
use crate::decode::{BitOp, ImmOp, Instruction, ShiftKind, decode};
use crate::flags::condition_name;
use crate::model::CpuModel;

fn sized(name: &str, size: Size) -> String {
    format!("{name}{}", size.suffix())
}

fn imm_name(op: ImmOp) -> &'static str {
    match op {
        ImmOp::Or => "ORI",
        ImmOp::And => "ANDI",
        ImmOp::Sub => "SUBI",
        ImmOp::Add => "ADDI",
        ImmOp::Eor => "EORI",
        ImmOp::Cmp => "CMPI",
    }
}

fn bit_name(op: BitOp) -> &'static str {
    match op {
        BitOp::Test => "BTST",
        BitOp::Change => "BCHG",
        BitOp::Clear => "BCLR",
        BitOp::Set => "BSET",
    }
}

fn shift_name(kind: ShiftKind, left: bool) -> &'static str {
    match (kind, left) {
        (ShiftKind::Arithmetic, true) => "ASL",
        (ShiftKind::Arithmetic, false) => "ASR",
        (ShiftKind::Logical, true) => "LSL",
        (ShiftKind::Logical, false) => "LSR",
        (ShiftKind::RotateExtend, true) => "ROXL",
        (ShiftKind::RotateExtend, false) => "ROXR",
        (ShiftKind::Rotate, true) => "ROL",
        (ShiftKind::Rotate, false) => "ROR",
    }
}

/// Mnemonic (with size suffix and condition) of `opcode` on `model`.
///
/// `ext` is the following word; it selects the MULx.L/DIVx.L variants.
#[must_use]
pub fn mnemonic(opcode: u16, ext: u16, model: CpuModel) -> String {
    let cc = ((opcode >> 8) & 0x0F) as u8;
    let instr = decode(opcode, ext, model);
    match instr {
        Instruction::OriToCcr => "ORI to CCR".into(),
        Instruction::OriToSr => "ORI to SR".into(),
        Instruction::AndiToCcr => "ANDI to CCR".into(),
        Instruction::AndiToSr => "ANDI to SR".into(),
        Instruction::EoriToCcr => "EORI to CCR".into(),
        Instruction::EoriToSr => "EORI to SR".into(),
        Instruction::Immediate { op, size } => sized(imm_name(op), size),
        Instruction::Bit { op, .. } => {
            let size = if opcode & 0x0038 == 0 { Size::Long } else { Size::Byte };
            sized(bit_name(op), size)
        }
        Instruction::Movep { size, .. } => sized("MOVEP", size),
        Instruction::Move(size) => sized("MOVE", size),
        Instruction::Movea(size) => sized("MOVEA", size),
        Instruction::Negx(size) => sized("NEGX", size),
        Instruction::MoveFromSr => "MOVE from SR".into(),
        Instruction::Clr(size) => sized("CLR", size),
        Instruction::MoveFromCcr => "MOVE from CCR".into(),
        Instruction::Neg(size) => sized("NEG", size),
        Instruction::MoveToCcr => "MOVE to CCR".into(),
        Instruction::Not(size) => sized("NOT", size),
        Instruction::MoveToSr => "MOVE to SR".into(),
        Instruction::Nbcd => "NBCD".into(),
        Instruction::LinkLong => "LINK.L".into(),
        Instruction::Swap => "SWAP".into(),
        Instruction::Pea => "PEA".into(),
        Instruction::Ext(size) => sized("EXT", size),
        Instruction::Extb => "EXTB.L".into(),
        Instruction::Movem { size, .. } => sized("MOVEM", size),
        Instruction::Tst(size) => sized("TST", size),
        Instruction::Tas => "TAS".into(),
        Instruction::Illegal => "ILLEGAL".into(),
        Instruction::MulLong { signed } => String::from(if signed { "MULS.L" } else { "MULU.L" }),
        Instruction::DivLong { signed } => {
            let split = ext & 0x0400 == 0 && (ext >> 12) & 7 != ext & 7;
            let name = match (signed, split) {
                (false, false) => "DIVU.L",
                (false, true) => "DIVUL.L",
                (true, false) => "DIVS.L",
                (true, true) => "DIVSL.L",
            };
            name.into()
        }
        Instruction::Trap => format!("TRAP #{}", opcode & 0x0F),
        Instruction::Link => "LINK".into(),
        Instruction::Unlk => "UNLK".into(),
        Instruction::MoveUsp { .. } => "MOVE USP".into(),
        Instruction::Reset => "RESET".into(),
        Instruction::Nop => "NOP".into(),
        Instruction::Stop => "STOP".into(),
        Instruction::Rte => "RTE".into(),
        Instruction::Rtd => "RTD".into(),
        Instruction::Rts => "RTS".into(),
        Instruction::Trapv => "TRAPV".into(),
        Instruction::Rtr => "RTR".into(),
        Instruction::Movec { .. } => "MOVEC".into(),
        Instruction::Jsr => "JSR".into(),
        Instruction::Jmp => "JMP".into(),
        Instruction::Lea => "LEA".into(),
        Instruction::Chk(size) => sized("CHK", size),
        Instruction::Addq(size) => sized("ADDQ", size),
        Instruction::Subq(size) => sized("SUBQ", size),
        Instruction::AddqAddr => sized("ADDQ", if opcode & 0x0080 != 0 { Size::Long } else { Size::Word }),
        Instruction::SubqAddr => sized("SUBQ", if opcode & 0x0080 != 0 { Size::Long } else { Size::Word }),
        Instruction::Scc => format!("S{}", condition_name(cc)),
        Instruction::Dbcc if cc == 1 => "DBRA".into(),
        Instruction::Dbcc => format!("DB{}", condition_name(cc)),
        Instruction::Trapcc => format!("TRAP{}", condition_name(cc)),
        Instruction::Bcc if cc == 0 => "BRA".into(),
        Instruction::Bcc => format!("B{}", condition_name(cc)),
        Instruction::Bsr => "BSR".into(),
        Instruction::Moveq => "MOVEQ".into(),
        Instruction::Or { size, .. } => sized("OR", size),
        Instruction::Divu => "DIVU.W".into(),
        Instruction::Divs => "DIVS.W".into(),
        Instruction::Sbcd { .. } => "SBCD".into(),
        Instruction::Sub { size, .. } => sized("SUB", size),
        Instruction::Suba(size) => sized("SUBA", size),
        Instruction::Subx { size, .. } => sized("SUBX", size),
        Instruction::Cmp(size) => sized("CMP", size),
        Instruction::Cmpa(size) => sized("CMPA", size),
        Instruction::Cmpm(size) => sized("CMPM", size),
        Instruction::Eor(size) => sized("EOR", size),
        Instruction::And { size, .. } => sized("AND", size),
        Instruction::Mulu => "MULU.W".into(),
        Instruction::Muls => "MULS.W".into(),
        Instruction::Abcd { .. } => "ABCD".into(),
        Instruction::Exg => "EXG".into(),
        Instruction::Add { size, .. } => sized("ADD", size),
        Instruction::Adda(size) => sized("ADDA", size),
        Instruction::Addx { size, .. } => sized("ADDX", size),
        Instruction::Shift { kind, left, size, .. } => sized(shift_name(kind, left), size),
        Instruction::ShiftMemory { kind, left } => sized(shift_name(kind, left), Size::Word),
        Instruction::LineA => format!("LINEA ${opcode:04X}"),
        Instruction::LineF => format!("LINEF ${opcode:04X}"),
        Instruction::Undefined => format!("DC.W ${opcode:04X}"),
    }
}
