//! ASx, LSx, ROXx and ROx on registers and on memory words.

use crate::addressing::{legal, reg_field};
use crate::alu::{self, Size};
use crate::bus::AddressSpace;
use crate::cpu::Cpu68000;
use crate::decode::ShiftKind;
use crate::exceptions::Fault;
use crate::flags::Flags;

/// Shift `value` by `count` with the flag rules of `kind`.
///
/// Rotates through X take the count modulo `bits + 1`.
fn shift(kind: ShiftKind, left: bool, value: u32, count: u32, size: Size, flags: &mut Flags) -> u32 {
    match (kind, left) {
        (ShiftKind::Arithmetic, true) => alu::asl(value, count, size, flags),
        (ShiftKind::Arithmetic, false) => alu::asr(value, count, size, flags),
        (ShiftKind::Logical, true) => alu::lsl(value, count, size, flags),
        (ShiftKind::Logical, false) => alu::lsr(value, count, size, flags),
        (ShiftKind::RotateExtend, true) => alu::roxl(value, count % (size.bits() + 1), size, flags),
        (ShiftKind::RotateExtend, false) => alu::roxr(value, count % (size.bits() + 1), size, flags),
        (ShiftKind::Rotate, true) => alu::rol(value, count, size, flags),
        (ShiftKind::Rotate, false) => alu::ror(value, count, size, flags),
    }
}

impl Cpu68000 {
    /// Register shift. The count is Dx mod 64, or an immediate 1-8.
    pub(crate) fn op_shift(&mut self, kind: ShiftKind, left: bool, size: Size, register_count: bool) {
        let dy = usize::from(self.opcode & 7);
        let field = reg_field(self.opcode);
        let count = if register_count {
            self.regs.d[field] & 63
        } else if field == 0 {
            8
        } else {
            field as u32
        };
        let result = shift(kind, left, self.regs.d[dy], count, size, &mut self.regs.flags);
        self.regs.set_d_sized(dy, result, size.mask());
    }

    /// Memory shift: one bit on a word operand.
    pub(crate) fn op_shift_memory<M: AddressSpace>(&mut self, mem: &mut M, kind: ShiftKind, left: bool) -> Result<(), Fault> {
        let dst = self.ea(mem, Size::Word, legal::MEMORY_SHIFT)?;
        let value = self.read_operand(mem, dst, Size::Word);
        let result = shift(kind, left, value, 1, Size::Word, &mut self.regs.flags);
        self.write_operand(mem, dst, Size::Word, result);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotate_extend_count_wraps_at_width_plus_one() {
        // ROXL.B by 9 is a full turn through X
        let mut flags = Flags { x: true, ..Flags::default() };
        assert_eq!(shift(ShiftKind::RotateExtend, true, 0x5A, 9, Size::Byte, &mut flags), 0x5A);
        assert!(flags.x && flags.c);
    }

    #[test]
    fn large_register_counts_clear_logical_results() {
        let mut flags = Flags::default();
        assert_eq!(shift(ShiftKind::Logical, false, 0xFFFF_FFFF, 63, Size::Long, &mut flags), 0);
        assert!(flags.z && !flags.c);
    }
}
