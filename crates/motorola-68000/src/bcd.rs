//! Packed decimal arithmetic: ABCD, SBCD, NBCD.

use crate::addressing::{legal, reg_field};
use crate::alu::{self, Size};
use crate::bus::AddressSpace;
use crate::cpu::Cpu68000;
use crate::exceptions::Fault;

impl Cpu68000 {
    /// The 68030 leaves V cleared after a decimal operation.
    fn bcd_clears_overflow(&self) -> bool {
        self.model().is_68030()
    }

    /// ABCD/SBCD Dy,Dx or -(Ay),-(Ax).
    pub(crate) fn op_abcd_sbcd<M: AddressSpace>(&mut self, mem: &mut M, memory: bool, subtract: bool) {
        let ry = usize::from(self.opcode & 7);
        let rx = reg_field(self.opcode);
        let clear_overflow = self.bcd_clears_overflow();
        let bcd = if subtract { alu::sbcd } else { alu::abcd };
        if memory {
            let src_addr = self.predecrement(ry, Size::Byte);
            let src = self.read_data(mem, src_addr, Size::Byte) as u8;
            let dst_addr = self.predecrement(rx, Size::Byte);
            let dst = self.read_data(mem, dst_addr, Size::Byte) as u8;
            let result = bcd(src, dst, &mut self.regs.flags, clear_overflow);
            self.write_data(mem, dst_addr, Size::Byte, u32::from(result));
        } else {
            let result = bcd(self.regs.d[ry] as u8, self.regs.d[rx] as u8, &mut self.regs.flags, clear_overflow);
            self.regs.set_d_sized(rx, u32::from(result), Size::Byte.mask());
        }
    }

    /// NBCD: decimal `0 - <ea> - X`.
    pub(crate) fn op_nbcd<M: AddressSpace>(&mut self, mem: &mut M) -> Result<(), Fault> {
        let dst = self.ea(mem, Size::Byte, legal::DATA_ALTERABLE)?;
        let value = self.read_operand(mem, dst, Size::Byte) as u8;
        let clear_overflow = self.bcd_clears_overflow();
        let result = alu::sbcd(value, 0, &mut self.regs.flags, clear_overflow);
        self.write_operand(mem, dst, Size::Byte, u32::from(result));
        Ok(())
    }
}
