//! Logical operations, status register immediates, bit operations, TST,
//! TAS and Scc.

use crate::addressing::{EaMask, legal, reg_field};
use crate::alu::Size;
use crate::bus::AddressSpace;
use crate::cpu::Cpu68000;
use crate::decode::{BitOp, ImmOp, Instruction};
use crate::exceptions::Fault;

/// Apply an OR/AND/EOR immediate.
const fn logic(op: ImmOp, src: u32, dst: u32) -> u32 {
    match op {
        ImmOp::Or => dst | src,
        ImmOp::And => dst & src,
        _ => dst ^ src,
    }
}

/// The logical operation behind an xxxI to CCR/SR instruction.
const fn status_op(instr: Instruction) -> ImmOp {
    match instr {
        Instruction::OriToCcr | Instruction::OriToSr => ImmOp::Or,
        Instruction::AndiToCcr | Instruction::AndiToSr => ImmOp::And,
        _ => ImmOp::Eor,
    }
}

impl Cpu68000 {
    /// ORI, ANDI, EORI to a data-alterable destination.
    pub(crate) fn op_logic_immediate<M: AddressSpace>(&mut self, mem: &mut M, op: ImmOp, size: Size) -> Result<(), Fault> {
        let imm = self.fetch_immediate(mem, size);
        let dst = self.ea(mem, size, legal::DATA_ALTERABLE)?;
        let value = self.read_operand(mem, dst, size);
        let result = logic(op, imm, value) & size.mask();
        self.write_operand(mem, dst, size, result);
        self.regs.flags.set_logical(result, size.msb_mask());
        Ok(())
    }

    /// ORI/ANDI/EORI to CCR.
    pub(crate) fn op_ccr_immediate<M: AddressSpace>(&mut self, mem: &mut M, instr: Instruction) -> Result<(), Fault> {
        let imm = u32::from(self.fetch_word(mem) & 0xFF);
        let ccr = logic(status_op(instr), imm, u32::from(self.regs.ccr()));
        self.regs.set_ccr(ccr as u16);
        Ok(())
    }

    /// ORI/ANDI/EORI to SR. Privileged; the immediate is not fetched in
    /// user mode.
    pub(crate) fn op_sr_immediate<M: AddressSpace>(&mut self, mem: &mut M, instr: Instruction) -> Result<(), Fault> {
        self.supervisor_only()?;
        let imm = u32::from(self.fetch_word(mem));
        let sr = logic(status_op(instr), imm, u32::from(self.sr()));
        self.write_sr(mem, sr as u16);
        Ok(())
    }

    /// AND/OR between Dn and an effective address.
    pub(crate) fn op_and_or<M: AddressSpace>(&mut self, mem: &mut M, size: Size, to_ea: bool, and: bool) -> Result<(), Fault> {
        let dn = reg_field(self.opcode);
        let op = if and { ImmOp::And } else { ImmOp::Or };
        let result = if to_ea {
            let dst = self.ea(mem, size, legal::RMW_DST)?;
            let value = self.read_operand(mem, dst, size);
            let result = logic(op, self.regs.d[dn], value) & size.mask();
            self.write_operand(mem, dst, size, result);
            result
        } else {
            let src = self.ea(mem, size, legal::DATA_SRC)?;
            let value = self.read_operand(mem, src, size);
            let result = logic(op, value, self.regs.d[dn]) & size.mask();
            self.regs.set_d_sized(dn, result, size.mask());
            result
        };
        self.regs.flags.set_logical(result, size.msb_mask());
        Ok(())
    }

    /// EOR Dn,<ea>
    pub(crate) fn op_eor<M: AddressSpace>(&mut self, mem: &mut M, size: Size) -> Result<(), Fault> {
        let dn = reg_field(self.opcode);
        let dst = self.ea(mem, size, legal::DATA_ALTERABLE)?;
        let value = self.read_operand(mem, dst, size);
        let result = (value ^ self.regs.d[dn]) & size.mask();
        self.write_operand(mem, dst, size, result);
        self.regs.flags.set_logical(result, size.msb_mask());
        Ok(())
    }

    pub(crate) fn op_not<M: AddressSpace>(&mut self, mem: &mut M, size: Size) -> Result<(), Fault> {
        let dst = self.ea(mem, size, legal::DATA_ALTERABLE)?;
        let result = !self.read_operand(mem, dst, size) & size.mask();
        self.write_operand(mem, dst, size, result);
        self.regs.flags.set_logical(result, size.msb_mask());
        Ok(())
    }

    /// TST. The 68030 also accepts PC-relative, immediate and (for word
    /// and long) An operands.
    pub(crate) fn op_tst<M: AddressSpace>(&mut self, mem: &mut M, size: Size) -> Result<(), Fault> {
        let mask = match size {
            _ if !self.capabilities().long_ops => legal::TST,
            Size::Byte => legal::TST_030.without(EaMask::AN),
            _ => legal::TST_030,
        };
        let src = self.ea(mem, size, mask)?;
        let value = self.read_operand(mem, src, size);
        self.regs.flags.set_logical(value, size.msb_mask());
        Ok(())
    }

    /// TAS: test, then set bit 7.
    pub(crate) fn op_tas<M: AddressSpace>(&mut self, mem: &mut M) -> Result<(), Fault> {
        let dst = self.ea(mem, Size::Byte, legal::DATA_ALTERABLE)?;
        let value = self.read_operand(mem, dst, Size::Byte);
        self.regs.flags.set_logical(value, Size::Byte.msb_mask());
        self.write_operand(mem, dst, Size::Byte, value | 0x80);
        Ok(())
    }

    /// BTST/BCHG/BCLR/BSET. Register destinations are long with the bit
    /// number mod 32; memory destinations are bytes with the bit number mod 8.
    pub(crate) fn op_bit<M: AddressSpace>(&mut self, mem: &mut M, op: BitOp, dynamic: bool) -> Result<(), Fault> {
        let bit = if dynamic {
            self.regs.d[reg_field(self.opcode)]
        } else {
            u32::from(self.fetch_word(mem))
        };
        let mask = match (op, dynamic) {
            (BitOp::Test, true) => legal::BTST_DYNAMIC,
            (BitOp::Test, false) => legal::BTST_STATIC,
            _ => legal::BIT_CHANGE,
        };
        let size = if self.opcode & 0x0038 == 0 { Size::Long } else { Size::Byte };
        let dst = self.ea(mem, size, mask)?;
        let bit_mask = 1u32 << (bit & (size.bits() - 1));
        let value = self.read_operand(mem, dst, size);
        self.regs.flags.z = value & bit_mask == 0;
        let result = match op {
            BitOp::Test => return Ok(()),
            BitOp::Change => value ^ bit_mask,
            BitOp::Clear => value & !bit_mask,
            BitOp::Set => value | bit_mask,
        };
        self.write_operand(mem, dst, size, result);
        Ok(())
    }

    /// Scc: $FF if the condition holds, else $00.
    pub(crate) fn op_scc<M: AddressSpace>(&mut self, mem: &mut M) -> Result<(), Fault> {
        let dst = self.ea(mem, Size::Byte, legal::DATA_ALTERABLE)?;
        let value = if self.condition() { 0xFF } else { 0x00 };
        self.write_operand(mem, dst, Size::Byte, value);
        Ok(())
    }

    /// Condition in bits 11-8 of the opcode.
    pub(crate) fn condition(&self) -> bool {
        self.regs.flags.condition(((self.opcode >> 8) & 0x0F) as u8)
    }
}
