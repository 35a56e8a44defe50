//! Data movement: MOVE and friends, MOVEM, MOVEP, LEA/PEA, EXG/SWAP,
//! LINK/UNLK and the status register moves.

use crate::addressing::{ea_fields, legal, reg_field};
use crate::alu::Size;
use crate::bus::AddressSpace;
use crate::cpu::Cpu68000;
use crate::exceptions::Fault;

impl Cpu68000 {
    /// MOVE <ea>,<ea>
    ///
    /// The destination mode is validated before the source is touched. A
    /// rejected destination still skips the source extension words, which
    /// come first in the instruction stream.
    pub(crate) fn op_move<M: AddressSpace>(&mut self, mem: &mut M, size: Size) -> Result<(), Fault> {
        let dst_mode = ((self.opcode >> 6) & 7) as u8;
        let dst_reg = reg_field(self.opcode) as u8;
        if !legal::MOVE_DST.allows(dst_mode, dst_reg) {
            let (src_mode, src_reg) = ea_fields(self.opcode);
            self.skip_extension(mem, src_mode, src_reg, size);
            return Err(self.reject_ea(mem, dst_mode, dst_reg, size));
        }
        let src_mask = if size == Size::Byte { legal::MOVE_BYTE_SRC } else { legal::MOVE_SRC };
        let src = self.ea(mem, size, src_mask)?;
        let value = self.read_operand(mem, src, size);
        let dst = self.resolve(mem, dst_mode, dst_reg, size, legal::MOVE_DST)?;
        self.write_operand(mem, dst, size, value);
        self.regs.flags.set_logical(value, size.msb_mask());
        Ok(())
    }

    /// MOVEA: sign-extended, no flags.
    pub(crate) fn op_movea<M: AddressSpace>(&mut self, mem: &mut M, size: Size) -> Result<(), Fault> {
        let an = reg_field(self.opcode);
        let src = self.ea(mem, size, legal::MOVE_SRC)?;
        self.regs.a[an] = size.sign_extend(self.read_operand(mem, src, size));
        Ok(())
    }

    pub(crate) fn op_moveq(&mut self) {
        let value = Size::Byte.sign_extend(u32::from(self.opcode));
        self.regs.d[reg_field(self.opcode)] = value;
        self.regs.flags.set_logical(value, Size::Long.msb_mask());
    }

    /// MOVEM registers to memory.
    ///
    /// -(An) stores A7..A0 then D7..D0 downwards and writes the final
    /// address back. A base register in the list is stored as its initial
    /// value on the 68000 and already decremented by one operand on the
    /// 68030.
    pub(crate) fn op_movem_to_memory<M: AddressSpace>(&mut self, mem: &mut M, size: Size) -> Result<(), Fault> {
        self.check_ea(mem, size, legal::MOVEM_TO_MEMORY)?;
        let list = self.fetch_word(mem);
        let step = size.bytes();

        if (self.opcode >> 3) & 7 == 4 {
            let base = usize::from(self.opcode & 7);
            let initial = self.regs.a[base];
            let base_value = if self.model().is_68030() { initial.wrapping_sub(step) } else { initial };
            let mut addr = initial;
            for i in 0..16 {
                if list & (1 << i) == 0 {
                    continue;
                }
                addr = addr.wrapping_sub(step);
                let value = match i {
                    0..=7 if 7 - i == base => base_value,
                    0..=7 => self.regs.a[7 - i],
                    _ => self.regs.d[15 - i],
                };
                self.write_data(mem, addr, size, value);
            }
            self.regs.a[base] = addr;
            return Ok(());
        }

        let mut addr = self.ea_address(mem, legal::MOVEM_TO_MEMORY)?;
        for i in 0..16 {
            if list & (1 << i) != 0 {
                let value = if i < 8 { self.regs.d[i] } else { self.regs.a[i - 8] };
                self.write_data(mem, addr, size, value);
                addr = addr.wrapping_add(step);
            }
        }
        Ok(())
    }

    /// MOVEM memory to registers, D0..D7 then A0..A7. Word loads are
    /// sign-extended; (An)+ leaves An at the address after the last load.
    pub(crate) fn op_movem_to_registers<M: AddressSpace>(&mut self, mem: &mut M, size: Size) -> Result<(), Fault> {
        self.check_ea(mem, size, legal::MOVEM_TO_REGS)?;
        let list = self.fetch_word(mem);
        let postincrement = (self.opcode >> 3) & 7 == 3;
        let mut addr = self.ea_address(mem, legal::MOVEM_TO_REGS)?;
        for i in 0..16 {
            if list & (1 << i) == 0 {
                continue;
            }
            let value = size.sign_extend(self.read_data(mem, addr, size));
            if i < 8 {
                self.regs.d[i] = value;
            } else {
                self.regs.a[i - 8] = value;
            }
            addr = addr.wrapping_add(size.bytes());
        }
        if postincrement {
            self.regs.a[usize::from(self.opcode & 7)] = addr;
        }
        Ok(())
    }

    /// MOVEP: transfers bytes to or from every other address at (d16,Ay).
    pub(crate) fn op_movep<M: AddressSpace>(&mut self, mem: &mut M, size: Size, to_memory: bool) {
        let dx = reg_field(self.opcode);
        let ay = usize::from(self.opcode & 7);
        let disp = Size::Word.sign_extend(u32::from(self.fetch_word(mem)));
        let addr = self.regs.a[ay].wrapping_add(disp);
        let count = size.bytes();

        if to_memory {
            let value = self.regs.d[dx];
            for i in 0..count {
                let byte = value >> (8 * (count - 1 - i));
                self.write_data(mem, addr.wrapping_add(2 * i), Size::Byte, byte);
            }
        } else {
            let mut value = 0;
            for i in 0..count {
                value = (value << 8) | self.read_data(mem, addr.wrapping_add(2 * i), Size::Byte);
            }
            self.regs.set_d_sized(dx, value, size.mask());
        }
    }

    pub(crate) fn op_lea<M: AddressSpace>(&mut self, mem: &mut M) -> Result<(), Fault> {
        let addr = self.ea_address(mem, legal::CONTROL)?;
        self.regs.a[reg_field(self.opcode)] = addr;
        Ok(())
    }

    pub(crate) fn op_pea<M: AddressSpace>(&mut self, mem: &mut M) -> Result<(), Fault> {
        let addr = self.ea_address(mem, legal::CONTROL)?;
        self.push_long(mem, addr);
        Ok(())
    }

    /// EXG Dx,Dy / Ax,Ay / Dx,Ay
    pub(crate) fn op_exg(&mut self) {
        let rx = reg_field(self.opcode);
        let ry = usize::from(self.opcode & 7);
        let regs = &mut self.regs;
        match (self.opcode >> 3) & 0x1F {
            0x08 => regs.d.swap(rx, ry),
            0x09 => regs.a.swap(rx, ry),
            _ => std::mem::swap(&mut regs.d[rx], &mut regs.a[ry]),
        }
    }

    pub(crate) fn op_swap(&mut self) {
        let dn = usize::from(self.opcode & 7);
        let value = self.regs.d[dn].rotate_left(16);
        self.regs.d[dn] = value;
        self.regs.flags.set_logical(value, Size::Long.msb_mask());
    }

    /// LINK An,#d16 or LINK.L An,#d32
    pub(crate) fn op_link<M: AddressSpace>(&mut self, mem: &mut M, long: bool) {
        let an = usize::from(self.opcode & 7);
        let value = self.regs.a[an];
        self.push_long(mem, value);
        self.regs.a[an] = self.regs.a[7];
        let disp = if long {
            self.fetch_long(mem)
        } else {
            Size::Word.sign_extend(u32::from(self.fetch_word(mem)))
        };
        self.regs.a[7] = self.regs.a[7].wrapping_add(disp);
    }

    pub(crate) fn op_unlk<M: AddressSpace>(&mut self, mem: &mut M) {
        let an = usize::from(self.opcode & 7);
        self.regs.a[7] = self.regs.a[an];
        let value = self.pop_long(mem);
        self.regs.a[an] = value;
    }

    /// MOVE USP,An / MOVE An,USP
    pub(crate) fn op_move_usp(&mut self, to_usp: bool) -> Result<(), Fault> {
        self.supervisor_only()?;
        let an = usize::from(self.opcode & 7);
        if to_usp {
            self.regs.set_user_sp(self.regs.a[an]);
        } else {
            self.regs.a[an] = self.regs.user_sp();
        }
        Ok(())
    }

    /// MOVE SR,<ea>. Privileged on the 68030 only.
    pub(crate) fn op_move_from_sr<M: AddressSpace>(&mut self, mem: &mut M) -> Result<(), Fault> {
        self.check_ea(mem, Size::Word, legal::DATA_ALTERABLE)?;
        if self.model().is_68030() {
            self.supervisor_only()?;
        }
        let dst = self.ea(mem, Size::Word, legal::DATA_ALTERABLE)?;
        let sr = u32::from(self.sr());
        self.write_operand(mem, dst, Size::Word, sr);
        Ok(())
    }

    /// MOVE <ea>,SR
    pub(crate) fn op_move_to_sr<M: AddressSpace>(&mut self, mem: &mut M) -> Result<(), Fault> {
        self.check_ea(mem, Size::Word, legal::DATA_SRC)?;
        self.supervisor_only()?;
        let src = self.ea(mem, Size::Word, legal::DATA_SRC)?;
        let value = self.read_operand(mem, src, Size::Word) as u16;
        self.write_sr(mem, value);
        Ok(())
    }

    /// MOVE CCR,<ea>
    pub(crate) fn op_move_from_ccr<M: AddressSpace>(&mut self, mem: &mut M) -> Result<(), Fault> {
        let dst = self.ea(mem, Size::Word, legal::DATA_ALTERABLE)?;
        let ccr = u32::from(self.ccr());
        self.write_operand(mem, dst, Size::Word, ccr);
        Ok(())
    }

    /// MOVE <ea>,CCR: a word operand, only the low five bits land.
    pub(crate) fn op_move_to_ccr<M: AddressSpace>(&mut self, mem: &mut M) -> Result<(), Fault> {
        let src = self.ea(mem, Size::Word, legal::DATA_SRC)?;
        let value = self.read_operand(mem, src, Size::Word) as u16;
        self.regs.set_ccr(value);
        Ok(())
    }
}
