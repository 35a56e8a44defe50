//! Program control: Bcc/BSR, DBcc, JMP/JSR, returns and conditional traps.

use crate::addressing::legal;
use crate::alu::Size;
use crate::bus::AddressSpace;
use crate::cpu::Cpu68000;
use crate::exceptions::Fault;

impl Cpu68000 {
    /// Branch displacement for Bcc/BSR, leaving PC after the displacement.
    ///
    /// Displacement $00 selects a word and, on the 68030, $FF selects a
    /// long. The returned target is relative to the word after the opcode.
    fn branch_target<M: AddressSpace>(&mut self, mem: &mut M) -> u32 {
        let base = self.regs.pc;
        let disp = match self.opcode & 0xFF {
            0x00 => Size::Word.sign_extend(u32::from(self.fetch_word(mem))),
            0xFF if self.capabilities().long_branch => self.fetch_long(mem),
            d => Size::Byte.sign_extend(u32::from(d)),
        };
        base.wrapping_add(disp)
    }

    /// Bcc and BRA.
    pub(crate) fn op_bcc<M: AddressSpace>(&mut self, mem: &mut M) {
        let taken = self.condition();
        let target = self.branch_target(mem);
        if taken {
            self.regs.pc = target;
        }
    }

    /// BSR: push the address after the displacement, then branch.
    pub(crate) fn op_bsr<M: AddressSpace>(&mut self, mem: &mut M) {
        let target = self.branch_target(mem);
        let ret = self.regs.pc;
        self.push_long(mem, ret);
        self.regs.pc = target;
    }

    /// DBcc: decrement Dn.W and loop until it hits -1 or the condition holds.
    pub(crate) fn op_dbcc<M: AddressSpace>(&mut self, mem: &mut M) {
        if self.condition() {
            self.regs.pc = self.regs.pc.wrapping_add(2);
            return;
        }
        let dn = usize::from(self.opcode & 7);
        let counter = (self.regs.d[dn] as u16).wrapping_sub(1);
        self.regs.set_d_sized(dn, u32::from(counter), 0xFFFF);
        if counter == 0xFFFF {
            self.regs.pc = self.regs.pc.wrapping_add(2);
        } else {
            let disp = Size::Word.sign_extend(u32::from(self.peek_word(mem)));
            self.regs.pc = self.regs.pc.wrapping_add(disp);
        }
    }

    pub(crate) fn op_jmp<M: AddressSpace>(&mut self, mem: &mut M) -> Result<(), Fault> {
        self.regs.pc = self.ea_address(mem, legal::CONTROL)?;
        Ok(())
    }

    pub(crate) fn op_jsr<M: AddressSpace>(&mut self, mem: &mut M) -> Result<(), Fault> {
        let target = self.ea_address(mem, legal::CONTROL)?;
        let ret = self.regs.pc;
        self.push_long(mem, ret);
        self.regs.pc = target;
        Ok(())
    }

    pub(crate) fn op_rts<M: AddressSpace>(&mut self, mem: &mut M) {
        self.regs.pc = self.pop_long(mem);
    }

    /// RTR: CCR then PC.
    pub(crate) fn op_rtr<M: AddressSpace>(&mut self, mem: &mut M) {
        let ccr = self.pop_word(mem);
        self.regs.set_ccr(ccr);
        self.regs.pc = self.pop_long(mem);
    }

    /// RTD #d16: return and deallocate.
    pub(crate) fn op_rtd<M: AddressSpace>(&mut self, mem: &mut M) {
        let disp = Size::Word.sign_extend(u32::from(self.fetch_word(mem)));
        self.regs.pc = self.pop_long(mem);
        self.regs.a[7] = self.regs.a[7].wrapping_add(disp);
    }

    pub(crate) fn op_trapv(&self) -> Result<(), Fault> {
        if self.regs.flags.v { Err(Fault::Trapv) } else { Ok(()) }
    }

    /// TRAPcc, TRAPcc.W #d16, TRAPcc.L #d32. The operand is skipped, never
    /// used.
    pub(crate) fn op_trapcc<M: AddressSpace>(&mut self, mem: &mut M) -> Result<(), Fault> {
        match self.opcode & 7 {
            2 => {
                self.fetch_word(mem);
            }
            3 => {
                self.fetch_long(mem);
            }
            _ => {}
        }
        if self.condition() { Err(Fault::Trapv) } else { Ok(()) }
    }
}
