//! Integer arithmetic: ADD/SUB/CMP in all their forms, NEG/NEGX/CLR,
//! multiply, divide, CHK and sign extension.

use crate::addressing::{EaMask, legal, reg_field};
use crate::alu::{self, Size};
use crate::bus::AddressSpace;
use crate::cpu::Cpu68000;
use crate::decode::ImmOp;
use crate::exceptions::Fault;

/// Source mask for `<ea>,Dn` forms: byte operands cannot come from An.
const fn arith_src(size: Size) -> EaMask {
    match size {
        Size::Byte => legal::ARITH_BYTE_SRC,
        _ => legal::ARITH_SRC,
    }
}

impl Cpu68000 {
    /// ADDI, SUBI, CMPI.
    pub(crate) fn op_arith_immediate<M: AddressSpace>(&mut self, mem: &mut M, op: ImmOp, size: Size) -> Result<(), Fault> {
        let imm = self.fetch_immediate(mem, size);
        let mask = match op {
            ImmOp::Cmp if self.capabilities().full_extension => legal::CMPI_DST_030,
            ImmOp::Cmp => legal::CMPI_DST,
            _ => legal::DATA_ALTERABLE,
        };
        let dst = self.ea(mem, size, mask)?;
        let value = self.read_operand(mem, dst, size);
        let flags = &mut self.regs.flags;
        let result = match op {
            ImmOp::Add => alu::add(imm, value, size, flags),
            ImmOp::Sub => alu::sub(imm, value, size, flags),
            _ => {
                alu::cmp(imm, value, size, flags);
                return Ok(());
            }
        };
        self.write_operand(mem, dst, size, result);
        Ok(())
    }

    /// ADD/SUB between Dn and an effective address, in either direction.
    pub(crate) fn op_add_sub<M: AddressSpace>(&mut self, mem: &mut M, size: Size, to_ea: bool, subtract: bool) -> Result<(), Fault> {
        let dn = reg_field(self.opcode);
        let arith = if subtract { alu::sub } else { alu::add };
        if to_ea {
            let dst = self.ea(mem, size, legal::RMW_DST)?;
            let value = self.read_operand(mem, dst, size);
            let result = arith(self.regs.d[dn], value, size, &mut self.regs.flags);
            self.write_operand(mem, dst, size, result);
        } else {
            let src = self.ea(mem, size, arith_src(size))?;
            let value = self.read_operand(mem, src, size);
            let result = arith(value, self.regs.d[dn], size, &mut self.regs.flags);
            self.regs.set_d_sized(dn, result, size.mask());
        }
        Ok(())
    }

    /// ADDA/SUBA: full 32-bit, word sources sign-extended, flags untouched.
    pub(crate) fn op_adda_suba<M: AddressSpace>(&mut self, mem: &mut M, size: Size, subtract: bool) -> Result<(), Fault> {
        let an = reg_field(self.opcode);
        let src = self.ea(mem, size, legal::ARITH_SRC)?;
        let value = size.sign_extend(self.read_operand(mem, src, size));
        self.regs.a[an] = if subtract {
            self.regs.a[an].wrapping_sub(value)
        } else {
            self.regs.a[an].wrapping_add(value)
        };
        Ok(())
    }

    /// Quick data in bits 11-9, with 0 meaning 8.
    fn quick_data(&self) -> u32 {
        match (self.opcode >> 9) & 7 {
            0 => 8,
            n => u32::from(n),
        }
    }

    /// ADDQ/SUBQ to a data-alterable destination.
    pub(crate) fn op_quick<M: AddressSpace>(&mut self, mem: &mut M, size: Size, subtract: bool) -> Result<(), Fault> {
        let data = self.quick_data();
        let dst = self.ea(mem, size, legal::QUICK_DST)?;
        let value = self.read_operand(mem, dst, size);
        let flags = &mut self.regs.flags;
        let result = if subtract { alu::sub(data, value, size, flags) } else { alu::add(data, value, size, flags) };
        self.write_operand(mem, dst, size, result);
        Ok(())
    }

    /// ADDQ/SUBQ to An.
    pub(crate) fn op_quick_addr(&mut self, subtract: bool) {
        let data = self.quick_data();
        let an = usize::from(self.opcode & 7);
        self.regs.a[an] = if subtract {
            self.regs.a[an].wrapping_sub(data)
        } else {
            self.regs.a[an].wrapping_add(data)
        };
    }

    /// ADDX/SUBX, register or -(Ay),-(Ax).
    pub(crate) fn op_addx_subx<M: AddressSpace>(&mut self, mem: &mut M, size: Size, memory: bool, subtract: bool) {
        let ry = usize::from(self.opcode & 7);
        let rx = reg_field(self.opcode);
        let arith = if subtract { alu::subx } else { alu::addx };
        if memory {
            let src_addr = self.predecrement(ry, size);
            let src = self.read_data(mem, src_addr, size);
            let dst_addr = self.predecrement(rx, size);
            let dst = self.read_data(mem, dst_addr, size);
            let result = arith(src, dst, size, &mut self.regs.flags);
            self.write_data(mem, dst_addr, size, result);
        } else {
            let result = arith(self.regs.d[ry], self.regs.d[rx], size, &mut self.regs.flags);
            self.regs.set_d_sized(rx, result, size.mask());
        }
    }

    /// CMP `<ea>,Dn`.
    pub(crate) fn op_cmp<M: AddressSpace>(&mut self, mem: &mut M, size: Size) -> Result<(), Fault> {
        let dn = reg_field(self.opcode);
        let src = self.ea(mem, size, arith_src(size))?;
        let value = self.read_operand(mem, src, size);
        alu::cmp(value, self.regs.d[dn], size, &mut self.regs.flags);
        Ok(())
    }

    /// CMPA: always a 32-bit compare.
    pub(crate) fn op_cmpa<M: AddressSpace>(&mut self, mem: &mut M, size: Size) -> Result<(), Fault> {
        let an = reg_field(self.opcode);
        let src = self.ea(mem, size, legal::ARITH_SRC)?;
        let value = size.sign_extend(self.read_operand(mem, src, size));
        alu::cmp(value, self.regs.a[an], Size::Long, &mut self.regs.flags);
        Ok(())
    }

    /// CMPM (Ay)+,(Ax)+
    pub(crate) fn op_cmpm<M: AddressSpace>(&mut self, mem: &mut M, size: Size) {
        let ry = usize::from(self.opcode & 7);
        let rx = reg_field(self.opcode);
        let src_addr = self.postincrement(ry, size);
        let src = self.read_data(mem, src_addr, size);
        let dst_addr = self.postincrement(rx, size);
        let dst = self.read_data(mem, dst_addr, size);
        alu::cmp(src, dst, size, &mut self.regs.flags);
    }

    pub(crate) fn op_neg<M: AddressSpace>(&mut self, mem: &mut M, size: Size) -> Result<(), Fault> {
        let dst = self.ea(mem, size, legal::DATA_ALTERABLE)?;
        let value = self.read_operand(mem, dst, size);
        let result = alu::neg(value, size, &mut self.regs.flags);
        self.write_operand(mem, dst, size, result);
        Ok(())
    }

    pub(crate) fn op_negx<M: AddressSpace>(&mut self, mem: &mut M, size: Size) -> Result<(), Fault> {
        let dst = self.ea(mem, size, legal::DATA_ALTERABLE)?;
        let value = self.read_operand(mem, dst, size);
        let result = alu::negx(value, size, &mut self.regs.flags);
        self.write_operand(mem, dst, size, result);
        Ok(())
    }

    pub(crate) fn op_clr<M: AddressSpace>(&mut self, mem: &mut M, size: Size) -> Result<(), Fault> {
        let dst = self.ea(mem, size, legal::DATA_ALTERABLE)?;
        self.write_operand(mem, dst, size, 0);
        let flags = &mut self.regs.flags;
        flags.n = false;
        flags.z = true;
        flags.v = false;
        flags.c = false;
        Ok(())
    }

    /// MULU.W/MULS.W: 16x16 into all 32 bits of Dn.
    pub(crate) fn op_mul_word<M: AddressSpace>(&mut self, mem: &mut M, signed: bool) -> Result<(), Fault> {
        let dn = reg_field(self.opcode);
        let src = self.ea(mem, Size::Word, legal::DATA_SRC)?;
        let value = self.read_operand(mem, src, Size::Word);
        let result = if signed {
            (i32::from(value as u16 as i16) * i32::from(self.regs.d[dn] as u16 as i16)) as u32
        } else {
            (value & 0xFFFF) * (self.regs.d[dn] & 0xFFFF)
        };
        self.regs.d[dn] = result;
        self.regs.flags.set_logical(result, Size::Long.msb_mask());
        Ok(())
    }

    /// DIVU.W/DIVS.W: 32/16 into remainder:quotient.
    ///
    /// Overflow sets V (and N) and leaves Dn alone without trapping.
    pub(crate) fn op_div_word<M: AddressSpace>(&mut self, mem: &mut M, signed: bool) -> Result<(), Fault> {
        let dn = reg_field(self.opcode);
        let src = self.ea(mem, Size::Word, legal::DATA_SRC)?;
        let divisor = self.read_operand(mem, src, Size::Word) as u16;
        let dividend = self.regs.d[dn];

        let flags = &mut self.regs.flags;
        flags.n = false;
        flags.z = false;
        flags.v = false;
        flags.c = false;
        if divisor == 0 {
            return Err(Fault::DivideByZero);
        }

        let result = if signed {
            let q = (dividend as i32).checked_div(i32::from(divisor as i16));
            let r = (dividend as i32).checked_rem(i32::from(divisor as i16));
            match (q, r) {
                (Some(q), Some(r)) if i16::try_from(q).is_ok() => Some((q as u32, r as u32)),
                _ => None,
            }
        } else {
            let q = dividend / u32::from(divisor);
            (q <= 0xFFFF).then(|| (q, dividend % u32::from(divisor)))
        };

        match result {
            Some((quotient, remainder)) => {
                self.regs.d[dn] = (remainder << 16) | (quotient & 0xFFFF);
                flags.n = quotient & 0x8000 != 0;
                flags.z = quotient & 0xFFFF == 0;
            }
            None => {
                flags.v = true;
                flags.n = true;
            }
        }
        Ok(())
    }

    /// MULU.L/MULS.L: 32x32 to 32 (V on overflow) or to 64 in Dh:Dl.
    pub(crate) fn op_mul_long<M: AddressSpace>(&mut self, mem: &mut M, signed: bool) -> Result<(), Fault> {
        let ext = self.fetch_word(mem);
        let dl = usize::from((ext >> 12) & 7);
        let dh = usize::from(ext & 7);
        let wide = ext & 0x0400 != 0;

        let src = self.ea(mem, Size::Long, legal::DATA_SRC)?;
        let value = self.read_operand(mem, src, Size::Long);
        let multiplicand = self.regs.d[dl];

        let product = if signed {
            (i64::from(value as i32) * i64::from(multiplicand as i32)) as u64
        } else {
            u64::from(value) * u64::from(multiplicand)
        };
        let flags = &mut self.regs.flags;
        flags.c = false;
        if wide {
            self.regs.d[dh] = (product >> 32) as u32;
            self.regs.d[dl] = product as u32;
            flags.n = product & (1 << 63) != 0;
            flags.z = product == 0;
            flags.v = false;
        } else {
            let low = product as u32;
            self.regs.d[dl] = low;
            flags.n = low & 0x8000_0000 != 0;
            flags.z = low == 0;
            flags.v = if signed {
                product as i64 != i64::from(low as i32)
            } else {
                product >> 32 != 0
            };
        }
        Ok(())
    }

    /// DIVU.L/DIVS.L/DIVUL.L/DIVSL.L.
    ///
    /// 32/32 or 64/32 (Dr:Dq); the remainder goes to Dr, then the quotient
    /// to Dq, so Dr == Dq keeps the quotient.
    pub(crate) fn op_div_long<M: AddressSpace>(&mut self, mem: &mut M, signed: bool) -> Result<(), Fault> {
        let ext = self.fetch_word(mem);
        let dq = usize::from((ext >> 12) & 7);
        let dr = usize::from(ext & 7);
        let wide = ext & 0x0400 != 0;

        let src = self.ea(mem, Size::Long, legal::DATA_SRC)?;
        let divisor = self.read_operand(mem, src, Size::Long);

        let flags = &mut self.regs.flags;
        flags.c = false;
        if divisor == 0 {
            return Err(Fault::DivideByZero);
        }

        let dividend = if wide {
            (u64::from(self.regs.d[dr]) << 32) | u64::from(self.regs.d[dq])
        } else if signed {
            i64::from(self.regs.d[dq] as i32) as u64
        } else {
            u64::from(self.regs.d[dq])
        };

        let result = if signed {
            let (n, d) = (dividend as i64, i64::from(divisor as i32));
            match (n.checked_div(d), n.checked_rem(d)) {
                (Some(q), Some(r)) if i32::try_from(q).is_ok() => Some((q as u32, r as u32)),
                _ => None,
            }
        } else {
            let d = u64::from(divisor);
            u32::try_from(dividend / d).ok().map(|q| (q, (dividend % d) as u32))
        };

        match result {
            Some((quotient, remainder)) => {
                self.regs.d[dr] = remainder;
                self.regs.d[dq] = quotient;
                flags.n = quotient & 0x8000_0000 != 0;
                flags.z = quotient == 0;
                flags.v = false;
            }
            None => {
                flags.v = true;
            }
        }
        Ok(())
    }

    /// CHK.W/CHK.L: trap unless 0 <= Dn <= bound.
    pub(crate) fn op_chk<M: AddressSpace>(&mut self, mem: &mut M, size: Size) -> Result<(), Fault> {
        let dn = reg_field(self.opcode);
        let src = self.ea(mem, size, legal::DATA_SRC)?;
        let bound = size.sign_extend(self.read_operand(mem, src, size)) as i32;
        let value = size.sign_extend(self.regs.d[dn]) as i32;
        if value < 0 {
            self.regs.flags.n = true;
            Err(Fault::Chk)
        } else if value > bound {
            self.regs.flags.n = false;
            Err(Fault::Chk)
        } else {
            Ok(())
        }
    }

    /// EXT.W (byte to word) or EXT.L (word to long).
    pub(crate) fn op_ext(&mut self, size: Size) {
        let dn = usize::from(self.opcode & 7);
        let value = self.regs.d[dn];
        match size {
            Size::Long => {
                let result = Size::Word.sign_extend(value);
                self.regs.d[dn] = result;
                self.regs.flags.set_logical(result, Size::Long.msb_mask());
            }
            _ => {
                let result = Size::Byte.sign_extend(value) & 0xFFFF;
                self.regs.set_d_sized(dn, result, 0xFFFF);
                self.regs.flags.set_logical(result, Size::Word.msb_mask());
            }
        }
    }

    /// EXTB.L: byte to long.
    pub(crate) fn op_extb(&mut self) {
        let dn = usize::from(self.opcode & 7);
        let result = Size::Byte.sign_extend(self.regs.d[dn]);
        self.regs.d[dn] = result;
        self.regs.flags.set_logical(result, Size::Long.msb_mask());
    }
}
