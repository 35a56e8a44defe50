//! Effective address resolution.
//!
//! An instruction resolves each of its operands exactly once. The result is
//! an [`Operand`] that can be read and then written back without repeating
//! the side effects of (An)+ and -(An), which makes read-modify-write forms
//! (ADD Dn,<ea>, NEG, BSET...) safe.

use crate::addressing::{EaMask, ea_fields};
use crate::alu::Size;
use crate::bus::AddressSpace;
use crate::cpu::Cpu68000;
use crate::exceptions::Fault;

/// A resolved operand location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// Data register Dn.
    DataReg(usize),
    /// Address register An.
    AddrReg(usize),
    /// Data space memory address.
    Memory(u32),
    /// Immediate data at this address in the instruction stream.
    Immediate(u32),
}

impl Operand {
    /// The memory address, for control-mode operands.
    #[must_use]
    pub const fn address(self) -> Option<u32> {
        match self {
            Self::Memory(addr) => Some(addr),
            _ => None,
        }
    }
}

/// Full extension word fields (68030).
#[derive(Debug, Clone, Copy)]
struct FullExtension(u16);

impl FullExtension {
    const fn base_suppressed(self) -> bool {
        self.0 & 0x0080 != 0
    }

    const fn index_suppressed(self) -> bool {
        self.0 & 0x0040 != 0
    }

    /// Base displacement size code: 1 = null, 2 = word, 3 = long.
    const fn bd_size(self) -> u16 {
        (self.0 >> 4) & 3
    }

    /// Index/indirect selection.
    const fn iis(self) -> u16 {
        self.0 & 7
    }

    /// Outer displacement size code, same encoding as `bd_size`.
    const fn od_size(self) -> u16 {
        self.0 & 3
    }

    /// Bytes of displacement following the extension word.
    const fn displacement_bytes(self) -> u32 {
        let od = if self.iis() == 0 { 0 } else { size_bytes(self.od_size()) };
        size_bytes(self.bd_size()) + od
    }
}

/// Displacement length for a full-format size code.
const fn size_bytes(code: u16) -> u32 {
    match code {
        2 => 2,
        3 => 4,
        _ => 0,
    }
}

impl Cpu68000 {
    /// Resolve the effective address in the low six bits of the opcode.
    pub(crate) fn ea<M: AddressSpace>(&mut self, mem: &mut M, size: Size, mask: EaMask) -> Result<Operand, Fault> {
        let (mode, reg) = ea_fields(self.opcode);
        self.resolve(mem, mode, reg, size, mask)
    }

    /// Validate the opcode's effective address without resolving it, for
    /// instructions that must check privilege between the two.
    pub(crate) fn check_ea<M: AddressSpace>(&mut self, mem: &mut M, size: Size, mask: EaMask) -> Result<(), Fault> {
        let (mode, reg) = ea_fields(self.opcode);
        if mask.allows(mode, reg) {
            Ok(())
        } else {
            Err(self.reject_ea(mem, mode, reg, size))
        }
    }

    /// Resolve a control-mode effective address in the low six bits of the
    /// opcode to its memory address (LEA, PEA, JMP, JSR, MOVEM).
    pub(crate) fn ea_address<M: AddressSpace>(&mut self, mem: &mut M, mask: EaMask) -> Result<u32, Fault> {
        self.ea(mem, Size::Long, mask)?.address().ok_or(Fault::Illegal)
    }

    /// Check `mode`/`reg` against `mask`, then resolve.
    ///
    /// A rejected mode still consumes its extension words so the fault PC
    /// lands where the silicon puts it.
    pub(crate) fn resolve<M: AddressSpace>(
        &mut self,
        mem: &mut M,
        mode: u8,
        reg: u8,
        size: Size,
        mask: EaMask,
    ) -> Result<Operand, Fault> {
        if !mask.allows(mode, reg) {
            return Err(self.reject_ea(mem, mode, reg, size));
        }
        let r = usize::from(reg & 7);
        match mode & 7 {
            0 => Ok(Operand::DataReg(r)),
            1 => Ok(Operand::AddrReg(r)),
            2 => Ok(Operand::Memory(self.regs.a[r])),
            3 => {
                let addr = self.regs.a[r];
                self.regs.a[r] = addr.wrapping_add(Self::address_step(r, size));
                Ok(Operand::Memory(addr))
            }
            4 => {
                self.regs.a[r] = self.regs.a[r].wrapping_sub(Self::address_step(r, size));
                Ok(Operand::Memory(self.regs.a[r]))
            }
            5 => {
                let disp = self.fetch_word(mem) as i16 as u32;
                Ok(Operand::Memory(self.regs.a[r].wrapping_add(disp)))
            }
            6 => {
                let base = self.regs.a[r];
                self.indexed(mem, base)
            }
            _ => match reg & 7 {
                0 => Ok(Operand::Memory(self.fetch_word(mem) as i16 as u32)),
                1 => Ok(Operand::Memory(self.fetch_long(mem))),
                2 => {
                    let base = self.regs.pc;
                    let disp = self.fetch_word(mem) as i16 as u32;
                    Ok(Operand::Memory(base.wrapping_add(disp)))
                }
                3 => {
                    let base = self.regs.pc;
                    self.indexed(mem, base)
                }
                4 => {
                    let pc = self.regs.pc;
                    let (addr, len) = match size {
                        Size::Byte => (pc.wrapping_add(1), 2),
                        Size::Word => (pc, 2),
                        Size::Long => (pc, 4),
                    };
                    self.regs.pc = pc.wrapping_add(len);
                    Ok(Operand::Immediate(addr))
                }
                _ => Err(Fault::Illegal),
            },
        }
    }

    /// Skip the extension words of a rejected operand and report the fault.
    pub(crate) fn reject_ea<M: AddressSpace>(&mut self, mem: &mut M, mode: u8, reg: u8, size: Size) -> Fault {
        self.skip_extension(mem, mode, reg, size);
        #[cfg(feature = "log")]
        slog::debug!(self.logger, "illegal effective address";
            "opcode" => format_args!("{:#06X}", self.opcode), "mode" => mode, "reg" => reg);
        Fault::Illegal
    }

    /// Advance PC past the extension words of `mode`/`reg` without resolving it.
    pub(crate) fn skip_extension<M: AddressSpace>(&mut self, mem: &mut M, mode: u8, reg: u8, size: Size) {
        let advance = match (mode & 7, reg & 7) {
            (6, _) | (7, 3) => self.index_extension_length(mem),
            (5, _) | (7, 0 | 2) => 2,
            (7, 1) => 4,
            (7, 4) if size == Size::Long => 4,
            (7, 4) => 2,
            _ => 0,
        };
        self.regs.pc = self.regs.pc.wrapping_add(advance);
    }

    /// Length of an indexed mode's extension at PC, including displacements.
    fn index_extension_length<M: AddressSpace>(&self, mem: &mut M) -> u32 {
        let ext = self.peek_word(mem);
        if self.capabilities().full_extension && ext & 0x0100 != 0 {
            2 + FullExtension(ext).displacement_bytes()
        } else {
            2
        }
    }

    /// Post-increment/pre-decrement step. A7 stays word aligned.
    pub(crate) const fn address_step(reg: usize, size: Size) -> u32 {
        if reg == 7 && matches!(size, Size::Byte) { 2 } else { size.bytes() }
    }

    /// -(An) for the register-pair forms that encode it implicitly.
    pub(crate) fn predecrement(&mut self, reg: usize, size: Size) -> u32 {
        self.regs.a[reg] = self.regs.a[reg].wrapping_sub(Self::address_step(reg, size));
        self.regs.a[reg]
    }

    /// (An)+ for CMPM.
    pub(crate) fn postincrement(&mut self, reg: usize, size: Size) -> u32 {
        let addr = self.regs.a[reg];
        self.regs.a[reg] = addr.wrapping_add(Self::address_step(reg, size));
        addr
    }

    /// Brief (or, on the 68030, full) extension word indexed addressing.
    fn indexed<M: AddressSpace>(&mut self, mem: &mut M, base: u32) -> Result<Operand, Fault> {
        let ext = self.fetch_word(mem);
        if self.capabilities().full_extension && ext & 0x0100 != 0 {
            return self.full_extension(mem, base, FullExtension(ext));
        }
        let disp = ext as u8 as i8 as u32;
        Ok(Operand::Memory(base.wrapping_add(disp).wrapping_add(self.index_value(ext))))
    }

    /// Index register value: sign-extended word unless W/L is set, scaled on
    /// the 68030.
    fn index_value(&self, ext: u16) -> u32 {
        let reg = usize::from((ext >> 12) & 7);
        let raw = if ext & 0x8000 != 0 { self.regs.a[reg] } else { self.regs.d[reg] };
        let value = if ext & 0x0800 != 0 { raw } else { raw as u16 as i16 as u32 };
        if self.capabilities().full_extension {
            value << ((ext >> 9) & 3)
        } else {
            value
        }
    }

    fn displacement<M: AddressSpace>(&mut self, mem: &mut M, code: u16) -> u32 {
        match code {
            2 => self.fetch_word(mem) as i16 as u32,
            3 => self.fetch_long(mem),
            _ => 0,
        }
    }

    fn full_extension<M: AddressSpace>(&mut self, mem: &mut M, base: u32, ext: FullExtension) -> Result<Operand, Fault> {
        if ext.bd_size() == 0 {
            return Err(Fault::Illegal);
        }
        let base = if ext.base_suppressed() { 0 } else { base };
        let index = if ext.index_suppressed() { 0 } else { self.index_value(ext.0) };
        let bd = self.displacement(mem, ext.bd_size());
        let fc = self.data_fc();

        match (ext.index_suppressed(), ext.iis()) {
            (_, 0) => Ok(Operand::Memory(base.wrapping_add(bd).wrapping_add(index))),
            // Pre-indexed: [bd + base + index] + od
            (false, 1..=3) => {
                let od = self.displacement(mem, ext.od_size());
                let pointer = mem.read_long(base.wrapping_add(bd).wrapping_add(index), fc);
                Ok(Operand::Memory(pointer.wrapping_add(od)))
            }
            // Post-indexed: [bd + base] + index + od
            (false, 5..=7) => {
                let od = self.displacement(mem, ext.od_size());
                let pointer = mem.read_long(base.wrapping_add(bd), fc);
                Ok(Operand::Memory(pointer.wrapping_add(index).wrapping_add(od)))
            }
            // Memory indirect, index suppressed: [bd + base] + od
            (true, 1..=3) => {
                let od = self.displacement(mem, ext.od_size());
                let pointer = mem.read_long(base.wrapping_add(bd), fc);
                Ok(Operand::Memory(pointer.wrapping_add(od)))
            }
            _ => Err(Fault::Illegal),
        }
    }

    /// Read a resolved operand, masked to `size`.
    pub(crate) fn read_operand<M: AddressSpace>(&mut self, mem: &mut M, op: Operand, size: Size) -> u32 {
        match op {
            Operand::DataReg(r) => self.regs.d[r] & size.mask(),
            Operand::AddrReg(r) => self.regs.a[r] & size.mask(),
            Operand::Memory(addr) => self.read_data(mem, addr, size),
            Operand::Immediate(addr) => {
                let fc = self.program_fc();
                match size {
                    Size::Byte => u32::from(mem.read_byte(addr, fc)),
                    Size::Word => u32::from(mem.read_word(addr, fc)),
                    Size::Long => mem.read_long(addr, fc),
                }
            }
        }
    }

    /// Write a resolved operand. Register writes keep the bits above `size`.
    pub(crate) fn write_operand<M: AddressSpace>(&mut self, mem: &mut M, op: Operand, size: Size, value: u32) {
        match op {
            Operand::DataReg(r) => self.regs.set_d_sized(r, value, size.mask()),
            Operand::AddrReg(r) => {
                let mask = size.mask();
                self.regs.a[r] = (self.regs.a[r] & !mask) | (value & mask);
            }
            Operand::Memory(addr) => self.write_data(mem, addr, size, value),
            Operand::Immediate(_) => debug_assert!(false, "write to immediate operand"),
        }
    }

    /// Fetch an immediate of `size` from the instruction stream.
    pub(crate) fn fetch_immediate<M: AddressSpace>(&mut self, mem: &mut M, size: Size) -> u32 {
        match size {
            Size::Byte => u32::from(self.fetch_word(mem) & 0xFF),
            Size::Word => u32::from(self.fetch_word(mem)),
            Size::Long => self.fetch_long(mem),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addressing::legal;
    use crate::bus::{FunctionCode, M68kBus, TranslatedAccess};
    use crate::model::CpuModel;

    struct Ram(Vec<u8>);

    impl M68kBus for Ram {
        fn read_byte(&mut self, addr: u32, _fc: FunctionCode) -> u8 {
            self.0.get(addr as usize).copied().unwrap_or(0)
        }
        fn read_word(&mut self, addr: u32, fc: FunctionCode) -> u16 {
            u16::from_be_bytes([self.read_byte(addr, fc), self.read_byte(addr.wrapping_add(1), fc)])
        }
        fn write_byte(&mut self, addr: u32, value: u8, _fc: FunctionCode) {
            if let Some(slot) = self.0.get_mut(addr as usize) {
                *slot = value;
            }
        }
        fn write_word(&mut self, addr: u32, value: u16, fc: FunctionCode) {
            let [hi, lo] = value.to_be_bytes();
            self.write_byte(addr, hi, fc);
            self.write_byte(addr.wrapping_add(1), lo, fc);
        }
    }

    fn setup(words: &[u16]) -> (Cpu68000, Ram) {
        let mut ram = Ram(vec![0; 0x1_0000]);
        for (i, w) in words.iter().enumerate() {
            ram.write_word(0x1000 + 2 * i as u32, *w, FunctionCode::SupervisorProgram);
        }
        let mut cpu = Cpu68000::new_with_model(CpuModel::M68030);
        cpu.regs.pc = 0x1000;
        (cpu, ram)
    }

    #[test]
    fn byte_postincrement_on_a7_keeps_alignment() {
        let (mut cpu, mut ram) = setup(&[]);
        cpu.regs.a[7] = 0x2000;
        cpu.regs.a[0] = 0x3000;
        let mut mem = TranslatedAccess::new(&mut ram);
        assert_eq!(cpu.resolve(&mut mem, 3, 7, Size::Byte, EaMask::ANY), Ok(Operand::Memory(0x2000)));
        assert_eq!(cpu.regs.a[7], 0x2002);
        cpu.resolve(&mut mem, 3, 0, Size::Byte, EaMask::ANY).ok();
        assert_eq!(cpu.regs.a[0], 0x3001);
    }

    #[test]
    fn brief_index_scales_on_68030() {
        // (4,A0,D1.W*4)
        let (mut cpu, mut ram) = setup(&[0x1404]);
        cpu.regs.a[0] = 0x100;
        cpu.regs.d[1] = 0xFFFF_0010;
        let mut mem = TranslatedAccess::new(&mut ram);
        assert_eq!(cpu.resolve(&mut mem, 6, 0, Size::Word, EaMask::ANY), Ok(Operand::Memory(0x144)));
    }

    #[test]
    fn full_extension_post_indexed() {
        // ([0x20,A0],D1.L,8): BS=0 IS=0 BD=word I/IS=110 (post, word od)
        let (mut cpu, mut ram) = setup(&[0x1926, 0x0020, 0x0008]);
        ram.write_word(0x120, 0x0000, FunctionCode::SupervisorData);
        ram.write_word(0x122, 0x4000, FunctionCode::SupervisorData);
        cpu.regs.a[0] = 0x100;
        cpu.regs.d[1] = 0x10;
        let mut mem = TranslatedAccess::new(&mut ram);
        assert_eq!(cpu.resolve(&mut mem, 6, 0, Size::Long, EaMask::ANY), Ok(Operand::Memory(0x4018)));
        assert_eq!(cpu.regs.pc, 0x1006);
    }

    #[test]
    fn full_extension_reserved_encoding_is_illegal() {
        // IS=1 with I/IS=101 is reserved
        let (mut cpu, mut ram) = setup(&[0x0165]);
        let mut mem = TranslatedAccess::new(&mut ram);
        assert_eq!(cpu.resolve(&mut mem, 6, 0, Size::Long, EaMask::ANY), Err(Fault::Illegal));
    }

    #[test]
    fn rejected_mode_skips_its_extension_words() {
        let (mut cpu, mut ram) = setup(&[0x1234, 0x5678]);
        let mut mem = TranslatedAccess::new(&mut ram);
        assert_eq!(cpu.resolve(&mut mem, 7, 1, Size::Word, legal::CONTROL.without(EaMask::ABS_LONG)), Err(Fault::Illegal));
        assert_eq!(cpu.regs.pc, 0x1004);

        cpu.regs.pc = 0x1000;
        assert_eq!(cpu.resolve(&mut mem, 7, 4, Size::Long, legal::DATA_ALTERABLE), Err(Fault::Illegal));
        assert_eq!(cpu.regs.pc, 0x1004);

        cpu.regs.pc = 0x1000;
        assert_eq!(cpu.resolve(&mut mem, 1, 0, Size::Byte, legal::ARITH_BYTE_SRC), Err(Fault::Illegal));
        assert_eq!(cpu.regs.pc, 0x1000);
    }

    #[test]
    fn postincrement_step_by_size() {
        assert_eq!(Cpu68000::address_step(7, Size::Byte), 2);
        assert_eq!(Cpu68000::address_step(3, Size::Byte), 1);
        assert_eq!(Cpu68000::address_step(7, Size::Word), 2);
        assert_eq!(Cpu68000::address_step(0, Size::Long), 4);

        let (mut cpu, _) = setup(&[]);
        cpu.regs.a[7] = 0x2000;
        assert_eq!(cpu.predecrement(7, Size::Byte), 0x1FFE);
        assert_eq!(cpu.postincrement(7, Size::Byte), 0x1FFE);
        assert_eq!(cpu.regs.a[7], 0x2000);
    }

    #[test]
    fn partial_register_writes_preserve_upper_bits() {
        let (mut cpu, mut ram) = setup(&[]);
        cpu.regs.d[2] = 0x1234_5678;
        cpu.regs.a[2] = 0x1234_5678;
        let mut mem = TranslatedAccess::new(&mut ram);
        cpu.write_operand(&mut mem, Operand::DataReg(2), Size::Byte, 0xAB);
        cpu.write_operand(&mut mem, Operand::AddrReg(2), Size::Word, 0xABCD);
        assert_eq!(cpu.regs.d[2], 0x1234_56AB);
        assert_eq!(cpu.regs.a[2], 0x1234_ABCD);
    }

    #[test]
    fn byte_immediate_reads_low_half_of_word() {
        let (mut cpu, mut ram) = setup(&[0x00C3]);
        let mut mem = TranslatedAccess::new(&mut ram);
        let op = cpu.resolve(&mut mem, 7, 4, Size::Byte, EaMask::ANY).ok();
        assert_eq!(op, Some(Operand::Immediate(0x1001)));
        assert_eq!(cpu.regs.pc, 0x1002);
        let value = op.map(|op| cpu.read_operand(&mut mem, op, Size::Byte));
        assert_eq!(value, Some(0xC3));
    }
}
