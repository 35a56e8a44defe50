//! Privileged system control: RTE, STOP, RESET and MOVEC.

use crate::bus::AddressSpace;
use crate::cpu::Cpu68000;
use crate::exceptions::Fault;

/// MOVEC control register codes.
mod control {
    pub const SFC: u16 = 0x000;
    pub const DFC: u16 = 0x001;
    pub const CACR: u16 = 0x002;
    pub const USP: u16 = 0x800;
    pub const VBR: u16 = 0x801;
    pub const CAAR: u16 = 0x802;
    pub const MSP: u16 = 0x803;
    pub const ISP: u16 = 0x804;
}

/// Writable CACR bits on the 68030.
const CACR_MASK: u32 = 0x3313;

impl Cpu68000 {
    /// Privilege check, made before any extension word is fetched.
    pub(crate) fn supervisor_only(&self) -> Result<(), Fault> {
        if self.regs.supervisor { Ok(()) } else { Err(Fault::Privilege) }
    }

    /// RTE. The 68030 unwinds by frame format: $0 and $2 return, $1
    /// (throwaway) switches stacks and continues with the next frame.
    pub(crate) fn op_rte<M: AddressSpace>(&mut self, mem: &mut M) -> Result<(), Fault> {
        self.supervisor_only()?;
        if !self.capabilities().format_frames {
            let sr = self.pop_word(mem);
            self.regs.pc = self.pop_long(mem);
            self.write_sr(mem, sr);
            return Ok(());
        }

        loop {
            let sp = self.regs.a[7];
            let fc = self.data_fc();
            let sr = mem.read_word(sp, fc);
            let pc = mem.read_long(sp.wrapping_add(2), fc);
            let format = mem.read_word(sp.wrapping_add(6), fc) >> 12;
            match format {
                0x0 | 0x2 => {
                    self.regs.a[7] = sp.wrapping_add(if format == 0 { 8 } else { 12 });
                    self.regs.pc = pc;
                    self.write_sr(mem, sr);
                    return Ok(());
                }
                0x1 => {
                    self.regs.a[7] = sp.wrapping_add(8);
                    self.regs.load_sr(self.model(), sr);
                }
                _ => {
                    #[cfg(feature = "log")]
                    slog::debug!(self.logger, "rte format error"; "format" => format, "sp" => format_args!("{sp:#010X}"));
                    return Err(Fault::FormatError);
                }
            }
        }
    }

    /// STOP #imm: load SR and park until an interrupt is accepted.
    pub(crate) fn op_stop<M: AddressSpace>(&mut self, mem: &mut M) -> Result<(), Fault> {
        self.supervisor_only()?;
        let sr = self.fetch_word(mem);
        self.regs.load_sr(self.model(), sr);
        self.stopped = true;
        #[cfg(feature = "log")]
        slog::debug!(self.logger, "stop"; "sr" => format_args!("{sr:#06X}"), "pc" => format_args!("{:#010X}", self.regs.pc));
        self.check_interrupt(mem);
        Ok(())
    }

    /// RESET: pulse the external reset line. CPU state is untouched.
    pub(crate) fn op_reset<M: AddressSpace>(&mut self, mem: &mut M) -> Result<(), Fault> {
        self.supervisor_only()?;
        #[cfg(feature = "log")]
        slog::debug!(self.logger, "reset instruction"; "pc" => format_args!("{:#010X}", self.regs.pc.wrapping_sub(2)));
        mem.reset_devices();
        Ok(())
    }

    /// MOVEC Rc,Rn / MOVEC Rn,Rc
    pub(crate) fn op_movec<M: AddressSpace>(&mut self, mem: &mut M, to_control: bool) -> Result<(), Fault> {
        self.supervisor_only()?;
        let ext = self.fetch_word(mem);
        let reg = usize::from((ext >> 12) & 7);
        let address = ext & 0x8000 != 0;
        let code = ext & 0x0FFF;

        if to_control {
            let value = if address { self.regs.a[reg] } else { self.regs.d[reg] };
            self.write_control(code, value)
        } else {
            let value = self.read_control(code)?;
            if address {
                self.regs.a[reg] = value;
            } else {
                self.regs.d[reg] = value;
            }
            Ok(())
        }
    }

    fn read_control(&self, code: u16) -> Result<u32, Fault> {
        let regs = &self.regs;
        Ok(match code {
            control::SFC => u32::from(regs.sfc),
            control::DFC => u32::from(regs.dfc),
            control::CACR => regs.cacr,
            control::USP => regs.user_sp(),
            control::VBR => regs.vbr,
            control::CAAR => regs.caar,
            control::MSP => regs.master_sp(),
            control::ISP => regs.interrupt_sp(),
            _ => return Err(self.unknown_control(code)),
        })
    }

    fn write_control(&mut self, code: u16, value: u32) -> Result<(), Fault> {
        let regs = &mut self.regs;
        match code {
            control::SFC => regs.sfc = (value & 7) as u8,
            control::DFC => regs.dfc = (value & 7) as u8,
            control::CACR => regs.cacr = value & CACR_MASK,
            control::USP => regs.set_user_sp(value),
            control::VBR => regs.vbr = value,
            control::CAAR => regs.caar = value,
            control::MSP => regs.set_master_sp(value),
            control::ISP => regs.set_interrupt_sp(value),
            _ => return Err(self.unknown_control(code)),
        }
        Ok(())
    }

    fn unknown_control(&self, code: u16) -> Fault {
        #[cfg(feature = "log")]
        slog::warn!(self.logger, "unknown control register"; "code" => format_args!("{code:#05X}"));
        #[cfg(not(feature = "log"))]
        let _ = code;
        Fault::Illegal
    }
}
