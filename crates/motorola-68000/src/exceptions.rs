//! Exception processing: faults, stack frames and interrupt acceptance.
//!
//! Instruction handlers report guest exceptions as `Err(Fault)`. The fetch
//! loop hands the fault to [`Cpu68000::raise`], which picks the saved PC and
//! frame format and enters the handler. Nothing here can fail on the host.

use crate::bus::{AddressSpace, FunctionCode};
use crate::cpu::Cpu68000;

/// Trace exception vector offset.
pub const TRACE_VECTOR: u32 = 0x24;

/// A guest exception raised by an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Illegal instruction or addressing mode (vector 4).
    Illegal,
    /// Integer divide by zero (vector 5).
    DivideByZero,
    /// CHK/CHK.L bound violation (vector 6).
    Chk,
    /// TRAPV or TRAPcc with the condition true (vector 7).
    Trapv,
    /// Privileged instruction in user mode (vector 8).
    Privilege,
    /// Line 1010 emulator (vector 10).
    LineA,
    /// Line 1111 emulator (vector 11).
    LineF,
    /// RTE found an unknown stack frame format (vector 14).
    FormatError,
    /// TRAP #n (vectors 32-47).
    Trap(u8),
}

impl Fault {
    /// Offset of the handler address from the vector base.
    #[must_use]
    pub const fn vector_offset(self) -> u32 {
        match self {
            Self::Illegal => 0x10,
            Self::DivideByZero => 0x14,
            Self::Chk => 0x18,
            Self::Trapv => 0x1C,
            Self::Privilege => 0x20,
            Self::LineA => 0x28,
            Self::LineF => 0x2C,
            Self::FormatError => 0x38,
            Self::Trap(n) => 0x80 + 4 * (n as u32 & 0x0F),
        }
    }

    /// Stack frame format on models that push one.
    #[must_use]
    pub const fn frame(self) -> Frame {
        match self {
            Self::DivideByZero | Self::Chk | Self::Trapv => Frame::InstructionAddress,
            _ => Frame::Short,
        }
    }
}

/// 68030 exception stack frame formats in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    /// Format $0: SR, PC, format/vector word.
    Short,
    /// Format $2: Format $0 plus the address of the instruction that caused
    /// the exception.
    InstructionAddress,
}

impl Frame {
    /// Format code in the top nibble of the format/vector word.
    #[must_use]
    pub const fn format(self) -> u16 {
        match self {
            Self::Short => 0x0,
            Self::InstructionAddress => 0x2,
        }
    }
}

impl Cpu68000 {
    /// Deliver a fault raised by the current instruction.
    pub(crate) fn raise<M: AddressSpace>(&mut self, mem: &mut M, fault: Fault) {
        let pc = match fault {
            Fault::Illegal if self.capabilities().format_frames => self.regs.instruction_pc,
            Fault::Illegal | Fault::Privilege | Fault::LineA | Fault::LineF | Fault::FormatError => {
                self.regs.pc.wrapping_sub(2)
            }
            Fault::DivideByZero | Fault::Chk | Fault::Trapv | Fault::Trap(_) => self.regs.pc,
        };
        #[cfg(feature = "log")]
        match fault {
            Fault::Trap(_) | Fault::LineA => {}
            _ => slog::debug!(self.logger, "exception";
                "fault" => ?fault, "opcode" => format_args!("{:#06X}", self.opcode), "pc" => format_args!("{pc:#010X}")),
        }
        let sr = self.sr();
        self.exception(mem, fault.vector_offset(), pc, sr, fault.frame());
    }

    /// Enter exception processing.
    ///
    /// Switches to the interrupt stack, pushes the frame for this model,
    /// clears trace, releases STOP and jumps through the vector table.
    pub(crate) fn exception<M: AddressSpace>(&mut self, mem: &mut M, offset: u32, pc: u32, sr: u16, frame: Frame) {
        if !self.regs.supervisor {
            self.regs.usp = self.regs.a[7];
            self.regs.supervisor = true;
            self.regs.m = false;
            self.regs.a[7] = self.regs.ssp;
        } else if self.regs.m {
            self.regs.msp = self.regs.a[7];
            self.regs.m = false;
            self.regs.a[7] = self.regs.ssp;
        }
        self.regs.trace = 0;
        self.stopped = false;

        let vector_base = if self.capabilities().format_frames {
            if frame == Frame::InstructionAddress {
                self.push_long(mem, self.regs.instruction_pc);
            }
            self.push_word(mem, frame.format() << 12 | (offset & 0x0FFF) as u16);
            self.regs.vbr
        } else {
            0
        };
        self.push_long(mem, pc);
        self.push_word(mem, sr);

        self.regs.pc = mem.read_long(vector_base.wrapping_add(offset), FunctionCode::SupervisorData);
    }

    /// Take the trace exception after an instruction that ran with T1 set.
    pub(crate) fn trace_exception<M: AddressSpace>(&mut self, mem: &mut M) {
        let sr = self.sr();
        let pc = self.regs.pc;
        self.exception(mem, TRACE_VECTOR, pc, sr, Frame::InstructionAddress);
    }

    /// Accept a pending interrupt if the asserted level beats the mask.
    ///
    /// Level 7 is treated like any other level: it is taken while the mask
    /// is below 7.
    pub(crate) fn check_interrupt<M: AddressSpace>(&mut self, mem: &mut M) {
        let level = self.regs.ipl;
        if level <= self.regs.interrupt_mask {
            return;
        }
        let sr = self.sr();
        self.regs.interrupt_mask = level;
        let vector = mem.acknowledge(level);
        #[cfg(feature = "log")]
        slog::debug!(self.logger, "interrupt"; "level" => level, "vector" => vector, "stopped" => self.stopped);
        let pc = self.regs.pc;
        self.exception(mem, u32::from(vector) * 4, pc, sr, Frame::Short);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_offsets() {
        assert_eq!(Fault::Illegal.vector_offset(), 0x10);
        assert_eq!(Fault::FormatError.vector_offset(), 0x38);
        assert_eq!(Fault::Trap(0).vector_offset(), 0x80);
        assert_eq!(Fault::Trap(15).vector_offset(), 0xBC);
    }

    #[test]
    fn instruction_address_frames_only_for_arithmetic_traps() {
        assert_eq!(Fault::DivideByZero.frame(), Frame::InstructionAddress);
        assert_eq!(Fault::Chk.frame(), Frame::InstructionAddress);
        assert_eq!(Fault::Trapv.frame(), Frame::InstructionAddress);
        assert_eq!(Fault::Trap(1).frame(), Frame::Short);
        assert_eq!(Fault::Privilege.frame(), Frame::Short);
        assert_eq!(Frame::InstructionAddress.format(), 2);
    }
}
