//! Motorola 68000/68030 CPU registers.
//!
//! - D0-D7: 8 data registers (32-bit)
//! - A0-A7: 8 address registers (32-bit, A7 is the active stack pointer)
//! - USP, SSP (ISP), MSP: shadow copies of the *inactive* stack pointers
//! - PC: Program counter
//! - Status: discrete flags, trace, supervisor, M and interrupt mask
//!
//! The 16-bit SR is never stored. [`Registers::sr`] synthesizes it and
//! [`Registers::load_sr`] decomposes it, running the stack switch.

use crate::flags::{self, Flags};
use crate::model::CpuModel;

/// Power-on program counter.
pub const RESET_PC: u32 = 0x0040_002A;
/// Power-on active stack pointer.
pub const RESET_SP: u32 = 0x4D1F_8172;

/// T1 bit of the `trace` field (trace every instruction).
pub const TRACE_T1: u8 = 0b10;
/// T0 bit of the `trace` field (trace on change of flow, 68030).
pub const TRACE_T0: u8 = 0b01;

/// Register file for both models.
///
/// The 68030-only fields stay zero on the 68000.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registers {
    /// Program counter.
    pub pc: u32,
    /// Data registers D0-D7.
    pub d: [u32; 8],
    /// Address registers A0-A7. A7 is the active stack pointer.
    pub a: [u32; 8],
    /// Inactive interrupt/supervisor stack pointer.
    pub ssp: u32,
    /// Inactive user stack pointer.
    pub usp: u32,
    /// Inactive master stack pointer (68030).
    pub msp: u32,
    /// Condition code flags.
    pub flags: Flags,
    /// Trace bits: T1 in bit 1, T0 in bit 0.
    pub trace: u8,
    /// Supervisor state.
    pub supervisor: bool,
    /// Master stack select (68030).
    pub m: bool,
    /// Interrupt priority floor (0-7).
    pub interrupt_mask: u8,
    /// Externally asserted interrupt priority level (0-7).
    pub ipl: u8,
    /// Vector base register (68030).
    pub vbr: u32,
    /// Cache control register (68030).
    pub cacr: u32,
    /// Cache address register (68030).
    pub caar: u32,
    /// Source function code (68030).
    pub sfc: u8,
    /// Destination function code (68030).
    pub dfc: u8,
    /// Address of the instruction being executed (68030).
    pub instruction_pc: u32,
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl Registers {
    /// Create registers in the power-on state.
    ///
    /// Supervisor mode, interrupt mask level 7, everything else zero.
    #[must_use]
    pub const fn new() -> Self {
        let mut a = [0; 8];
        a[7] = RESET_SP;
        Self {
            pc: RESET_PC,
            d: [0; 8],
            a,
            ssp: 0,
            usp: 0,
            msp: 0,
            flags: Flags { x: false, n: false, z: false, v: false, c: false },
            trace: 0,
            supervisor: true,
            m: false,
            interrupt_mask: 7,
            ipl: 0,
            vbr: 0,
            cacr: 0,
            caar: 0,
            sfc: 0,
            dfc: 0,
            instruction_pc: 0,
        }
    }

    /// Get the condition code register (low byte of SR).
    #[must_use]
    pub const fn ccr(&self) -> u8 {
        self.flags.to_ccr()
    }

    /// Set the condition code register. Bits 5-15 are ignored.
    pub fn set_ccr(&mut self, value: u16) {
        self.flags = Flags::from_ccr(value as u8);
    }

    /// Synthesize the status register for `model`.
    #[must_use]
    pub const fn sr(&self, model: CpuModel) -> u16 {
        let mut sr = self.flags.to_ccr() as u16;
        if self.trace & TRACE_T1 != 0 {
            sr |= flags::T1;
        }
        if model.capabilities().msp {
            if self.trace & TRACE_T0 != 0 {
                sr |= flags::T0;
            }
            if self.m {
                sr |= flags::M;
            }
        }
        if self.supervisor {
            sr |= flags::S;
        }
        sr | (self.interrupt_mask as u16 & 7) << 8
    }

    /// Decompose `value` into the status fields, switching stacks.
    ///
    /// The active A7 is saved into the stack register being vacated and A7
    /// is loaded from the one being entered. Pending interrupts are not
    /// evaluated here; the CPU does that after every SR write.
    pub fn load_sr(&mut self, model: CpuModel, value: u16) {
        let value = value & if model.capabilities().msp { flags::SR_MASK_68030 } else { flags::SR_MASK_68000 };
        let new_s = value & flags::S != 0;
        let new_m = model.capabilities().msp && value & flags::M != 0;

        self.save_active_sp();
        self.supervisor = new_s;
        self.m = new_m;
        self.load_active_sp();

        self.trace = if model.capabilities().msp {
            (value >> 14) as u8 & (TRACE_T1 | TRACE_T0)
        } else {
            (value >> 14) as u8 & TRACE_T1
        };
        self.interrupt_mask = ((value >> 8) & 7) as u8;
        self.set_ccr(value);
    }

    /// Copy A7 into the shadow register for the current (S, M) state.
    pub fn save_active_sp(&mut self) {
        match (self.supervisor, self.m) {
            (false, _) => self.usp = self.a[7],
            (true, false) => self.ssp = self.a[7],
            (true, true) => self.msp = self.a[7],
        }
    }

    /// Load A7 from the shadow register for the current (S, M) state.
    pub fn load_active_sp(&mut self) {
        self.a[7] = match (self.supervisor, self.m) {
            (false, _) => self.usp,
            (true, false) => self.ssp,
            (true, true) => self.msp,
        };
    }

    /// Current user stack pointer, whether active or shadowed.
    #[must_use]
    pub const fn user_sp(&self) -> u32 {
        if self.supervisor { self.usp } else { self.a[7] }
    }

    /// Current interrupt stack pointer, whether active or shadowed.
    #[must_use]
    pub const fn interrupt_sp(&self) -> u32 {
        if self.supervisor && !self.m { self.a[7] } else { self.ssp }
    }

    /// Current master stack pointer, whether active or shadowed.
    #[must_use]
    pub const fn master_sp(&self) -> u32 {
        if self.supervisor && self.m { self.a[7] } else { self.msp }
    }

    /// Write the user stack pointer, wherever it currently lives.
    pub fn set_user_sp(&mut self, value: u32) {
        if self.supervisor {
            self.usp = value;
        } else {
            self.a[7] = value;
        }
    }

    /// Write the interrupt stack pointer, wherever it currently lives.
    pub fn set_interrupt_sp(&mut self, value: u32) {
        if self.supervisor && !self.m {
            self.a[7] = value;
        } else {
            self.ssp = value;
        }
    }

    /// Write the master stack pointer, wherever it currently lives.
    pub fn set_master_sp(&mut self, value: u32) {
        if self.supervisor && self.m {
            self.a[7] = value;
        } else {
            self.msp = value;
        }
    }

    /// Write `value` into the low `size` bytes of Dn, preserving the rest.
    pub fn set_d_sized(&mut self, n: usize, value: u32, mask: u32) {
        debug_assert!(n < 8);
        self.d[n] = (self.d[n] & !mask) | (value & mask);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_on_state() {
        let regs = Registers::new();
        assert_eq!(regs.pc, RESET_PC);
        assert_eq!(regs.a[7], RESET_SP);
        assert!(regs.supervisor);
        assert_eq!(regs.sr(CpuModel::M68000), 0x2700);
        assert_eq!(regs.sr(CpuModel::M68030), 0x2700);
    }

    #[test]
    fn sr_round_trip_drops_unsupported_bits() {
        let mut regs = Registers::new();
        regs.load_sr(CpuModel::M68000, 0xFFFF);
        assert_eq!(regs.sr(CpuModel::M68000), flags::SR_MASK_68000);

        let mut regs = Registers::new();
        regs.load_sr(CpuModel::M68030, 0xFFFF);
        assert_eq!(regs.sr(CpuModel::M68030), flags::SR_MASK_68030);
    }

    #[test]
    fn supervisor_to_user_swaps_stacks() {
        let mut regs = Registers::new();
        regs.a[7] = 0x1000;
        regs.usp = 0x2000;
        regs.load_sr(CpuModel::M68000, 0x0000);
        assert_eq!(regs.a[7], 0x2000);
        assert_eq!(regs.ssp, 0x1000);

        regs.a[7] = 0x2100;
        regs.load_sr(CpuModel::M68000, 0x2000);
        assert_eq!(regs.a[7], 0x1000);
        assert_eq!(regs.usp, 0x2100);
    }

    #[test]
    fn master_bit_selects_msp_on_68030_only() {
        let mut regs = Registers::new();
        regs.a[7] = 0x1000;
        regs.msp = 0x3000;
        regs.load_sr(CpuModel::M68030, 0x3000);
        assert!(regs.m);
        assert_eq!(regs.a[7], 0x3000);
        assert_eq!(regs.ssp, 0x1000);

        let mut regs = Registers::new();
        regs.a[7] = 0x1000;
        regs.msp = 0x3000;
        regs.load_sr(CpuModel::M68000, 0x3000);
        assert!(!regs.m);
        assert_eq!(regs.a[7], 0x1000);
    }

    #[test]
    fn stack_accessors_follow_active_state() {
        let mut regs = Registers::new();
        regs.set_user_sp(0x4444);
        assert_eq!(regs.usp, 0x4444);
        assert_eq!(regs.interrupt_sp(), RESET_SP);
        regs.load_sr(CpuModel::M68030, 0x0000);
        assert_eq!(regs.user_sp(), 0x4444);
        assert_eq!(regs.a[7], 0x4444);
        assert_eq!(regs.interrupt_sp(), RESET_SP);
    }
}
