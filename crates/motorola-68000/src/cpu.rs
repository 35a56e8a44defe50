//! The 68000/68030 CPU object.
//!
//! `Cpu68000` owns the register file, the model selection and the STOP
//! latch. It executes whole instructions per step: there is no cycle
//! accounting and no prefetch queue. The scheduler drives it with an
//! instruction budget through [`Cpu68000::run`].

use std::fmt;

use emu_core::{Observable, Value};

use crate::alu::Size;
use crate::bus::{AddressSpace, FunctionCode};
use crate::model::{CpuCapabilities, CpuModel};
use crate::registers::Registers;

/// Motorola 68000-family CPU.
#[derive(Clone)]
pub struct Cpu68000 {
    /// Register file.
    pub regs: Registers,
    /// Selected model. Fixed for the lifetime of the CPU.
    model: CpuModel,
    /// Opcode of the instruction being executed.
    pub(crate) opcode: u16,
    /// Parked by STOP until an interrupt is accepted.
    pub(crate) stopped: bool,
    #[cfg(feature = "log")]
    pub(crate) logger: slog::Logger,
}

impl Default for Cpu68000 {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Cpu68000 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cpu68000")
            .field("model", &self.model)
            .field("regs", &self.regs)
            .field("opcode", &format_args!("{:#06X}", self.opcode))
            .field("stopped", &self.stopped)
            .finish_non_exhaustive()
    }
}

impl Cpu68000 {
    /// Create a 68000 in the power-on state.
    #[must_use]
    pub fn new() -> Self {
        Self::new_with_model(CpuModel::M68000)
    }

    /// Create a CPU of the given model in the power-on state.
    #[must_use]
    pub fn new_with_model(model: CpuModel) -> Self {
        Self {
            regs: Registers::new(),
            model,
            opcode: 0,
            stopped: false,
            #[cfg(feature = "log")]
            logger: slog::Logger::root(slog::Discard, slog::o!()),
        }
    }

    /// Rebuild a CPU around an existing register file.
    #[must_use]
    pub fn from_registers(model: CpuModel, regs: Registers) -> Self {
        Self { regs, ..Self::new_with_model(model) }
    }

    /// Replace the logger. Child loggers carry the model name.
    #[cfg(feature = "log")]
    #[must_use]
    pub fn with_logger(mut self, logger: slog::Logger) -> Self {
        self.logger = logger.new(slog::o!("cpu" => self.model.name()));
        self
    }

    /// Selected model.
    #[must_use]
    pub const fn model(&self) -> CpuModel {
        self.model
    }

    /// Capability table of the selected model.
    #[must_use]
    pub const fn capabilities(&self) -> CpuCapabilities {
        self.model.capabilities()
    }

    /// True while parked by STOP.
    #[must_use]
    pub const fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Current program counter.
    #[must_use]
    pub const fn pc(&self) -> u32 {
        self.regs.pc
    }

    /// Set the program counter.
    pub fn set_pc(&mut self, value: u32) {
        self.regs.pc = value;
    }

    /// Data register `n`.
    #[must_use]
    pub fn d(&self, n: usize) -> u32 {
        self.regs.d[n & 7]
    }

    /// Set data register `n`.
    pub fn set_d(&mut self, n: usize, value: u32) {
        self.regs.d[n & 7] = value;
    }

    /// Address register `n`. `a(7)` is the active stack pointer.
    #[must_use]
    pub fn a(&self, n: usize) -> u32 {
        self.regs.a[n & 7]
    }

    /// Set address register `n`.
    pub fn set_a(&mut self, n: usize, value: u32) {
        self.regs.a[n & 7] = value;
    }

    /// Synthesized status register.
    #[must_use]
    pub const fn sr(&self) -> u16 {
        self.regs.sr(self.model)
    }

    /// Load the status register from a debugger.
    ///
    /// Stacks are switched immediately. A now-unmasked interrupt is taken at
    /// the start of the next [`run`](Self::run).
    pub fn set_sr(&mut self, value: u16) {
        self.regs.load_sr(self.model, value);
    }

    /// Condition code register.
    #[must_use]
    pub const fn ccr(&self) -> u8 {
        self.regs.ccr()
    }

    /// Set the condition code register.
    pub fn set_ccr(&mut self, value: u8) {
        self.regs.set_ccr(u16::from(value));
    }

    /// User stack pointer.
    #[must_use]
    pub const fn usp(&self) -> u32 {
        self.regs.user_sp()
    }

    /// Set the user stack pointer.
    pub fn set_usp(&mut self, value: u32) {
        self.regs.set_user_sp(value);
    }

    /// Supervisor (interrupt) stack pointer.
    #[must_use]
    pub const fn ssp(&self) -> u32 {
        self.regs.interrupt_sp()
    }

    /// Set the supervisor (interrupt) stack pointer.
    pub fn set_ssp(&mut self, value: u32) {
        self.regs.set_interrupt_sp(value);
    }

    /// Master stack pointer. Always zero on the 68000.
    #[must_use]
    pub const fn msp(&self) -> u32 {
        self.regs.master_sp()
    }

    /// Set the master stack pointer. Ignored on the 68000.
    pub fn set_msp(&mut self, value: u32) {
        if self.capabilities().msp {
            self.regs.set_master_sp(value);
        }
    }

    /// Vector base register. Always zero on the 68000.
    #[must_use]
    pub const fn vbr(&self) -> u32 {
        self.regs.vbr
    }

    /// Set the vector base register. Ignored on the 68000.
    pub fn set_vbr(&mut self, value: u32) {
        if self.capabilities().vbr {
            self.regs.vbr = value;
        }
    }

    /// Drive the interrupt priority level lines (0-7).
    pub fn set_ipl(&mut self, level: u8) {
        self.regs.ipl = level & 7;
    }

    /// Currently asserted interrupt priority level.
    #[must_use]
    pub const fn ipl(&self) -> u8 {
        self.regs.ipl
    }

    /// Return to the power-on state. The asserted IPL is kept.
    pub fn reset(&mut self) {
        let ipl = self.regs.ipl;
        self.regs = Registers::new();
        self.regs.ipl = ipl;
        self.stopped = false;
        self.opcode = 0;
    }

    // === Bus helpers ===

    pub(crate) fn data_fc(&self) -> FunctionCode {
        FunctionCode::from_flags(self.regs.supervisor, false)
    }

    pub(crate) fn program_fc(&self) -> FunctionCode {
        FunctionCode::from_flags(self.regs.supervisor, true)
    }

    /// Fetch the next instruction word and advance PC.
    pub(crate) fn fetch_word<M: AddressSpace>(&mut self, mem: &mut M) -> u16 {
        let word = mem.read_word(self.regs.pc, self.program_fc());
        self.regs.pc = self.regs.pc.wrapping_add(2);
        word
    }

    /// Fetch the next instruction long and advance PC.
    pub(crate) fn fetch_long<M: AddressSpace>(&mut self, mem: &mut M) -> u32 {
        let long = mem.read_long(self.regs.pc, self.program_fc());
        self.regs.pc = self.regs.pc.wrapping_add(4);
        long
    }

    /// Read the next instruction word without advancing PC.
    pub(crate) fn peek_word<M: AddressSpace>(&self, mem: &mut M) -> u16 {
        mem.read_word(self.regs.pc, self.program_fc())
    }

    pub(crate) fn read_data<M: AddressSpace>(&self, mem: &mut M, addr: u32, size: Size) -> u32 {
        let fc = self.data_fc();
        match size {
            Size::Byte => u32::from(mem.read_byte(addr, fc)),
            Size::Word => u32::from(mem.read_word(addr, fc)),
            Size::Long => mem.read_long(addr, fc),
        }
    }

    pub(crate) fn write_data<M: AddressSpace>(&self, mem: &mut M, addr: u32, size: Size, value: u32) {
        let fc = self.data_fc();
        match size {
            Size::Byte => mem.write_byte(addr, value as u8, fc),
            Size::Word => mem.write_word(addr, value as u16, fc),
            Size::Long => mem.write_long(addr, value, fc),
        }
    }

    pub(crate) fn push_word<M: AddressSpace>(&mut self, mem: &mut M, value: u16) {
        self.regs.a[7] = self.regs.a[7].wrapping_sub(2);
        mem.write_word(self.regs.a[7], value, self.data_fc());
    }

    pub(crate) fn push_long<M: AddressSpace>(&mut self, mem: &mut M, value: u32) {
        self.regs.a[7] = self.regs.a[7].wrapping_sub(4);
        mem.write_long(self.regs.a[7], value, self.data_fc());
    }

    pub(crate) fn pop_word<M: AddressSpace>(&mut self, mem: &mut M) -> u16 {
        let value = mem.read_word(self.regs.a[7], self.data_fc());
        self.regs.a[7] = self.regs.a[7].wrapping_add(2);
        value
    }

    pub(crate) fn pop_long<M: AddressSpace>(&mut self, mem: &mut M) -> u32 {
        let value = mem.read_long(self.regs.a[7], self.data_fc());
        self.regs.a[7] = self.regs.a[7].wrapping_add(4);
        value
    }

    /// Write SR from an executing instruction: switch stacks, then let a
    /// newly unmasked interrupt in.
    pub(crate) fn write_sr<M: AddressSpace>(&mut self, mem: &mut M, value: u16) {
        self.regs.load_sr(self.model, value);
        self.check_interrupt(mem);
    }
}

/// Query paths supported by the 68000-family CPU.
const M68K_QUERY_PATHS: &[&str] = &[
    "d0", "d1", "d2", "d3", "d4", "d5", "d6", "d7",
    "a0", "a1", "a2", "a3", "a4", "a5", "a6", "a7",
    "usp", "ssp", "msp", "vbr", "pc", "sr", "ccr",
    "flags.x", "flags.n", "flags.z", "flags.v", "flags.c", "flags.s", "flags.m", "flags.t",
    "int_mask", "ipl", "stopped", "opcode", "model",
];

impl Observable for Cpu68000 {
    fn query(&self, path: &str) -> Option<Value> {
        let flags = self.regs.flags;
        match path {
            "d0" => Some(self.regs.d[0].into()),
            "d1" => Some(self.regs.d[1].into()),
            "d2" => Some(self.regs.d[2].into()),
            "d3" => Some(self.regs.d[3].into()),
            "d4" => Some(self.regs.d[4].into()),
            "d5" => Some(self.regs.d[5].into()),
            "d6" => Some(self.regs.d[6].into()),
            "d7" => Some(self.regs.d[7].into()),
            "a0" => Some(self.regs.a[0].into()),
            "a1" => Some(self.regs.a[1].into()),
            "a2" => Some(self.regs.a[2].into()),
            "a3" => Some(self.regs.a[3].into()),
            "a4" => Some(self.regs.a[4].into()),
            "a5" => Some(self.regs.a[5].into()),
            "a6" => Some(self.regs.a[6].into()),
            "a7" => Some(self.regs.a[7].into()),
            "usp" => Some(self.usp().into()),
            "ssp" => Some(self.ssp().into()),
            "msp" => Some(self.msp().into()),
            "vbr" => Some(self.regs.vbr.into()),
            "pc" => Some(self.regs.pc.into()),
            "sr" => Some(self.sr().into()),
            "ccr" => Some(self.ccr().into()),
            "flags.x" => Some(flags.x.into()),
            "flags.n" => Some(flags.n.into()),
            "flags.z" => Some(flags.z.into()),
            "flags.v" => Some(flags.v.into()),
            "flags.c" => Some(flags.c.into()),
            "flags.s" => Some(self.regs.supervisor.into()),
            "flags.m" => Some(self.regs.m.into()),
            "flags.t" => Some((self.regs.trace != 0).into()),
            "int_mask" => Some(self.regs.interrupt_mask.into()),
            "ipl" => Some(self.regs.ipl.into()),
            "stopped" => Some(self.stopped.into()),
            "opcode" => Some(self.opcode.into()),
            "model" => Some(self.model.name().into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        M68K_QUERY_PATHS
    }
}

impl emu_core::Cpu for Cpu68000 {
    type Registers = Registers;

    fn pc(&self) -> u32 {
        self.regs.pc
    }

    fn registers(&self) -> Registers {
        self.regs
    }

    fn is_halted(&self) -> bool {
        self.stopped
    }

    fn set_interrupt_level(&mut self, level: u8) {
        self.set_ipl(level);
    }

    fn reset(&mut self) {
        Cpu68000::reset(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observable_exposes_power_on_state() {
        let cpu = Cpu68000::new_with_model(CpuModel::M68030);
        assert_eq!(cpu.query("pc"), Some(Value::U32(0x0040_002A)));
        assert_eq!(cpu.query("sr"), Some(Value::U16(0x2700)));
        assert_eq!(cpu.query("flags.s"), Some(Value::Bool(true)));
        assert_eq!(cpu.query("model"), Some(Value::from("68030")));
        assert_eq!(cpu.query("bogus"), None);
        for path in cpu.query_paths() {
            assert!(cpu.query(path).is_some(), "{path}");
        }
    }

    #[test]
    fn model_gated_registers_ignore_writes_on_68000() {
        let mut cpu = Cpu68000::new();
        cpu.set_vbr(0x1000);
        cpu.set_msp(0x2000);
        assert_eq!(cpu.vbr(), 0);
        assert_eq!(cpu.msp(), 0);

        let mut cpu = Cpu68000::new_with_model(CpuModel::M68030);
        cpu.set_vbr(0x1000);
        assert_eq!(cpu.vbr(), 0x1000);
    }

    #[test]
    fn reset_keeps_asserted_ipl() {
        let mut cpu = Cpu68000::new();
        cpu.set_d(3, 0x1234);
        cpu.set_ipl(4);
        cpu.stopped = true;
        cpu.reset();
        assert_eq!(cpu.d(3), 0);
        assert_eq!(cpu.ipl(), 4);
        assert!(!cpu.is_stopped());
    }
}
