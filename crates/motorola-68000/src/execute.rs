//! The fetch loop and instruction dispatch.
//!
//! One generic interpreter, [`Cpu68000::run_with`], is instantiated per
//! memory path. [`Cpu68000::run`] picks the path for the selected model.

use crate::bus::{AddressSpace, DirectAccess, M68kBus, TranslatedAccess};
use crate::cpu::Cpu68000;
use crate::decode::{ImmOp, Instruction, decode};
use crate::exceptions::Fault;
use crate::model::CpuModel;
use crate::registers::TRACE_T1;

impl Cpu68000 {
    /// Execute exactly `*instructions` instructions, decrementing the count.
    ///
    /// Pending interrupts are checked on entry and on exit. A CPU parked by
    /// STOP consumes the rest of the budget without fetching.
    pub fn run<B: M68kBus + ?Sized>(&mut self, bus: &mut B, instructions: &mut u32) {
        match self.model() {
            CpuModel::M68000 => self.run_with(&mut DirectAccess::new(bus), instructions),
            CpuModel::M68030 => self.run_with(&mut TranslatedAccess::new(bus), instructions),
        }
    }

    /// Execute a single instruction.
    pub fn step<B: M68kBus + ?Sized>(&mut self, bus: &mut B) {
        let mut budget = 1;
        self.run(bus, &mut budget);
    }

    /// The interpreter loop over a specific memory path.
    pub fn run_with<M: AddressSpace>(&mut self, mem: &mut M, instructions: &mut u32) {
        self.check_interrupt(mem);
        while *instructions > 0 {
            if self.stopped {
                *instructions = 0;
                break;
            }
            *instructions -= 1;
            self.execute_next(mem);
        }
        self.check_interrupt(mem);
    }

    fn execute_next<M: AddressSpace>(&mut self, mem: &mut M) {
        let pc = self.regs.pc;
        let fc = self.program_fc();
        self.opcode = mem.read_word(pc, fc);
        let ext = mem.read_word(pc.wrapping_add(2), fc);
        if self.capabilities().format_frames {
            self.regs.instruction_pc = pc;
        }
        self.regs.pc = pc.wrapping_add(2);

        let trace_before = self.regs.trace;
        let instr = decode(self.opcode, ext, self.model());
        if let Err(fault) = self.execute(mem, instr) {
            self.raise(mem, fault);
            return;
        }
        // An SR write inside the instruction decides with the new T1
        if trace_before & TRACE_T1 != 0 && self.regs.trace & TRACE_T1 != 0 {
            self.trace_exception(mem);
        }
    }

    fn execute<M: AddressSpace>(&mut self, mem: &mut M, instr: Instruction) -> Result<(), Fault> {
        match instr {
            Instruction::OriToCcr | Instruction::AndiToCcr | Instruction::EoriToCcr => self.op_ccr_immediate(mem, instr),
            Instruction::OriToSr | Instruction::AndiToSr | Instruction::EoriToSr => self.op_sr_immediate(mem, instr),
            Instruction::Immediate { op: op @ (ImmOp::Or | ImmOp::And | ImmOp::Eor), size } => {
                self.op_logic_immediate(mem, op, size)
            }
            Instruction::Immediate { op, size } => self.op_arith_immediate(mem, op, size),
            Instruction::Bit { op, dynamic } => self.op_bit(mem, op, dynamic),
            Instruction::Movep { size, to_memory } => {
                self.op_movep(mem, size, to_memory);
                Ok(())
            }

            Instruction::Move(size) => self.op_move(mem, size),
            Instruction::Movea(size) => self.op_movea(mem, size),
            Instruction::Moveq => {
                self.op_moveq();
                Ok(())
            }

            Instruction::Negx(size) => self.op_negx(mem, size),
            Instruction::Clr(size) => self.op_clr(mem, size),
            Instruction::Neg(size) => self.op_neg(mem, size),
            Instruction::Not(size) => self.op_not(mem, size),
            Instruction::MoveFromSr => self.op_move_from_sr(mem),
            Instruction::MoveFromCcr => self.op_move_from_ccr(mem),
            Instruction::MoveToCcr => self.op_move_to_ccr(mem),
            Instruction::MoveToSr => self.op_move_to_sr(mem),
            Instruction::Nbcd => self.op_nbcd(mem),
            Instruction::Link => {
                self.op_link(mem, false);
                Ok(())
            }
            Instruction::LinkLong => {
                self.op_link(mem, true);
                Ok(())
            }
            Instruction::Unlk => {
                self.op_unlk(mem);
                Ok(())
            }
            Instruction::Swap => {
                self.op_swap();
                Ok(())
            }
            Instruction::Exg => {
                self.op_exg();
                Ok(())
            }
            Instruction::Ext(size) => {
                self.op_ext(size);
                Ok(())
            }
            Instruction::Extb => {
                self.op_extb();
                Ok(())
            }
            Instruction::Pea => self.op_pea(mem),
            Instruction::Lea => self.op_lea(mem),
            Instruction::Movem { size, to_memory: true } => self.op_movem_to_memory(mem, size),
            Instruction::Movem { size, to_memory: false } => self.op_movem_to_registers(mem, size),
            Instruction::Tst(size) => self.op_tst(mem, size),
            Instruction::Tas => self.op_tas(mem),
            Instruction::MulLong { signed } => self.op_mul_long(mem, signed),
            Instruction::DivLong { signed } => self.op_div_long(mem, signed),
            Instruction::Chk(size) => self.op_chk(mem, size),
            Instruction::MoveUsp { to_usp } => self.op_move_usp(to_usp),

            Instruction::Trap => Err(Fault::Trap((self.opcode & 0x0F) as u8)),
            Instruction::Trapv => self.op_trapv(),
            Instruction::Trapcc => self.op_trapcc(mem),
            Instruction::Reset => self.op_reset(mem),
            Instruction::Nop => Ok(()),
            Instruction::Stop => self.op_stop(mem),
            Instruction::Rte => self.op_rte(mem),
            Instruction::Rtd => {
                self.op_rtd(mem);
                Ok(())
            }
            Instruction::Rts => {
                self.op_rts(mem);
                Ok(())
            }
            Instruction::Rtr => {
                self.op_rtr(mem);
                Ok(())
            }
            Instruction::Movec { to_control } => self.op_movec(mem, to_control),
            Instruction::Jsr => self.op_jsr(mem),
            Instruction::Jmp => self.op_jmp(mem),

            Instruction::Addq(size) => self.op_quick(mem, size, false),
            Instruction::Subq(size) => self.op_quick(mem, size, true),
            Instruction::AddqAddr => {
                self.op_quick_addr(false);
                Ok(())
            }
            Instruction::SubqAddr => {
                self.op_quick_addr(true);
                Ok(())
            }
            Instruction::Scc => self.op_scc(mem),
            Instruction::Dbcc => {
                self.op_dbcc(mem);
                Ok(())
            }
            Instruction::Bcc => {
                self.op_bcc(mem);
                Ok(())
            }
            Instruction::Bsr => {
                self.op_bsr(mem);
                Ok(())
            }

            Instruction::Or { size, to_ea } => self.op_and_or(mem, size, to_ea, false),
            Instruction::And { size, to_ea } => self.op_and_or(mem, size, to_ea, true),
            Instruction::Eor(size) => self.op_eor(mem, size),
            Instruction::Divu => self.op_div_word(mem, false),
            Instruction::Divs => self.op_div_word(mem, true),
            Instruction::Mulu => self.op_mul_word(mem, false),
            Instruction::Muls => self.op_mul_word(mem, true),
            Instruction::Sbcd { memory } => {
                self.op_abcd_sbcd(mem, memory, true);
                Ok(())
            }
            Instruction::Abcd { memory } => {
                self.op_abcd_sbcd(mem, memory, false);
                Ok(())
            }
            Instruction::Sub { size, to_ea } => self.op_add_sub(mem, size, to_ea, true),
            Instruction::Add { size, to_ea } => self.op_add_sub(mem, size, to_ea, false),
            Instruction::Suba(size) => self.op_adda_suba(mem, size, true),
            Instruction::Adda(size) => self.op_adda_suba(mem, size, false),
            Instruction::Subx { size, memory } => {
                self.op_addx_subx(mem, size, memory, true);
                Ok(())
            }
            Instruction::Addx { size, memory } => {
                self.op_addx_subx(mem, size, memory, false);
                Ok(())
            }
            Instruction::Cmp(size) => self.op_cmp(mem, size),
            Instruction::Cmpa(size) => self.op_cmpa(mem, size),
            Instruction::Cmpm(size) => {
                self.op_cmpm(mem, size);
                Ok(())
            }

            Instruction::Shift { kind, left, size, register_count } => {
                self.op_shift(kind, left, size, register_count);
                Ok(())
            }
            Instruction::ShiftMemory { kind, left } => self.op_shift_memory(mem, kind, left),

            Instruction::LineA => Err(Fault::LineA),
            Instruction::LineF => Err(Fault::LineF),
            Instruction::Illegal | Instruction::Undefined => {
                #[cfg(feature = "log")]
                if instr == Instruction::Undefined {
                    slog::warn!(self.logger, "undefined opcode";
                        "opcode" => format_args!("{:#06X}", self.opcode), "pc" => format_args!("{:#010X}", self.regs.pc.wrapping_sub(2)));
                }
                Err(Fault::Illegal)
            }
        }
    }
}
