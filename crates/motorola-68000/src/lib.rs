//! Motorola 68000 and 68030 instruction interpreter.
//!
//! One engine covers both models. The model is chosen at construction and
//! selects the memory path, the decode tree extensions and the exception
//! frame layout. Execution is instruction-granular: the machine hands the
//! core an instruction budget and a bus, and regains control when the
//! budget is spent or the guest executes STOP.

pub mod addressing;
pub mod alu;
pub mod bus;
pub mod cpu;
pub mod decode;
pub mod disasm;
pub mod ea;
pub mod exceptions;
pub mod execute;
pub mod flags;
pub mod model;
pub mod registers;
pub mod snapshot;

mod arith;
mod bcd;
mod branches;
mod logic;
mod moves;
mod shifts;
mod system;

pub use alu::Size;
pub use bus::{AddressSpace, DirectAccess, FunctionCode, M68kBus, TranslatedAccess};
pub use cpu::Cpu68000;
pub use disasm::mnemonic;
pub use exceptions::Fault;
pub use flags::Flags;
pub use model::{CpuCapabilities, CpuModel};
pub use registers::Registers;
pub use snapshot::SnapshotError;
