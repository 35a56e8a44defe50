//! Core traits and types shared by the CPU crates.
//!
//! A CPU core runs in bounded batches handed to it by the machine's
//! scheduler, and exposes its state for debuggers without perturbing it.

mod cpu;
mod observable;

pub use cpu::Cpu;
pub use observable::{Observable, Value};
