//! CPU core trait.

/// A CPU core driven by an external scheduler.
///
/// The scheduler hands the core a bus and an instruction budget; the core
/// executes exactly that many instructions (or parks early when the guest
/// waits for an interrupt) and returns. Between batches the scheduler may
/// drive the interrupt lines and inspect state.
pub trait Cpu {
    /// The type used for register inspection.
    type Registers;

    /// Returns the current program counter.
    fn pc(&self) -> u32;

    /// Returns a copy of the register file for inspection.
    fn registers(&self) -> Self::Registers;

    /// Returns true while the core is parked waiting for an interrupt.
    fn is_halted(&self) -> bool;

    /// Drive the external interrupt priority lines (0 = none).
    ///
    /// The level is sampled at batch boundaries and after status register
    /// writes, never mid-instruction.
    fn set_interrupt_level(&mut self, level: u8);

    /// Return the core to its power-on state.
    fn reset(&mut self);
}
