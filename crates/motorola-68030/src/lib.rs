//! Motorola 68030 wrapper crate.
//!
//! A composition layer over the shared `motorola-68000` interpreter that
//! pins the model to `M68030`: 32-bit addressing through the translation
//! seam, VBR/CACR/MSP, format $0/$2 exception frames and the 32-bit
//! multiply/divide forms.

use std::ops::{Deref, DerefMut};

pub use motorola_68000::{
    Cpu68000 as InnerCpu68000, CpuCapabilities, CpuModel, Fault, FunctionCode, M68kBus, Registers, SnapshotError,
};

/// The shared 68k core constructed as a 68030.
#[derive(Debug, Clone)]
pub struct Cpu68030 {
    inner: InnerCpu68000,
}

impl Cpu68030 {
    /// Create a 68030 in the power-on state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: InnerCpu68000::new_with_model(CpuModel::M68030),
        }
    }

    /// Rebuild a 68030 from a checkpoint taken with
    /// [`checkpoint`](InnerCpu68000::checkpoint).
    pub fn restore(data: &[u8]) -> Result<Self, SnapshotError> {
        InnerCpu68000::restore(CpuModel::M68030, data).map(|inner| Self { inner })
    }

    /// Borrow the wrapped shared CPU core.
    #[must_use]
    pub const fn as_inner(&self) -> &InnerCpu68000 {
        &self.inner
    }

    /// Mutably borrow the wrapped shared CPU core.
    #[must_use]
    pub fn as_inner_mut(&mut self) -> &mut InnerCpu68000 {
        &mut self.inner
    }

    /// Consume the wrapper and return the shared CPU core.
    #[must_use]
    pub fn into_inner(self) -> InnerCpu68000 {
        self.inner
    }
}

impl Default for Cpu68030 {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for Cpu68030 {
    type Target = InnerCpu68000;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for Cpu68030 {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

impl From<Cpu68030> for InnerCpu68000 {
    fn from(cpu: Cpu68030) -> Self {
        cpu.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::{Cpu68030, CpuModel};

    #[test]
    fn wrapper_sets_68030_model() {
        let cpu = Cpu68030::new();
        assert_eq!(cpu.model(), CpuModel::M68030);
        assert!(cpu.capabilities().movec);
        assert!(cpu.capabilities().vbr);
        assert!(cpu.capabilities().format_frames);
    }

    #[test]
    fn restore_keeps_the_model() {
        let mut cpu = Cpu68030::new();
        cpu.set_vbr(0x0001_0000);
        cpu.set_d(2, 0xCAFE_F00D);
        let block = cpu.checkpoint();

        let restored = Cpu68030::restore(&block).expect("valid checkpoint");
        assert_eq!(restored.model(), CpuModel::M68030);
        assert_eq!(restored.vbr(), 0x0001_0000);
        assert_eq!(restored.d(2), 0xCAFE_F00D);
    }
}
