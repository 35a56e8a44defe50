//! CPU model/capability definitions for the Motorola 68k family.
//!
//! One interpreter serves both models. The capability table is consulted at
//! decode time (68030-only encodings become illegal on the 68000) and at a
//! handful of execution points where the silicon differs (frame formats,
//! index scaling, BCD overflow, MOVE from SR privilege).

/// Selected Motorola 68k CPU model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuModel {
    /// Motorola MC68000 (Macintosh 128K through Classic).
    M68000,
    /// Motorola MC68030 (Macintosh SE/30, IIx and later).
    M68030,
}

/// Capability flags for a specific CPU model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuCapabilities {
    /// `MOVEC` instruction family is available.
    pub movec: bool,
    /// Vector Base Register (`VBR`) is present.
    pub vbr: bool,
    /// Separate master stack pointer and the SR M bit.
    pub msp: bool,
    /// Full-format extension words and scaled index registers.
    pub full_extension: bool,
    /// 32-bit branch displacements (`Bcc.L`, `BSR.L`).
    pub long_branch: bool,
    /// `MULx.L`/`DIVx.L`, `CHK.L`, `EXTB.L`, `LINK.L`, `RTD`, `TRAPcc`.
    pub long_ops: bool,
    /// Exceptions push a format/vector word (Format $0 and $2 frames).
    pub format_frames: bool,
}

impl CpuModel {
    /// Static capability set for this CPU model.
    #[must_use]
    pub const fn capabilities(self) -> CpuCapabilities {
        match self {
            Self::M68000 => CpuCapabilities {
                movec: false,
                vbr: false,
                msp: false,
                full_extension: false,
                long_branch: false,
                long_ops: false,
                format_frames: false,
            },
            Self::M68030 => CpuCapabilities {
                movec: true,
                vbr: true,
                msp: true,
                full_extension: true,
                long_branch: true,
                long_ops: true,
                format_frames: true,
            },
        }
    }

    /// True for the 68030 family member.
    #[must_use]
    pub const fn is_68030(self) -> bool {
        matches!(self, Self::M68030)
    }

    /// Short model name used by debuggers.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::M68000 => "68000",
            Self::M68030 => "68030",
        }
    }
}
