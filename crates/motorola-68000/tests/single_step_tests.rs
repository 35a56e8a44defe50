//! Integration tests using the `SingleStepTests` 680x0 JSON vectors.
//!
//! Test data lives in `test-data/680x0/68000/v1/*.json` at the workspace
//! root. The vectors are cycle-level; this core is instruction-level, so
//! only the final register and memory state is compared. Cases that end in
//! a bus or address error are expected to fail.

use motorola_68000::{Cpu68000, CpuModel, FunctionCode, M68kBus};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Flat 16MB RAM bus.
struct TestBus {
    data: Vec<u8>,
}

impl TestBus {
    fn new() -> Self {
        Self { data: vec![0; 0x100_0000] }
    }

    fn load_ram(&mut self, ram: &[(u32, u8)]) {
        for &(addr, value) in ram {
            self.data[(addr & 0xFF_FFFF) as usize] = value;
        }
    }

    fn peek(&self, addr: u32) -> u8 {
        self.data[(addr & 0xFF_FFFF) as usize]
    }
}

impl M68kBus for TestBus {
    fn read_byte(&mut self, addr: u32, _fc: FunctionCode) -> u8 {
        self.peek(addr)
    }

    fn read_word(&mut self, addr: u32, _fc: FunctionCode) -> u16 {
        u16::from(self.peek(addr)) << 8 | u16::from(self.peek(addr.wrapping_add(1)))
    }

    fn write_byte(&mut self, addr: u32, value: u8, _fc: FunctionCode) {
        self.data[(addr & 0xFF_FFFF) as usize] = value;
    }

    fn write_word(&mut self, addr: u32, value: u16, fc: FunctionCode) {
        self.write_byte(addr, (value >> 8) as u8, fc);
        self.write_byte(addr.wrapping_add(1), value as u8, fc);
    }
}

/// JSON test case format.
#[derive(Deserialize)]
struct TestCase {
    name: String,
    initial: CpuState,
    #[serde(rename = "final")]
    final_state: CpuState,
}

/// JSON CPU state format.
#[derive(Deserialize)]
struct CpuState {
    d0: u32,
    d1: u32,
    d2: u32,
    d3: u32,
    d4: u32,
    d5: u32,
    d6: u32,
    d7: u32,
    a0: u32,
    a1: u32,
    a2: u32,
    a3: u32,
    a4: u32,
    a5: u32,
    a6: u32,
    usp: u32,
    ssp: u32,
    sr: u16,
    pc: u32,
    prefetch: Vec<u32>,
    ram: Vec<(u32, u8)>,
}

impl CpuState {
    fn d(&self) -> [u32; 8] {
        [self.d0, self.d1, self.d2, self.d3, self.d4, self.d5, self.d6, self.d7]
    }

    fn a(&self) -> [u32; 7] {
        [self.a0, self.a1, self.a2, self.a3, self.a4, self.a5, self.a6]
    }
}

/// Load registers and memory. The prefetch queue is written back to memory
/// so the fetch loop reads the same words.
fn setup(cpu: &mut Cpu68000, bus: &mut TestBus, state: &CpuState) {
    bus.load_ram(&state.ram);
    for (i, &word) in state.prefetch.iter().enumerate() {
        let addr = state.pc.wrapping_add(2 * i as u32);
        bus.write_word(addr, word as u16, FunctionCode::SupervisorProgram);
    }

    cpu.regs.d = state.d();
    cpu.regs.a[..7].copy_from_slice(&state.a());
    cpu.regs.supervisor = true;
    cpu.regs.m = false;
    cpu.regs.a[7] = state.ssp;
    cpu.regs.usp = state.usp;
    cpu.regs.load_sr(CpuModel::M68000, state.sr);
    cpu.set_pc(state.pc);
}

/// Compare the CPU/bus state against expected, returning a list of mismatches.
fn compare(cpu: &Cpu68000, bus: &TestBus, expected: &CpuState) -> Vec<String> {
    let mut errors = Vec::new();

    for (i, (&got, want)) in cpu.regs.d.iter().zip(expected.d()).enumerate() {
        if got != want {
            errors.push(format!("D{i}: got ${got:08X}, want ${want:08X}"));
        }
    }
    for (i, (&got, want)) in cpu.regs.a.iter().zip(expected.a()).enumerate() {
        if got != want {
            errors.push(format!("A{i}: got ${got:08X}, want ${want:08X}"));
        }
    }
    if cpu.usp() != expected.usp {
        errors.push(format!("USP: got ${:08X}, want ${:08X}", cpu.usp(), expected.usp));
    }
    if cpu.ssp() != expected.ssp {
        errors.push(format!("SSP: got ${:08X}, want ${:08X}", cpu.ssp(), expected.ssp));
    }
    if cpu.sr() != expected.sr {
        errors.push(format!("SR: got ${:04X}, want ${:04X}", cpu.sr(), expected.sr));
    }
    if cpu.pc() != expected.pc {
        errors.push(format!("PC: got ${:08X}, want ${:08X}", cpu.pc(), expected.pc));
    }
    for &(addr, want) in &expected.ram {
        let got = bus.peek(addr);
        if got != want {
            errors.push(format!("RAM[${addr:06X}]: got ${got:02X}, want ${want:02X}"));
        }
    }

    errors
}

fn run_test(test: &TestCase) -> Result<(), Vec<String>> {
    let mut cpu = Cpu68000::new();
    let mut bus = TestBus::new();
    setup(&mut cpu, &mut bus, &test.initial);
    cpu.step(&mut bus);

    let errors = compare(&cpu, &bus, &test.final_state);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.into_iter().map(|e| format!("{}: {e}", test.name)).collect())
    }
}

/// Run all tests from a file and return (passed, failed, first errors).
fn run_test_file(path: &Path) -> (usize, usize, Vec<String>) {
    let tests: Vec<TestCase> = match fs::read_to_string(path).map_err(|e| e.to_string()).and_then(|json| {
        serde_json::from_str(&json).map_err(|e| e.to_string())
    }) {
        Ok(t) => t,
        Err(e) => return (0, 0, vec![format!("Failed to load {}: {e}", path.display())]),
    };

    let mut passed = 0;
    let mut failed = 0;
    let mut first_errors = Vec::new();

    for test in &tests {
        match run_test(test) {
            Ok(()) => passed += 1,
            Err(errors) => {
                failed += 1;
                if first_errors.len() < 20 {
                    first_errors.extend(errors.into_iter().take(3));
                }
            }
        }
    }

    (passed, failed, first_errors)
}

fn test_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../test-data/680x0/68000/v1")
}

/// Smoke test over a single file. NOP never faults, so every vector in
/// it has to match.
#[test]
fn test_nop() {
    let path = test_dir().join("NOP.json");
    if !path.exists() {
        eprintln!("Test file not found: {}", path.display());
        return;
    }

    let (passed, failed, errors) = run_test_file(&path);
    println!("NOP: {passed} passed, {failed} failed");
    for err in errors.iter().take(10) {
        println!("  {err}");
    }
    assert!(passed > 0, "no vectors loaded from {}", path.display());
    assert_eq!(failed, 0, "NOP vectors failed: {errors:?}");
}

/// Run every available vector file (called manually, not in CI).
#[test]
#[ignore]
fn run_all_single_step_tests() {
    let pattern = test_dir().join("*.json");
    let Some(pattern) = pattern.to_str() else {
        return;
    };
    let mut paths: Vec<PathBuf> = glob::glob(pattern).map(|paths| paths.filter_map(Result::ok).collect()).unwrap_or_default();
    if paths.is_empty() {
        eprintln!("No test files under {}", test_dir().display());
        return;
    }
    paths.sort();

    let mut total_passed = 0;
    let mut total_failed = 0;

    for path in &paths {
        let (passed, failed, errors) = run_test_file(path);
        let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
        if failed > 0 {
            println!("{stem}: {passed} passed, {failed} failed");
            for err in errors.iter().take(3) {
                println!("  {err}");
            }
        } else {
            println!("{stem}: {passed} passed");
        }
        total_passed += passed;
        total_failed += failed;
    }

    println!("\n=== Total: {total_passed} passed, {total_failed} failed ===");
}
