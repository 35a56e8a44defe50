//! 68030-specific behavior: exception frames, VBR, MOVEC and the 32-bit
//! multiply/divide and branch forms.

use motorola_68030::{Cpu68030, FunctionCode, M68kBus};

const CODE: u32 = 0x1000;
const STACK: u32 = 0x8000;
const HANDLERS: u32 = 0x0001_0000;

fn handler(vector: u32) -> u32 {
    HANDLERS + vector * 0x10
}

struct TestBus {
    mem: Vec<u8>,
}

impl TestBus {
    fn new() -> Self {
        let mut bus = Self { mem: vec![0; 0x100_0000] };
        for v in 0..256 {
            bus.poke_long(v * 4, handler(v));
            bus.poke_word(handler(v), 0x4E71);
        }
        bus
    }

    fn index(addr: u32) -> usize {
        (addr & 0x00FF_FFFF) as usize
    }

    fn load(&mut self, addr: u32, words: &[u16]) {
        for (i, &word) in words.iter().enumerate() {
            self.poke_word(addr + 2 * i as u32, word);
        }
    }

    fn poke_word(&mut self, addr: u32, value: u16) {
        self.mem[Self::index(addr)] = (value >> 8) as u8;
        self.mem[Self::index(addr + 1)] = value as u8;
    }

    fn poke_long(&mut self, addr: u32, value: u32) {
        self.poke_word(addr, (value >> 16) as u16);
        self.poke_word(addr + 2, value as u16);
    }

    fn peek_word(&self, addr: u32) -> u16 {
        u16::from(self.mem[Self::index(addr)]) << 8 | u16::from(self.mem[Self::index(addr + 1)])
    }

    fn peek_long(&self, addr: u32) -> u32 {
        u32::from(self.peek_word(addr)) << 16 | u32::from(self.peek_word(addr + 2))
    }
}

impl M68kBus for TestBus {
    fn read_byte(&mut self, addr: u32, _fc: FunctionCode) -> u8 {
        self.mem[Self::index(addr)]
    }

    fn read_word(&mut self, addr: u32, _fc: FunctionCode) -> u16 {
        self.peek_word(addr)
    }

    fn write_byte(&mut self, addr: u32, value: u8, _fc: FunctionCode) {
        self.mem[Self::index(addr)] = value;
    }

    fn write_word(&mut self, addr: u32, value: u16, _fc: FunctionCode) {
        self.poke_word(addr, value);
    }
}

fn setup(code: &[u16]) -> (Cpu68030, TestBus) {
    let mut bus = TestBus::new();
    bus.load(CODE, code);
    let mut cpu = Cpu68030::new();
    cpu.set_pc(CODE);
    cpu.set_a(7, STACK);
    (cpu, bus)
}

#[test]
fn divide_by_zero_pushes_format_2_frame() {
    // DIVU.W D1,D0
    let (mut cpu, mut bus) = setup(&[0x80C1]);
    cpu.step(&mut bus);
    let sp = cpu.a(7);
    assert_eq!(sp, STACK - 12);
    assert_eq!(cpu.pc(), handler(5));
    assert_eq!(bus.peek_word(sp), 0x2700);
    assert_eq!(bus.peek_long(sp + 2), CODE + 2);
    assert_eq!(bus.peek_word(sp + 6), 0x2014);
    assert_eq!(bus.peek_long(sp + 8), CODE);
}

#[test]
fn rte_unwinds_format_2_frame() {
    let (mut cpu, mut bus) = setup(&[0x80C1]);
    bus.poke_word(handler(5), 0x4E73);
    let mut budget = 2;
    cpu.run(&mut bus, &mut budget);
    assert_eq!(cpu.pc(), CODE + 2);
    assert_eq!(cpu.a(7), STACK);
    assert_eq!(cpu.sr(), 0x2700);
}

#[test]
fn trap_goes_through_vbr_with_format_0_frame() {
    // TRAP #0
    let (mut cpu, mut bus) = setup(&[0x4E40]);
    cpu.set_vbr(0x0002_0000);
    bus.poke_long(0x0002_0080, 0x0003_0000);
    cpu.step(&mut bus);
    assert_eq!(cpu.pc(), 0x0003_0000);
    let sp = cpu.a(7);
    assert_eq!(sp, STACK - 8);
    assert_eq!(bus.peek_long(sp + 2), CODE + 2);
    assert_eq!(bus.peek_word(sp + 6), 0x0080);
}

#[test]
fn illegal_stacks_the_instruction_address() {
    // MOVEC to an unknown control register
    let (mut cpu, mut bus) = setup(&[0x4E7A, 0x0FFF]);
    cpu.step(&mut bus);
    assert_eq!(cpu.pc(), handler(4));
    let sp = cpu.a(7);
    assert_eq!(bus.peek_long(sp + 2), CODE);
    assert_eq!(bus.peek_word(sp + 6), 0x0010);
}

#[test]
fn movec_moves_vbr_and_masks_cacr() {
    // MOVEC D0,VBR; MOVEC D0,CACR; MOVEC CACR,D1; MOVEC VBR,A2
    let (mut cpu, mut bus) = setup(&[0x4E7B, 0x0801, 0x4E7B, 0x0002, 0x4E7A, 0x1002, 0x4E7A, 0xA801]);
    cpu.set_d(0, 0xFFFF_FFFF);
    let mut budget = 4;
    cpu.run(&mut bus, &mut budget);
    assert_eq!(cpu.vbr(), 0xFFFF_FFFF);
    assert_eq!(cpu.d(1), 0x3313);
    assert_eq!(cpu.a(2), 0xFFFF_FFFF);
    assert_eq!(cpu.pc(), CODE + 16);
}

#[test]
fn move_from_sr_is_privileged() {
    // MOVE SR,D0 in user mode
    let (mut cpu, mut bus) = setup(&[0x40C0]);
    cpu.set_usp(0x6000);
    cpu.set_sr(0x0000);
    cpu.step(&mut bus);
    assert_eq!(cpu.pc(), handler(8));
    assert_eq!(cpu.d(0), 0);
}

#[test]
fn mulu_long_into_register_pair() {
    // MULU.L D1,D2:D0
    let (mut cpu, mut bus) = setup(&[0x4C01, 0x0402]);
    cpu.set_d(0, 0x0001_0000);
    cpu.set_d(1, 0x0001_0000);
    cpu.step(&mut bus);
    assert_eq!(cpu.d(2), 1);
    assert_eq!(cpu.d(0), 0);
    assert_eq!(cpu.ccr(), 0);
}

#[test]
fn mulu_long_overflow_sets_v() {
    // MULU.L D1,D0
    let (mut cpu, mut bus) = setup(&[0x4C01, 0x0000]);
    cpu.set_d(0, 0x0001_0000);
    cpu.set_d(1, 0x0001_0000);
    cpu.step(&mut bus);
    assert_eq!(cpu.d(0), 0);
    assert_eq!(cpu.ccr(), 0x06);
}

#[test]
fn divide_long_forms() {
    // DIVU.L D1,D0
    let (mut cpu, mut bus) = setup(&[0x4C41, 0x0000]);
    cpu.set_d(0, 100);
    cpu.set_d(1, 7);
    cpu.step(&mut bus);
    assert_eq!(cpu.d(0), 14);
    assert_eq!(cpu.ccr(), 0);

    // DIVSL.L D1,D3:D2
    let (mut cpu, mut bus) = setup(&[0x4C41, 0x2803]);
    cpu.set_d(2, (-100i32) as u32);
    cpu.set_d(1, 7);
    cpu.step(&mut bus);
    assert_eq!(cpu.d(2), (-14i32) as u32);
    assert_eq!(cpu.d(3), (-2i32) as u32);
    assert_eq!(cpu.ccr(), 0x08);
}

#[test]
fn long_branch_displacement() {
    // BRA.L +$100
    let (mut cpu, mut bus) = setup(&[0x60FF, 0x0000, 0x0100]);
    cpu.step(&mut bus);
    assert_eq!(cpu.pc(), CODE + 2 + 0x100);
}

#[test]
fn trace_pushes_instruction_address() {
    let (mut cpu, mut bus) = setup(&[0x4E71]);
    cpu.set_sr(0xA700);
    cpu.step(&mut bus);
    assert_eq!(cpu.pc(), handler(9));
    let sp = cpu.a(7);
    assert_eq!(sp, STACK - 12);
    assert_eq!(bus.peek_word(sp), 0xA700);
    assert_eq!(bus.peek_long(sp + 2), CODE + 2);
    assert_eq!(bus.peek_word(sp + 6), 0x2024);
    assert_eq!(bus.peek_long(sp + 8), CODE);
}

#[test]
fn rte_rejects_unknown_frame_format() {
    let (mut cpu, mut bus) = setup(&[0x4E73]);
    cpu.set_a(7, 0x7000);
    bus.poke_word(0x7000, 0x2700);
    bus.poke_long(0x7002, 0x0000_4000);
    bus.poke_word(0x7006, 0xF000);
    cpu.step(&mut bus);
    assert_eq!(cpu.pc(), handler(14));
    let sp = cpu.a(7);
    assert_eq!(sp, 0x7000 - 8);
    assert_eq!(bus.peek_long(sp + 2), CODE);
    assert_eq!(bus.peek_word(sp + 6), 0x0038);
}

#[test]
fn rte_skips_throwaway_frame() {
    // Format $1 on the interrupt stack, then a format $0 frame on the master stack
    let (mut cpu, mut bus) = setup(&[0x4E73]);
    cpu.set_msp(0x6000);
    cpu.set_a(7, 0x7000);
    bus.poke_word(0x7000, 0x3700);
    bus.poke_long(0x7002, 0);
    bus.poke_word(0x7006, 0x1000);
    bus.poke_word(0x6000, 0x2000);
    bus.poke_long(0x6002, 0x0000_4000);
    bus.poke_word(0x6006, 0x0000);
    cpu.step(&mut bus);
    assert_eq!(cpu.pc(), 0x4000);
    assert_eq!(cpu.sr(), 0x2000);
    assert_eq!(cpu.a(7), 0x7008);
    assert_eq!(cpu.msp(), 0x6008);
}
