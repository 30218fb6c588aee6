#![allow(dead_code)]

use armstep::cpu::psr::Psr;
use armstep::{Bus, ExceptionHandler, Fault, MemoryFault, ProcessorState};
use mockall::mock;
use tracing_subscriber::EnvFilter;

mock! {
    pub State {}
    impl ProcessorState for State {
        fn program_counter(&self) -> u32;
        fn advance_program_counter(&mut self, bytes: u32);
        fn register_at(&self, reg: usize) -> u32;
        fn set_register_at(&mut self, reg: usize, value: u32);
        fn cpsr(&self) -> Psr;
        fn spsr(&self) -> Psr;
        fn execute_data_processing(&mut self, op_code: u32) -> Result<(), Fault>;
    }
}

mock! {
    pub Memory {}
    impl Bus for Memory {
        fn read_word(&mut self, address: u32) -> Result<u32, MemoryFault>;
        fn read_half_word(&mut self, address: u32) -> Result<u16, MemoryFault>;
        fn read_byte(&mut self, address: u32) -> Result<u8, MemoryFault>;
        fn write_word(&mut self, address: u32, value: u32) -> Result<(), MemoryFault>;
        fn write_half_word(&mut self, address: u32, value: u16) -> Result<(), MemoryFault>;
        fn write_byte(&mut self, address: u32, value: u8) -> Result<(), MemoryFault>;
        fn fetch(&mut self, address: u32) -> Result<u32, MemoryFault>;
    }
}

mock! {
    pub Exceptions {}
    impl ExceptionHandler for Exceptions {
        fn raise_exception(&mut self, fault: &Fault);
    }
}

/// Flags with only Z set.
pub fn zero_flag() -> Psr {
    let mut psr = Psr::default();
    psr.set_zero_flag(true);
    psr
}

/// A bus on which any access fails the test.
pub fn untouchable_memory() -> MockMemory {
    let mut memory = MockMemory::new();
    memory.expect_read_word().never();
    memory.expect_read_half_word().never();
    memory.expect_read_byte().never();
    memory.expect_write_word().never();
    memory.expect_write_half_word().never();
    memory.expect_write_byte().never();
    memory.expect_fetch().never();
    memory
}

/// Logs of the crate go to the test output, filtered by `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
