use crate::bitwise::Bits;
use crate::cpu::arm::instructions::SingleDataTransferOffsetInfo;
use crate::cpu::arm::mode::registers_in_list;
use crate::cpu::condition::Condition;
use crate::cpu::flags::{
    HalfwordDataTransferOffsetKind, HalfwordTransferKind, Indexing, LoadStoreKind, Offsetting,
    ReadWriteKind,
};
use crate::cpu::interpreter::{Interpreter, SIZE_OF_INSTRUCTION, Step};
use crate::cpu::psr::PsrKind;
use crate::cpu::registers::{REG_LR, REG_PROGRAM_COUNTER};
use crate::cpu::state::ProcessorState;
use crate::fault::Fault;
use crate::memory::Bus;

impl<P: ProcessorState, B: Bus> Interpreter<'_, P, B> {
    /// LDRH, STRH, LDRSB and LDRSH.
    ///
    /// Signed stores never get here, the decoder reports them as undefined.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn half_word_data_transfer(
        &mut self,
        condition: Condition,
        indexing: Indexing,
        offsetting: Offsetting,
        write_back: bool,
        load_store_kind: LoadStoreKind,
        offset_kind: HalfwordDataTransferOffsetKind,
        base_register: usize,
        source_destination_register: usize,
        transfer_kind: HalfwordTransferKind,
    ) -> Result<(), Fault> {
        let passed = self.can_execute(condition);
        let Some(address) = self.address_mode_half(
            indexing,
            offsetting,
            write_back,
            offset_kind,
            base_register,
            passed,
        ) else {
            return Ok(());
        };

        if !passed {
            return Ok(());
        }

        match load_store_kind {
            LoadStoreKind::Store => {
                let value = self.state.register_at(source_destination_register);
                self.bus.write_half_word(address, value as u16)?;
            }
            LoadStoreKind::Load => {
                let value = match transfer_kind {
                    HalfwordTransferKind::UnsignedHalfwords => {
                        u32::from(self.bus.read_half_word(address)?)
                    }
                    HalfwordTransferKind::SignedByte => {
                        u32::from(self.bus.read_byte(address)?).sign_extended(8)
                    }
                    HalfwordTransferKind::SignedHalfwords => {
                        u32::from(self.bus.read_half_word(address)?).sign_extended(16)
                    }
                };
                self.state.set_register_at(source_destination_register, value);
            }
        }

        Ok(())
    }

    /// LDR, STR, LDRB and STRB. Bytes are zero-extended on load.
    ///
    /// Storing R15 stores the address of the instruction + 8.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn single_data_transfer(
        &mut self,
        condition: Condition,
        load_store_kind: LoadStoreKind,
        quantity: ReadWriteKind,
        write_back: bool,
        indexing: Indexing,
        rd: usize,
        base_register: usize,
        offset_info: SingleDataTransferOffsetInfo,
        offsetting: Offsetting,
    ) -> Result<(), Fault> {
        let passed = self.can_execute(condition);
        let Some(address) = self.address_mode_word_byte(
            indexing,
            offsetting,
            write_back,
            offset_info,
            base_register,
            passed,
        ) else {
            return Ok(());
        };

        if !passed {
            return Ok(());
        }

        match load_store_kind {
            LoadStoreKind::Store => {
                let value = self.state.register_at(rd);
                match quantity {
                    ReadWriteKind::Word => self.bus.write_word(address, value)?,
                    ReadWriteKind::Byte => self.bus.write_byte(address, value as u8)?,
                }
            }
            LoadStoreKind::Load => {
                let value = match quantity {
                    ReadWriteKind::Word => self.bus.read_word(address)?,
                    ReadWriteKind::Byte => u32::from(self.bus.read_byte(address)?),
                };
                self.state.set_register_at(rd, value);
            }
        }

        Ok(())
    }

    /// LDM and STM.
    ///
    /// Registers are moved lowest first to increasing addresses whatever the
    /// direction. When the base is in the list, STM stores its value from
    /// before the write-back and LDM overwrites the written back value.
    /// A PC loaded by LDM has bit 0 cleared.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn block_data_transfer(
        &mut self,
        condition: Condition,
        indexing: Indexing,
        offsetting: Offsetting,
        write_back: bool,
        load_store: LoadStoreKind,
        rn: usize,
        register_list: u16,
    ) -> Result<(), Fault> {
        let passed = self.can_execute(condition);
        let original_base = self.state.register_at(rn);
        let range =
            self.address_mode_multiple(indexing, offsetting, write_back, rn, register_list, passed);

        if !passed {
            return Ok(());
        }

        let mut address = range.start;
        for reg in registers_in_list(register_list) {
            match load_store {
                LoadStoreKind::Load => {
                    let mut value = self.bus.read_word(address)?;
                    if reg == REG_PROGRAM_COUNTER {
                        value.set_bit(0, false);
                    }
                    self.state.set_register_at(reg, value);
                }
                LoadStoreKind::Store => {
                    let value = if reg == rn {
                        original_base
                    } else {
                        self.state.register_at(reg)
                    };
                    self.bus.write_word(address, value)?;
                }
            }
            address = address.wrapping_add(4);
        }

        range.check_end(address)
    }

    /// B and BL.
    ///
    /// The link register is written even when the condition fails. `offset` is
    /// the 26-bit byte offset, it is negated and subtracted from R15 which
    /// lands `offset` bytes after the instruction + 8.
    pub(crate) fn branch(&mut self, condition: Condition, link: bool, offset: u32) {
        let pc = self.state.register_at(REG_PROGRAM_COUNTER);

        if link {
            self.state
                .set_register_at(REG_LR, pc.wrapping_sub(SIZE_OF_INSTRUCTION));
        }

        if !self.can_execute(condition) {
            return;
        }

        let negated = offset.sign_extended(26).wrapping_neg();
        self.state
            .set_register_at(REG_PROGRAM_COUNTER, pc.wrapping_sub(negated));
    }

    /// SWI. The halt comment ends the run, anything else traps.
    ///
    /// The condition field is not looked at.
    pub(crate) fn software_interrupt(&self, comment: u32) -> Result<Step, Fault> {
        if comment == self.config.halt_comment {
            tracing::debug!("halt requested by SWI #0x{comment:06X}");
            return Ok(Step::Halt);
        }

        Err(Fault::SoftwareInterrupt { comment })
    }

    /// MRS, copies the selected status register into `destination_register`.
    pub(crate) fn mrs(
        &mut self,
        op_code: u32,
        condition: Condition,
        psr_kind: PsrKind,
        destination_register: usize,
    ) -> Result<(), Fault> {
        if !self.can_execute(condition) {
            if self.config.undefined_on_failed_mrs {
                return Err(Fault::UndefinedInstruction { op_code });
            }
            return Ok(());
        }

        let psr = match psr_kind {
            PsrKind::Cpsr => self.state.cpsr(),
            PsrKind::Spsr => self.state.spsr(),
        };
        self.state.set_register_at(destination_register, psr.into());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoreConfig;
    use crate::cpu::psr::Psr;
    use crate::cpu::state::Cpu;
    use crate::memory::internal_memory::InternalMemory;
    use pretty_assertions::assert_eq;

    struct Machine {
        cpu: Cpu,
        memory: InternalMemory,
        config: CoreConfig,
    }

    impl Machine {
        /// As seen while executing the instruction at 0x100.
        fn new() -> Self {
            let mut cpu = Cpu::new(0x100);
            cpu.advance_program_counter(SIZE_OF_INSTRUCTION);
            Self {
                cpu,
                memory: InternalMemory::new(0, 0x400),
                config: CoreConfig::embedded(),
            }
        }

        fn execute(&mut self, op_code: u32) -> Result<Step, Fault> {
            Interpreter::new(&mut self.cpu, &mut self.memory, &self.config).execute(op_code)
        }

        fn with_flags(mut self, n: bool, z: bool, c: bool, v: bool) -> Self {
            self.cpu.cpsr.set_sign_flag(n);
            self.cpu.cpsr.set_zero_flag(z);
            self.cpu.cpsr.set_carry_flag(c);
            self.cpu.cpsr.set_overflow_flag(v);
            self
        }
    }

    #[test]
    fn load_byte_zero_extends() {
        let mut machine = Machine::new();
        machine.memory.write_byte(0x200, 0xFF).unwrap();
        machine.cpu.set_register_at(1, 0x200);

        // LDRB R0, [R1]
        assert_eq!(machine.execute(0xE5D1_0000), Ok(Step::Continue));
        assert_eq!(machine.cpu.register_at(0), 0x0000_00FF);
    }

    #[test]
    fn load_signed_byte_sign_extends() {
        let mut machine = Machine::new();
        machine.memory.write_byte(0x200, 0xFF).unwrap();
        machine.cpu.set_register_at(1, 0x200);

        // LDRSB R0, [R1]
        assert_eq!(machine.execute(0xE1D1_00D0), Ok(Step::Continue));
        assert_eq!(machine.cpu.register_at(0), 0xFFFF_FFFF);
    }

    #[test]
    fn half_words() {
        let mut machine = Machine::new();
        machine.cpu.set_register_at(1, 0x200);
        machine.cpu.set_register_at(2, 0x1234_8001);

        // STRH R2, [R1, #2]!
        machine.execute(0xE1E1_20B2).unwrap();
        assert_eq!(machine.cpu.register_at(1), 0x202);
        assert_eq!(machine.memory.read_word(0x200).unwrap(), 0x8001_0000);

        // LDRH R3, [R1], #-2
        machine.execute(0xE051_30B2).unwrap();
        assert_eq!(machine.cpu.register_at(3), 0x0000_8001);
        assert_eq!(machine.cpu.register_at(1), 0x200);

        // LDRSH R4, [R1, #2]
        machine.execute(0xE1D1_40F2).unwrap();
        assert_eq!(machine.cpu.register_at(4), 0xFFFF_8001);
        assert_eq!(machine.cpu.register_at(1), 0x200);
    }

    #[test]
    fn word_store_and_load_with_write_back() {
        let mut machine = Machine::new();
        machine.cpu.set_register_at(0, 0xCAFE_BABE);
        machine.cpu.set_register_at(1, 0x300);

        // STR R0, [R1, #-4]!
        machine.execute(0xE521_0004).unwrap();
        assert_eq!(machine.cpu.register_at(1), 0x2FC);
        assert_eq!(machine.memory.read_word(0x2FC).unwrap(), 0xCAFE_BABE);

        // LDR R2, [R1], #4
        machine.execute(0xE491_2004).unwrap();
        assert_eq!(machine.cpu.register_at(2), 0xCAFE_BABE);
        assert_eq!(machine.cpu.register_at(1), 0x300);
    }

    #[test]
    fn store_of_r15_is_eight_ahead() {
        let mut machine = Machine::new();
        machine.cpu.set_register_at(1, 0x200);

        // STR R15, [R1]
        machine.execute(0xE581_F000).unwrap();
        assert_eq!(machine.memory.read_word(0x200).unwrap(), 0x108);
    }

    #[test]
    fn skipped_transfers_touch_nothing() {
        let mut machine = Machine::new().with_flags(false, true, false, false);
        machine.cpu.set_register_at(0, 0xAAAA_AAAA);
        machine.cpu.set_register_at(1, 0x200);
        machine.memory.write_word(0x200, 0x5555_5555).unwrap();
        let before = machine.cpu.clone();

        // LDRNE R0, [R1]
        assert_eq!(machine.execute(0x1591_0000), Ok(Step::Continue));
        // STRNE R0, [R1, #4]!
        assert_eq!(machine.execute(0x15A1_0004), Ok(Step::Continue));
        // LDRNEB R0, [R1], #1
        assert_eq!(machine.execute(0x14D1_0001), Ok(Step::Continue));
        // STRNEH R0, [R1]
        assert_eq!(machine.execute(0x11C1_00B0), Ok(Step::Continue));

        assert_eq!(machine.cpu, before);
        assert_eq!(machine.memory.read_word(0x200).unwrap(), 0x5555_5555);
        assert_eq!(machine.memory.read_word(0x204).unwrap(), 0);
    }

    #[test]
    fn data_abort_on_unmapped_address() {
        let mut machine = Machine::new();
        machine.cpu.set_register_at(1, 0x1000);

        // LDR R0, [R1]
        assert_eq!(
            machine.execute(0xE591_0000),
            Err(Fault::DataAbort { address: 0x1000 })
        );
    }

    #[test]
    fn load_multiple_increment_after() {
        let mut machine = Machine::new();
        machine.memory.load_words(0x200, &[1, 2, 3]).unwrap();
        machine.cpu.set_register_at(0, 0x200);

        // LDMIA R0!, {R1, R2}
        machine.execute(0xE8B0_0006).unwrap();
        assert_eq!(machine.cpu.register_at(1), 1);
        assert_eq!(machine.cpu.register_at(2), 2);
        assert_eq!(machine.cpu.register_at(0), 0x208);
    }

    #[test]
    fn store_multiple_decrement_before_keeps_register_order() {
        let mut machine = Machine::new();
        machine.cpu.set_register_at(0, 0x10);
        machine.cpu.set_register_at(REG_LR, 0xE0);
        machine.cpu.set_register_at(13, 0x300);

        // STMDB R13!, {R0, R14}
        machine.execute(0xE92D_4001).unwrap();
        assert_eq!(machine.cpu.register_at(13), 0x2F8);
        assert_eq!(machine.memory.read_word(0x2F8).unwrap(), 0x10);
        assert_eq!(machine.memory.read_word(0x2FC).unwrap(), 0xE0);
    }

    #[test]
    fn store_multiple_with_base_in_list_stores_the_old_base() {
        let mut machine = Machine::new();
        machine.cpu.set_register_at(1, 0x200);

        // STMIA R1!, {R0, R1}
        machine.execute(0xE8A1_0003).unwrap();
        assert_eq!(machine.memory.read_word(0x204).unwrap(), 0x200);
        assert_eq!(machine.cpu.register_at(1), 0x208);
    }

    #[test]
    fn load_multiple_into_pc_clears_bit_zero() {
        let mut machine = Machine::new();
        machine.memory.load_words(0x200, &[0x7, 0x301]).unwrap();
        machine.cpu.set_register_at(0, 0x200);

        // LDMIA R0, {R1, R15}
        machine.execute(0xE890_8002).unwrap();
        assert_eq!(machine.cpu.register_at(1), 0x7);
        assert_eq!(machine.cpu.program_counter(), 0x300);
        assert_eq!(machine.cpu.register_at(0), 0x200);
    }

    #[test]
    fn block_transfer_with_empty_list_is_a_no_op() {
        let mut machine = Machine::new();
        machine.cpu.set_register_at(0, 0x200);
        let before = machine.cpu.clone();

        // LDMIA R0!, {}
        assert_eq!(machine.execute(0xE8B0_0000), Ok(Step::Continue));
        assert_eq!(machine.cpu, before);
    }

    #[test]
    fn skipped_block_transfer_does_not_write_back() {
        let mut machine = Machine::new().with_flags(false, false, false, false);
        machine.cpu.set_register_at(0, 0x200);
        let before = machine.cpu.clone();

        // LDMEQIA R0!, {R1, R2}
        assert_eq!(machine.execute(0x08B0_0006), Ok(Step::Continue));
        assert_eq!(machine.cpu, before);
    }

    #[test]
    fn branch_with_zero_offset() {
        let mut machine = Machine::new();

        // B with offset field 0: lands on the instruction + 8.
        machine.execute(0xEA00_0000).unwrap();
        assert_eq!(machine.cpu.register_at(REG_PROGRAM_COUNTER), 0x10C);
        assert_eq!(machine.cpu.program_counter(), 0x108);
        assert_eq!(machine.cpu.register_at(REG_LR), 0);
    }

    #[test]
    fn branch_forward_and_backward() {
        let mut machine = Machine::new();
        // B +0x10
        machine.execute(0xEA00_0004).unwrap();
        assert_eq!(machine.cpu.program_counter(), 0x118);

        let mut machine = Machine::new();
        // B -8, a branch to itself
        machine.execute(0xEAFF_FFFE).unwrap();
        assert_eq!(machine.cpu.program_counter(), 0x100);
    }

    #[test]
    fn branch_with_most_negative_offset() {
        let mut machine = Machine::new();

        // B with offset field 0x800000: R15 reads 0x108, lands 32 MiB below.
        machine.execute(0xEA80_0000).unwrap();
        assert_eq!(machine.cpu.program_counter(), 0xFE00_0108);

        let mut machine = Machine::new();
        // B with offset field 0x7FFFFF: the largest forward branch.
        machine.execute(0xEA7F_FFFF).unwrap();
        assert_eq!(machine.cpu.program_counter(), 0x0200_0104);
    }

    #[test]
    fn branch_with_link() {
        let mut machine = Machine::new();
        // BL +0x20
        machine.execute(0xEB00_0008).unwrap();
        assert_eq!(machine.cpu.register_at(REG_LR), 0x104);
        assert_eq!(machine.cpu.program_counter(), 0x128);
    }

    #[test]
    fn branch_with_link_writes_lr_even_when_skipped() {
        let mut machine = Machine::new().with_flags(false, true, false, false);

        // BLNE +0x20 with Z set
        assert_eq!(machine.execute(0x1B00_0008), Ok(Step::Continue));
        assert_eq!(machine.cpu.register_at(REG_LR), 0x104);
        assert_eq!(machine.cpu.program_counter(), 0x104);
    }

    #[test]
    fn software_interrupts() {
        let mut machine = Machine::new();
        assert_eq!(machine.execute(0xEF12_3456), Ok(Step::Halt));
        assert_eq!(
            machine.execute(0xEF00_0042),
            Err(Fault::SoftwareInterrupt { comment: 0x42 })
        );
        assert_eq!(
            machine.execute(0xEF12_3457),
            Err(Fault::SoftwareInterrupt { comment: 0x12_3457 })
        );

    }

    #[test]
    fn software_interrupt_ignores_its_condition() {
        let mut machine = Machine::new().with_flags(false, false, false, false);
        assert!(!machine.cpu.cpsr.zero_flag());

        // SWIEQ #0x42 with Z clear
        assert_eq!(
            machine.execute(0x0F00_0042),
            Err(Fault::SoftwareInterrupt { comment: 0x42 })
        );

        // SWIEQ #0x123456 with Z clear
        assert_eq!(machine.execute(0x0F12_3456), Ok(Step::Halt));
    }

    #[test]
    fn halt_comment_is_configurable() {
        let mut machine = Machine::new();
        machine.config.halt_comment = 0x11;
        assert_eq!(machine.execute(0xEF00_0011), Ok(Step::Halt));
        assert_eq!(
            machine.execute(0xEF12_3456),
            Err(Fault::SoftwareInterrupt { comment: 0x12_3456 })
        );
    }

    #[test]
    fn mrs_reads_status_registers() {
        let mut machine = Machine::new();
        machine.cpu.cpsr = Psr::from(0x6000_001F);
        machine.cpu.spsr = Psr::from(0x8000_0010);

        // MRS R0, CPSR
        machine.execute(0xE10F_0000).unwrap();
        assert_eq!(machine.cpu.register_at(0), 0x6000_001F);

        // MRS R1, SPSR
        machine.execute(0xE14F_1000).unwrap();
        assert_eq!(machine.cpu.register_at(1), 0x8000_0010);
    }

    #[test]
    fn mrs_with_failing_condition() {
        let mut machine = Machine::new().with_flags(false, false, false, false);

        // MRSEQ R0, CPSR
        assert_eq!(machine.execute(0x010F_0000), Ok(Step::Continue));
        assert_eq!(machine.cpu.register_at(0), 0);

        machine.config.undefined_on_failed_mrs = true;
        assert_eq!(
            machine.execute(0x010F_0000),
            Err(Fault::UndefinedInstruction {
                op_code: 0x010F_0000
            })
        );
    }
}
