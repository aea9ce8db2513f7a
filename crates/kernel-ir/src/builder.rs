//! # Kernel Builder
//!
//! Centralizes block creation, instruction insertion and termination for
//! the emitters. The builder owns the insertion point explicitly and lives
//! for one emission only, so no "current block" state can leak between
//! kernels.

use crate::{
    BinOp, Block, BlockId, Instruction, InstructionKind, KernelProgram, MemoryOrdering,
    Terminator, Value, ValueId,
};

/// Builder over one kernel program with an explicit insertion point
pub struct KernelBuilder<'k> {
    program: &'k mut KernelProgram,
    current: BlockId,
}

impl<'k> KernelBuilder<'k> {
    /// Creates a builder positioned at the program's entry block
    pub fn new(program: &'k mut KernelProgram) -> Self {
        let current = program.entry_block;
        Self { program, current }
    }

    /// Creates a new named block without moving the insertion point
    pub fn block(&mut self, name: &str) -> BlockId {
        self.program.add_block(name)
    }

    /// Moves the insertion point to the given block
    pub fn switch_to(&mut self, block: BlockId) {
        self.current = block;
    }

    pub const fn current(&self) -> BlockId {
        self.current
    }

    fn current_block_mut(&mut self) -> &mut Block {
        self.program
            .block_mut(self.current)
            .expect("insertion point refers to a block of this program")
    }

    fn push(&mut self, kind: InstructionKind) {
        self.current_block_mut()
            .push_instruction(Instruction::new(kind));
    }

    fn push_defining(&mut self, make: impl FnOnce(ValueId) -> InstructionKind) -> ValueId {
        let dest = self.program.new_value_id();
        let kind = make(dest);
        self.current_block_mut()
            .push_instruction(Instruction::new(kind));
        dest
    }

    /// Terminates the current block.
    ///
    /// # Panics
    /// Panics if the block is already terminated; that is an emitter bug,
    /// not an input condition.
    pub fn terminate(&mut self, terminator: Terminator) {
        let block = self.current_block_mut();
        assert!(
            !block.is_terminated(),
            "block already terminated during kernel emission"
        );
        block.set_terminator(terminator);
    }

    // --- Instruction helpers ---

    pub fn global_id(&mut self) -> ValueId {
        self.push_defining(|dest| InstructionKind::GlobalId { dest })
    }

    pub fn local_id(&mut self) -> ValueId {
        self.push_defining(|dest| InstructionKind::LocalId { dest })
    }

    pub fn binary(&mut self, op: BinOp, left: Value, right: Value) -> ValueId {
        self.push_defining(|dest| InstructionKind::Binary {
            op,
            dest,
            left,
            right,
        })
    }

    pub fn gep(&mut self, base: Value, offset: Value) -> ValueId {
        self.push_defining(|dest| InstructionKind::Gep { dest, base, offset })
    }

    pub fn load(&mut self, address: Value) -> ValueId {
        self.push_defining(|dest| InstructionKind::Load { dest, address })
    }

    pub fn store(&mut self, address: Value, value: Value) {
        self.push(InstructionKind::Store { address, value });
    }

    pub fn vector_load(&mut self, address: Value, width: u32) -> ValueId {
        self.push_defining(|dest| InstructionKind::VectorLoad {
            dest,
            address,
            width,
        })
    }

    pub fn vector_store(&mut self, address: Value, value: Value, width: u32) {
        self.push(InstructionKind::VectorStore {
            address,
            value,
            width,
        });
    }

    pub fn splat(&mut self, scalar: Value, width: u32) -> ValueId {
        self.push_defining(|dest| InstructionKind::Splat {
            dest,
            scalar,
            width,
        })
    }

    pub fn extract_lane(&mut self, vector: Value, lane: u32) -> ValueId {
        self.push_defining(|dest| InstructionKind::ExtractLane { dest, vector, lane })
    }

    pub fn local_alloc(&mut self, len: u32) -> ValueId {
        self.push_defining(|dest| InstructionKind::LocalAlloc { dest, len })
    }

    pub fn barrier(&mut self) {
        self.push(InstructionKind::Barrier);
    }

    pub fn atomic_add(&mut self, address: Value, value: Value) {
        self.push(InstructionKind::AtomicAdd {
            address,
            value,
            ordering: MemoryOrdering::SeqCst,
        });
    }
}
