//! # SPMD Kernel IR
//!
//! Data structures and emitters for the parallel-kernel programs produced
//! from vectorizable loops. The design follows a small CFG-based IR:
//!
//! 1. **Control Flow Graph**: a kernel is a directed graph of basic blocks
//! 2. **Three-address instructions**: at most one operation per instruction
//! 3. **Single definition**: every value id is assigned exactly once
//! 4. **Explicit control flow**: only terminators transfer control
//!
//! The emitted program describes a many-lane execution model: lanes within
//! one group synchronize only at explicit barriers, and disjoint groups
//! interact only through the single sequentially-consistent atomic combine.
//! The analyzer and emitter themselves run single-threaded, one loop at a
//! time, with no state shared across loops.

pub use block::Block;
pub use builder::KernelBuilder;
pub use descriptor::{KernelDescriptor, DEFAULT_MAX_GROUP_SIZE, DEFAULT_PREFERRED_GROUP_SIZE};
pub use emit::{detect_operation, emit_kernel, EmitError};
pub use instruction::{BinOp, Instruction, InstructionKind, MemoryOrdering};
pub use program::{KernelParam, KernelProgram, ParamType};
pub use terminator::Terminator;
pub use value::{Literal, Value};
pub use verify::{verify, VerifyError};

pub mod block;
pub mod builder;
pub mod descriptor;
pub mod emit;
pub mod instruction;
pub mod program;
pub mod terminator;
pub mod value;
pub mod verify;

// --- Core Identifiers ---

index_vec::define_index_type! {
    /// Unique identifier for a basic block within a kernel
    pub struct BlockId = usize;
}

index_vec::define_index_type! {
    /// Unique identifier for a value (virtual register) within a kernel
    pub struct ValueId = usize;
}

// --- Pretty Printing Support ---

/// Trait for pretty-printing kernel IR constructs
pub trait PrettyPrint {
    fn pretty_print(&self, indent: usize) -> String;
}

/// Helper function to create indentation
pub(crate) fn indent_str(level: usize) -> String {
    "  ".repeat(level)
}
