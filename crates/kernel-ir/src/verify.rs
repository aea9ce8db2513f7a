//! # Structural Verifier
//!
//! Validates an emitted kernel program before it is reported as a success:
//! block graph integrity, single definition per value, no uses of
//! undefined values, no leftover placeholder terminators, and no blocks
//! the entry can never reach. Verification failure is a per-loop emission
//! failure, not a crash.

use rustc_hash::FxHashSet;

use crate::{BlockId, KernelProgram, Terminator, ValueId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    #[error("block bb{0} has no terminator")]
    Unterminated(usize),
    #[error("block bb{0} targets out-of-range block bb{1}")]
    BadTarget(usize, usize),
    #[error("value %{0} is defined more than once")]
    Redefined(usize),
    #[error("value %{0} is used but never defined")]
    UndefinedUse(usize),
    #[error("block bb{0} is unreachable from entry")]
    UnreachableBlock(usize),
}

/// Structurally validates a kernel program.
pub fn verify(program: &KernelProgram) -> Result<(), VerifyError> {
    check_terminators(program)?;
    check_definitions(program)?;
    check_reachability(program)?;
    Ok(())
}

fn check_terminators(program: &KernelProgram) -> Result<(), VerifyError> {
    let block_count = program.blocks.len();
    for (id, block) in program.blocks.iter_enumerated() {
        if matches!(block.terminator, Terminator::Unreachable) {
            return Err(VerifyError::Unterminated(id.index()));
        }
        for target in block.terminator.target_blocks() {
            if target.index() >= block_count {
                return Err(VerifyError::BadTarget(id.index(), target.index()));
            }
        }
    }
    Ok(())
}

fn check_definitions(program: &KernelProgram) -> Result<(), VerifyError> {
    let mut defined: FxHashSet<ValueId> = FxHashSet::default();
    for param in &program.params {
        if !defined.insert(param.value) {
            return Err(VerifyError::Redefined(param.value.index()));
        }
    }
    for block in program.blocks.iter() {
        for instruction in &block.instructions {
            if let Some(dest) = instruction.destination() {
                if !defined.insert(dest) {
                    return Err(VerifyError::Redefined(dest.index()));
                }
            }
        }
    }
    for block in program.blocks.iter() {
        let used = block
            .instructions
            .iter()
            .flat_map(|i| i.used_values())
            .chain(block.terminator.used_values());
        for value in used {
            if !defined.contains(&value) {
                return Err(VerifyError::UndefinedUse(value.index()));
            }
        }
    }
    Ok(())
}

fn check_reachability(program: &KernelProgram) -> Result<(), VerifyError> {
    let mut reachable: FxHashSet<BlockId> = FxHashSet::default();
    let mut worklist = vec![program.entry_block];
    while let Some(id) = worklist.pop() {
        if !reachable.insert(id) {
            continue;
        }
        if let Some(block) = program.block(id) {
            for target in block.terminator.target_blocks() {
                worklist.push(target);
            }
        }
    }
    for (id, _) in program.blocks.iter_enumerated() {
        if !reachable.contains(&id) {
            return Err(VerifyError::UnreachableBlock(id.index()));
        }
    }
    Ok(())
}
