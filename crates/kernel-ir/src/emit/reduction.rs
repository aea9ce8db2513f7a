//! # Reduction Kernel Emitter
//!
//! State machine:
//! `entry -> local_reduce -> tree_step(1) -> ... -> leader_check
//!  -> {atomic_combine -> exit, exit}`.
//!
//! Each lane horizontally sums a `width`-wide vector into its slot of a
//! group-local buffer. The tree then halves the active lane count every
//! step; a barrier sits between every write to the buffer and the next
//! step's reads, otherwise a lane could read a slot its neighbor has not
//! finished writing. Only the lane with local id 0 contributes the group's
//! total to the global result, through a single sequentially consistent
//! atomic add, so concurrent groups compose deterministically.

use crate::emit::EmitError;
use crate::{
    BinOp, BlockId, KernelBuilder, KernelDescriptor, KernelProgram, ParamType, Terminator, Value,
};

pub(crate) fn emit(descriptor: &KernelDescriptor) -> Result<KernelProgram, EmitError> {
    if descriptor.arguments.len() < 2 {
        // Needs an input buffer and a result location
        return Err(EmitError::NoArguments(descriptor.name.clone()));
    }
    let width = descriptor.vector_width;
    let group_size = descriptor.preferred_work_group_size;

    let mut program = KernelProgram::new(descriptor.name.clone());
    program.vector_width = width;
    program.is_reduction = true;
    program.preferred_work_group_size = group_size;
    program.max_work_group_size = descriptor.max_work_group_size;
    program.uses_local_memory = true;

    let mut pointers = Vec::with_capacity(descriptor.arguments.len());
    for argument in &descriptor.arguments {
        pointers.push(program.add_param(argument.clone(), ParamType::PtrF32));
    }
    program.add_param("n", ParamType::U32);

    let input = Value::operand(pointers[0]);
    let result_ptr = Value::operand(pointers[1]);

    let mut builder = KernelBuilder::new(&mut program);

    // Declare the whole state machine up front; every tree step owns a
    // predicate block, an accumulate block and a rejoin block.
    let local_reduce = builder.block("local_reduce");
    let steps: Vec<u32> = std::iter::successors(Some(1u32), |step| step.checked_mul(2))
        .take_while(|step| *step < group_size)
        .collect();
    let tree_blocks: Vec<(BlockId, BlockId, BlockId)> = steps
        .iter()
        .map(|step| {
            (
                builder.block(&format!("tree_step_{step}")),
                builder.block(&format!("tree_add_{step}")),
                builder.block(&format!("tree_join_{step}")),
            )
        })
        .collect();
    let leader_check = builder.block("leader_check");
    let atomic_combine = builder.block("atomic_combine");
    let exit = builder.block("exit");

    // entry: lane ids and the group-local buffer
    let gid = builder.global_id();
    let lid = builder.local_id();
    let local_buf = builder.local_alloc(group_size);
    builder.terminate(Terminator::jump(local_reduce));

    // local_reduce: horizontal sum of one vector into local[lid]
    builder.switch_to(local_reduce);
    let address = builder.gep(input, Value::operand(gid));
    let vector = builder.vector_load(Value::operand(address), width);
    let mut partial = builder.extract_lane(Value::operand(vector), 0);
    for lane in 1..width {
        let element = builder.extract_lane(Value::operand(vector), lane);
        partial = builder.binary(BinOp::Add, Value::operand(partial), Value::operand(element));
    }
    let slot = builder.gep(Value::operand(local_buf), Value::operand(lid));
    builder.store(Value::operand(slot), Value::operand(partial));
    // Written slots must be visible before any lane reads a neighbor's
    builder.barrier();
    let first_target = tree_blocks
        .first()
        .map_or(leader_check, |(step_block, _, _)| *step_block);
    builder.terminate(Terminator::jump(first_target));

    // tree steps, active range halving as the stride doubles
    for (index, (step, (step_block, add_block, join_block))) in
        steps.iter().zip(&tree_blocks).enumerate()
    {
        builder.switch_to(*step_block);
        let partner = builder.binary(
            BinOp::Add,
            Value::operand(lid),
            Value::uint(u64::from(*step)),
        );
        let in_range = builder.binary(
            BinOp::Lt,
            Value::operand(partner),
            Value::uint(u64::from(group_size)),
        );
        builder.terminate(Terminator::branch(
            Value::operand(in_range),
            *add_block,
            *join_block,
        ));

        builder.switch_to(*add_block);
        let partner_addr = builder.gep(Value::operand(local_buf), Value::operand(partner));
        let partner_val = builder.load(Value::operand(partner_addr));
        let own_addr = builder.gep(Value::operand(local_buf), Value::operand(lid));
        let own_val = builder.load(Value::operand(own_addr));
        let combined = builder.binary(
            BinOp::Add,
            Value::operand(own_val),
            Value::operand(partner_val),
        );
        builder.store(Value::operand(own_addr), Value::operand(combined));
        builder.terminate(Terminator::jump(*join_block));

        // One barrier per step, executed by every lane in the group
        builder.switch_to(*join_block);
        builder.barrier();
        let next = tree_blocks
            .get(index + 1)
            .map_or(leader_check, |(next_step, _, _)| *next_step);
        builder.terminate(Terminator::jump(next));
    }

    // leader_check: exactly one lane per group continues to the combine
    builder.switch_to(leader_check);
    let is_leader = builder.binary(BinOp::Eq, Value::operand(lid), Value::uint(0));
    builder.terminate(Terminator::branch(
        Value::operand(is_leader),
        atomic_combine,
        exit,
    ));

    // atomic_combine: the group's total joins the global result
    builder.switch_to(atomic_combine);
    let total_addr = builder.gep(Value::operand(local_buf), Value::uint(0));
    let total = builder.load(Value::operand(total_addr));
    builder.atomic_add(result_ptr, Value::operand(total));
    builder.terminate(Terminator::jump(exit));

    builder.switch_to(exit);
    builder.terminate(Terminator::Return);

    Ok(program)
}
