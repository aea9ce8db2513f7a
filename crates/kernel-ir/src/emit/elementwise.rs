//! # Elementwise Kernel Emitter
//!
//! State machine: `entry -> {vector_path, scalar_path} -> exit`.
//!
//! Entry computes the lane's global id and the boundary test
//! `gid + width - 1 < n`. The vector path processes `width` contiguous
//! elements at once; the scalar path is the identical single-element tail
//! taken when a full vector would run past the end, so element counts not
//! divisible by the width stay correct.

use crate::emit::{EmitError, ELEMENT_SIZE_BYTES};
use crate::{
    BinOp, KernelBuilder, KernelDescriptor, KernelProgram, ParamType, Terminator, Value,
};

pub(crate) fn emit(
    descriptor: &KernelDescriptor,
    operation: Option<(BinOp, f32)>,
) -> Result<KernelProgram, EmitError> {
    if descriptor.arguments.is_empty() {
        return Err(EmitError::NoArguments(descriptor.name.clone()));
    }
    let width = descriptor.vector_width;

    let mut program = KernelProgram::new(descriptor.name.clone());
    program.vector_width = width;
    program.is_reduction = false;
    program.preferred_work_group_size = descriptor.preferred_work_group_size;
    program.max_work_group_size = descriptor.max_work_group_size;
    program.uses_local_memory = false;
    program.pointer_alignment = Some(width * ELEMENT_SIZE_BYTES);

    let mut buffers = Vec::with_capacity(descriptor.arguments.len());
    for argument in &descriptor.arguments {
        buffers.push(program.add_param(argument.clone(), ParamType::PtrF32));
    }
    let count = program.add_param("n", ParamType::U32);

    let input = Value::operand(buffers[0]);
    // A single collected buffer means an in-place update
    let output = Value::operand(*buffers.get(1).unwrap_or(&buffers[0]));

    let mut builder = KernelBuilder::new(&mut program);
    let vector_path = builder.block("vector_path");
    let scalar_path = builder.block("scalar_path");
    let exit = builder.block("exit");

    // entry: can a full vector be processed at this lane's offset?
    let gid = builder.global_id();
    let upper = builder.binary(
        BinOp::Add,
        Value::operand(gid),
        Value::uint(u64::from(width) - 1),
    );
    let in_bounds = builder.binary(BinOp::Lt, Value::operand(upper), Value::operand(count));
    builder.terminate(Terminator::branch(
        Value::operand(in_bounds),
        vector_path,
        scalar_path,
    ));

    // vector_path
    builder.switch_to(vector_path);
    let address = builder.gep(input, Value::operand(gid));
    let vector = builder.vector_load(Value::operand(address), width);
    let result = match operation {
        Some((op, constant)) => {
            let splat = builder.splat(Value::f32(constant), width);
            builder.binary(op, Value::operand(vector), Value::operand(splat))
        }
        None => vector,
    };
    let out_address = builder.gep(output, Value::operand(gid));
    builder.vector_store(Value::operand(out_address), Value::operand(result), width);
    builder.terminate(Terminator::jump(exit));

    // scalar_path: same computation, one element
    builder.switch_to(scalar_path);
    let address = builder.gep(input, Value::operand(gid));
    let element = builder.load(Value::operand(address));
    let result = match operation {
        Some((op, constant)) => builder.binary(op, Value::operand(element), Value::f32(constant)),
        None => element,
    };
    let out_address = builder.gep(output, Value::operand(gid));
    builder.store(Value::operand(out_address), Value::operand(result));
    builder.terminate(Terminator::jump(exit));

    builder.switch_to(exit);
    builder.terminate(Terminator::Return);

    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{verify, InstructionKind, PrettyPrint};

    fn descriptor(arguments: Vec<&str>, width: u32) -> KernelDescriptor {
        KernelDescriptor {
            name: "kernel_line_4".to_string(),
            vector_width: width,
            is_reduction: false,
            arguments: arguments.into_iter().map(str::to_string).collect(),
            preferred_work_group_size: 256,
            max_work_group_size: 1024,
            uses_local_memory: false,
        }
    }

    #[test]
    fn emitted_kernel_verifies() {
        let program = emit(&descriptor(vec!["arr", "out"], 8), Some((BinOp::Mul, 2.0))).unwrap();
        assert_eq!(verify(&program), Ok(()));
    }

    #[test]
    fn four_state_machine_shape() {
        let program = emit(&descriptor(vec!["arr", "out"], 8), None).unwrap();
        let names: Vec<&str> = program.blocks.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["entry", "vector_path", "scalar_path", "exit"]);
        assert!(program.block(program.entry_block).unwrap().terminator.is_conditional());
    }

    #[test]
    fn parameters_are_buffers_plus_count() {
        let program = emit(&descriptor(vec!["arr", "out"], 4), None).unwrap();
        let names: Vec<&str> = program.params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["arr", "out", "n"]);
        assert_eq!(program.params[0].ty, ParamType::PtrF32);
        assert_eq!(program.params[2].ty, ParamType::U32);
    }

    #[test]
    fn alignment_hint_scales_with_width() {
        let wide = emit(&descriptor(vec!["arr"], 8), None).unwrap();
        assert_eq!(wide.pointer_alignment, Some(32));
        let narrow = emit(&descriptor(vec!["arr"], 4), None).unwrap();
        assert_eq!(narrow.pointer_alignment, Some(16));
    }

    #[test]
    fn detected_operation_appears_in_both_paths() {
        let program = emit(&descriptor(vec!["arr", "out"], 8), Some((BinOp::Add, 1.0))).unwrap();
        let printed = program.pretty_print(0);
        assert!(printed.contains("vload.8"));
        assert!(printed.contains("splat.8 1.0"));
        assert!(printed.contains("vstore.8"));
        // scalar tail computes the same operation without vectors
        let scalar = &program.blocks[crate::BlockId::new(2)];
        assert!(scalar
            .instructions
            .iter()
            .any(|i| matches!(i.kind, InstructionKind::Binary { op: BinOp::Add, .. })));
    }

    #[test]
    fn identity_kernel_copies_without_arithmetic() {
        let program = emit(&descriptor(vec!["arr", "out"], 4), None).unwrap();
        let has_arith = program
            .blocks
            .iter()
            .flat_map(|b| &b.instructions)
            .any(|i| matches!(
                i.kind,
                InstructionKind::Binary {
                    op: BinOp::Mul | BinOp::Div,
                    ..
                } | InstructionKind::Splat { .. }
            ));
        assert!(!has_arith);
    }

    #[test]
    fn single_buffer_updates_in_place() {
        let program = emit(&descriptor(vec!["arr"], 4), Some((BinOp::Mul, 2.0))).unwrap();
        let names: Vec<&str> = program.params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["arr", "n"]);
        assert_eq!(verify(&program), Ok(()));
    }

    #[test]
    fn no_arguments_is_an_emission_failure() {
        let err = emit(&descriptor(vec![], 4), None).unwrap_err();
        assert!(matches!(err, EmitError::NoArguments(_)));
    }
}
