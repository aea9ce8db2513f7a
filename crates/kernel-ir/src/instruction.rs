//! # Kernel Instructions
//!
//! Instructions perform computation but never transfer control; control
//! flow changes are handled exclusively by terminators. The operation set
//! is the kernel surface only: lane-id queries, arithmetic, addressing,
//! scalar and vector memory access, group-local storage, barriers and the
//! atomic combine.

use rustc_hash::FxHashSet;

use crate::{PrettyPrint, Value, ValueId};

/// Arithmetic and comparison operators available inside kernels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    /// Unsigned less-than, used for bounds and tree-range tests
    Lt,
    /// Equality, used for the leader check
    Eq,
}

impl BinOp {
    const fn mnemonic(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Div => "div",
            Self::Lt => "lt",
            Self::Eq => "eq",
        }
    }
}

/// Memory ordering for atomic operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryOrdering {
    Relaxed,
    /// The ordering the cross-group combine requires: contributions
    /// compose deterministically regardless of group completion order
    SeqCst,
}

impl MemoryOrdering {
    const fn mnemonic(self) -> &'static str {
        match self {
            Self::Relaxed => "relaxed",
            Self::SeqCst => "seq_cst",
        }
    }
}

/// An instruction: one operation, at most one defined value
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub kind: InstructionKind,
    /// Optional comment carried into the pretty-printed form
    pub comment: Option<String>,
}

/// The kinds of instructions available in kernel programs
#[derive(Debug, Clone, PartialEq)]
pub enum InstructionKind {
    /// `dest = global_id`: the lane's index within the whole problem
    GlobalId { dest: ValueId },

    /// `dest = local_id`: the lane's index within its group
    LocalId { dest: ValueId },

    /// `dest = group_id`: the group's index within the dispatch
    GroupId { dest: ValueId },

    /// `dest = left op right`
    Binary {
        op: BinOp,
        dest: ValueId,
        left: Value,
        right: Value,
    },

    /// `dest = gep base, offset`: address of element `offset` past `base`
    Gep {
        dest: ValueId,
        base: Value,
        offset: Value,
    },

    /// `dest = load address`: single element
    Load { dest: ValueId, address: Value },

    /// `store address, value`: single element
    Store { address: Value, value: Value },

    /// `dest = vload.width address`: `width` contiguous elements
    VectorLoad {
        dest: ValueId,
        address: Value,
        width: u32,
    },

    /// `vstore.width address, value`
    VectorStore {
        address: Value,
        value: Value,
        width: u32,
    },

    /// `dest = splat.width scalar`: broadcast a scalar across the lanes of a vector
    Splat {
        dest: ValueId,
        scalar: Value,
        width: u32,
    },

    /// `dest = extract vector, lane`
    ExtractLane {
        dest: ValueId,
        vector: Value,
        lane: u32,
    },

    /// `dest = local_alloc len`: a group-local buffer of `len` elements
    LocalAlloc { dest: ValueId, len: u32 },

    /// Group-local memory fence: every lane in the group reaches it
    /// before any lane proceeds
    Barrier,

    /// `atomic_add address, value`: indivisible read-modify-write on
    /// globally shared memory
    AtomicAdd {
        address: Value,
        value: Value,
        ordering: MemoryOrdering,
    },
}

impl Instruction {
    pub const fn new(kind: InstructionKind) -> Self {
        Self {
            kind,
            comment: None,
        }
    }

    /// Attaches a comment for the pretty-printed form
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// The value this instruction defines, if any
    pub const fn destination(&self) -> Option<ValueId> {
        match &self.kind {
            InstructionKind::GlobalId { dest }
            | InstructionKind::LocalId { dest }
            | InstructionKind::GroupId { dest }
            | InstructionKind::Binary { dest, .. }
            | InstructionKind::Gep { dest, .. }
            | InstructionKind::Load { dest, .. }
            | InstructionKind::VectorLoad { dest, .. }
            | InstructionKind::Splat { dest, .. }
            | InstructionKind::ExtractLane { dest, .. }
            | InstructionKind::LocalAlloc { dest, .. } => Some(*dest),
            InstructionKind::Store { .. }
            | InstructionKind::VectorStore { .. }
            | InstructionKind::Barrier
            | InstructionKind::AtomicAdd { .. } => None,
        }
    }

    /// All values this instruction reads
    pub fn used_values(&self) -> FxHashSet<ValueId> {
        let mut used = FxHashSet::default();
        let mut add = |value: &Value| {
            if let Some(id) = value.as_operand() {
                used.insert(id);
            }
        };
        match &self.kind {
            InstructionKind::GlobalId { .. }
            | InstructionKind::LocalId { .. }
            | InstructionKind::GroupId { .. }
            | InstructionKind::LocalAlloc { .. }
            | InstructionKind::Barrier => {}
            InstructionKind::Binary { left, right, .. } => {
                add(left);
                add(right);
            }
            InstructionKind::Gep { base, offset, .. } => {
                add(base);
                add(offset);
            }
            InstructionKind::Load { address, .. } => add(address),
            InstructionKind::Store { address, value }
            | InstructionKind::AtomicAdd { address, value, .. } => {
                add(address);
                add(value);
            }
            InstructionKind::VectorLoad { address, .. } => add(address),
            InstructionKind::VectorStore { address, value, .. } => {
                add(address);
                add(value);
            }
            InstructionKind::Splat { scalar, .. } => add(scalar),
            InstructionKind::ExtractLane { vector, .. } => add(vector),
        }
        used
    }

    /// True for the group-local memory fence
    pub const fn is_barrier(&self) -> bool {
        matches!(self.kind, InstructionKind::Barrier)
    }

    /// True for the atomic cross-group combine
    pub const fn is_atomic(&self) -> bool {
        matches!(self.kind, InstructionKind::AtomicAdd { .. })
    }
}

impl PrettyPrint for Instruction {
    fn pretty_print(&self, _indent: usize) -> String {
        let text = match &self.kind {
            InstructionKind::GlobalId { dest } => format!("%{} = global_id", dest.index()),
            InstructionKind::LocalId { dest } => format!("%{} = local_id", dest.index()),
            InstructionKind::GroupId { dest } => format!("%{} = group_id", dest.index()),
            InstructionKind::Binary {
                op,
                dest,
                left,
                right,
            } => format!(
                "%{} = {} {}, {}",
                dest.index(),
                op.mnemonic(),
                left.pretty_print(0),
                right.pretty_print(0)
            ),
            InstructionKind::Gep { dest, base, offset } => format!(
                "%{} = gep {}, {}",
                dest.index(),
                base.pretty_print(0),
                offset.pretty_print(0)
            ),
            InstructionKind::Load { dest, address } => {
                format!("%{} = load {}", dest.index(), address.pretty_print(0))
            }
            InstructionKind::Store { address, value } => format!(
                "store {}, {}",
                address.pretty_print(0),
                value.pretty_print(0)
            ),
            InstructionKind::VectorLoad {
                dest,
                address,
                width,
            } => format!(
                "%{} = vload.{} {}",
                dest.index(),
                width,
                address.pretty_print(0)
            ),
            InstructionKind::VectorStore {
                address,
                value,
                width,
            } => format!(
                "vstore.{} {}, {}",
                width,
                address.pretty_print(0),
                value.pretty_print(0)
            ),
            InstructionKind::Splat { dest, scalar, width } => format!(
                "%{} = splat.{} {}",
                dest.index(),
                width,
                scalar.pretty_print(0)
            ),
            InstructionKind::ExtractLane { dest, vector, lane } => format!(
                "%{} = extract {}, {}",
                dest.index(),
                vector.pretty_print(0),
                lane
            ),
            InstructionKind::LocalAlloc { dest, len } => {
                format!("%{} = local_alloc {}", dest.index(), len)
            }
            InstructionKind::Barrier => "barrier".to_string(),
            InstructionKind::AtomicAdd {
                address,
                value,
                ordering,
            } => format!(
                "atomic_add {}, {} {}",
                address.pretty_print(0),
                value.pretty_print(0),
                ordering.mnemonic()
            ),
        };
        match &self.comment {
            Some(comment) => format!("{text} ; {comment}"),
            None => text,
        }
    }
}
