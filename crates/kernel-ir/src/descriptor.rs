//! # Kernel Descriptor
//!
//! The immutable recipe the emitter consumes: kernel name, width,
//! classification, ordered argument list and work-group hints, derived
//! from a vectorization report plus the collected arguments.

use cspmd_analysis::VectorizationReport;

/// Default preferred lanes per group
pub const DEFAULT_PREFERRED_GROUP_SIZE: u32 = 256;
/// Default upper bound on lanes per group
pub const DEFAULT_MAX_GROUP_SIZE: u32 = 1024;

/// Everything the emitter needs to know about one kernel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelDescriptor {
    pub name: String,
    pub vector_width: u32,
    pub is_reduction: bool,
    /// Unique argument names in parameter order: input buffer first, then
    /// the output buffer (elementwise) or accumulator (reduction)
    pub arguments: Vec<String>,
    pub preferred_work_group_size: u32,
    pub max_work_group_size: u32,
    pub uses_local_memory: bool,
}

impl KernelDescriptor {
    /// Builds the descriptor for one analyzed loop.
    ///
    /// For reductions the detected accumulator becomes the second
    /// parameter (the kernel's global result pointer), whether or not the
    /// collector picked it up: a scalar accumulator is a plain local in
    /// source and is never collected on its own.
    pub fn from_report(
        name: String,
        report: &VectorizationReport,
        mut arguments: Vec<String>,
    ) -> Self {
        if report.is_reduction {
            if let Some(accumulator) = &report.reduction_variable {
                arguments.retain(|a| a != accumulator);
                let slot = arguments.len().min(1);
                arguments.insert(slot, accumulator.clone());
            }
        }
        Self {
            name,
            vector_width: report.recommended_width,
            is_reduction: report.is_reduction,
            arguments,
            preferred_work_group_size: DEFAULT_PREFERRED_GROUP_SIZE,
            max_work_group_size: DEFAULT_MAX_GROUP_SIZE,
            uses_local_memory: report.is_reduction,
        }
    }
}
