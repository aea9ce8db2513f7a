//! # Kernel Program
//!
//! The emitted parallel program: a named function with an ordered pointer
//! parameter list plus a trailing element count, a basic-block graph, and
//! the execution hints the descriptor carries. Owned exclusively by the
//! emitter until handed to the verifier and printer.

use index_vec::IndexVec;

use crate::{indent_str, Block, BlockId, PrettyPrint, ValueId};

/// Kernel parameter types: element buffers and the element count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    /// Pointer to f32 elements in global memory
    PtrF32,
    /// Unsigned 32-bit scalar
    U32,
}

impl ParamType {
    const fn display(self) -> &'static str {
        match self {
            Self::PtrF32 => "*f32",
            Self::U32 => "u32",
        }
    }
}

/// One kernel parameter, bound to a value id usable in the body
#[derive(Debug, Clone, PartialEq)]
pub struct KernelParam {
    pub name: String,
    pub ty: ParamType,
    pub value: ValueId,
}

/// The emitted kernel program
#[derive(Debug, Clone, PartialEq)]
pub struct KernelProgram {
    pub name: String,
    pub vector_width: u32,
    pub is_reduction: bool,
    /// Parameters in declaration order; values are defined on entry
    pub params: Vec<KernelParam>,
    pub blocks: IndexVec<BlockId, Block>,
    pub entry_block: BlockId,
    pub preferred_work_group_size: u32,
    pub max_work_group_size: u32,
    pub uses_local_memory: bool,
    /// Alignment hint in bytes for all pointer parameters
    pub pointer_alignment: Option<u32>,
    next_value_id: u32,
}

impl KernelProgram {
    /// Creates a new program with an empty entry block
    pub fn new(name: String) -> Self {
        let mut blocks = IndexVec::new();
        let entry_block = blocks.push(Block::new("entry".to_string()));
        Self {
            name,
            vector_width: 1,
            is_reduction: false,
            params: Vec::new(),
            blocks,
            entry_block,
            preferred_work_group_size: 0,
            max_work_group_size: 0,
            uses_local_memory: false,
            pointer_alignment: None,
            next_value_id: 0,
        }
    }

    /// Appends a parameter and returns the value id bound to it
    pub fn add_param(&mut self, name: impl Into<String>, ty: ParamType) -> ValueId {
        let value = self.new_value_id();
        self.params.push(KernelParam {
            name: name.into(),
            ty,
            value,
        });
        value
    }

    /// Adds a new named block and returns its id
    pub fn add_block(&mut self, name: impl Into<String>) -> BlockId {
        self.blocks.push(Block::new(name.into()))
    }

    /// Generates a new unique value id within this program
    pub fn new_value_id(&mut self) -> ValueId {
        let id = ValueId::new(self.next_value_id as usize);
        self.next_value_id += 1;
        id
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(id)
    }

    pub fn block_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        self.blocks.get_mut(id)
    }

    /// Total barrier instructions across the program
    pub fn barrier_count(&self) -> usize {
        self.blocks.iter().map(Block::barrier_count).sum()
    }

    /// Total atomic-combine instructions across the program
    pub fn atomic_count(&self) -> usize {
        self.blocks
            .iter()
            .flat_map(|b| &b.instructions)
            .filter(|i| i.is_atomic())
            .count()
    }
}

impl PrettyPrint for KernelProgram {
    fn pretty_print(&self, indent: usize) -> String {
        let base = indent_str(indent);
        let params = self
            .params
            .iter()
            .map(|p| format!("{}: {}", p.name, p.ty.display()))
            .collect::<Vec<_>>()
            .join(", ");
        let mut header = format!(
            "{}kernel {}({}) width={} wgs={}/{}",
            base,
            self.name,
            params,
            self.vector_width,
            self.preferred_work_group_size,
            self.max_work_group_size
        );
        if let Some(alignment) = self.pointer_alignment {
            header.push_str(&format!(" align={alignment}"));
        }
        if self.uses_local_memory {
            header.push_str(" local_mem");
        }
        let mut result = format!("{header} {{\n");
        for (id, block) in self.blocks.iter_enumerated() {
            result.push_str(&format!(
                "{}  bb{} ({}):\n",
                base,
                id.index(),
                block.name
            ));
            result.push_str(&block.pretty_print(indent + 2));
        }
        result.push_str(&format!("{base}}}\n"));
        result
    }
}
