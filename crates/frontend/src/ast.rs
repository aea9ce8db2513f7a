//! C Subset AST
//!
//! Immutable tagged-variant representation of the analyzed source. The
//! analysis passes fold over these nodes; nothing here is mutated after
//! parsing.

use std::fmt;

/// A half-open byte range into the source file
pub type Span = (usize, usize);

/// An AST node paired with its source span
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    node: T,
    span: Span,
}

impl<T> Spanned<T> {
    pub const fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }

    pub const fn value(&self) -> &T {
        &self.node
    }

    pub const fn span(&self) -> Span {
        self.span
    }
}

/// A C type in the analyzed subset.
///
/// Arrays keep their own variant: a local array is neither pointer-typed
/// nor global, so it is not a kernel argument, but subscripts into it still
/// resolve to the element type.
#[derive(Debug, Clone, PartialEq)]
pub enum CType {
    Void,
    Char,
    Int,
    Long,
    Float,
    Double,
    Pointer(Box<CType>),
    Array(Box<CType>, u64),
}

impl CType {
    pub const fn is_integer(&self) -> bool {
        matches!(self, Self::Char | Self::Int | Self::Long)
    }

    pub const fn is_floating(&self) -> bool {
        matches!(self, Self::Float | Self::Double)
    }

    pub const fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_floating()
    }

    pub const fn is_pointer(&self) -> bool {
        matches!(self, Self::Pointer(_))
    }

    /// Element type of a pointer or array, if any
    pub fn element_type(&self) -> Option<&Self> {
        match self {
            Self::Pointer(elem) | Self::Array(elem, _) => Some(&**elem),
            _ => None,
        }
    }

    /// Conversion rank for the usual arithmetic conversions
    const fn rank(&self) -> u8 {
        match self {
            Self::Char => 1,
            Self::Int => 2,
            Self::Long => 3,
            Self::Float => 4,
            Self::Double => 5,
            _ => 0,
        }
    }

    /// Result type of an arithmetic operation between two numeric types
    pub fn promote(&self, other: &Self) -> Self {
        if self.rank() >= other.rank() {
            self.clone()
        } else {
            other.clone()
        }
    }
}

impl fmt::Display for CType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void => write!(f, "void"),
            Self::Char => write!(f, "char"),
            Self::Int => write!(f, "int"),
            Self::Long => write!(f, "long"),
            Self::Float => write!(f, "float"),
            Self::Double => write!(f, "double"),
            Self::Pointer(elem) => write!(f, "{elem}*"),
            Self::Array(elem, len) => write!(f, "{elem}[{len}]"),
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Arithmetic negation `-x`
    Neg,
    /// Postfix increment `x++`
    PostInc,
    /// Postfix decrement `x--`
    PostDec,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Neq,
}

impl BinaryOp {
    /// Arithmetic operators whose result types the uniformity check collects
    pub const fn is_computation(self) -> bool {
        matches!(self, Self::Add | Self::Sub | Self::Mul | Self::Div)
    }

    pub const fn is_comparison(self) -> bool {
        matches!(self, Self::Lt | Self::Gt | Self::Le | Self::Ge | Self::Eq | Self::Neq)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::Eq => "==",
            Self::Neq => "!=",
        };
        write!(f, "{s}")
    }
}

/// An expression in the analyzed subset
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Integer literal (e.g. `0`, `128`)
    IntLit(u64),
    /// Floating-point literal (e.g. `2.0f`); typed `float` in this subset
    FloatLit(f64),
    /// Variable reference
    Ident(String),
    /// Unary operation
    Unary {
        op: UnaryOp,
        operand: Box<Spanned<Expr>>,
    },
    /// Binary operation
    Binary {
        op: BinaryOp,
        left: Box<Spanned<Expr>>,
        right: Box<Spanned<Expr>>,
    },
    /// Plain assignment `target = value`
    Assign {
        target: Box<Spanned<Expr>>,
        value: Box<Spanned<Expr>>,
    },
    /// Compound assignment `target op= value`
    CompoundAssign {
        op: BinaryOp,
        target: Box<Spanned<Expr>>,
        value: Box<Spanned<Expr>>,
    },
    /// Array subscript `base[index]`
    Index {
        base: Box<Spanned<Expr>>,
        index: Box<Spanned<Expr>>,
    },
    /// Function call
    Call {
        callee: String,
        args: Vec<Spanned<Expr>>,
    },
    /// Explicit cast `(type) operand`
    Cast {
        ty: CType,
        operand: Box<Spanned<Expr>>,
    },
}

/// One counted loop: `for (init; cond; step) body`
#[derive(Debug, Clone, PartialEq)]
pub struct ForLoop {
    pub init: Option<Spanned<Expr>>,
    pub cond: Option<Spanned<Expr>>,
    pub step: Option<Spanned<Expr>>,
    pub body: Box<Spanned<Stmt>>,
}

/// A statement in the analyzed subset
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Local variable declaration, optionally an array, optionally initialized
    Declaration {
        ty: CType,
        name: String,
        init: Option<Spanned<Expr>>,
    },
    For(ForLoop),
    While {
        cond: Spanned<Expr>,
        body: Box<Spanned<Stmt>>,
    },
    If {
        cond: Spanned<Expr>,
        then_branch: Box<Spanned<Stmt>>,
        else_branch: Option<Box<Spanned<Stmt>>>,
    },
    Return(Option<Spanned<Expr>>),
    /// Expression used as a statement
    Expr(Spanned<Expr>),
    Block(Vec<Spanned<Stmt>>),
}

/// A function parameter
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDecl {
    pub ty: CType,
    pub name: String,
}

/// A function definition
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub return_type: CType,
    pub name: String,
    pub params: Vec<ParamDecl>,
    pub body: Spanned<Stmt>,
}

/// A top-level item
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Function(FunctionDef),
    /// File-scope variable declaration
    Global {
        ty: CType,
        name: String,
        init: Option<Spanned<Expr>>,
    },
}

/// A parsed source file
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TranslationUnit {
    pub items: Vec<Item>,
}

impl TranslationUnit {
    /// Iterates over the function definitions in declaration order
    pub fn functions(&self) -> impl Iterator<Item = &FunctionDef> {
        self.items.iter().filter_map(|item| match item {
            Item::Function(func) => Some(func),
            Item::Global { .. } => None,
        })
    }
}
