//! Symbol Table and Expression Typing
//!
//! A flat per-function symbol table (file-scope globals, parameters, local
//! declarations) and a resolver computing the result type of expressions
//! under the usual arithmetic conversions. Block scoping and shadowing are
//! not modeled; the analyzed subset declares locals once per function.

use rustc_hash::FxHashMap;

use crate::ast::{CType, Expr, FunctionDef, Item, Spanned, Stmt, TranslationUnit, UnaryOp};

/// Where a variable lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    Global,
    Local,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarInfo {
    pub ty: CType,
    pub storage: Storage,
}

/// All variables visible inside one function
#[derive(Debug, Default)]
pub struct SymbolTable {
    vars: FxHashMap<String, VarInfo>,
}

impl SymbolTable {
    /// Builds the table for one function: file-scope globals, then the
    /// function's parameters, then every local declaration in its body.
    pub fn for_function(unit: &TranslationUnit, func: &FunctionDef) -> Self {
        let mut vars = FxHashMap::default();
        for item in &unit.items {
            if let Item::Global { ty, name, .. } = item {
                vars.insert(
                    name.clone(),
                    VarInfo {
                        ty: ty.clone(),
                        storage: Storage::Global,
                    },
                );
            }
        }
        for param in &func.params {
            vars.insert(
                param.name.clone(),
                VarInfo {
                    ty: param.ty.clone(),
                    storage: Storage::Local,
                },
            );
        }
        let mut table = Self { vars };
        table.collect_locals(&func.body);
        table
    }

    fn collect_locals(&mut self, stmt: &Spanned<Stmt>) {
        match stmt.value() {
            Stmt::Declaration { ty, name, .. } => {
                self.vars.insert(
                    name.clone(),
                    VarInfo {
                        ty: ty.clone(),
                        storage: Storage::Local,
                    },
                );
            }
            Stmt::Block(stmts) => {
                for inner in stmts {
                    self.collect_locals(inner);
                }
            }
            Stmt::For(for_loop) => self.collect_locals(&for_loop.body),
            Stmt::While { body, .. } => self.collect_locals(body),
            Stmt::If {
                then_branch,
                else_branch,
                ..
            } => {
                self.collect_locals(then_branch);
                if let Some(else_branch) = else_branch {
                    self.collect_locals(else_branch);
                }
            }
            Stmt::Return(_) | Stmt::Expr(_) => {}
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&VarInfo> {
        self.vars.get(name)
    }

    /// True when a referenced variable must become a kernel parameter:
    /// it has global storage or pointer type.
    pub fn is_kernel_argument(&self, name: &str) -> bool {
        self.lookup(name).is_some_and(|info| {
            info.storage == Storage::Global || info.ty.is_pointer()
        })
    }
}

/// Computes expression result types against a symbol table
pub struct TypeResolver<'a> {
    symbols: &'a SymbolTable,
}

impl<'a> TypeResolver<'a> {
    pub const fn new(symbols: &'a SymbolTable) -> Self {
        Self { symbols }
    }

    /// Result type of an expression, or `None` when it cannot be resolved
    /// (unknown identifier, call, non-numeric operand).
    pub fn type_of(&self, expr: &Expr) -> Option<CType> {
        match expr {
            Expr::IntLit(_) => Some(CType::Int),
            // Float literals are single precision in this subset; see DESIGN.md
            Expr::FloatLit(_) => Some(CType::Float),
            Expr::Ident(name) => self.symbols.lookup(name).map(|info| info.ty.clone()),
            Expr::Unary { op, operand } => match op {
                UnaryOp::Neg | UnaryOp::PostInc | UnaryOp::PostDec => {
                    self.type_of(operand.value())
                }
            },
            Expr::Binary { op, left, right } => {
                if op.is_comparison() {
                    return Some(CType::Int);
                }
                let left = self.type_of(left.value())?;
                let right = self.type_of(right.value())?;
                if left.is_numeric() && right.is_numeric() {
                    Some(left.promote(&right))
                } else {
                    None
                }
            }
            Expr::Assign { target, .. } | Expr::CompoundAssign { target, .. } => {
                self.type_of(target.value())
            }
            Expr::Index { base, .. } => {
                let base_ty = self.type_of(base.value())?;
                base_ty.element_type().cloned()
            }
            Expr::Call { .. } => None,
            Expr::Cast { ty, .. } => Some(ty.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BinaryOp;
    use crate::lexer::lex;
    use crate::parser::Parser;

    fn function_symbols(source: &str) -> (TranslationUnit, String) {
        let (tokens, _) = lex(source);
        let unit = Parser::new(tokens).parse().expect("parse failed");
        let name = unit.functions().next().unwrap().name.clone();
        (unit, name)
    }

    fn table_for(unit: &TranslationUnit, name: &str) -> SymbolTable {
        let func = unit.functions().find(|f| f.name == name).unwrap();
        SymbolTable::for_function(unit, func)
    }

    #[test]
    fn params_and_locals_are_visible() {
        let (unit, name) = function_symbols("void f(float* arr, int n) { int i; }");
        let table = table_for(&unit, &name);
        assert_eq!(
            table.lookup("arr").unwrap().ty,
            CType::Pointer(Box::new(CType::Float))
        );
        assert_eq!(table.lookup("i").unwrap().storage, Storage::Local);
        assert!(table.lookup("missing").is_none());
    }

    #[test]
    fn pointer_params_and_globals_are_kernel_arguments() {
        let (unit, name) =
            function_symbols("float total;\nvoid f(float* arr, int n) { int i; }");
        let table = table_for(&unit, &name);
        assert!(table.is_kernel_argument("arr"));
        assert!(table.is_kernel_argument("total"));
        assert!(!table.is_kernel_argument("n"));
        assert!(!table.is_kernel_argument("i"));
    }

    #[test]
    fn subscript_resolves_to_element_type() {
        let (unit, name) = function_symbols("void f(float* arr, int n) { int i; arr[i]; }");
        let table = table_for(&unit, &name);
        let resolver = TypeResolver::new(&table);
        let expr = Expr::Index {
            base: Box::new(Spanned::new(Expr::Ident("arr".to_string()), (0, 0))),
            index: Box::new(Spanned::new(Expr::Ident("i".to_string()), (0, 0))),
        };
        assert_eq!(resolver.type_of(&expr), Some(CType::Float));
    }

    #[test]
    fn arithmetic_promotes_toward_floating() {
        let (unit, name) = function_symbols("void f(float x, int i) { }");
        let table = table_for(&unit, &name);
        let resolver = TypeResolver::new(&table);
        let expr = Expr::Binary {
            op: BinaryOp::Add,
            left: Box::new(Spanned::new(Expr::Ident("x".to_string()), (0, 0))),
            right: Box::new(Spanned::new(Expr::Ident("i".to_string()), (0, 0))),
        };
        assert_eq!(resolver.type_of(&expr), Some(CType::Float));
    }

    #[test]
    fn comparisons_are_int_typed() {
        let (unit, name) = function_symbols("void f(int i, int n) { }");
        let table = table_for(&unit, &name);
        let resolver = TypeResolver::new(&table);
        let expr = Expr::Binary {
            op: BinaryOp::Lt,
            left: Box::new(Spanned::new(Expr::Ident("i".to_string()), (0, 0))),
            right: Box::new(Spanned::new(Expr::Ident("n".to_string()), (0, 0))),
        };
        assert_eq!(resolver.type_of(&expr), Some(CType::Int));
    }

    #[test]
    fn local_array_is_not_a_kernel_argument() {
        let (unit, name) = function_symbols("void f(void) { float arr[16]; }");
        let table = table_for(&unit, &name);
        assert!(!table.is_kernel_argument("arr"));
        let resolver = TypeResolver::new(&table);
        let expr = Expr::Index {
            base: Box::new(Spanned::new(Expr::Ident("arr".to_string()), (0, 0))),
            index: Box::new(Spanned::new(Expr::IntLit(0), (0, 0))),
        };
        assert_eq!(resolver.type_of(&expr), Some(CType::Float));
    }
}
