use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::SourceLocation;

/// Identifier of a declaration, unique within a translation unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeclId(pub u32);

impl fmt::Display for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "D.{}", self.0)
    }
}

/// Static type of an expression or declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Type {
    #[serde(default)]
    pub name: String,
    /// Size in bytes; `None` for incomplete or unsized types.
    #[serde(default)]
    pub size: Option<u64>,
}

impl Type {
    pub fn sized(name: impl Into<String>, size: u64) -> Self {
        Self { name: name.into(), size: Some(size) }
    }

    pub fn unsized_type(name: impl Into<String>) -> Self {
        Self { name: name.into(), size: None }
    }

    /// Byte size if it is known and positive.
    pub fn positive_size(&self) -> Option<u64> {
        self.size.filter(|&size| size > 0)
    }
}

/// Where a declaration's storage lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Storage {
    /// File-scope variable defined in this unit.
    Global,
    /// Function-scope or file-scope `static`.
    Static,
    /// Declared here, defined elsewhere (`extern`).
    External,
    /// Automatic variable.
    Local,
    Parameter,
}

impl Storage {
    /// Whether storage outlives a single activation of the function.
    pub fn is_global(self) -> bool {
        matches!(self, Storage::Global | Storage::Static | Storage::External)
    }
}

/// A variable or parameter declaration and its host-side attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decl {
    pub id: DeclId,
    pub name: String,
    #[serde(default)]
    pub ty: Type,
    pub storage: Storage,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub volatile: bool,
    /// Register name for `register int x asm("r12")` style variables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hard_register: Option<String>,
    /// Set by the host when the address is known to be taken elsewhere.
    #[serde(default)]
    pub addressable: bool,
}

impl Decl {
    pub fn new(id: u32, name: impl Into<String>, ty: Type, storage: Storage) -> Self {
        Self {
            id: DeclId(id),
            name: name.into(),
            ty,
            storage,
            read_only: false,
            volatile: false,
            hard_register: None,
            addressable: false,
        }
    }

    pub fn is_global(&self) -> bool {
        self.storage.is_global()
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn addressable(mut self) -> Self {
        self.addressable = true;
        self
    }

    pub fn in_register(mut self, register: impl Into<String>) -> Self {
        self.hard_register = Some(register.into());
        self
    }
}

/// Array index operand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexValue {
    Constant(u64),
    /// Index held in a register (SSA name); not known statically.
    Variable(String),
}

/// An operand or memory reference in the lowered IR.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "expr", rename_all = "snake_case")]
pub enum Expr {
    /// Register temporary.
    Ssa {
        name: String,
        #[serde(default)]
        ty: Type,
    },
    Constant {
        value: i64,
        #[serde(default)]
        ty: Type,
    },
    /// The storage of a declaration.
    Var { decl: DeclId },
    /// Struct or union member; `bit_offset` is relative to `base`.
    Field {
        base: Box<Expr>,
        bit_offset: u64,
        bit_size: u64,
        #[serde(default)]
        ty: Type,
    },
    /// Array element of type `ty`.
    Index {
        base: Box<Expr>,
        index: IndexValue,
        #[serde(default)]
        ty: Type,
    },
    /// Memory at `pointer + offset` bytes.
    Deref {
        pointer: Box<Expr>,
        #[serde(default)]
        offset: i64,
        #[serde(default)]
        ty: Type,
        #[serde(default)]
        read_only: bool,
        #[serde(default)]
        volatile: bool,
    },
    AddressOf { target: Box<Expr> },
}

impl Expr {
    pub fn var(decl: DeclId) -> Self {
        Expr::Var { decl }
    }

    pub fn ssa(name: impl Into<String>, ty: Type) -> Self {
        Expr::Ssa { name: name.into(), ty }
    }

    pub fn constant(value: i64, ty: Type) -> Self {
        Expr::Constant { value, ty }
    }

    pub fn field(base: Expr, bit_offset: u64, bit_size: u64, ty: Type) -> Self {
        Expr::Field { base: Box::new(base), bit_offset, bit_size, ty }
    }

    pub fn index(base: Expr, index: IndexValue, ty: Type) -> Self {
        Expr::Index { base: Box::new(base), index, ty }
    }

    pub fn deref(pointer: Expr, offset: i64, ty: Type) -> Self {
        Expr::Deref { pointer: Box::new(pointer), offset, ty, read_only: false, volatile: false }
    }

    pub fn address_of(target: Expr) -> Self {
        Expr::AddressOf { target: Box::new(target) }
    }

    /// Whether the expression designates memory (as opposed to a register
    /// value, a constant or an address computation).
    pub fn is_memory(&self) -> bool {
        matches!(
            self,
            Expr::Var { .. } | Expr::Field { .. } | Expr::Index { .. } | Expr::Deref { .. }
        )
    }

    /// Static type of the expression, if it carries one.
    pub fn ty<'a>(&'a self, decls: &DeclTable<'a>) -> Option<&'a Type> {
        match self {
            Expr::Var { decl } => decls.get(*decl).map(|d| &d.ty),
            Expr::Ssa { ty, .. }
            | Expr::Constant { ty, .. }
            | Expr::Field { ty, .. }
            | Expr::Index { ty, .. }
            | Expr::Deref { ty, .. } => Some(ty),
            Expr::AddressOf { .. } => None,
        }
    }

    /// Declaration whose storage this reference lies in, looking through
    /// component references and `*&decl`.
    pub fn base_decl(&self) -> Option<DeclId> {
        match self {
            Expr::Var { decl } => Some(*decl),
            Expr::Field { base, .. } | Expr::Index { base, .. } => base.base_decl(),
            Expr::Deref { pointer, .. } => match pointer.as_ref() {
                Expr::AddressOf { target } => target.base_decl(),
                _ => None,
            },
            Expr::Ssa { .. } | Expr::Constant { .. } | Expr::AddressOf { .. } => None,
        }
    }

    /// Collect every declaration whose address is computed somewhere inside
    /// this expression tree.
    pub fn collect_address_taken(&self, out: &mut Vec<DeclId>) {
        match self {
            Expr::AddressOf { target } => {
                if let Some(decl) = target.base_decl() {
                    out.push(decl);
                }
                target.collect_address_taken(out);
            }
            Expr::Field { base, .. } | Expr::Index { base, .. } => base.collect_address_taken(out),
            Expr::Deref { pointer, .. } => {
                // `*&x` is a plain access to `x`, not an address escape.
                if let Expr::AddressOf { target } = pointer.as_ref() {
                    target.collect_address_taken(out);
                } else {
                    pointer.collect_address_taken(out);
                }
            }
            Expr::Var { .. } | Expr::Ssa { .. } | Expr::Constant { .. } => {}
        }
    }
}

/// Right-hand side of an assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rvalue", rename_all = "snake_case")]
pub enum Rvalue {
    /// Single operand: a copy, or a load when the operand is memory.
    Use { operand: Expr },
    Unary { op: String, operand: Expr },
    Binary { op: String, lhs: Expr, rhs: Expr },
    /// Marks the lhs storage as dead (`x = {CLOBBER}`); not an access.
    Clobber,
}

impl Rvalue {
    pub fn operands(&self) -> Vec<&Expr> {
        match self {
            Rvalue::Use { operand } | Rvalue::Unary { operand, .. } => vec![operand],
            Rvalue::Binary { lhs, rhs, .. } => vec![lhs, rhs],
            Rvalue::Clobber => Vec::new(),
        }
    }
}

/// Target of a call statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Callee {
    /// Call of a named function declaration.
    Direct(String),
    /// Call through a function pointer.
    Indirect(Expr),
}

impl Callee {
    /// Symbol name of a direct callee.
    pub fn name(&self) -> Option<&str> {
        match self {
            Callee::Direct(name) => Some(name),
            Callee::Indirect(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum StatementKind {
    Assign {
        lhs: Expr,
        rhs: Rvalue,
    },
    Call {
        callee: Callee,
        #[serde(default)]
        args: Vec<Expr>,
        #[serde(default)]
        lhs: Option<Expr>,
    },
    Return {
        #[serde(default)]
        value: Option<Expr>,
    },
    Nop,
}

/// A statement with its debug location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    #[serde(default)]
    pub location: SourceLocation,
    #[serde(flatten)]
    pub kind: StatementKind,
}

impl Statement {
    pub fn new(location: SourceLocation, kind: StatementKind) -> Self {
        Self { location, kind }
    }

    pub fn assign(location: SourceLocation, lhs: Expr, rhs: Rvalue) -> Self {
        Self::new(location, StatementKind::Assign { lhs, rhs })
    }

    pub fn call(location: SourceLocation, name: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::new(
            location,
            StatementKind::Call { callee: Callee::Direct(name.into()), args, lhs: None },
        )
    }

    pub fn is_call(&self) -> bool {
        matches!(self.kind, StatementKind::Call { .. })
    }

    pub fn is_clobber(&self) -> bool {
        matches!(self.kind, StatementKind::Assign { rhs: Rvalue::Clobber, .. })
    }

    /// The stored-to reference of an assignment that writes memory.
    pub fn store_operand(&self) -> Option<&Expr> {
        match &self.kind {
            StatementKind::Assign { rhs: Rvalue::Clobber, .. } => None,
            StatementKind::Assign { lhs, .. } if lhs.is_memory() => Some(lhs),
            _ => None,
        }
    }

    /// The loaded-from reference of an assignment that reads memory.
    pub fn load_operand(&self) -> Option<&Expr> {
        match &self.kind {
            StatementKind::Assign { rhs: Rvalue::Use { operand }, .. } if operand.is_memory() => {
                Some(operand)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicBlock {
    pub index: u32,
    #[serde(default)]
    pub statements: Vec<Statement>,
}

/// A function body after lowering, with its own local declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    /// Parameters and locals (function-scope statics included).
    #[serde(default)]
    pub decls: Vec<Decl>,
    #[serde(default)]
    pub blocks: Vec<BasicBlock>,
}

impl Function {
    pub fn statements(&self) -> impl Iterator<Item = &Statement> {
        self.blocks.iter().flat_map(|bb| bb.statements.iter())
    }
}

/// One compiled source file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationUnit {
    pub source_file: String,
    #[serde(default)]
    pub globals: Vec<Decl>,
    #[serde(default)]
    pub functions: Vec<Function>,
}

impl TranslationUnit {
    pub fn decl_table<'a>(&'a self, function: &'a Function) -> DeclTable<'a> {
        DeclTable::new(self, function)
    }
}

/// Declarations visible from one function: unit globals plus its own decls.
#[derive(Debug, Clone, Default)]
pub struct DeclTable<'a> {
    decls: HashMap<DeclId, &'a Decl>,
}

impl<'a> DeclTable<'a> {
    pub fn new(unit: &'a TranslationUnit, function: &'a Function) -> Self {
        let decls =
            unit.globals.iter().chain(function.decls.iter()).map(|d| (d.id, d)).collect();
        Self { decls }
    }

    pub fn get(&self, id: DeclId) -> Option<&'a Decl> {
        self.decls.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}
