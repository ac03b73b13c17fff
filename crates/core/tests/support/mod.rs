#![allow(dead_code)]

use std::sync::Arc;

use ma_lines_core::config::PassConfig;
use ma_lines_core::driver::{PassDriver, UnitSummary};
use ma_lines_core::model::{
    AccessRecord, BasicBlock, Decl, DeclId, Expr, Function, Rvalue, SourceLocation, Statement,
    Storage, TranslationUnit, Type,
};
use ma_lines_core::recorder::MemorySink;

pub const FILE: &str = "thisfile.c";

pub fn int() -> Type {
    Type::sized("int", 4)
}

pub fn ptr() -> Type {
    Type::sized("int *", 8)
}

pub fn at(line: u32) -> SourceLocation {
    SourceLocation::new(FILE, line)
}

pub fn global(id: u32, name: &str) -> Decl {
    Decl::new(id, name, int(), Storage::Global)
}

pub fn local(id: u32, name: &str) -> Decl {
    Decl::new(id, name, int(), Storage::Local)
}

pub fn param(id: u32, name: &str) -> Decl {
    Decl::new(id, name, int(), Storage::Parameter)
}

pub fn var(id: u32) -> Expr {
    Expr::var(DeclId(id))
}

pub fn ssa(name: &str) -> Expr {
    Expr::ssa(name, int())
}

pub fn copy(line: u32, lhs: Expr, rhs: Expr) -> Statement {
    Statement::assign(at(line), lhs, Rvalue::Use { operand: rhs })
}

pub fn function(name: &str, decls: Vec<Decl>, statements: Vec<Statement>) -> Function {
    Function { name: name.to_string(), decls, blocks: vec![BasicBlock { index: 2, statements }] }
}

pub fn unit(globals: Vec<Decl>, functions: Vec<Function>) -> TranslationUnit {
    TranslationUnit { source_file: FILE.to_string(), globals, functions }
}

/// Run the pass with an in-memory sink and the given config.
pub fn analyze_with(
    unit: &TranslationUnit,
    config: PassConfig,
) -> (Vec<AccessRecord>, UnitSummary) {
    let driver = PassDriver::new(Arc::new(config), MemorySink::new());
    let summary = driver.run_unit(unit);
    (driver.sink().records(), summary)
}

pub fn analyze(unit: &TranslationUnit) -> (Vec<AccessRecord>, UnitSummary) {
    analyze_with(unit, PassConfig::default())
}
