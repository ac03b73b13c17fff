use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::analysis::calls::is_interesting_call;
use crate::analysis::classify::{Classification, ExprClassifier, SkipReason};
use crate::model::{AccessKind, Expr, Function, Statement, StatementKind};
use crate::recorder::AccessSink;

/// What the walker saw in one function. Diagnostics only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSummary {
    pub function: String,
    pub statements: usize,
    pub reads: usize,
    pub writes: usize,
    /// Calls to known primitives.
    pub calls: usize,
    pub skipped: BTreeMap<SkipReason, usize>,
}

impl FunctionSummary {
    pub fn new(function: impl Into<String>) -> Self {
        Self { function: function.into(), ..Self::default() }
    }

    /// Records handed to the sink.
    pub fn records(&self) -> usize {
        self.reads + self.writes + self.calls
    }

    fn count(&mut self, kind: AccessKind) {
        match kind {
            AccessKind::Read => self.reads += 1,
            AccessKind::Write => self.writes += 1,
            AccessKind::Both => self.calls += 1,
        }
    }
}

/// Visits every statement of a function and reports its accesses.
pub struct StatementWalker<'a, S: AccessSink + ?Sized> {
    classifier: ExprClassifier<'a>,
    sink: &'a S,
}

impl<'a, S: AccessSink + ?Sized> StatementWalker<'a, S> {
    pub fn new(classifier: ExprClassifier<'a>, sink: &'a S) -> Self {
        Self { classifier, sink }
    }

    pub fn walk(&self, function: &Function) -> FunctionSummary {
        let mut summary = FunctionSummary::new(&function.name);
        for bb in &function.blocks {
            for stmt in &bb.statements {
                summary.statements += 1;
                self.visit(stmt, &mut summary);
            }
        }
        debug!(
            function = %function.name,
            statements = summary.statements,
            records = summary.records(),
            "processed function"
        );
        summary
    }

    fn visit(&self, stmt: &Statement, summary: &mut FunctionSummary) {
        if let StatementKind::Call { callee, .. } = &stmt.kind {
            if is_interesting_call(callee) {
                self.emit(stmt, AccessKind::Both, summary);
            }
        } else if matches!(stmt.kind, StatementKind::Assign { .. }) && !stmt.is_clobber() {
            if let Some(lhs) = stmt.store_operand() {
                self.process_expr(stmt, lhs, true, summary);
            }
            if let Some(rhs) = stmt.load_operand() {
                self.process_expr(stmt, rhs, false, summary);
            }
        }
    }

    fn process_expr(
        &self,
        stmt: &Statement,
        expr: &Expr,
        is_write: bool,
        summary: &mut FunctionSummary,
    ) {
        match self.classifier.classify(expr, is_write) {
            Classification::Interesting(kind) => self.emit(stmt, kind, summary),
            Classification::Skip(reason) => {
                trace!(location = %stmt.location, reason = reason.as_str(), "skipped");
                *summary.skipped.entry(reason).or_default() += 1;
            }
        }
    }

    fn emit(&self, stmt: &Statement, kind: AccessKind, summary: &mut FunctionSummary) {
        self.sink.record(&stmt.location, kind);
        summary.count(kind);
    }
}
