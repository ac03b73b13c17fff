//! Decides whether a memory reference on one side of an assignment is worth
//! reporting.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::analysis::oracle::{AliasOracle, PointsToQuery};
use crate::analysis::reference::{inner_reference, Base};
use crate::model::{AccessKind, DeclTable, Expr};

/// Why a candidate reference was not reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Incomplete, unsized or zero-sized type.
    UnsizedType,
    /// Base declaration is provably local to the function.
    DoesNotEscape,
    /// Neither global nor referenced through any pointer.
    NotAliased,
    ReadOnly,
    /// Variable bound to a hardware register.
    HardRegister,
    /// Bit-field or otherwise misaligned sub-word access.
    PartialAccess,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SkipReason::UnsizedType => "unsized_type",
            SkipReason::DoesNotEscape => "does_not_escape",
            SkipReason::NotAliased => "not_aliased",
            SkipReason::ReadOnly => "read_only",
            SkipReason::HardRegister => "hard_register",
            SkipReason::PartialAccess => "partial_access",
        }
    }
}

/// Outcome of classifying one candidate reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Interesting(AccessKind),
    Skip(SkipReason),
}

/// Expression classifier for one function.
pub struct ExprClassifier<'a> {
    decls: &'a DeclTable<'a>,
    oracle: &'a dyn AliasOracle,
    query: PointsToQuery,
}

impl<'a> ExprClassifier<'a> {
    /// `ipa_pta` tells whether interprocedural points-to analysis ran for
    /// this compilation.
    pub fn new(decls: &'a DeclTable<'a>, oracle: &'a dyn AliasOracle, ipa_pta: bool) -> Self {
        Self { decls, oracle, query: PointsToQuery::conservative(ipa_pta) }
    }

    /// Classify `expr`, the destination (`is_write`) or the source operand of
    /// an assignment.
    pub fn classify(&self, expr: &Expr, is_write: bool) -> Classification {
        let Some(size) = expr.ty(self.decls).and_then(|ty| ty.positive_size()) else {
            return Classification::Skip(SkipReason::UnsizedType);
        };
        let Some(inner) = inner_reference(expr, self.decls) else {
            return Classification::Skip(SkipReason::UnsizedType);
        };

        let (read_only, hard_register) = match inner.base {
            Base::Decl(id) => {
                if !self.query.includes(self.oracle, id) {
                    trace!(decl = %id, "does not escape");
                    return Classification::Skip(SkipReason::DoesNotEscape);
                }
                if !self.oracle.is_global(id) && !self.oracle.may_be_aliased(id) {
                    trace!(decl = %id, "neither global nor may be aliased");
                    return Classification::Skip(SkipReason::NotAliased);
                }
                self.decls
                    .get(id)
                    .map(|decl| (decl.read_only, decl.hard_register.is_some()))
                    .unwrap_or((false, false))
            }
            Base::Memory { read_only } => (read_only, false),
        };
        if read_only {
            return Classification::Skip(SkipReason::ReadOnly);
        }
        if hard_register {
            return Classification::Skip(SkipReason::HardRegister);
        }

        // TODO: report bit-field accesses as touching the enclosing aligned unit.
        if !inner.is_naturally_aligned(size) {
            return Classification::Skip(SkipReason::PartialAccess);
        }

        Classification::Interesting(if is_write { AccessKind::Write } else { AccessKind::Read })
    }
}
