//! Alias and escape queries.
//!
//! The classifier only talks to [`AliasOracle`]; [`UnitAliasOracle`] is the
//! bundled engine computing the answers from a whole translation unit with a
//! flow-insensitive, field-insensitive points-to analysis.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::model::{Callee, DeclId, Expr, Function, Rvalue, StatementKind, TranslationUnit};

/// Answers the alias/escape questions the classifier needs about a
/// declaration. Implementations are scoped to the function being analyzed.
pub trait AliasOracle {
    /// Address may be visible outside the current function.
    fn escapes(&self, decl: DeclId) -> bool;

    /// Address may be visible outside the translation unit. Only consulted
    /// when interprocedural points-to analysis ran.
    fn ipa_escapes(&self, decl: DeclId) -> bool {
        self.escapes(decl)
    }

    /// Storage may be referenced through some pointer in the unit.
    fn may_be_aliased(&self, decl: DeclId) -> bool;

    /// Storage is static (file scope, `static` or `extern`).
    fn is_global(&self, decl: DeclId) -> bool;
}

/// A points-to solution described by its special members only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointsToQuery {
    pub escaped: bool,
    pub ipa_escaped: bool,
    pub nonlocal: bool,
}

impl PointsToQuery {
    /// "May point to escaped, interprocedurally escaped or non-local
    /// storage". The IPA part only when `ipa_pta` is enabled.
    pub fn conservative(ipa_pta: bool) -> Self {
        Self { escaped: true, ipa_escaped: ipa_pta, nonlocal: true }
    }

    /// Whether a pointer with this solution may point to `decl`.
    pub fn includes(&self, oracle: &dyn AliasOracle, decl: DeclId) -> bool {
        (self.nonlocal && oracle.is_global(decl))
            || (self.escaped && oracle.escapes(decl))
            || (self.ipa_escaped && oracle.ipa_escapes(decl))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Node {
    Decl(DeclId),
    Ssa(String),
    /// Value loaded through a pointer that does not resolve to a declaration.
    Temp(usize),
}

/// Where a value flowing into an assignment, argument or return comes from.
enum Source {
    Address(DeclId),
    Copy(Node),
}

enum Dest {
    Node(Node),
    /// Storage visible to other code: globals and memory behind pointers.
    Escape,
}

/// Inclusion constraints of one function.
#[derive(Default)]
struct Constraints {
    /// `to ⊇ from`
    copies: Vec<(Node, Node)>,
    /// `to ⊇ *pointer`
    loads: Vec<(Node, Node)>,
    temps: usize,
}

impl Constraints {
    /// The value `expr` evaluates to, as a points-to source.
    fn source_of(&mut self, expr: &Expr) -> Option<Source> {
        match expr {
            Expr::AddressOf { target } => self.address_of(target),
            Expr::Ssa { name, .. } => Some(Source::Copy(Node::Ssa(name.clone()))),
            Expr::Var { decl } => Some(Source::Copy(Node::Decl(*decl))),
            // Field-insensitive: a component holds what its object holds.
            Expr::Field { base, .. } | Expr::Index { base, .. } => self.source_of(base),
            Expr::Deref { pointer, .. } => match self.source_of(pointer)? {
                Source::Address(decl) => Some(Source::Copy(Node::Decl(decl))),
                Source::Copy(node) => {
                    let temp = Node::Temp(self.temps);
                    self.temps += 1;
                    self.loads.push((temp.clone(), node));
                    Some(Source::Copy(temp))
                }
            },
            Expr::Constant { .. } => None,
        }
    }

    /// The address of `target`; for memory behind a pointer, that pointer.
    fn address_of(&mut self, target: &Expr) -> Option<Source> {
        match target {
            Expr::Var { decl } => Some(Source::Address(*decl)),
            Expr::Field { base, .. } | Expr::Index { base, .. } => self.address_of(base),
            Expr::Deref { pointer, .. } => self.source_of(pointer),
            Expr::Ssa { .. } | Expr::Constant { .. } | Expr::AddressOf { .. } => None,
        }
    }
}

/// Per-function escape facts.
#[derive(Debug, Default)]
struct FunctionFacts {
    escaped: HashSet<DeclId>,
}

/// Alias/escape facts for a whole translation unit.
#[derive(Debug, Default)]
pub struct UnitAliasOracle {
    globals: HashSet<DeclId>,
    address_taken: HashSet<DeclId>,
    functions: HashMap<String, FunctionFacts>,
    ipa_escaped: HashSet<DeclId>,
}

impl UnitAliasOracle {
    pub fn build(unit: &TranslationUnit) -> Self {
        let mut globals: HashSet<DeclId> =
            unit.globals.iter().filter(|d| d.is_global()).map(|d| d.id).collect();
        let mut address_taken: HashSet<DeclId> =
            unit.globals.iter().filter(|d| d.addressable).map(|d| d.id).collect();

        for function in &unit.functions {
            for decl in &function.decls {
                if decl.is_global() {
                    globals.insert(decl.id);
                }
                if decl.addressable {
                    address_taken.insert(decl.id);
                }
            }
            for expr in function.statements().flat_map(|s| statement_exprs(&s.kind)) {
                let mut taken = Vec::new();
                expr.collect_address_taken(&mut taken);
                address_taken.extend(taken);
            }
        }

        let mut functions = HashMap::new();
        let mut ipa_escaped = HashSet::new();
        for function in &unit.functions {
            let facts = solve_function(function, &globals);
            ipa_escaped.extend(facts.escaped.iter().copied());
            functions.insert(function.name.clone(), facts);
        }

        debug!(
            globals = globals.len(),
            address_taken = address_taken.len(),
            escaped = ipa_escaped.len(),
            "alias facts computed for {}",
            unit.source_file
        );

        Self { globals, address_taken, functions, ipa_escaped }
    }

    /// View of the facts from inside `function`.
    pub fn for_function(&self, function: &str) -> FunctionAliasOracle<'_> {
        FunctionAliasOracle { unit: self, facts: self.functions.get(function) }
    }
}

/// [`AliasOracle`] for one function of a unit.
#[derive(Debug, Clone, Copy)]
pub struct FunctionAliasOracle<'a> {
    unit: &'a UnitAliasOracle,
    facts: Option<&'a FunctionFacts>,
}

impl AliasOracle for FunctionAliasOracle<'_> {
    fn escapes(&self, decl: DeclId) -> bool {
        self.facts.is_some_and(|facts| facts.escaped.contains(&decl))
    }

    fn ipa_escapes(&self, decl: DeclId) -> bool {
        self.unit.ipa_escaped.contains(&decl)
    }

    fn may_be_aliased(&self, decl: DeclId) -> bool {
        self.unit.address_taken.contains(&decl)
    }

    fn is_global(&self, decl: DeclId) -> bool {
        self.unit.globals.contains(&decl)
    }
}

fn statement_exprs(kind: &StatementKind) -> Vec<&Expr> {
    match kind {
        StatementKind::Assign { lhs, rhs } => {
            let mut exprs = vec![lhs];
            exprs.extend(rhs.operands());
            exprs
        }
        StatementKind::Call { callee, args, lhs } => {
            let mut exprs: Vec<&Expr> = args.iter().chain(lhs.iter()).collect();
            if let Callee::Indirect(pointer) = callee {
                exprs.push(pointer);
            }
            exprs
        }
        StatementKind::Return { value } => value.iter().collect(),
        StatementKind::Nop => Vec::new(),
    }
}

fn dest_of(expr: &Expr, globals: &HashSet<DeclId>) -> Dest {
    match expr {
        Expr::Ssa { name, .. } => Dest::Node(Node::Ssa(name.clone())),
        _ => match expr.base_decl() {
            Some(decl) if !globals.contains(&decl) => Dest::Node(Node::Decl(decl)),
            _ => Dest::Escape,
        },
    }
}

fn solve_function(function: &Function, globals: &HashSet<DeclId>) -> FunctionFacts {
    let mut points_to: HashMap<Node, HashSet<DeclId>> = HashMap::new();
    let mut constraints = Constraints::default();
    let mut escaped: HashSet<DeclId> = HashSet::new();
    let mut escaping_nodes: Vec<Node> = Vec::new();

    let mut escape = |source: Source, escaped: &mut HashSet<DeclId>| match source {
        Source::Address(decl) => {
            escaped.insert(decl);
        }
        Source::Copy(node) => escaping_nodes.push(node),
    };

    for stmt in function.statements() {
        match &stmt.kind {
            StatementKind::Assign { rhs: Rvalue::Clobber, .. } => {}
            StatementKind::Assign { lhs, rhs } => {
                let dest = dest_of(lhs, globals);
                for operand in rhs.operands() {
                    let Some(source) = constraints.source_of(operand) else {
                        continue;
                    };
                    match (&dest, source) {
                        (Dest::Escape, source) => escape(source, &mut escaped),
                        (Dest::Node(node), Source::Address(decl)) => {
                            points_to.entry(node.clone()).or_default().insert(decl);
                        }
                        (Dest::Node(node), Source::Copy(from)) => {
                            constraints.copies.push((node.clone(), from));
                        }
                    }
                }
            }
            StatementKind::Call { args, .. } => {
                for arg in args {
                    if let Some(source) = constraints.source_of(arg) {
                        escape(source, &mut escaped);
                    }
                }
            }
            StatementKind::Return { value } => {
                if let Some(source) = value.as_ref().and_then(|v| constraints.source_of(v)) {
                    escape(source, &mut escaped);
                }
            }
            StatementKind::Nop => {}
        }
    }

    // Propagate copies and loads until the points-to sets are stable.
    let mut changed = true;
    while changed {
        changed = false;
        for (to, from) in &constraints.copies {
            let from_set = points_to.get(from).cloned().unwrap_or_default();
            changed |= union_into(&mut points_to, to, from_set);
        }
        for (to, pointer) in &constraints.loads {
            let loaded: HashSet<DeclId> = points_to
                .get(pointer)
                .into_iter()
                .flatten()
                .filter_map(|target| points_to.get(&Node::Decl(*target)))
                .flatten()
                .copied()
                .collect();
            changed |= union_into(&mut points_to, to, loaded);
        }
    }

    for node in &escaping_nodes {
        if let Some(set) = points_to.get(node) {
            escaped.extend(set.iter().copied());
        }
    }

    // Anything reachable through escaped storage escapes as well.
    let mut worklist: Vec<DeclId> = escaped.iter().copied().collect();
    while let Some(decl) = worklist.pop() {
        if let Some(set) = points_to.get(&Node::Decl(decl)) {
            for &target in set {
                if escaped.insert(target) {
                    worklist.push(target);
                }
            }
        }
    }

    FunctionFacts { escaped }
}

fn union_into(
    points_to: &mut HashMap<Node, HashSet<DeclId>>,
    to: &Node,
    from: HashSet<DeclId>,
) -> bool {
    if from.is_empty() {
        return false;
    }
    let to_set = points_to.entry(to.clone()).or_default();
    let before = to_set.len();
    to_set.extend(from);
    to_set.len() != before
}
