//! Wiring the analysis into a compilation.
//!
//! The host runs [`MemoryAccessPass`] once per function, at a point where all
//! whole-program analyses are complete. [`PassDriver`] plays that role for a
//! loaded translation unit.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::{ExprClassifier, FunctionSummary, StatementWalker, UnitAliasOracle};
use crate::config::PassConfig;
use crate::model::{Function, TranslationUnit};
use crate::recorder::{AccessSink, FileRecorder};

/// Where a pass is inserted relative to its reference pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassPosition {
    InsertBefore,
    InsertAfter,
    Replace,
}

/// How the pass registers itself in the host's pass pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassRegistration {
    pub name: &'static str,
    /// The pass is placed relative to this one; it runs after all IPA passes.
    pub reference_pass: &'static str,
    /// Which occurrence of the reference pass (1-based).
    pub reference_instance: u32,
    pub position: PassPosition,
    pub properties_required: &'static [&'static str],
}

pub const REGISTRATION: PassRegistration = PassRegistration {
    name: "racehound_ma_lines",
    reference_pass: "ehdisp",
    reference_instance: 1,
    position: PassPosition::InsertBefore,
    properties_required: &["ssa", "cfg"],
};

/// The per-function pass over one translation unit.
pub struct MemoryAccessPass<'a, S: AccessSink + ?Sized> {
    config: &'a PassConfig,
    unit: &'a TranslationUnit,
    oracle: &'a UnitAliasOracle,
    sink: &'a S,
}

impl<'a, S: AccessSink + ?Sized> MemoryAccessPass<'a, S> {
    pub fn new(
        config: &'a PassConfig,
        unit: &'a TranslationUnit,
        oracle: &'a UnitAliasOracle,
        sink: &'a S,
    ) -> Self {
        Self { config, unit, oracle, sink }
    }

    pub fn execute(&self, function: &Function) -> FunctionSummary {
        debug!("Processing function \"{}\"", function.name);
        let decls = self.unit.decl_table(function);
        let oracle = self.oracle.for_function(&function.name);
        let classifier = ExprClassifier::new(&decls, &oracle, self.config.ipa_pta);
        StatementWalker::new(classifier, self.sink).walk(function)
    }
}

/// Results for one translation unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSummary {
    pub source_file: String,
    pub reads: usize,
    pub writes: usize,
    pub calls: usize,
    pub skipped: usize,
    pub functions: Vec<FunctionSummary>,
}

impl UnitSummary {
    fn new(source_file: &str, functions: Vec<FunctionSummary>) -> Self {
        Self {
            source_file: source_file.to_string(),
            reads: functions.iter().map(|f| f.reads).sum(),
            writes: functions.iter().map(|f| f.writes).sum(),
            calls: functions.iter().map(|f| f.calls).sum(),
            skipped: functions.iter().flat_map(|f| f.skipped.values()).sum(),
            functions,
        }
    }

    pub fn records(&self) -> usize {
        self.reads + self.writes + self.calls
    }
}

/// Runs the pass over whole translation units with a fixed configuration.
pub struct PassDriver<S: AccessSink> {
    config: Arc<PassConfig>,
    sink: S,
}

impl<S: AccessSink> PassDriver<S> {
    pub fn new(config: Arc<PassConfig>, sink: S) -> Self {
        Self { config, sink }
    }

    pub fn config(&self) -> &PassConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Analyze every function of `unit`, in order.
    pub fn run_unit(&self, unit: &TranslationUnit) -> UnitSummary {
        let oracle = UnitAliasOracle::build(unit);
        let pass = MemoryAccessPass::new(&self.config, unit, &oracle, &self.sink);
        let functions = unit.functions.iter().map(|f| pass.execute(f)).collect();
        UnitSummary::new(&unit.source_file, functions)
    }
}

impl PassDriver<FileRecorder> {
    /// Driver appending to the configured output file.
    pub fn with_file_recorder(config: Arc<PassConfig>) -> Self {
        let sink = FileRecorder::from_config(&config);
        Self::new(config, sink)
    }
}
