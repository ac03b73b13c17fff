use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use ma_lines_core::config::{PassConfig, PluginArgument};
use ma_lines_core::driver::{PassDriver, UnitSummary};
use ma_lines_core::model::load_translation_unit;
use serde::Serialize;

/// Options for `analyze`, as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    /// Output list; overrides a `file=` plugin argument.
    pub file: Option<PathBuf>,
    /// Raw `key=value` plugin arguments.
    pub plugin_args: Vec<String>,
    pub ipa_pta: bool,
    pub lock_timeout_ms: Option<u64>,
    pub json: bool,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeReport {
    pub output: String,
    pub units: Vec<UnitSummary>,
}

/// Build the pass configuration: defaults, then plugin arguments, then flags.
pub fn build_config(options: &AnalyzeOptions) -> Result<PassConfig> {
    let args = options
        .plugin_args
        .iter()
        .map(|raw| {
            raw.parse::<PluginArgument>()
                .with_context(|| format!("Invalid plugin argument \"{raw}\""))
        })
        .collect::<Result<Vec<_>>>()?;
    let mut config = PassConfig::from_plugin_args(&args).context("Invalid plugin arguments")?;
    if let Some(file) = &options.file {
        config.output_path = file.clone();
    }
    Ok(config.with_ipa_pta(options.ipa_pta).with_lock_timeout_ms(options.lock_timeout_ms))
}

/// Run the pass over every input unit, appending to the configured list.
pub fn analyze_command(inputs: &[PathBuf], options: &AnalyzeOptions) -> Result<()> {
    let config = Arc::new(build_config(options)?);
    let driver = PassDriver::with_file_recorder(Arc::clone(&config));

    let mut units = Vec::with_capacity(inputs.len());
    for input in inputs {
        let unit = load_translation_unit(input)?;
        units.push(driver.run_unit(&unit));
    }

    let report = AnalyzeReport { output: config.output_path.display().to_string(), units };
    if options.json {
        let serialized =
            serde_json::to_string_pretty(&report).context("Failed to serialize summary to JSON")?;
        println!("{}", serialized);
        return Ok(());
    }

    println!("Output: {}", report.output);
    for unit in &report.units {
        println!(
            "  - {} [functions: {}] writes={} reads={} calls={} skipped={}",
            unit.source_file,
            unit.functions.len(),
            unit.writes,
            unit.reads,
            unit.calls,
            unit.skipped
        );
    }
    Ok(())
}
