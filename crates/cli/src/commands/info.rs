use anyhow::{Context, Result};
use ma_lines_core::analysis::KNOWN_PRIMITIVES;
use ma_lines_core::config::PassConfig;
use ma_lines_core::driver::{PassRegistration, REGISTRATION};
use serde::Serialize;

use crate::commands::{build_config, AnalyzeOptions};

#[derive(Serialize)]
pub struct RegistrationSnapshot {
    pub registration: PassRegistration,
    pub config: PassConfig,
}

/// List the functions whose calls are reported as a whole.
pub fn primitives_command(json: bool) -> Result<()> {
    if json {
        let serialized = serde_json::to_string_pretty(KNOWN_PRIMITIVES)
            .context("Failed to serialize primitives to JSON")?;
        println!("{}", serialized);
        return Ok(());
    }

    println!("Known primitives ({}):", KNOWN_PRIMITIVES.len());
    for name in KNOWN_PRIMITIVES {
        println!("  - {name}");
    }
    Ok(())
}

/// Show where the pass is inserted and the effective configuration.
pub fn registration_command(options: &AnalyzeOptions, json: bool) -> Result<()> {
    let snapshot =
        RegistrationSnapshot { registration: REGISTRATION, config: build_config(options)? };
    if json {
        let serialized = serde_json::to_string_pretty(&snapshot)
            .context("Failed to serialize registration to JSON")?;
        println!("{}", serialized);
        return Ok(());
    }

    let reg = &snapshot.registration;
    println!("Pass: {}", reg.name);
    println!(
        "Position: {:?} instance {} of \"{}\"",
        reg.position, reg.reference_instance, reg.reference_pass
    );
    println!("Requires: {}", reg.properties_required.join(", "));
    println!("Output file: {}", snapshot.config.output_path.display());
    println!("IPA points-to: {}", if snapshot.config.ipa_pta { "enabled" } else { "disabled" });
    match snapshot.config.lock_timeout_ms {
        Some(ms) => println!("Lock wait: {ms} ms"),
        None => println!("Lock wait: blocking"),
    }
    Ok(())
}
