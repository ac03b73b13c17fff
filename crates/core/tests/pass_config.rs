use std::path::PathBuf;
use std::time::Duration;

use ma_lines_core::config::{ConfigError, PassConfig, PluginArgument, DEFAULT_OUTPUT_FILE};

#[test]
fn defaults_to_relative_list_file() {
    let config = PassConfig::default();
    assert_eq!(config.output_path, PathBuf::from("./dump_memory_accesses.list"));
    assert_eq!(DEFAULT_OUTPUT_FILE, "./dump_memory_accesses.list");
    assert!(!config.ipa_pta);
    assert_eq!(config.lock_timeout(), None);
}

#[test]
fn file_argument_selects_output_path() {
    let args = vec!["file=/tmp/out.list".parse::<PluginArgument>().expect("plugin argument")];
    let config = PassConfig::from_plugin_args(&args).expect("config from plugin arguments");
    assert_eq!(config.output_path, PathBuf::from("/tmp/out.list"));
}

#[test]
fn unknown_arguments_are_ignored() {
    let args = vec![PluginArgument::new("verbose", "1"), PluginArgument::new("file", "x.list")];
    let config = PassConfig::from_plugin_args(&args).expect("config from plugin arguments");
    assert_eq!(config.output_path, PathBuf::from("x.list"));
}

#[test]
fn empty_file_argument_is_rejected() {
    let args = vec!["file".parse::<PluginArgument>().expect("plugin argument")];
    assert_eq!(PassConfig::from_plugin_args(&args), Err(ConfigError::EmptyOutputPath));
    assert!(matches!("=x".parse::<PluginArgument>(), Err(ConfigError::EmptyKey(_))));
}

#[test]
fn argument_value_may_contain_equals_signs() {
    let arg: PluginArgument = "file=out=1.list".parse().expect("plugin argument");
    assert_eq!(arg, PluginArgument::new("file", "out=1.list"));
}

#[test]
fn builder_sets_ipa_and_lock_timeout() {
    let config = PassConfig::new("a.list").with_ipa_pta(true).with_lock_timeout_ms(Some(250));
    assert!(config.ipa_pta);
    assert_eq!(config.lock_timeout(), Some(Duration::from_millis(250)));

    let json = serde_json::to_string(&config).expect("serialize config");
    let back: PassConfig = serde_json::from_str(&json).expect("deserialize config");
    assert_eq!(back, config);
}
