//! Analyzer assembly from configuration

use goanalyze_core::{Analyzer, AnalyzerConfig, BoxInspection, InspectionSettings};
use goanalyze_exprs::{
    arguments, calls, duplicates, loop_address, operators, receiver, slices, string_index,
};

/// Every inspection the facade knows, in run order.
pub const INSPECTIONS: [&str; 10] = [
    goanalyze_assign::NAME,
    goanalyze_printf::NAME,
    operators::NAME,
    arguments::NAME,
    calls::NAME,
    duplicates::NAME,
    string_index::NAME,
    loop_address::NAME,
    receiver::NAME,
    slices::NAME,
];

/// Check if an inspection should be loaded based on config.
/// Returns true if: no config, no inspection entry, or enabled != false
fn should_load_inspection(config: Option<&AnalyzerConfig>, key: &str) -> bool {
    config.is_none_or(|c| c.is_enabled(key))
}

fn load(
    analyzer: &mut Analyzer,
    config: Option<&AnalyzerConfig>,
    key: &str,
    default: fn() -> BoxInspection,
    configured: impl Fn(&InspectionSettings) -> BoxInspection,
) {
    if !should_load_inspection(config, key) {
        tracing::info!(inspection = key, "inspection disabled by configuration");
        return;
    }
    match config.and_then(|c| c.settings(key)) {
        Some(settings) => analyzer.add_inspection(configured(settings)),
        None => analyzer.add_inspection(default()),
    }
}

/// Build an analyzer with every enabled inspection.
///
/// Without configuration all inspections run with their defaults.
#[must_use]
pub fn init_analyzer(config: Option<&AnalyzerConfig>) -> Analyzer {
    let mut analyzer = Analyzer::new();
    if let Some(depth) = config.and_then(|c| c.analysis.max_inference_depth) {
        analyzer = analyzer.with_max_inference_depth(depth);
    }

    load(
        &mut analyzer,
        config,
        goanalyze_assign::NAME,
        goanalyze_assign::init_inspection,
        |s| goanalyze_assign::init_inspection_with_config(goanalyze_assign::config_from_settings(s)),
    );
    load(
        &mut analyzer,
        config,
        goanalyze_printf::NAME,
        goanalyze_printf::init_inspection,
        |s| goanalyze_printf::init_inspection_with_config(goanalyze_printf::config_from_settings(s)),
    );
    load(
        &mut analyzer,
        config,
        operators::NAME,
        operators::init_inspection,
        |s| operators::init_inspection_with_config(operators::config_from_settings(s)),
    );
    load(
        &mut analyzer,
        config,
        arguments::NAME,
        arguments::init_inspection,
        |s| arguments::init_inspection_with_config(arguments::config_from_settings(s)),
    );
    load(
        &mut analyzer,
        config,
        calls::NAME,
        calls::init_inspection,
        |s| calls::init_inspection_with_config(calls::config_from_settings(s)),
    );
    load(
        &mut analyzer,
        config,
        duplicates::NAME,
        duplicates::init_inspection,
        |s| duplicates::init_inspection_with_config(duplicates::config_from_settings(s)),
    );
    load(
        &mut analyzer,
        config,
        string_index::NAME,
        string_index::init_inspection,
        |s| string_index::init_inspection_with_config(string_index::config_from_settings(s)),
    );
    load(
        &mut analyzer,
        config,
        loop_address::NAME,
        loop_address::init_inspection,
        |s| loop_address::init_inspection_with_config(loop_address::config_from_settings(s)),
    );
    load(
        &mut analyzer,
        config,
        receiver::NAME,
        receiver::init_inspection,
        |s| receiver::init_inspection_with_config(receiver::config_from_settings(s)),
    );
    load(
        &mut analyzer,
        config,
        slices::NAME,
        slices::init_inspection,
        |s| slices::init_inspection_with_config(slices::config_from_settings(s)),
    );

    analyzer
}
