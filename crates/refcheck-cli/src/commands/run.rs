//! Run - Conformance Suite Command
//!
//! Runs every selected case against the reference backend and exits
//! non-zero if any case fails.
//!
//! @version 0.1.0
//! @author `AutomataNexus` Development Team

use refcheck_onnx::{run_suite, HarnessConfig, ReferenceBackend, SuiteReport};
use tracing::debug;

use super::utils::{print_failure, print_header, print_kv, print_success};
use crate::cli::RunArgs;
use crate::config::ProjectConfig;
use crate::error::{CliError, CliResult};

// =============================================================================
// Execute Command
// =============================================================================

/// Execute the `run` command
pub fn execute(args: RunArgs) -> CliResult<()> {
    let project = ProjectConfig::discover(args.config.as_deref())?;
    let config = merge(project.harness, &args);
    debug!(?config, "resolved harness configuration");

    print_header("Conformance Suite");
    print_kv("Decimal", &config.decimal.to_string());
    print_kv("Seed", &config.seed.to_string());
    if let Some(filter) = &config.filter {
        print_kv("Filter", filter);
    }
    println!();

    let report = run_suite(&ReferenceBackend, &config)?;
    print_report(&report);

    if report.total() == 0 {
        return Err(CliError::InvalidArgument(
            "filter selected no conformance cases".to_string(),
        ));
    }
    if !report.is_success() {
        return Err(CliError::CasesFailed(report.failures.len()));
    }
    Ok(())
}

/// Applies command-line flags on top of the file configuration.
fn merge(mut config: HarnessConfig, args: &RunArgs) -> HarnessConfig {
    if let Some(filter) = &args.filter {
        config.filter = Some(filter.clone());
    }
    if let Some(decimal) = args.decimal {
        config.decimal = decimal;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    config.parallel |= args.parallel;
    config
}

fn print_report(report: &SuiteReport) {
    for name in &report.passed {
        print_success(name);
    }
    for failure in &report.failures {
        print_failure(&format!("{}: {}", failure.name, failure.error));
    }

    println!();
    let summary = format!(
        "{} passed, {} failed on backend '{}'",
        report.passed.len(),
        report.failures.len(),
        report.backend
    );
    if report.is_success() {
        print_success(&summary);
    } else {
        print_failure(&summary);
    }
}

// =============================================================================
// Tests
// =============================================================================
