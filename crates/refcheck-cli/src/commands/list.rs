//! List - Conformance Case Listing
//!
//! @version 0.1.0
//! @author `AutomataNexus` Development Team

use std::fs;

use colored::Colorize;
use refcheck_onnx::conformance_suite;

use super::utils::{print_header, print_info, print_success};
use crate::cli::ListArgs;
use crate::error::CliResult;

/// Execute the `list` command
pub fn execute(args: ListArgs) -> CliResult<()> {
    let cases = conformance_suite(0)?;
    let selected: Vec<_> = cases
        .iter()
        .filter(|c| args.filter.as_deref().map_or(true, |f| c.name.contains(f)))
        .collect();

    print_header("Conformance Cases");
    for case in &selected {
        println!("  {:<52} {}", case.name, case.node.op_type.cyan());
    }
    println!();
    print_info(&format!("{} of {} cases", selected.len(), cases.len()));

    if let Some(dir) = &args.export {
        fs::create_dir_all(dir)?;
        for case in &selected {
            fs::write(dir.join(format!("{}.json", case.name)), case.node.to_json()?)?;
        }
        print_success(&format!(
            "Wrote {} node descriptors to {}",
            selected.len(),
            dir.display()
        ));
    }
    Ok(())
}
