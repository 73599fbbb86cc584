use crate::output::read_report;
use crate::utils::config::SCHEMA_VERSION;
use anyhow::Result;
use std::path::PathBuf;

/// Validate a report JSON file
pub fn validate_report_file(file_path: PathBuf) -> Result<()> {
    println!("Validating report: {}", file_path.display());

    let report = read_report(&file_path)?;

    println!("✓ Valid report JSON");
    println!("  Version: {}", report.version);
    println!("  Entry point: {}", report.root);
    println!("  Total stack usage: {} bytes", report.total_stack_usage);
    match report.budget {
        Some(budget) if report.within_budget() => println!("  Budget: {} bytes (ok)", budget),
        Some(budget) => println!("  Budget: {} bytes (EXCEEDED)", budget),
        None => println!("  Budget: none"),
    }
    println!("  Worst-case path depth: {}", report.worst_case_path.len());
    if report.unknown_functions.is_empty() {
        println!("  Functions without usage: none");
    } else {
        println!(
            "  Functions without usage: {}",
            report.unknown_functions.join(", ")
        );
    }
    println!("  Generated at: {}", report.generated_at);

    Ok(())
}

/// Display version information
pub fn display_version() {
    println!("stack-estimate v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Worst-case stack depth estimation for embedded firmware.");
}
