//! Analyze command implementation.
//!
//! The analyze command:
//! 1. Reads stack usage records
//! 2. Parses them into the function table
//! 3. Obtains the call listing
//! 4. Builds the call graph
//! 5. Estimates worst-case stack totals
//! 6. Reports (and checks the budget)

use super::models::AnalyzeArgs;
use crate::aggregator::{
    calculate_frame_distribution, estimate_stack_usage, heaviest_frames, worst_case_path,
};
use crate::output::{render_tree, write_report};
use crate::parser::{build_call_graph, parse_usage_lines, CallGraph, StackReport, UsageTable};
use crate::toolchain::{find_latest_usage_file, read_lines, resolve_make_path, CflowRunner};
use crate::utils::config::SCHEMA_VERSION;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::path::PathBuf;
use std::time::Instant;

/// Outcome of the core analysis
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Function table with edges and totals filled in
    pub table: UsageTable,

    /// Entry point and listing anomalies
    pub graph: CallGraph,

    /// Worst-case stack bytes from the entry point
    pub total: u64,
}

/// Run the three analysis phases over in-memory input
///
/// **Public** - the pipeline without any file or process access
///
/// The function table is handed from usage parsing to the call graph builder
/// to the estimator, each extending it in turn.
pub fn analyze_lines<U, C>(usage_lines: &[U], listing_lines: &[C]) -> Result<Analysis>
where
    U: AsRef<str>,
    C: AsRef<str>,
{
    let mut table = parse_phase(usage_lines)?;
    let graph = graph_phase(&mut table, listing_lines)?;
    let total = estimate_phase(&mut table, &graph)?;

    Ok(Analysis {
        table,
        graph,
        total,
    })
}

fn parse_phase<U: AsRef<str>>(usage_lines: &[U]) -> Result<UsageTable> {
    parse_usage_lines(usage_lines).context("Failed to parse stack usage records")
}

fn graph_phase<C: AsRef<str>>(table: &mut UsageTable, listing_lines: &[C]) -> Result<CallGraph> {
    build_call_graph(table, listing_lines).context("Failed to build call graph")
}

fn estimate_phase(table: &mut UsageTable, graph: &CallGraph) -> Result<u64> {
    estimate_stack_usage(table, &graph.root)
        .with_context(|| format!("Failed to estimate stack usage from {}", graph.root))
}

/// Build the serializable report for an analysis
///
/// **Public** - used by execute_analyze and tests
pub fn build_report(analysis: &Analysis, budget: Option<u64>, top_frames: usize) -> StackReport {
    let root = analysis.graph.root.as_str();

    StackReport {
        version: SCHEMA_VERSION.to_string(),
        root: root.to_string(),
        total_stack_usage: analysis.total,
        budget,
        worst_case_path: worst_case_path(&analysis.table, root),
        heaviest_frames: heaviest_frames(&analysis.table, root, top_frames),
        unknown_functions: analysis.graph.unknown_functions.clone(),
        dynamic_frames: analysis.table.dynamic_frames(),
        function_count: analysis.table.len(),
        edge_count: analysis.table.edge_count(),
        generated_at: chrono::Utc::now().to_rfc3339(),
    }
}

/// Execute the analyze command
///
/// **Public** - main entry point called from main.rs
///
/// # Returns
/// The report; Err if any step fails or the estimate exceeds the budget
///
/// # Errors
/// * No usage file found, or a malformed usage/listing line
/// * Generator or make failures
/// * Recursion in the call graph
/// * Budget exceeded (after the report has been printed and written)
pub fn execute_analyze(args: AnalyzeArgs) -> Result<StackReport> {
    let start_time = Instant::now();

    // Step 1: Locate and read usage records
    info!("Step 1/6: Reading stack usage records...");
    let su_path = match &args.su_file {
        Some(path) => path.clone(),
        None => find_latest_usage_file(&args.su_dir, &args.su_pattern)
            .context("Failed to locate a stack usage file")?,
    };
    let usage_lines = read_lines(&su_path)
        .with_context(|| format!("Failed to read {}", su_path.display()))?;

    // Step 2: Obtain the call listing
    info!("Step 2/6: Obtaining call listing...");
    let listing_lines = load_listing(&args)?;
    debug!("Call listing has {} lines", listing_lines.len());

    // Step 3: Parse usage records
    info!("Step 3/6: Parsing stack usage ({} lines)...", usage_lines.len());
    let mut table = parse_phase(&usage_lines)?;

    // Step 4: Build the call graph
    info!("Step 4/6: Building call graph...");
    let graph = graph_phase(&mut table, &listing_lines)?;

    // Step 5: Estimate
    info!("Step 5/6: Estimating worst-case stack usage...");
    let total = estimate_phase(&mut table, &graph)?;

    let analysis = Analysis {
        table,
        graph,
        total,
    };

    let dist = calculate_frame_distribution(&analysis.table, &analysis.graph.root);
    info!("Frame distribution: {}", dist.summary());

    // Step 6: Report
    info!("Step 6/6: Reporting...");
    let report = build_report(&analysis, args.budget, args.top_frames);

    if args.verbose {
        print_details(&analysis, &report);
    }

    if let Some(path) = &args.output_json {
        write_report(&report, path).context("Failed to write report JSON")?;
        info!("✓ Report written to: {}", path.display());
    }

    println!("Estimated total stack usage: {} bytes", report.total_stack_usage);

    info!(
        "Analysis completed in {:.2}s",
        start_time.elapsed().as_secs_f64()
    );

    if let Some(budget) = report.budget {
        if !report.within_budget() {
            anyhow::bail!(
                "Estimated stack usage of {} bytes exceeds the budget of {} bytes",
                report.total_stack_usage,
                budget
            );
        }
        info!(
            "✓ Within budget: {} of {} bytes",
            report.total_stack_usage, budget
        );
    }

    Ok(report)
}

/// Read the listing file or run the generator
///
/// **Private** - internal helper for execute_analyze
fn load_listing(args: &AnalyzeArgs) -> Result<Vec<String>> {
    if let Some(path) = &args.listing {
        return read_lines(path)
            .with_context(|| format!("Failed to read call listing {}", path.display()));
    }

    let mut sources = args.sources.clone();
    if let (Some(env_mk), Some(expr)) = (&args.env_mk, &args.extra_source) {
        let extra = resolve_make_path(env_mk, expr)
            .with_context(|| format!("Failed to resolve {} via {}", expr, env_mk.display()))?;
        sources.push(extra);
    }

    CflowRunner::new(args.cflow_program.as_str())
        .call_listing(&sources)
        .context("Failed to generate call listing")
}

/// Print the annotated tree and anomaly lists
///
/// **Private** - verbose output for execute_analyze
fn print_details(analysis: &Analysis, report: &StackReport) {
    print!("{}", render_tree(&analysis.table, &analysis.graph.root));

    if !report.unknown_functions.is_empty() {
        println!("Functions without stack usage info:");
        for name in &report.unknown_functions {
            println!("  {}", name);
        }
        println!("Stack usage of these functions assumed to be 0");
    }

    if !report.dynamic_frames.is_empty() {
        warn!(
            "Dynamic frames, sizes are lower bounds: {}",
            report.dynamic_frames.join(", ")
        );
    }

    if let Some(note) = analysis.graph.extra_roots_summary() {
        println!("{}", note);
    }

    let path: Vec<&str> = report
        .worst_case_path
        .iter()
        .map(|entry| entry.function.as_str())
        .collect();
    println!("Worst-case path: {}", path.join(" -> "));
}

/// Validate analyze arguments
///
/// **Public** - can be called before execute_analyze for early validation
pub fn validate_args(args: &AnalyzeArgs) -> Result<()> {
    if args.listing.is_none() && args.sources.is_empty() {
        anyhow::bail!("Either source files or --listing must be given");
    }

    if args.su_file.is_none() && args.su_pattern.trim().is_empty() {
        anyhow::bail!("Stack usage file pattern cannot be empty");
    }

    if args.env_mk.is_some() != args.extra_source.is_some() {
        anyhow::bail!("--env-mk and --extra-source must be given together");
    }

    if args.listing.is_none() && args.cflow_program.trim().is_empty() {
        anyhow::bail!("Call listing generator cannot be empty");
    }

    if args.top_frames == 0 {
        anyhow::bail!("top_frames must be greater than 0");
    }

    if args.top_frames > 1000 {
        anyhow::bail!("top_frames is too large (max 1000)");
    }

    if args.budget == Some(0) {
        anyhow::bail!("budget must be greater than 0");
    }

    Ok(())
}

/// Convenience wrapper: analyze explicit files without running any tools
///
/// **Public** - simplified API for scripted checks
pub fn analyze_files(su_file: PathBuf, listing: PathBuf) -> Result<StackReport> {
    let args = AnalyzeArgs {
        su_file: Some(su_file),
        listing: Some(listing),
        ..Default::default()
    };
    validate_args(&args)?;
    execute_analyze(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::{EstimateError, ParseError};

    #[test]
    fn test_validate_args_with_listing() {
        let args = AnalyzeArgs {
            listing: Some(PathBuf::from("cflow.txt")),
            ..Default::default()
        };
        assert!(validate_args(&args).is_ok());
    }

    #[test]
    fn test_validate_args_with_sources() {
        let args = AnalyzeArgs {
            sources: vec![PathBuf::from("main.c")],
            ..Default::default()
        };
        assert!(validate_args(&args).is_ok());
    }

    #[test]
    fn test_validate_args_no_input() {
        assert!(validate_args(&AnalyzeArgs::default()).is_err());
    }

    #[test]
    fn test_validate_args_make_query_needs_both() {
        let args = AnalyzeArgs {
            sources: vec![PathBuf::from("main.c")],
            env_mk: Some(PathBuf::from("../env.mk")),
            ..Default::default()
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_top_frames_zero() {
        let args = AnalyzeArgs {
            sources: vec![PathBuf::from("main.c")],
            top_frames: 0,
            ..Default::default()
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_zero_budget() {
        let args = AnalyzeArgs {
            sources: vec![PathBuf::from("main.c")],
            budget: Some(0),
            ..Default::default()
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_analyze_lines() {
        let usage = ["m.c:1:1:main 8 static", "m.c:5:1:work 24 static"];
        let listing = [
            "main() <int main (void) at m.c:1>:",
            "    work() <void work (void) at m.c:5>:",
            "        memset()",
        ];
        let analysis = analyze_lines(&usage, &listing).unwrap();
        assert_eq!(analysis.total, 32);
        assert_eq!(analysis.graph.root, "main");
        assert_eq!(analysis.graph.unknown_functions, vec!["memset"]);
    }

    #[test]
    fn test_analyze_lines_keeps_error_kind() {
        let err = analyze_lines(&["bad line"], &["main()"]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ParseError>(),
            Some(ParseError::MalformedUsageLine { line_no: 1, .. })
        ));

        let err = analyze_lines::<&str, &str>(&[], &["a()", "  b()", "    a()"]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EstimateError>(),
            Some(EstimateError::RecursionDetected { .. })
        ));
    }

    #[test]
    fn test_execute_analyze_reports_failing_phase() {
        let dir = tempfile::tempdir().unwrap();
        let su = dir.path().join("m.su");
        let listing = dir.path().join("cflow.txt");
        std::fs::write(&su, "m.c:1:1:main 8 static\n").unwrap();
        std::fs::write(&listing, "main()\n    not a call line\n").unwrap();

        let args = AnalyzeArgs {
            su_file: Some(su),
            listing: Some(listing),
            ..Default::default()
        };
        let err = execute_analyze(args).unwrap_err();

        assert_eq!(err.to_string(), "Failed to build call graph");
        assert!(matches!(
            err.downcast_ref::<ParseError>(),
            Some(ParseError::MalformedCallLine { line_no: 2, .. })
        ));
    }

    #[test]
    fn test_build_report() {
        let usage = ["m.c:1:1:main 8 static", "m.c:5:1:work 24 dynamic"];
        let listing = ["main()", "  work()"];
        let analysis = analyze_lines(&usage, &listing).unwrap();
        let report = build_report(&analysis, Some(16), 5);

        assert_eq!(report.total_stack_usage, 32);
        assert!(!report.within_budget());
        assert_eq!(report.dynamic_frames, vec!["work"]);
        assert_eq!(report.worst_case_path.len(), 2);
        assert_eq!(report.edge_count, 1);
    }
}
