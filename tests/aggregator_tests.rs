use stack_estimate::aggregator::{estimate_stack_usage, worst_case_path};
use stack_estimate::parser::{build_call_graph, FrameKind, FunctionRecord, UsageTable};
use stack_estimate::utils::error::EstimateError;

fn table_with(usages: &[(&str, u64)], edges: &[(&str, &str)]) -> UsageTable {
    let mut table = UsageTable::new();
    for (name, usage) in usages {
        table.insert(FunctionRecord::new(*name, *usage, FrameKind::Static));
    }
    for (caller, callee) in edges {
        table.add_call(caller, callee);
    }
    table
}

fn diamond() -> UsageTable {
    table_with(
        &[("A", 4), ("B", 6), ("C", 2), ("D", 10)],
        &[("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")],
    )
}

fn total(table: &UsageTable, name: &str) -> u64 {
    table.get(name).unwrap().total_usage.unwrap()
}

#[test]
fn test_diamond_shared_descendant() {
    let mut table = diamond();

    let root_total = estimate_stack_usage(&mut table, "A").unwrap();

    assert_eq!(total(&table, "D"), 10);
    assert_eq!(total(&table, "B"), 16);
    assert_eq!(total(&table, "C"), 12);
    assert_eq!(total(&table, "A"), 20);
    assert_eq!(root_total, 20);
}

#[test]
fn test_recurrence_holds_for_every_function() {
    let mut table = table_with(
        &[
            ("main", 16),
            ("init", 8),
            ("clock", 24),
            ("loop", 12),
            ("rx", 40),
            ("tx", 32),
            ("crc", 4),
        ],
        &[
            ("main", "init"),
            ("main", "loop"),
            ("init", "clock"),
            ("loop", "rx"),
            ("loop", "tx"),
            ("rx", "crc"),
            ("tx", "crc"),
            ("tx", "memcpy"),
        ],
    );

    estimate_stack_usage(&mut table, "main").unwrap();

    for record in table.iter() {
        let deepest = record
            .callees
            .iter()
            .map(|c| total(&table, c))
            .max()
            .unwrap_or(0);
        assert_eq!(
            record.total_usage,
            Some(record.effective_usage() + deepest),
            "recurrence broken at {}",
            record.name
        );
    }
    assert_eq!(total(&table, "main"), 16 + 12 + 40 + 4);
}

#[test]
fn test_memoization_idempotence() {
    let mut table = diamond();

    let first = estimate_stack_usage(&mut table, "A").unwrap();
    let snapshot: Vec<FunctionRecord> = table.iter().cloned().collect();

    let second = estimate_stack_usage(&mut table, "A").unwrap();
    let after: Vec<FunctionRecord> = table.iter().cloned().collect();

    assert_eq!(first, second);
    assert_eq!(snapshot, after);
}

#[test]
fn test_subtree_estimate_reused_by_root() {
    let mut table = diamond();

    assert_eq!(estimate_stack_usage(&mut table, "B").unwrap(), 16);
    assert_eq!(table.get("A").unwrap().total_usage, None);
    assert_eq!(estimate_stack_usage(&mut table, "A").unwrap(), 20);
}

#[test]
fn test_cycle_detection() {
    let mut table = table_with(&[("A", 4), ("B", 8)], &[("A", "B"), ("B", "A")]);

    let err = estimate_stack_usage(&mut table, "A").unwrap_err();

    assert_eq!(
        err,
        EstimateError::RecursionDetected {
            cycle: vec!["A".to_string(), "B".to_string(), "A".to_string()]
        }
    );
}

#[test]
fn test_cycle_from_listing() {
    let mut table = UsageTable::new();
    let listing = ["main()", "    parse()", "        expr()", "            parse()"];
    let graph = build_call_graph(&mut table, &listing).unwrap();

    let err = estimate_stack_usage(&mut table, &graph.root).unwrap_err();

    assert_eq!(
        err.to_string(),
        "Recursion detected: parse -> expr -> parse"
    );
}

#[test]
fn test_worst_case_path_of_diamond() {
    let mut table = diamond();
    estimate_stack_usage(&mut table, "A").unwrap();

    let path = worst_case_path(&table, "A");
    let names: Vec<&str> = path.iter().map(|e| e.function.as_str()).collect();
    let own_sum: u64 = path.iter().map(|e| e.own_usage.unwrap_or(0)).sum();

    assert_eq!(names, vec!["A", "B", "D"]);
    assert_eq!(own_sum, 20);
    assert_eq!(path[0].total_usage, 20);
}
