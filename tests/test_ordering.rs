use processor_dependency_solver::domain::solver::SolverResult;
use processor_dependency_solver::{ProcessorDescriptor, SolverConfig, UnitHandle, resolve_dependencies};
use tracing_test::traced_test;

fn solve(units: Vec<ProcessorDescriptor>) -> SolverResult {
    resolve_dependencies(units.into_iter().map(ProcessorDescriptor::into_handle), SolverConfig::default())
}

#[test]
fn test_single_unit() {
    let result = solve(vec![ProcessorDescriptor::new("Only")]);

    assert_eq!(result.names(), vec!["Only"]);
    assert!(result.dependencies_of("Only").is_empty());
    assert_eq!(result.order[0].sequence_position, 0);
    assert!(result.report.is_clean());
}

#[test]
fn test_transitive_ordering() {
    let result = solve(vec![ProcessorDescriptor::new("A").after("C"), ProcessorDescriptor::new("B").after("A"), ProcessorDescriptor::new("C")]);

    assert_eq!(result.names(), vec!["C", "A", "B"]);
    assert!(result.dependencies_of("C").is_empty());
    assert_eq!(result.dependencies_of("A"), vec!["C"]);
    assert_eq!(result.dependencies_of("B"), vec!["A"]);
}

#[traced_test]
#[test]
fn test_missing_dependency_keeps_relative_order() {
    let forward = solve(vec![ProcessorDescriptor::new("X").after("Ghost"), ProcessorDescriptor::new("Y").before("Ghost")]);
    let backward = solve(vec![ProcessorDescriptor::new("Y").before("Ghost"), ProcessorDescriptor::new("X").after("Ghost")]);

    for result in [&forward, &backward] {
        assert_eq!(result.names(), vec!["Y", "X"]);
        assert_eq!(result.dependencies_of("X"), vec!["Y"]);
        assert_eq!(result.report.dangling.len(), 1);
        assert_eq!(result.report.dangling[0].name, "Ghost");
    }
    assert!(logs_contain("Unable to find dependency 'Ghost'"));
}

#[test]
fn test_group_ordering_is_independent_of_insertion_order() {
    let late = || ProcessorDescriptor::new("Late").in_group("W.X.Y.Z").after("P.Q.R");
    let early = || ProcessorDescriptor::new("Early").in_group("P.Q.R");
    let earlier = || ProcessorDescriptor::new("Nested").in_group("P.Q.R.S");
    let outsider = || ProcessorDescriptor::new("Outsider").in_group("P.Q");

    let late_first = solve(vec![late(), early(), earlier(), outsider()]);
    let late_last = solve(vec![outsider(), early(), earlier(), late()]);

    for result in [&late_first, &late_last] {
        let late_position = result.position_of("Late").unwrap();
        assert!(result.position_of("Early").unwrap() < late_position);
        assert!(result.position_of("Nested").unwrap() < late_position);

        let mut dependencies = result.dependencies_of("Late");
        dependencies.sort();
        assert_eq!(dependencies, vec!["Early", "Nested"]);
    }
}

#[test]
fn test_group_before_group() {
    let result = solve(vec![
        ProcessorDescriptor::new("Draw").in_group("Rendering"),
        ProcessorDescriptor::new("Present").in_group("Rendering.Late"),
        ProcessorDescriptor::new("Simulate").in_group("Simulation").before("Rendering"),
    ]);

    assert_eq!(result.names(), vec!["Simulate", "Draw", "Present"]);
    assert_eq!(result.dependencies_of("Draw"), vec!["Simulate"]);
    assert_eq!(result.dependencies_of("Present"), vec!["Simulate"]);
}

#[test]
fn test_priority_and_inherited_priority() {
    let units = || {
        vec![
            ProcessorDescriptor::new("Independent").with_priority(5),
            ProcessorDescriptor::new("Feeder"),
            ProcessorDescriptor::new("Urgent").after("Feeder").with_priority(10),
        ]
    };

    // Feeder inherits the priority of Urgent, which waits on it.
    let prioritized = solve(units());
    assert_eq!(prioritized.names(), vec!["Feeder", "Urgent", "Independent"]);

    let unprioritized = resolve_dependencies(units().into_iter().map(ProcessorDescriptor::into_handle), SolverConfig::default().with_priority_ordering(false));
    assert_eq!(unprioritized.names(), vec!["Feeder", "Independent", "Urgent"]);
}

#[test]
fn test_solving_is_idempotent() {
    let units: Vec<UnitHandle> = vec![
        ProcessorDescriptor::new("A").in_group("G").into_handle(),
        ProcessorDescriptor::new("B").after("G").with_priority(2).into_handle(),
        ProcessorDescriptor::new("C").before("A").into_handle(),
        ProcessorDescriptor::new("D").after("Missing").into_handle(),
    ];

    let first = resolve_dependencies(units.iter().cloned(), SolverConfig::default());
    let second = resolve_dependencies(units.iter().cloned(), SolverConfig::default());

    assert_eq!(first.names(), second.names());
    for entry in &first.order {
        assert_eq!(first.dependencies_of(entry.name.as_str()), second.dependencies_of(entry.name.as_str()));
        assert_eq!(Some(entry.sequence_position), second.get(entry.name.as_str()).map(|other| other.sequence_position));
    }
}

#[traced_test]
#[test]
fn test_duplicates_and_absent_entries() {
    let units: Vec<Option<UnitHandle>> = vec![
        Some(ProcessorDescriptor::new("A").with_priority(1).into_handle()),
        None,
        Some(ProcessorDescriptor::new("A").with_priority(7).after("B").into_handle()),
        Some(ProcessorDescriptor::new("B").into_handle()),
    ];

    let result = resolve_dependencies(units, SolverConfig::default());

    assert_eq!(result.len(), 2);
    assert_eq!(result.report.duplicates.len(), 1);
    assert_eq!(result.report.skipped_entries, 1);
    // The first registration wins, its declarations are the only ones used.
    assert!(result.dependencies_of("A").is_empty());
    assert!(logs_contain("Processing unit 'A' is already registered"));
    assert!(logs_contain("Skipping absent processing unit at position 1"));
}

#[test]
fn test_empty_input() {
    let result = resolve_dependencies(Vec::<UnitHandle>::new(), SolverConfig::default());

    assert!(result.is_empty());
    assert!(result.waves().is_empty());
}
