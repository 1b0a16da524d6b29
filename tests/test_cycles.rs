use processor_dependency_solver::{DependencyCache, ProcessorDescriptor, SolverConfig, UnitHandle, resolve_dependencies};
use tracing_test::traced_test;

const CYCLE_MESSAGE: &str = "Detected processing dependency cycle";

fn four_cycle() -> Vec<UnitHandle> {
    vec![
        ProcessorDescriptor::new("A").after("D").into_handle(),
        ProcessorDescriptor::new("B").after("A").into_handle(),
        ProcessorDescriptor::new("C").after("B").into_handle(),
        ProcessorDescriptor::new("D").after("C").into_handle(),
    ]
}

fn count_lines(lines: &[&str], needle: &str) -> usize {
    lines.iter().filter(|line| line.contains(needle)).count()
}

#[traced_test]
#[test]
fn test_four_unit_cycle_terminates() {
    let result = resolve_dependencies(four_cycle(), SolverConfig::default());

    assert_eq!(result.len(), 4);
    assert_eq!(result.names(), vec!["A", "B", "C", "D"]);
    assert_eq!(result.report.cycles.len(), 1);
    assert_eq!(result.report.cycles[0].describe(), "A -> D -> C -> B -> A");

    assert_eq!(result.report.broken_edges.len(), 1);
    assert_eq!(result.report.broken_edges[0].dependent, "A");
    assert_eq!(result.report.broken_edges[0].dependency, "D");
    assert!(result.dependencies_of("A").is_empty());
    assert_eq!(result.dependencies_of("D"), vec!["C"]);

    assert!(logs_contain("A -> D -> C -> B -> A"));
    logs_assert(|lines: &[&str]| match count_lines(lines, CYCLE_MESSAGE) {
        1 => Ok(()),
        n => Err(format!("expected the cycle to be logged once, found {}", n)),
    });
}

#[traced_test]
#[test]
fn test_cycle_is_reported_once_through_the_cache() {
    let units = four_cycle();
    let config = SolverConfig::default();
    let mut cache = DependencyCache::new();

    let first = cache.resolve(&units, &config, 1).clone();
    let second = cache.resolve(&units, &config, 2).clone();

    assert_eq!(first.names(), second.names());
    assert_eq!(second.len(), 4);
    assert_eq!(first.report.reported_cycles.len(), 1);
    assert_eq!(second.report.cycles.len(), 1);
    assert!(second.report.reported_cycles.is_empty());

    logs_assert(|lines: &[&str]| match count_lines(lines, CYCLE_MESSAGE) {
        1 => Ok(()),
        n => Err(format!("expected the cycle to be logged once, found {}", n)),
    });
}

#[test]
fn test_cycle_through_groups() {
    let units = vec![
        ProcessorDescriptor::new("Move").in_group("Movement").after("Physics").into_handle(),
        ProcessorDescriptor::new("Collide").in_group("Physics").after("Movement").into_handle(),
        ProcessorDescriptor::new("Bystander").into_handle(),
    ];

    let result = resolve_dependencies(units, SolverConfig::default());

    assert_eq!(result.len(), 3);
    assert_eq!(result.report.cycles.len(), 1);
    assert_eq!(result.report.broken_edges.len(), 1);
}

#[test]
fn test_self_reference_is_ignored() {
    let units = vec![ProcessorDescriptor::new("Loner").after("Loner").before("Loner").into_handle()];

    let result = resolve_dependencies(units, SolverConfig::default());

    assert_eq!(result.names(), vec!["Loner"]);
    assert!(result.report.cycles.is_empty());
    assert!(result.dependencies_of("Loner").is_empty());
}
