use processor_dependency_solver::{
    ResourceCategory,
    error::{ConversionError, Error},
    load_and_resolve, load_pipeline,
};

const PIPELINE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/pipeline.json");

#[test]
fn test_load_pipeline() {
    let pipeline = load_pipeline(PIPELINE).unwrap();

    assert_eq!(pipeline.units.len(), 7);
    assert!(pipeline.config.prune_units_without_data);
    assert!(!pipeline.config.single_threaded);
    assert!(pipeline.config.priority_ordering);

    let catalog = &pipeline.catalog;
    assert_eq!(catalog.get(ResourceCategory::ExternalServices, "Telemetry"), Some(0));
    assert_eq!(catalog.get(ResourceCategory::Fields, "Velocity"), Some(0));
    assert_eq!(catalog.get(ResourceCategory::Fields, "Transform"), Some(1));
    assert_eq!(catalog.get(ResourceCategory::Fields, "LodLevel"), Some(2));
    assert_eq!(catalog.len(ResourceCategory::ConstSharedFields), 1);
    assert_eq!(catalog.len(ResourceCategory::Tags), 1);
}

#[test]
fn test_resolve_pipeline() {
    let result = load_and_resolve(PIPELINE).unwrap();

    assert_eq!(result.names(), vec!["Steering", "FlushTelemetry", "ApplyVelocity", "UpdateLod", "PublishTelemetry", "Render"]);

    assert!(result.dependencies_of("Steering").is_empty());
    assert_eq!(result.dependencies_of("ApplyVelocity"), vec!["Steering"]);
    assert_eq!(result.dependencies_of("UpdateLod"), vec!["ApplyVelocity", "Steering"]);
    assert_eq!(result.dependencies_of("PublishTelemetry"), vec!["ApplyVelocity", "Steering"]);

    // Telemetry is thread-safe, so the two telemetry units do not wait for each other.
    assert!(result.dependencies_of("FlushTelemetry").is_empty());

    // CleanupDebris matches no data and is replaced by what it waited for.
    assert_eq!(result.dependencies_of("Render"), vec!["UpdateLod"]);
    assert_eq!(result.report.pruned.len(), 1);
    assert_eq!(result.report.pruned[0], "CleanupDebris");
    assert!(result.get("CleanupDebris").is_none());

    let waves: Vec<Vec<&str>> = result.waves().iter().map(|wave| wave.iter().map(|entry| entry.name.as_str()).collect()).collect();
    assert_eq!(waves, vec![vec!["Steering", "FlushTelemetry"], vec!["ApplyVelocity"], vec!["UpdateLod", "PublishTelemetry"], vec!["Render"]]);
}

#[test]
fn test_render_pipeline_graph() {
    let pipeline = load_pipeline(PIPELINE).unwrap();

    let rendered = pipeline.render_graph();

    assert!(rendered.contains("[Movement]"));
    assert!(rendered.contains("  [Movement.Avoidance]"));
    assert!(rendered.contains("ApplyVelocity after [Steering] priority=0 waiting=4 fields r[Velocity] w[Transform]"));
    assert!(rendered.contains("CleanupDebris (pruned) after [UpdateLod]"));
    assert!(rendered.contains("FlushTelemetry priority=0 waiting=0\n"));
}

#[test]
fn test_missing_pipeline_file() {
    let result = load_pipeline("tests/data/does_not_exist.json");

    assert!(matches!(result, Err(Error::IoError(_))));
}

#[test]
fn test_illegal_access_is_rejected() {
    let dto = serde_json::from_str(r#"{ "units": [{ "name": "A", "requirements": [{ "category": "constSharedFields", "access": "write", "resource": "Settings" }] }] }"#).unwrap();

    let result = processor_dependency_solver::domain::pipeline::Pipeline::from_dto(dto);

    assert!(matches!(
        result,
        Err(Error::Conversion(ConversionError::IllegalAccess(ResourceCategory::ConstSharedFields, _)))
    ));
}
