use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::LevelFilter;

use processor_dependency_solver::domain::solver::SolverResult;
use processor_dependency_solver::{load_pipeline, logger};

#[derive(Parser, Debug)]
#[command(name = "solve-pipeline")]
#[command(about = "Order the processing units of a pipeline file and print the resulting waves")]
struct Args {
    /// Path to the pipeline JSON file
    pipeline: PathBuf,

    /// Solve for strictly sequential execution, overriding the file
    #[arg(long)]
    single_threaded: bool,

    /// Ignore declared execution priorities, overriding the file
    #[arg(long)]
    no_priorities: bool,

    /// Print the node graph before solving
    #[arg(long)]
    graph: bool,

    /// Log level, takes precedence over RUST_LOG
    #[arg(long)]
    log_level: Option<LevelFilter>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_with_level(args.log_level);

    let path = args.pipeline.to_string_lossy();
    let mut pipeline = load_pipeline(&path).with_context(|| format!("Failed to load pipeline '{}'", path))?;
    if args.single_threaded {
        pipeline.config.single_threaded = true;
    }
    if args.no_priorities {
        pipeline.config.priority_ordering = false;
    }

    if args.graph {
        println!("{}", pipeline.render_graph());
    }

    let result = pipeline.solve();
    print_result(&result);

    Ok(())
}

fn print_result(result: &SolverResult) {
    for (wave_index, wave) in result.waves().iter().enumerate() {
        println!("Wave {}:", wave_index);
        for entry in wave {
            if entry.dependencies.is_empty() {
                println!("  {}", entry.name);
            } else {
                let dependencies: Vec<&str> = entry.dependencies.iter().map(|name| name.as_str()).collect();
                println!("  {} (after {})", entry.name, dependencies.join(", "));
            }
        }
    }

    let report = &result.report;
    if report.is_clean() && report.pruned.is_empty() {
        return;
    }
    println!();
    for name in &report.duplicates {
        println!("duplicate: {}", name);
    }
    for dangling in &report.dangling {
        println!("unresolved: {} (named by {})", dangling.name, dangling.declared_by);
    }
    for cycle in &report.cycles {
        println!("cycle: {}", cycle.describe());
    }
    for edge in &report.broken_edges {
        println!("broken: {} no longer waits for {}", edge.dependent, edge.dependency);
    }
    for name in &report.pruned {
        println!("pruned: {}", name);
    }
}
