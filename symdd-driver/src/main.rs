// SPDX-License-Identifier: Apache-2.0

//! Command line driver: parses a circuit description, builds the ROBDD for
//! one of its outputs, and writes the JavaScript graph fragment consumed by
//! the HTML visualization page.

use clap::Parser;

use symdd::bdd_builder::{build_bdd, BuildOptions};
use symdd::emit_viz::emit_graph_js;
use symdd::model_parser::parse_model;

#[derive(clap::ValueEnum, Debug, Clone, Copy)]
enum StrategyArg {
    /// Compose the circuit structure through APPLY (scales with BDD size).
    Symbolic,
    /// Enumerate all assignments (exponential; small circuits only).
    Enumerative,
}

/// Builds the ROBDD for a circuit output and emits a JS graph fragment.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the circuit description file.
    input: String,

    /// Index into the module's OUTPUT list.
    output_index: String,

    /// Path of the JavaScript file to write.
    output_js: String,

    /// BDD construction strategy.
    #[arg(long, value_enum, default_value_t = StrategyArg::Symbolic)]
    strategy: StrategyArg,
}

fn main() {
    let _ = env_logger::builder().try_init();
    let args = Args::parse();

    let output_index: usize = args.output_index.parse().unwrap_or_else(|_| {
        eprintln!(
            "output index '{}' does not parse as an integer",
            args.output_index
        );
        std::process::exit(1);
    });

    let file_content = std::fs::read_to_string(&args.input).unwrap_or_else(|err| {
        eprintln!("failed to read {}: {}", args.input, err);
        std::process::exit(1);
    });

    let parse_start = std::time::Instant::now();
    let model = parse_model(&file_content).unwrap_or_else(|err| {
        eprintln!("{}: {}", args.input, err);
        std::process::exit(1);
    });
    log::info!("parsed '{}' in {:?}", model.name, parse_start.elapsed());

    if output_index >= model.outputs.len() {
        eprintln!(
            "output index {} out of range: module '{}' has {} outputs",
            output_index,
            model.name,
            model.outputs.len()
        );
        std::process::exit(1);
    }

    let options = match args.strategy {
        StrategyArg::Symbolic => BuildOptions::symbolic(),
        StrategyArg::Enumerative => BuildOptions::enumerative(),
    };

    let build_start = std::time::Instant::now();
    let (builder, root) = build_bdd(&model, output_index, options);
    let build_time = build_start.elapsed();

    let fragment = emit_graph_js(&builder, root);
    if let Err(err) = std::fs::write(&args.output_js, &fragment) {
        eprintln!("failed to write {}: {}", args.output_js, err);
        std::process::exit(1);
    }

    println!(
        "{}: output {} -> {} BDD nodes over {} variables in {:?}",
        model.name,
        output_index,
        builder.node_count(),
        builder.support().len(),
        build_time
    );
    println!(
        "wrote {} edges to {} ({} unique-table collisions)",
        fragment.lines().count(),
        args.output_js,
        builder.unique_table_collisions()
    );
}
