//! Dungeon Evolve CLI - Run a level search from a preset or JSON configuration.

use std::time::Instant;

use dungeon_evolve::{
    compute::evolution::{EvolutionEngine, Fitness, GridModel, LevelModel, RoomModel},
    schema::{ConfigError, GeneratorConfig, LevelRepresentation, SearchConfig},
};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <grid|rooms|config.json> [iterations]", args[0]);
        eprintln!();
        eprintln!("Evolve a dungeon level and print the best one found.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  grid         Dense cell grid with the reference settings");
        eprintln!("  rooms        Room list with the reference settings");
        eprintln!("  config.json  Path to a generator configuration file");
        eprintln!("  iterations   Override the number of rounds");
        eprintln!();
        eprintln!("Example configuration is printed with the --example flag.");
        std::process::exit(1);
    }

    let mut config = match args[1].as_str() {
        "--example" => {
            print_example_config();
            return;
        }
        "grid" => GeneratorConfig::grid(),
        "rooms" => GeneratorConfig::rooms(),
        path => GeneratorConfig::from_json_file(path).unwrap_or_else(|e| {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }),
    };

    if let Some(arg) = args.get(2) {
        config.search.iterations = arg.parse().unwrap_or_else(|_| {
            eprintln!("Invalid iteration count: {}", arg);
            std::process::exit(1);
        });
    }

    let outcome = match config.representation {
        LevelRepresentation::Grid(grid) => {
            GridModel::new(grid).and_then(|model| run(model, config.search))
        }
        LevelRepresentation::Rooms(rooms) => {
            RoomModel::new(rooms).and_then(|model| run(model, config.search))
        }
    };

    if let Err(e) = outcome {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    }
}

fn run<M: LevelModel + Clone>(model: M, search: SearchConfig) -> Result<(), ConfigError> {
    let renderer = model.clone();
    let mut engine = EvolutionEngine::new(model, search.clone())?;

    println!("Dungeon Evolve");
    println!("==============");
    println!("Model: {}", renderer.name());
    println!("Rounds: {}", search.iterations);
    println!("Mutations per level: {}", search.mutations_per_level);
    println!("Considered levels: {}", search.considered_levels);
    println!("Candidates per round: {}", search.candidates_per_round());
    println!();

    let start = Instant::now();
    let total = search.iterations;
    let report_every = (total / 10).max(1);

    let result = engine.run_with_callback(|progress, best| {
        if progress.generation == 0 {
            println!("Seed level (score {:.3}):", best.score.value());
            print_level(&renderer.render(&best.level));
            println!();
            println!("Running search...");
            return;
        }
        if progress.generation % report_every == 0 || progress.generation == total {
            let elapsed = start.elapsed().as_secs_f32();
            println!(
                "  Round {}/{}: best={:.3}, avg={:.3}, pool={}, {:.1} rounds/s",
                progress.generation,
                total,
                progress.generation_best,
                progress.avg_fitness,
                progress.pool_size,
                progress.generation as f32 / elapsed.max(f32::EPSILON)
            );
        }
    });

    println!();
    println!("Best level (score {:.3}):", result.best.score.value());
    print_level(&renderer.render(&result.best.level));
    println!(
        "Evaluations: {} in {:.2}s ({:.1}/s)",
        result.stats.total_evaluations,
        result.stats.elapsed_seconds,
        result.stats.evaluations_per_second
    );
    Ok(())
}

/// Print a rendered level followed by a separator as wide as its rows.
fn print_level(rendered: &str) {
    let width = rendered.lines().next().map_or(0, str::len);
    print!("{}", rendered);
    println!("{}", "=".repeat(width));
}

fn print_example_config() {
    for (label, config) in [
        ("grid", GeneratorConfig::grid()),
        ("rooms", GeneratorConfig::rooms()),
    ] {
        let json = serde_json::to_string_pretty(&config).unwrap_or_else(|e| {
            eprintln!("Error serializing example config: {}", e);
            std::process::exit(1);
        });
        println!("Example {} configuration:", label);
        println!("{}", json);
        println!();
    }
}
