//! Cohort selection CLI - Pick a diverse, high-quality candidate group from JSON data.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cohort_select::{
    compute::{CandidatePool, SyntheticPoolSpec, evolution::EvolutionEngine},
    report::{
        QualityHistogram, load_pool, ranked_selection, region_counts, resolve_members,
        write_selection,
    },
    schema::{GroupSnapshot, SelectionConfig},
};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage(&args[0]);
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_config();
        return;
    }

    let (config, pool, output) = if args[1] == "--synthetic" {
        let size: usize = args
            .get(2)
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| {
                eprintln!("--synthetic needs a candidate count");
                std::process::exit(1);
            });
        let config = args
            .get(3)
            .map(|path| load_config(Path::new(path)))
            .unwrap_or_default();

        let pool_seed = config.random_seed.unwrap_or_else(rand::random);
        let pool = SyntheticPoolSpec {
            size,
            ..Default::default()
        }
        .generate(pool_seed)
        .unwrap_or_else(|e| {
            eprintln!("Error generating pool: {}", e);
            std::process::exit(1);
        });
        (config, pool, None)
    } else {
        if args.len() < 3 {
            print_usage(&args[0]);
            std::process::exit(1);
        }
        let config = load_config(Path::new(&args[1]));
        let pool = load_pool(&args[2]).unwrap_or_else(|e| {
            eprintln!("Error loading candidates: {}", e);
            std::process::exit(1);
        });
        (config, pool, args.get(3).map(PathBuf::from))
    };

    let pool = Arc::new(pool);
    let generations = config.population.generations;

    println!("Cohort Selection");
    println!("================");
    println!("Pool: {} candidates", pool.len());
    println!(
        "Group size: {}, population: {}, generations: {}",
        config.group_size, config.population.size, generations
    );
    println!(
        "Weights: quality={}, diversity={}, coverage={}",
        config.fitness.quality_weight, config.fitness.diversity_weight, config.fitness.coverage_weight
    );
    println!();

    let region_field = config.fitness.region_field.clone();
    let region_count = config.fitness.region_count;

    let mut engine = EvolutionEngine::new(config, Arc::clone(&pool)).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    println!("Running search (seed {})...", engine.seed());
    let result = engine.run_with_callback(|progress| {
        if progress.is_report {
            println!(
                "  Generation {}/{}: best fitness = {:.2}",
                progress.generation, progress.total_generations, progress.generation_best
            );
        }
    });

    let best = &result.best;
    println!();
    println!("Best group:");
    println!("  Fitness: {:.2}", best.fitness);
    println!("  Mean quality: {:.2}", best.summary.mean_quality);
    for (field, distinct) in &best.summary.distinct_per_field {
        println!("  Distinct {}: {}", field, distinct);
    }
    println!(
        "  Regions covered: {}/{}",
        best.summary.distinct_regions, region_count
    );
    if result.best_overall.fitness > best.fitness {
        println!(
            "  (best seen in any generation: {:.2} at generation {})",
            result.best_overall.fitness, result.best_overall.generation
        );
    }

    print_distributions(&pool, &result.best, &region_field);

    let ranked = ranked_selection(&pool, best).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    println!();
    println!("Selected candidates by quality:");
    for (rank, candidate) in ranked.iter().enumerate() {
        println!("  {:>4}. {} ({:.2})", rank + 1, candidate.id, candidate.quality);
    }

    if let Some(path) = output {
        match write_selection(&path, &pool, best) {
            Ok(count) => println!("\nWrote {} candidates to {}", count, path.display()),
            Err(e) => {
                eprintln!("Error writing selection: {}", e);
                std::process::exit(1);
            }
        }
    }

    println!(
        "\nTime: {:.2}s ({} evaluations)",
        result.stats.elapsed_seconds, result.stats.total_evaluations
    );
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} <config.json> <pool.json> [output.json]", program);
    eprintln!("       {} --synthetic <N> [config.json]", program);
    eprintln!("       {} --example", program);
    eprintln!();
    eprintln!("Select a diverse, high-quality group of candidates.");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  config.json  Selection configuration (every field optional)");
    eprintln!("  pool.json    JSON array of candidate records");
    eprintln!("  output.json  Where to write the selected candidates");
    eprintln!();
    eprintln!("Example configuration is generated with --example flag.");
}

fn load_config(path: &Path) -> SelectionConfig {
    let config_str = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading config file: {}", e);
        std::process::exit(1);
    });

    serde_json::from_str(&config_str).unwrap_or_else(|e| {
        eprintln!("Error parsing config: {}", e);
        std::process::exit(1);
    })
}

fn print_distributions(pool: &CandidatePool, best: &GroupSnapshot, region_field: &str) {
    let Ok(members) = resolve_members(pool, best) else {
        return;
    };

    let histogram = QualityHistogram::from_members(pool, &members, QualityHistogram::DEFAULT_BINS);
    let edges = histogram.edges();
    println!();
    println!("Quality distribution:");
    for (i, count) in histogram.counts.iter().enumerate() {
        println!("  [{:>6.1}, {:>6.1}): {}", edges[i], edges[i + 1], count);
    }

    if let Some(regions) = region_counts(pool, &members, region_field) {
        println!();
        println!("Members per {}:", region_field);
        for (region, count) in regions {
            println!("  {}: {}", region, count);
        }
    }
}

fn print_example_config() {
    let config = SelectionConfig::default();

    println!("Example configuration (config.json):");
    println!("{}", serde_json::to_string_pretty(&config).unwrap());
    println!();
    println!("Example candidate records (pool.json):");
    println!(
        "{}",
        r#"[
  {"id": "1001", "scores": [612.4, 580.0, 701.2, 655.9, 720.0],
   "attributes": {"income_bracket": "B", "race": "1", "school_type": "public", "region": "SP"}},
  {"id": "1002", "quality": 74.5,
   "attributes": {"income_bracket": "D", "race": "3", "school_type": "private", "region": "BA"}}
]"#
    );
}
