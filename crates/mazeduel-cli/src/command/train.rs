use std::path::PathBuf;

use anyhow::{Context, ensure};
use mazeduel_constraints::storage::{self, Slot};
use mazeduel_training::{CrossoverKind, GeneticOptimizer, OptimizerParams};
use rand::Rng as _;

use super::DataDirArg;
use crate::{
    schema::policy_model::PolicyModel,
    util,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    #[clap(flatten)]
    data: DataDirArg,
    /// JSON file with optimizer parameters; flags below override it
    #[arg(long)]
    params: Option<PathBuf>,
    #[arg(long)]
    population_size: Option<usize>,
    #[arg(long)]
    generations: Option<usize>,
    #[arg(long)]
    tournament_size: Option<usize>,
    #[arg(long)]
    crossover_rate: Option<f32>,
    /// Crossover operator (uniform or singlepoint)
    #[arg(long)]
    crossover: Option<CrossoverKind>,
    #[arg(long)]
    mutation_rate: Option<f32>,
    #[arg(long)]
    mutation_step_size: Option<f32>,
    /// Seed for a reproducible run; random if omitted
    #[arg(long)]
    seed: Option<u64>,
    /// Model name stored in the output
    #[arg(long, default_value = "policy")]
    name: String,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

impl TrainArg {
    fn optimizer_params(&self) -> anyhow::Result<OptimizerParams> {
        let mut params = match &self.params {
            Some(path) => util::read_params_file(path)?,
            None => OptimizerParams::default(),
        };
        let overrides = [
            (&mut params.population_size, self.population_size),
            (&mut params.num_generations, self.generations),
            (&mut params.tournament_size, self.tournament_size),
        ];
        for (field, value) in overrides {
            if let Some(value) = value {
                *field = value;
            }
        }
        let overrides = [
            (&mut params.crossover_rate, self.crossover_rate),
            (&mut params.mutation_rate, self.mutation_rate),
            (&mut params.mutation_step_size, self.mutation_step_size),
        ];
        for (field, value) in overrides {
            if let Some(value) = value {
                *field = value;
            }
        }
        if let Some(crossover) = self.crossover {
            params.crossover = crossover;
        }
        params.validate()?;
        Ok(params)
    }
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let params = arg.optimizer_params()?;
    let storage = arg.data.storage();
    let constraints = storage::load_or_empty(&storage, Slot::Merged)
        .context("Failed to load merged log")?;
    ensure!(
        !constraints.is_empty(),
        "No constraints in {}; record and merge a session first",
        storage.path(Slot::Merged).display()
    );

    let seed = arg.seed.unwrap_or_else(|| rand::rng().random());
    tracing::info!(
        seed,
        constraints = constraints.len(),
        population = params.population_size,
        generations = params.num_generations,
        crossover = %params.crossover,
        "starting training"
    );

    let mut optimizer = GeneticOptimizer::with_seed(params, constraints, seed)?;
    while let Some(report) = optimizer.step_generation() {
        let gene_stats = optimizer.population().gene_stats();
        #[expect(clippy::cast_precision_loss)]
        let gene_std_dev_mean =
            gene_stats.iter().map(|s| s.std_dev).sum::<f32>() / gene_stats.len().max(1) as f32;

        eprintln!("Generation #{}:", report.generation);
        eprintln!("  Fitness Stats:");
        eprintln!("    Min:  {:.3}", report.fitness.min);
        eprintln!("    Max:  {:.3}", report.fitness.max);
        eprintln!("    Mean: {:.3}", report.fitness.mean);
        eprintln!("    Best: {:.3}", report.best_fitness);
        eprintln!("  Gene Stddev Mean: {gene_std_dev_mean:.3}");
    }

    let Some(best) = optimizer.run() else {
        anyhow::bail!("No generation was evaluated");
    };
    let model = PolicyModel::new(arg.name.clone(), best.fitness(), best.policy());
    util::write_json(&model, arg.output.as_deref())?;

    eprintln!();
    eprintln!("Model saved successfully");
    if let Some(path) = &arg.output {
        eprintln!("  Path: {}", path.display());
    }
    eprintln!("  Name: {}", model.name);
    eprintln!("  Trained at: {}", model.trained_at);
    eprintln!("  Final fitness: {:.3}", model.final_fitness);
    eprintln!("  Seed: {seed}");

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Debug, Parser)]
    struct Cli {
        #[clap(flatten)]
        train: TrainArg,
    }

    #[test]
    fn test_flags_override_params_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");
        std::fs::write(&path, r#"{"populationSize": 20, "mutationRate": 0.3}"#).unwrap();

        let cli = Cli::parse_from([
            "train",
            "--params",
            path.to_str().unwrap(),
            "--generations",
            "5",
            "--crossover",
            "singlepoint",
        ]);
        let params = cli.train.optimizer_params().unwrap();
        assert_eq!(params.population_size, 20);
        assert_eq!(params.num_generations, 5);
        assert_eq!(params.crossover, CrossoverKind::SinglePoint);
        assert!((params.mutation_rate - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let cli = Cli::parse_from(["train", "--crossover-rate", "2"]);
        assert!(cli.train.optimizer_params().is_err());
    }
}
