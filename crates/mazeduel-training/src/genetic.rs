//! Genetic algorithm that evolves policies against a constraint set.
//!
//! # Algorithm Overview
//!
//! 1. **Initialize** - every gene of every individual is drawn uniformly from
//!    `[-1, 1]`
//! 2. **Evaluate Fitness** - each individual's policy is scored with
//!    [`fitness::evaluate`]; the best individual seen so far is kept aside
//! 3. **Tournament Selection** - two parents are picked, each as the fittest
//!    of `tournament_size` individuals drawn at random with replacement
//! 4. **Crossover** - with probability `crossover_rate` the parents' copies
//!    are recombined (uniform or single-point); otherwise they pass through
//! 5. **Mutation** - each gene of each child is perturbed with probability
//!    `mutation_rate`
//! 6. **Replacement** - the children replace the whole population
//!
//! There is no elitism: the best-ever individual lives outside the
//! population, so the reported best fitness never decreases even though the
//! population's own maximum may.
//!
//! # Driving the optimizer
//!
//! [`GeneticOptimizer::step_generation`] advances exactly one generation and
//! returns its [`GenerationReport`], so a caller can interleave training with
//! other work or stop at any generation boundary. [`GeneticOptimizer::run`]
//! steps until the configured number of generations is reached.
//!
//! ```
//! use mazeduel_constraints::{Action, Constraint, StateVector};
//! use mazeduel_training::{GeneticOptimizer, OptimizerParams};
//!
//! let constraints = [Constraint::new(
//!     StateVector::new([0.2, 1.0, 0.0, 0.0, 0.9]),
//!     Action::Laser,
//!     1.0,
//! )];
//! let params = OptimizerParams {
//!     population_size: 10,
//!     num_generations: 5,
//!     ..OptimizerParams::default()
//! };
//! let mut optimizer = GeneticOptimizer::with_seed(params, constraints.to_vec(), 42).unwrap();
//! while let Some(report) = optimizer.step_generation() {
//!     assert!(report.best_fitness >= report.fitness.max);
//! }
//! assert!(optimizer.is_finished());
//! assert!(optimizer.best().is_some());
//! ```

use mazeduel_constraints::Constraint;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::{Policy, SummaryStats, fitness, weights};

/// A candidate policy and its fitness.
#[derive(Debug, Clone)]
pub struct Individual {
    policy: Policy,
    fitness: f32,
}

impl Individual {
    /// Creates an unevaluated individual with random weights.
    pub fn random<R>(rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let mut policy = Policy::zeros();
        weights::randomize(policy.weights_mut(), rng);
        Self {
            policy,
            fitness: f32::MIN,
        }
    }

    #[must_use]
    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    #[must_use]
    pub fn into_policy(self) -> Policy {
        self.policy
    }

    /// Fitness from the last evaluation, `f32::MIN` before the first.
    #[must_use]
    pub fn fitness(&self) -> f32 {
        self.fitness
    }
}

/// One generation of individuals.
#[derive(Debug, Clone)]
pub struct Population {
    individuals: Vec<Individual>,
}

impl Population {
    #[must_use]
    pub fn random<R>(count: usize, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let individuals = (0..count).map(|_| Individual::random(rng)).collect();
        Self { individuals }
    }

    #[must_use]
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    /// Scores every individual against `constraints` and sorts the population
    /// by fitness, best first.
    pub fn evaluate_fitness(&mut self, constraints: &[Constraint]) {
        for ind in &mut self.individuals {
            ind.fitness = fitness::evaluate(&ind.policy, constraints);
        }
        self.individuals
            .sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
    }

    /// Fitness distribution of the population.
    #[must_use]
    pub fn fitness_stats(&self) -> Option<SummaryStats> {
        SummaryStats::new(self.individuals.iter().map(|ind| ind.fitness))
    }

    /// Distribution of each gene across the population, in weight order.
    ///
    /// Shrinking spreads indicate the population is converging.
    #[must_use]
    pub fn gene_stats(&self) -> Vec<SummaryStats> {
        let Some(first) = self.individuals.first() else {
            return vec![];
        };
        (0..first.policy.weights().len())
            .filter_map(|i| {
                SummaryStats::new(self.individuals.iter().map(|ind| ind.policy.weights()[i]))
            })
            .collect()
    }
}

/// Recombination operator used when breeding.
///
/// Parses case-insensitively from its variant name (`uniform`, `singlepoint`).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::FromStr,
)]
#[serde(rename_all = "camelCase")]
pub enum CrossoverKind {
    /// Each gene from either parent with equal probability.
    #[default]
    Uniform,
    /// Head from one parent, tail from the other.
    SinglePoint,
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ParamsError {
    #[display("population size must be at least 1")]
    EmptyPopulation,
    #[display("tournament size must be at least 1")]
    EmptyTournament,
    #[display("{name} must be within [0, 1], got {value}")]
    RateOutOfRange { name: &'static str, value: f32 },
    #[display("mutation step size must be a non-negative number, got {value}")]
    InvalidStepSize { value: f32 },
}

/// Genetic algorithm parameters.
///
/// Deserializes from a camelCase JSON object; missing fields take their
/// defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OptimizerParams {
    pub population_size: usize,
    pub num_generations: usize,
    /// Number of random contestants per parent selection.
    pub tournament_size: usize,
    /// Probability that a pair of parents is recombined.
    pub crossover_rate: f32,
    pub crossover: CrossoverKind,
    /// Per-gene mutation probability.
    pub mutation_rate: f32,
    /// Half-width of the uniform mutation perturbation.
    pub mutation_step_size: f32,
}

impl Default for OptimizerParams {
    fn default() -> Self {
        Self {
            population_size: 50,
            num_generations: 100,
            tournament_size: 2,
            crossover_rate: 0.7,
            crossover: CrossoverKind::Uniform,
            mutation_rate: 0.1,
            mutation_step_size: 0.1,
        }
    }
}

impl OptimizerParams {
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.population_size == 0 {
            return Err(ParamsError::EmptyPopulation);
        }
        if self.tournament_size == 0 {
            return Err(ParamsError::EmptyTournament);
        }
        for (name, value) in [
            ("crossover rate", self.crossover_rate),
            ("mutation rate", self.mutation_rate),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ParamsError::RateOutOfRange { name, value });
            }
        }
        let step = self.mutation_step_size;
        if !step.is_finite() || step < 0.0 {
            return Err(ParamsError::InvalidStepSize { value: step });
        }
        Ok(())
    }

    /// Breeds the next generation from an evaluated population.
    fn evolve<R>(&self, population: &Population, rng: &mut R) -> Population
    where
        R: Rng + ?Sized,
    {
        let parents = &population.individuals;
        let mut next_individuals = Vec::with_capacity(parents.len() + 1);

        while next_individuals.len() < parents.len() {
            let p1 = tournament_select(parents, self.tournament_size, rng);
            let p2 = tournament_select(parents, self.tournament_size, rng);
            let mut c1 = p1.policy.clone();
            let mut c2 = p2.policy.clone();

            if rng.random_bool(self.crossover_rate.into()) {
                match self.crossover {
                    CrossoverKind::Uniform => {
                        weights::uniform_crossover(c1.weights_mut(), c2.weights_mut(), rng);
                    }
                    CrossoverKind::SinglePoint => {
                        weights::single_point_crossover(c1.weights_mut(), c2.weights_mut(), rng);
                    }
                }
            }
            for child in [&mut c1, &mut c2] {
                weights::mutate(
                    child.weights_mut(),
                    self.mutation_rate,
                    self.mutation_step_size,
                    rng,
                );
            }

            next_individuals.extend([c1, c2].map(|policy| Individual {
                policy,
                fitness: f32::MIN,
            }));
        }
        next_individuals.truncate(parents.len());

        Population {
            individuals: next_individuals,
        }
    }
}

/// Selects the fittest of `tournament_size` individuals drawn independently,
/// so the same individual may be drawn more than once.
fn tournament_select<'a, R>(
    population: &'a [Individual],
    tournament_size: usize,
    rng: &mut R,
) -> &'a Individual
where
    R: Rng + ?Sized,
{
    assert!(tournament_size > 0);
    assert!(!population.is_empty(), "tournament over an empty population");
    let mut winner = &population[rng.random_range(0..population.len())];
    for _ in 1..tournament_size {
        let contender = &population[rng.random_range(0..population.len())];
        if contender.fitness > winner.fitness {
            winner = contender;
        }
    }
    winner
}

/// Summary of one evaluated generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationReport {
    /// Zero-based generation index.
    pub generation: usize,
    /// Fitness distribution of this generation's population.
    pub fitness: SummaryStats,
    /// Best fitness seen in any generation so far.
    pub best_fitness: f32,
}

/// Steppable genetic optimizer over a fixed constraint set.
#[derive(Debug)]
pub struct GeneticOptimizer<R> {
    params: OptimizerParams,
    constraints: Vec<Constraint>,
    rng: R,
    population: Population,
    generation: usize,
    best: Option<Individual>,
}

impl GeneticOptimizer<Pcg32> {
    /// Creates an optimizer whose whole run is reproducible from `seed`.
    pub fn with_seed(
        params: OptimizerParams,
        constraints: Vec<Constraint>,
        seed: u64,
    ) -> Result<Self, ParamsError> {
        Self::new(params, constraints, Pcg32::seed_from_u64(seed))
    }
}

impl<R> GeneticOptimizer<R>
where
    R: Rng,
{
    /// Validates `params` and draws the initial population from `rng`.
    pub fn new(
        params: OptimizerParams,
        constraints: Vec<Constraint>,
        mut rng: R,
    ) -> Result<Self, ParamsError> {
        params.validate()?;
        let population = Population::random(params.population_size, &mut rng);
        Ok(Self {
            params,
            constraints,
            rng,
            population,
            generation: 0,
            best: None,
        })
    }

    #[must_use]
    pub fn params(&self) -> &OptimizerParams {
        &self.params
    }

    /// Number of generations evaluated so far.
    #[must_use]
    pub fn generation(&self) -> usize {
        self.generation
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.generation >= self.params.num_generations
    }

    #[must_use]
    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Best individual across all evaluated generations, `None` before the
    /// first generation.
    #[must_use]
    pub fn best(&self) -> Option<&Individual> {
        self.best.as_ref()
    }

    /// Evaluates the current generation, updates the best-ever individual and
    /// breeds the next generation.
    ///
    /// Returns `None` without doing anything once all generations have run.
    /// After the final generation the population is left as evaluated.
    pub fn step_generation(&mut self) -> Option<GenerationReport> {
        if self.is_finished() {
            return None;
        }

        self.population.evaluate_fitness(&self.constraints);
        let fitness = self.population.fitness_stats()?;
        if let Some(leader) = self.population.individuals.first()
            && self.best.as_ref().is_none_or(|best| leader.fitness > best.fitness)
        {
            self.best = Some(leader.clone());
        }
        let best_fitness = self.best.as_ref().map_or(fitness.max, Individual::fitness);

        let report = GenerationReport {
            generation: self.generation,
            fitness,
            best_fitness,
        };
        tracing::debug!(
            generation = report.generation,
            min = fitness.min,
            max = fitness.max,
            mean = fitness.mean,
            best = best_fitness,
            "evaluated generation"
        );

        self.generation += 1;
        if !self.is_finished() {
            self.population = self.params.evolve(&self.population, &mut self.rng);
        }
        Some(report)
    }

    /// Steps through every remaining generation and returns the best
    /// individual.
    pub fn run(&mut self) -> Option<&Individual> {
        while self.step_generation().is_some() {}
        if let Some(best) = &self.best {
            tracing::info!(
                generations = self.generation,
                constraints = self.constraints.len(),
                fitness = best.fitness,
                "optimization finished"
            );
        }
        self.best.as_ref()
    }
}
