use super::{gradient::ProjectedGradient, BlendProblem, OptimizationResult, RatioSolver};
use crate::settings::{
    RecommenderSettings, GLOBAL_POPULATION_PER_COMPONENT, GLOBAL_TOLERANCE,
};
use peptofit_schemas::recommendation::SolverStrategy;
use rand::{rngs::StdRng, Rng, SeedableRng};

const MUTATION: f64 = 0.7;
const CROSSOVER: f64 = 0.9;
/// Absolute floor of the population-spread test, for objectives that converge to zero.
const ABSOLUTE_TOLERANCE: f64 = 1e-12;
const MIN_POPULATION: usize = 4;

/// Global solver: seeded `rand/1/bin` differential evolution over the bounded simplex, with the
/// best member polished by the local solver.
///
/// Trial vectors are projected back onto the feasible set before evaluation, so the population
/// never leaves it. The search counts as converged once the spread of objective values is within
/// `tolerance` of their mean.
#[derive(Debug, Clone)]
pub struct DifferentialEvolution {
    pub population_per_component: usize,
    pub max_generations: usize,
    pub mutation: f64,
    pub crossover: f64,
    pub tolerance: f64,
    pub seed: u64,
    pub polish: Option<ProjectedGradient>,
}

impl DifferentialEvolution {
    pub fn from_settings(settings: &RecommenderSettings) -> Self {
        Self {
            population_per_component: GLOBAL_POPULATION_PER_COMPONENT,
            max_generations: settings.global_max_generations,
            mutation: MUTATION,
            crossover: CROSSOVER,
            tolerance: GLOBAL_TOLERANCE,
            seed: settings.global_seed,
            polish: Some(ProjectedGradient::from_settings(settings)),
        }
    }

    fn population_converged(&self, energies: &[f64]) -> bool {
        let n = energies.len() as f64;
        let mean = energies.iter().sum::<f64>() / n;
        let variance = energies.iter().map(|e| (e - mean).powi(2)).sum::<f64>() / n;
        variance.sqrt() <= ABSOLUTE_TOLERANCE + self.tolerance * mean.abs()
    }
}

/// Three distinct population indices, all different from `exclude`.
fn pick_three(rng: &mut StdRng, size: usize, exclude: usize) -> [usize; 3] {
    let mut picked = [exclude; 3];
    for slot in 0..3 {
        loop {
            let candidate = rng.gen_range(0..size);
            if candidate != exclude && !picked[..slot].contains(&candidate) {
                picked[slot] = candidate;
                break;
            }
        }
    }
    picked
}

impl RatioSolver for DifferentialEvolution {
    fn strategy(&self) -> SolverStrategy {
        SolverStrategy::DifferentialEvolution
    }

    fn solve(&self, problem: &BlendProblem) -> OptimizationResult {
        let strategy = self.strategy();
        let n = problem.dimension();
        if !problem.bounds.is_feasible(n) {
            return OptimizationResult::infeasible(problem, strategy);
        }

        let bounds = problem.bounds;
        let mut rng = StdRng::seed_from_u64(self.seed);
        let size = (self.population_per_component * n).max(MIN_POPULATION);

        let mut population: Vec<Vec<f64>> = Vec::with_capacity(size);
        population.push(problem.uniform_start());
        while population.len() < size {
            let raw: Vec<f64> = (0..n).map(|_| rng.gen_range(bounds.min..=bounds.max)).collect();
            population.push(bounds.project(&raw));
        }
        let mut energies: Vec<f64> = population.iter().map(|r| problem.objective(r)).collect();

        let mut generations = 0;
        let mut converged = false;
        while generations < self.max_generations {
            generations += 1;
            for i in 0..size {
                let [a, b, c] = pick_three(&mut rng, size, i);
                let forced = rng.gen_range(0..n);
                let trial: Vec<f64> = (0..n)
                    .map(|j| {
                        if j == forced || rng.gen::<f64>() < self.crossover {
                            population[a][j] + self.mutation * (population[b][j] - population[c][j])
                        } else {
                            population[i][j]
                        }
                    })
                    .collect();
                let trial = bounds.project(&trial);
                let energy = problem.objective(&trial);
                if energy <= energies[i] {
                    population[i] = trial;
                    energies[i] = energy;
                }
            }
            if self.population_converged(&energies) {
                converged = true;
                break;
            }
        }

        let best = energies
            .iter()
            .enumerate()
            .min_by(|(ia, ea), (ib, eb)| ea.total_cmp(eb).then_with(|| ia.cmp(ib)))
            .map(|(index, _)| index)
            .unwrap_or(0);
        let mut ratios = population[best].clone();
        let mut objective = energies[best];

        if let Some(local) = &self.polish {
            let polished = local.solve_from(problem, &ratios);
            if polished.objective < objective {
                ratios = polished.ratios;
                objective = polished.objective;
            }
        }

        let message = if converged {
            format!("population converged after {} generations", generations)
        } else {
            format!("generation limit of {} reached", self.max_generations)
        };
        OptimizationResult {
            ratios,
            objective,
            success: converged,
            iterations: generations,
            message,
            strategy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::RatioBounds;
    use crate::profile::{Feature, FeatureVector};
    use crate::targets::TargetProfile;
    use peptofit_schemas::level::Level;

    fn three_component_problem() -> BlendProblem {
        let features = [Feature::TotalNitrogen, Feature::AminoNitrogen, Feature::Nucleotides];
        let vectors: Vec<FeatureVector> = [[0.9, 0.2, 0.1], [0.3, 0.8, 0.2], [0.2, 0.1, 0.9]]
            .iter()
            .map(|row| {
                features
                    .iter()
                    .zip(row)
                    .map(|(f, v)| (*f, Level::Known(*v)))
                    .collect()
            })
            .collect();
        let refs: Vec<&FeatureVector> = vectors.iter().collect();
        let target = TargetProfile {
            values: features.iter().copied().zip([0.6, 0.4, 0.3]).collect(),
            weights: features.iter().map(|f| (*f, 1.0)).collect(),
        };
        BlendProblem::new(&refs, &target, RatioBounds { min: 0.1, max: 0.8 })
    }

    #[test]
    fn seeded_search_is_reproducible() {
        let solver = DifferentialEvolution::from_settings(&RecommenderSettings::default());
        let problem = three_component_problem();
        let first = solver.solve(&problem);
        let second = solver.solve(&problem);
        assert_eq!(first.iterations, second.iterations);
        for (a, b) in first.ratios.iter().zip(&second.ratios) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn agrees_with_the_local_solver_on_a_convex_problem() {
        let settings = RecommenderSettings::default();
        let problem = three_component_problem();
        let global = DifferentialEvolution::from_settings(&settings).solve(&problem);
        let local = ProjectedGradient::from_settings(&settings).solve(&problem);
        assert_eq!(global.strategy, SolverStrategy::DifferentialEvolution);
        assert!((global.objective - local.objective).abs() < 1e-8);
        assert!((global.ratios.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn polished_results_stay_on_the_simplex() {
        let settings = RecommenderSettings::default();
        let solver = DifferentialEvolution {
            max_generations: 60,
            ..DifferentialEvolution::from_settings(&settings)
        };
        let features = [Feature::TotalNitrogen, Feature::AminoNitrogen, Feature::Nucleotides, Feature::Vitamins];
        let mut rng = StdRng::seed_from_u64(11);
        for case in 0..150 {
            let n = rng.gen_range(2..=5);
            let vectors: Vec<FeatureVector> = (0..n)
                .map(|_| {
                    features
                        .iter()
                        .map(|f| (*f, Level::Known(rng.gen_range(0.0..1.5))))
                        .collect()
                })
                .collect();
            let refs: Vec<&FeatureVector> = vectors.iter().collect();
            let target = TargetProfile {
                values: features.iter().map(|f| (*f, rng.gen_range(0.0..1.5))).collect(),
                weights: features.iter().map(|f| (*f, 1.0)).collect(),
            };
            let problem = BlendProblem::new(&refs, &target, RatioBounds { min: 0.1, max: 0.8 });
            let result = solver.solve(&problem);
            assert!(problem.bounds.admits(&result.ratios), "case {}: {:?}", case, result.ratios);
        }
    }

    #[test]
    fn unpolished_population_stays_feasible() {
        let solver = DifferentialEvolution {
            polish: None,
            max_generations: 5,
            ..DifferentialEvolution::from_settings(&RecommenderSettings::default())
        };
        let result = solver.solve(&three_component_problem());
        assert!(result.ratios.iter().all(|r| (0.1 - 1e-9..=0.8 + 1e-9).contains(r)));
        assert!((result.ratios.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }
}
