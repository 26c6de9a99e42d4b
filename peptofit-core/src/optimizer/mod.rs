//! Blend ratio optimizer.
//!
//! Finds mixing ratios that minimise `Σ_f w_f (Σ_i r_i x_if - t_f)²` over the features `f` that
//! have a target and are measured in every component, subject to `Σ r_i = 1` and
//! `min_ratio ≤ r_i ≤ max_ratio`. Two backends share that problem and result shape: a local
//! projected-gradient descent and a seeded differential evolution. Both keep every iterate
//! feasible, so the returned ratios satisfy the constraints even when the solve reports failure.

pub mod evolution;
pub mod gradient;
pub mod simplex;

use crate::profile::{Feature, FeatureVector};
use crate::settings::{RecommenderSettings, RATIO_SUM_TOLERANCE};
use crate::targets::TargetProfile;
use peptofit_schemas::recommendation::{OptimizationSummary, SolverStrategy};
use serde::{Deserialize, Serialize};

pub use evolution::DifferentialEvolution;
pub use gradient::ProjectedGradient;

/// How hard to search for ratios: `Quick` uses the local solver, `Thorough` the global one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Thoroughness {
    #[default]
    Quick,
    Thorough,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatioBounds {
    pub min: f64,
    pub max: f64,
}

impl RatioBounds {
    pub fn from_settings(settings: &RecommenderSettings) -> Self {
        Self {
            min: settings.min_ratio,
            max: settings.max_ratio,
        }
    }

    pub fn is_feasible(&self, n: usize) -> bool {
        simplex::is_feasible(n, self.min, self.max)
    }

    pub fn project(&self, v: &[f64]) -> Vec<f64> {
        simplex::project(v, self.min, self.max)
    }

    /// Whether `ratios` sum to one within [`RATIO_SUM_TOLERANCE`] and each lies within bounds.
    pub fn admits(&self, ratios: &[f64]) -> bool {
        let sum: f64 = ratios.iter().sum();
        (sum - 1.0).abs() <= RATIO_SUM_TOLERANCE
            && ratios
                .iter()
                .all(|r| *r >= self.min - RATIO_SUM_TOLERANCE && *r <= self.max + RATIO_SUM_TOLERANCE)
    }
}

/// One least-squares blend problem, with the unusable features already dropped.
#[derive(Debug, Clone)]
pub struct BlendProblem {
    /// Feature values per usable feature, one entry per component.
    rows: Vec<Vec<f64>>,
    targets: Vec<f64>,
    weights: Vec<f64>,
    features: Vec<Feature>,
    components: usize,
    pub bounds: RatioBounds,
}

impl BlendProblem {
    pub fn new(components: &[&FeatureVector], target: &TargetProfile, bounds: RatioBounds) -> Self {
        let mut problem = Self {
            rows: Vec::new(),
            targets: Vec::new(),
            weights: Vec::new(),
            features: Vec::new(),
            components: components.len(),
            bounds,
        };
        for (feature, value) in &target.values {
            let weight = target.weights.get(feature).copied().unwrap_or(0.0);
            if weight <= 0.0 {
                continue;
            }
            let row: Option<Vec<f64>> = components.iter().map(|c| c.get(*feature).known()).collect();
            if let Some(row) = row {
                problem.rows.push(row);
                problem.targets.push(*value);
                problem.weights.push(weight);
                problem.features.push(*feature);
            }
        }
        problem
    }

    pub fn dimension(&self) -> usize {
        self.components
    }

    /// Features that entered the objective.
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    fn residuals(&self, ratios: &[f64]) -> impl Iterator<Item = (f64, &Vec<f64>, f64)> + '_ {
        let ratios = ratios.to_vec();
        self.rows
            .iter()
            .zip(&self.targets)
            .zip(&self.weights)
            .map(move |((row, target), weight)| {
                let blended: f64 = row.iter().zip(&ratios).map(|(x, r)| x * r).sum();
                (blended - target, row, *weight)
            })
    }

    pub fn objective(&self, ratios: &[f64]) -> f64 {
        self.residuals(ratios)
            .map(|(residual, _, weight)| weight * residual * residual)
            .sum()
    }

    pub fn gradient(&self, ratios: &[f64]) -> Vec<f64> {
        let mut grad = vec![0.0; self.components];
        for (residual, row, weight) in self.residuals(ratios) {
            for (g, x) in grad.iter_mut().zip(row) {
                *g += 2.0 * weight * residual * x;
            }
        }
        grad
    }

    /// Trace of the Hessian, an upper bound on its largest eigenvalue.
    pub fn curvature(&self) -> f64 {
        self.rows
            .iter()
            .zip(&self.weights)
            .map(|(row, weight)| 2.0 * weight * row.iter().map(|x| x * x).sum::<f64>())
            .sum()
    }

    pub fn uniform_start(&self) -> Vec<f64> {
        vec![1.0 / self.components as f64; self.components]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationResult {
    pub ratios: Vec<f64>,
    /// Objective value at `ratios`.
    pub objective: f64,
    pub success: bool,
    pub iterations: usize,
    pub message: String,
    pub strategy: SolverStrategy,
}

impl OptimizationResult {
    pub(crate) fn infeasible(problem: &BlendProblem, strategy: SolverStrategy) -> Self {
        let ratios = problem.uniform_start();
        Self {
            objective: problem.objective(&ratios),
            ratios,
            success: false,
            iterations: 0,
            message: format!(
                "ratio bounds [{}, {}] admit no blend of {} components",
                problem.bounds.min,
                problem.bounds.max,
                problem.dimension()
            ),
            strategy,
        }
    }

    pub fn summary(&self) -> OptimizationSummary {
        OptimizationSummary {
            strategy: self.strategy,
            success: self.success,
            iterations: self.iterations,
            objective: self.objective,
            message: self.message.clone(),
        }
    }
}

pub trait RatioSolver {
    fn strategy(&self) -> SolverStrategy;

    fn solve(&self, problem: &BlendProblem) -> OptimizationResult;
}

pub fn solver_for(thoroughness: Thoroughness, settings: &RecommenderSettings) -> Box<dyn RatioSolver> {
    match thoroughness {
        Thoroughness::Quick => Box::new(ProjectedGradient::from_settings(settings)),
        Thoroughness::Thorough => Box::new(DifferentialEvolution::from_settings(settings)),
    }
}

/// Solves for the ratios of `components` against `target`.
pub fn optimize(
    components: &[&FeatureVector],
    target: &TargetProfile,
    thoroughness: Thoroughness,
    settings: &RecommenderSettings,
) -> OptimizationResult {
    let problem = BlendProblem::new(components, target, RatioBounds::from_settings(settings));
    let mut result = solver_for(thoroughness, settings).solve(&problem);
    if problem.bounds.is_feasible(problem.dimension()) && !problem.bounds.admits(&result.ratios) {
        tracing::warn!(ratios = ?result.ratios, "solver left the feasible set, projecting back");
        result.ratios = problem.bounds.project(&result.ratios);
        result.objective = problem.objective(&result.ratios);
    }
    tracing::debug!(
        strategy = %result.strategy,
        success = result.success,
        iterations = result.iterations,
        objective = result.objective,
        features = problem.features().len(),
        "blend ratios solved"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use peptofit_schemas::level::Level;

    fn vector(values: &[(Feature, f64)]) -> FeatureVector {
        values.iter().map(|(f, v)| (*f, Level::Known(*v))).collect()
    }

    fn target(values: &[(Feature, f64)]) -> TargetProfile {
        TargetProfile {
            values: values.iter().copied().collect(),
            weights: values.iter().map(|(f, _)| (*f, 1.0)).collect(),
        }
    }

    #[test]
    fn features_missing_in_any_component_are_dropped() {
        let a = vector(&[(Feature::TotalNitrogen, 0.8), (Feature::Vitamins, 0.2)]);
        let b = vector(&[(Feature::TotalNitrogen, 0.4)]);
        let t = target(&[(Feature::TotalNitrogen, 0.6), (Feature::Vitamins, 0.5)]);
        let problem = BlendProblem::new(&[&a, &b], &t, RatioBounds { min: 0.1, max: 0.8 });
        assert_eq!(problem.features(), &[Feature::TotalNitrogen]);
        assert!(problem.objective(&[0.5, 0.5]).abs() < 1e-15);
    }

    #[test]
    fn gradient_matches_finite_differences() {
        let a = vector(&[(Feature::TotalNitrogen, 0.8), (Feature::BcaaRatio, 0.1)]);
        let b = vector(&[(Feature::TotalNitrogen, 0.3), (Feature::BcaaRatio, 0.3)]);
        let t = target(&[(Feature::TotalNitrogen, 0.7), (Feature::BcaaRatio, 0.25)]);
        let problem = BlendProblem::new(&[&a, &b], &t, RatioBounds { min: 0.1, max: 0.8 });
        let r = [0.4, 0.6];
        let grad = problem.gradient(&r);
        let h = 1e-6;
        for i in 0..2 {
            let mut up = r;
            up[i] += h;
            let mut down = r;
            down[i] -= h;
            let numeric = (problem.objective(&up) - problem.objective(&down)) / (2.0 * h);
            assert!((grad[i] - numeric).abs() < 1e-6);
        }
    }

    #[test]
    fn both_strategies_share_the_result_shape() {
        let a = vector(&[(Feature::TotalNitrogen, 0.9)]);
        let b = vector(&[(Feature::TotalNitrogen, 0.3)]);
        let t = target(&[(Feature::TotalNitrogen, 0.6)]);
        let settings = RecommenderSettings::default();
        for (thoroughness, strategy) in [
            (Thoroughness::Quick, SolverStrategy::ProjectedGradient),
            (Thoroughness::Thorough, SolverStrategy::DifferentialEvolution),
        ] {
            let result = optimize(&[&a, &b], &t, thoroughness, &settings);
            assert_eq!(result.strategy, strategy);
            assert_eq!(result.ratios.len(), 2);
            assert!((result.ratios[0] - 0.5).abs() < 1e-4, "{:?}", result);
        }
    }

    #[test]
    fn infeasible_bounds_are_reported() {
        let a = vector(&[(Feature::TotalNitrogen, 0.9)]);
        let b = vector(&[(Feature::TotalNitrogen, 0.3)]);
        let t = target(&[(Feature::TotalNitrogen, 0.6)]);
        let settings = RecommenderSettings {
            max_ratio: 0.4,
            ..Default::default()
        };
        let result = optimize(&[&a, &b], &t, Thoroughness::Quick, &settings);
        assert!(!result.success);
        assert!(result.message.contains("admit no blend"));
    }
}
