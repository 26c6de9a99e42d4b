use super::{BlendProblem, OptimizationResult, RatioSolver};
use crate::settings::{RecommenderSettings, LOCAL_FTOL};
use peptofit_schemas::recommendation::SolverStrategy;

/// Projected gradient length below which the iterate counts as stationary.
const STATIONARY_STEP: f64 = 1e-12;
/// Ceiling on the line-search step, as a multiple of the projected gradient step.
const MAX_STEP: f64 = 1e3;

/// Local solver: projected gradient descent from uniform ratios with an exact line search.
///
/// Each iteration takes the gradient step `r - ∇f / L` (with `L` the Hessian trace), projects it
/// back onto the feasible set, and moves along the line through that point by the step that
/// minimises the quadratic objective while staying within bounds.
#[derive(Debug, Clone)]
pub struct ProjectedGradient {
    pub max_iterations: usize,
    pub ftol: f64,
}

impl ProjectedGradient {
    pub fn from_settings(settings: &RecommenderSettings) -> Self {
        Self {
            max_iterations: settings.local_max_iterations,
            ftol: LOCAL_FTOL,
        }
    }

    /// Runs the descent from `start`, projected onto the feasible set first.
    pub fn solve_from(&self, problem: &BlendProblem, start: &[f64]) -> OptimizationResult {
        let strategy = SolverStrategy::ProjectedGradient;
        let n = problem.dimension();
        if !problem.bounds.is_feasible(n) {
            return OptimizationResult::infeasible(problem, strategy);
        }

        let mut ratios = problem.bounds.project(start);
        let mut objective = problem.objective(&ratios);
        let curvature = problem.curvature();
        if curvature <= 0.0 {
            return OptimizationResult {
                ratios,
                objective,
                success: true,
                iterations: 0,
                message: "objective is flat over the feasible ratios".to_string(),
                strategy,
            };
        }

        for iteration in 1..=self.max_iterations {
            let grad = problem.gradient(&ratios);
            let stepped: Vec<f64> = ratios
                .iter()
                .zip(&grad)
                .map(|(r, g)| r - g / curvature)
                .collect();
            let target = problem.bounds.project(&stepped);
            let direction: Vec<f64> = target.iter().zip(&ratios).map(|(t, r)| t - r).collect();

            let length = direction.iter().map(|d| d * d).sum::<f64>().sqrt();
            if length <= STATIONARY_STEP {
                return converged(ratios, objective, iteration, strategy);
            }

            let max_step = max_feasible_step(problem, &ratios, &direction);
            let alpha = line_search(problem, &grad, &direction, max_step);
            // `direction` sums to zero only up to rounding; projecting keeps the drift from
            // accumulating across iterations.
            let next = problem.bounds.project(
                &ratios
                    .iter()
                    .zip(&direction)
                    .map(|(r, d)| r + alpha * d)
                    .collect::<Vec<f64>>(),
            );
            let next_objective = problem.objective(&next);
            let improvement = objective - next_objective;
            if next_objective <= objective {
                ratios = next;
                objective = next_objective;
            }
            if improvement.abs() <= self.ftol * objective.abs().max(1.0) {
                return converged(ratios, objective, iteration, strategy);
            }
        }

        OptimizationResult {
            ratios,
            objective,
            success: false,
            iterations: self.max_iterations,
            message: format!("iteration limit of {} reached", self.max_iterations),
            strategy,
        }
    }
}

fn converged(
    ratios: Vec<f64>,
    objective: f64,
    iterations: usize,
    strategy: SolverStrategy,
) -> OptimizationResult {
    OptimizationResult {
        ratios,
        objective,
        success: true,
        iterations,
        message: "converged".to_string(),
        strategy,
    }
}

/// Largest step along `direction` that keeps every ratio within bounds, between 1 (the
/// projected point itself) and [`MAX_STEP`]. Entries below [`STATIONARY_STEP`] are rounding
/// noise and do not limit the step.
fn max_feasible_step(problem: &BlendProblem, ratios: &[f64], direction: &[f64]) -> f64 {
    ratios
        .iter()
        .zip(direction)
        .filter_map(|(r, d)| {
            if *d > STATIONARY_STEP {
                Some((problem.bounds.max - r) / d)
            } else if *d < -STATIONARY_STEP {
                Some((problem.bounds.min - r) / d)
            } else {
                None
            }
        })
        .fold(MAX_STEP, f64::min)
        .max(1.0)
}

/// Minimiser of the quadratic objective along `direction`, within `[0, max_step]`.
fn line_search(problem: &BlendProblem, grad: &[f64], direction: &[f64], max_step: f64) -> f64 {
    let slope: f64 = grad.iter().zip(direction).map(|(g, d)| g * d).sum();
    let bend: f64 = problem
        .rows
        .iter()
        .zip(&problem.weights)
        .map(|(row, weight)| {
            let along: f64 = row.iter().zip(direction).map(|(x, d)| x * d).sum();
            2.0 * weight * along * along
        })
        .sum();
    if bend <= 0.0 {
        return 1.0;
    }
    (-slope / bend).clamp(0.0, max_step)
}

impl RatioSolver for ProjectedGradient {
    fn strategy(&self) -> SolverStrategy {
        SolverStrategy::ProjectedGradient
    }

    fn solve(&self, problem: &BlendProblem) -> OptimizationResult {
        self.solve_from(problem, &problem.uniform_start())
    }
}
