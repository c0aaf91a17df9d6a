//! Configuration and result types for the active-set solver.

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

/// What to report when the iteration cap is reached with the active set
/// still changing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailurePolicy {
    /// Fill every entry of the output vector with NaN, making the failure
    /// unmistakable to downstream numeric consumers.
    NanFill,
    /// Return the last iterate as a best-effort answer.
    LastIterate,
}

/// Active-set solver configuration.
///
/// The damping fractions were tuned against a full humanoid's dynamics; they
/// exist to stop a marginal constraint from toggling in and out of the
/// active set every iteration, and should be re-tuned for a different
/// physical system rather than assumed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QpSolverConfig {
    /// Tolerance below which an inequality violation is ignored.
    pub convergence_threshold: f64,
    /// Tolerance below which a negative Lagrange multiplier is ignored.
    pub multiplier_threshold: f64,
    /// Maximum outer active-set iterations per solve.
    pub max_iterations: u32,
    /// Damping fraction for adding rows, in (0, 1). An inactive row is only
    /// added once its violation exceeds `(1 - fraction) * max_violation`.
    pub violation_fraction_to_add: f64,
    /// Damping fraction for removing rows, in (0, 1). An active row is only
    /// removed once its multiplier drops below
    /// `-(1 - fraction) * min_multiplier`.
    pub violation_fraction_to_remove: f64,
    /// Keep the active set from the previous solve as the starting guess.
    pub warm_start: bool,
    /// Clear the active set whenever the problem shape (variable count,
    /// equality rows, inequality rows) differs from the previous call.
    pub reset_active_set_on_size_change: bool,
    /// Reporting mode for failed convergence.
    pub failure_policy: FailurePolicy,
}

impl Default for QpSolverConfig {
    fn default() -> Self {
        Self {
            convergence_threshold: 1e-10,
            multiplier_threshold: 1e-10,
            max_iterations: 10,
            violation_fraction_to_add: 0.8,
            violation_fraction_to_remove: 0.95,
            warm_start: false,
            reset_active_set_on_size_change: true,
            failure_policy: FailurePolicy::NanFill,
        }
    }
}

/// Result of a solve call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveOutcome {
    /// Number of outer active-set iterations used.
    pub iterations: u32,
    /// False if the iteration cap was hit or the iterate went non-finite;
    /// the output vector then follows the configured [`FailurePolicy`].
    pub converged: bool,
}

/// Observer invoked with every intermediate iterate.
///
/// Fires after each KKT subproblem solve, including the final one. Useful
/// for recording solver trajectories when diagnosing a cycling active set.
pub trait IntermediateSolutionListener {
    /// `x` is the current primal iterate, `active_indices` the inequality
    /// rows currently imposed as equalities.
    fn solution_computed(&mut self, x: &DVector<f64>, active_indices: &[usize]);
}
