//! Active-set QP solver.
//!
//! Solves `min 1/2 x^T H x + f^T x` subject to `A x = b`, `C x <= d` by
//! imposing the active inequality rows as equalities and solving the
//! resulting KKT system through the Schur complement of `H^-1`. Does not
//! handle problems where several inequality rows in the active set make the
//! subproblem infeasible; it works well for the benign constraints an MPC
//! produces (friction pyramids, torque limits, variable bounds) and is very
//! fast when warm started.

use nalgebra::{DMatrix, DVector};

use crate::error::ProblemError;
use crate::inverse::{DenseInverse, InverseCalculator};
use crate::types::{FailurePolicy, IntermediateSolutionListener, QpSolverConfig, SolveOutcome};

fn reshape(matrix: &mut DMatrix<f64>, nrows: usize, ncols: usize) {
    if matrix.shape() != (nrows, ncols) {
        matrix.resize_mut(nrows, ncols, 0.0);
    }
}

fn reshape_vector(vector: &mut DVector<f64>, nrows: usize) {
    if vector.nrows() != nrows {
        vector.resize_vertically_mut(nrows, 0.0);
    }
}

/// Active-set QP solver with warm starting and solver-owned scratch state.
///
/// The instance holds the current problem, the active set carried across
/// calls, and every intermediate buffer; `solve` performs no allocation
/// beyond factorizing the (small) augmented multiplier system. One instance
/// serves one control loop: calls must be serialized by the caller.
pub struct ActiveSetQpSolver {
    config: QpSolverConfig,
    inverse_calculator: Box<dyn InverseCalculator>,
    listeners: Vec<Box<dyn IntermediateSolutionListener>>,

    // Problem, replaced each cycle. cost_h is stored symmetrized.
    cost_h: DMatrix<f64>,
    cost_f: DVector<f64>,
    cost_constant: f64,
    eq_a: DMatrix<f64>,
    eq_b: DVector<f64>,
    ineq_c: DMatrix<f64>,
    ineq_d: DVector<f64>,

    // The only state carried between calls.
    active_indices: Vec<usize>,
    previous_num_variables: usize,
    previous_num_equalities: usize,
    previous_num_inequalities: usize,

    // Active inequality rows imposed as equalities.
    c_bar: DMatrix<f64>,
    d_bar: DVector<f64>,

    // Cached once per call.
    h_inv: DMatrix<f64>,
    eq_a_t: DMatrix<f64>,
    a_h_inv: DMatrix<f64>,
    h_inv_a_t: DMatrix<f64>,
    a_h_inv_a_t: DMatrix<f64>,

    // Recomputed whenever the active set changes.
    c_bar_h_inv: DMatrix<f64>,
    h_inv_c_bar_t: DMatrix<f64>,
    c_bar_h_inv_a_t: DMatrix<f64>,
    a_h_inv_c_bar_t: DMatrix<f64>,
    c_bar_h_inv_c_bar_t: DMatrix<f64>,

    // Augmented multiplier system and solution scratch.
    schur: DMatrix<f64>,
    schur_rhs: DVector<f64>,
    augmented_multipliers: DVector<f64>,
    a_and_c_bar: DMatrix<f64>,
    constraint_gradient: DVector<f64>,
    x: DVector<f64>,
    eq_multipliers: DVector<f64>,
    ineq_multipliers: DVector<f64>,
    ineq_check: DVector<f64>,
    indices_to_add: Vec<usize>,
    indices_to_remove: Vec<usize>,
}

impl Default for ActiveSetQpSolver {
    fn default() -> Self {
        Self::new(QpSolverConfig::default())
    }
}

impl ActiveSetQpSolver {
    /// Create a solver with the given configuration and the dense default
    /// inverse.
    pub fn new(config: QpSolverConfig) -> Self {
        Self {
            config,
            inverse_calculator: Box::new(DenseInverse),
            listeners: Vec::new(),
            cost_h: DMatrix::zeros(0, 0),
            cost_f: DVector::zeros(0),
            cost_constant: 0.0,
            eq_a: DMatrix::zeros(0, 0),
            eq_b: DVector::zeros(0),
            ineq_c: DMatrix::zeros(0, 0),
            ineq_d: DVector::zeros(0),
            active_indices: Vec::new(),
            previous_num_variables: 0,
            previous_num_equalities: 0,
            previous_num_inequalities: 0,
            c_bar: DMatrix::zeros(0, 0),
            d_bar: DVector::zeros(0),
            h_inv: DMatrix::zeros(0, 0),
            eq_a_t: DMatrix::zeros(0, 0),
            a_h_inv: DMatrix::zeros(0, 0),
            h_inv_a_t: DMatrix::zeros(0, 0),
            a_h_inv_a_t: DMatrix::zeros(0, 0),
            c_bar_h_inv: DMatrix::zeros(0, 0),
            h_inv_c_bar_t: DMatrix::zeros(0, 0),
            c_bar_h_inv_a_t: DMatrix::zeros(0, 0),
            a_h_inv_c_bar_t: DMatrix::zeros(0, 0),
            c_bar_h_inv_c_bar_t: DMatrix::zeros(0, 0),
            schur: DMatrix::zeros(0, 0),
            schur_rhs: DVector::zeros(0),
            augmented_multipliers: DVector::zeros(0),
            a_and_c_bar: DMatrix::zeros(0, 0),
            constraint_gradient: DVector::zeros(0),
            x: DVector::zeros(0),
            eq_multipliers: DVector::zeros(0),
            ineq_multipliers: DVector::zeros(0),
            ineq_check: DVector::zeros(0),
            indices_to_add: Vec::new(),
            indices_to_remove: Vec::new(),
        }
    }

    /// Create a solver with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(QpSolverConfig::default())
    }

    /// Access the solver configuration.
    pub fn config(&self) -> &QpSolverConfig {
        &self.config
    }

    /// Mutable access to the configuration. Takes effect on the next solve.
    pub fn config_mut(&mut self) -> &mut QpSolverConfig {
        &mut self.config
    }

    /// Replace the cost-matrix inverse strategy.
    pub fn set_inverse_calculator(&mut self, calculator: Box<dyn InverseCalculator>) {
        self.inverse_calculator = calculator;
    }

    /// Register an observer for intermediate iterates.
    pub fn add_solution_listener(&mut self, listener: Box<dyn IntermediateSolutionListener>) {
        self.listeners.push(listener);
    }

    /// Set the cost `1/2 x^T H x + f^T x`.
    ///
    /// `h` is stored as `0.5 (H + H^T)`, so callers need not supply a
    /// symmetric matrix.
    pub fn set_cost(&mut self, h: &DMatrix<f64>, f: &DVector<f64>) -> Result<(), ProblemError> {
        self.set_cost_with_constant(h, f, 0.0)
    }

    /// Set the cost with an additive constant, `1/2 x^T H x + f^T x + c`.
    /// The constant only shows up in [`Self::objective_cost`].
    pub fn set_cost_with_constant(
        &mut self,
        h: &DMatrix<f64>,
        f: &DVector<f64>,
        constant: f64,
    ) -> Result<(), ProblemError> {
        if h.nrows() != h.ncols() {
            return Err(ProblemError::CostMatrixNotSquare {
                rows: h.nrows(),
                cols: h.ncols(),
            });
        }
        if h.nrows() != f.nrows() {
            return Err(ProblemError::CostVectorDimMismatch {
                matrix_rows: h.nrows(),
                vector_rows: f.nrows(),
            });
        }

        let num_variables = h.nrows();
        reshape(&mut self.cost_h, num_variables, num_variables);
        h.transpose_to(&mut self.cost_h);
        self.cost_h += h;
        self.cost_h.scale_mut(0.5);

        reshape_vector(&mut self.cost_f, num_variables);
        self.cost_f.copy_from(f);
        self.cost_constant = constant;
        Ok(())
    }

    /// Set the equality constraints `A x = b`. Requires the cost to be set
    /// first so the variable count is known.
    pub fn set_equality_constraints(
        &mut self,
        a: &DMatrix<f64>,
        b: &DVector<f64>,
    ) -> Result<(), ProblemError> {
        if a.nrows() != b.nrows() {
            return Err(ProblemError::EqualityRowMismatch {
                matrix_rows: a.nrows(),
                vector_rows: b.nrows(),
            });
        }
        if a.ncols() != self.cost_h.ncols() {
            return Err(ProblemError::VariableCountMismatch {
                expected: self.cost_h.ncols(),
                got: a.ncols(),
            });
        }

        reshape(&mut self.eq_a, a.nrows(), a.ncols());
        self.eq_a.copy_from(a);
        reshape_vector(&mut self.eq_b, b.nrows());
        self.eq_b.copy_from(b);
        Ok(())
    }

    /// Set the inequality constraints `C x <= d` (row-wise).
    pub fn set_inequality_constraints(
        &mut self,
        c: &DMatrix<f64>,
        d: &DVector<f64>,
    ) -> Result<(), ProblemError> {
        if c.nrows() != d.nrows() {
            return Err(ProblemError::InequalityRowMismatch {
                matrix_rows: c.nrows(),
                vector_rows: d.nrows(),
            });
        }
        if c.ncols() != self.cost_h.ncols() {
            return Err(ProblemError::VariableCountMismatch {
                expected: self.cost_h.ncols(),
                got: c.ncols(),
            });
        }

        reshape(&mut self.ineq_c, c.nrows(), c.ncols());
        self.ineq_c.copy_from(c);
        reshape_vector(&mut self.ineq_d, d.nrows());
        self.ineq_d.copy_from(d);
        Ok(())
    }

    /// Reset all problem matrices to empty (0 variables, 0 constraints).
    /// Does not clear the active set; see [`Self::reset_active_set`].
    pub fn clear(&mut self) {
        reshape(&mut self.cost_h, 0, 0);
        reshape_vector(&mut self.cost_f, 0);
        self.cost_constant = 0.0;
        reshape(&mut self.eq_a, 0, 0);
        reshape_vector(&mut self.eq_b, 0);
        reshape(&mut self.ineq_c, 0, 0);
        reshape_vector(&mut self.ineq_d, 0);
    }

    /// Drop every inequality row from the active set.
    pub fn reset_active_set(&mut self) {
        reshape(&mut self.c_bar, 0, 0);
        reshape_vector(&mut self.d_bar, 0);
        self.active_indices.clear();
    }

    /// Seed the active set, e.g. from an external heuristic. Only effective
    /// when warm starting across identically shaped problems; otherwise the
    /// solve clears it again.
    pub fn set_active_inequality_indices(&mut self, indices: &[usize]) {
        self.active_indices.clear();
        self.active_indices.extend_from_slice(indices);
    }

    /// Inequality rows currently imposed as equalities.
    pub fn active_inequality_indices(&self) -> &[usize] {
        &self.active_indices
    }

    /// Equality-constraint Lagrange multipliers from the last solve.
    pub fn equality_multipliers(&self) -> &DVector<f64> {
        &self.eq_multipliers
    }

    /// Inequality-constraint Lagrange multipliers from the last solve.
    /// Zero for rows outside the active set.
    pub fn inequality_multipliers(&self) -> &DVector<f64> {
        &self.ineq_multipliers
    }

    /// Evaluate `1/2 x^T H x + f^T x + c` for a given point.
    pub fn objective_cost(&self, x: &DVector<f64>) -> f64 {
        let h_x = &self.cost_h * x;
        0.5 * x.dot(&h_x) + self.cost_f.dot(x) + self.cost_constant
    }

    /// Solve the current problem, writing the primal solution into
    /// `solution` (resized to the variable count).
    ///
    /// Returns the outer iteration count and whether the active set
    /// stabilized. On failed convergence the output follows the configured
    /// [`FailurePolicy`]; this never panics for an infeasible problem.
    pub fn solve(&mut self, solution: &mut DVector<f64>) -> SolveOutcome {
        if !self.config.warm_start
            || (self.config.reset_active_set_on_size_change && self.problem_size_changed())
        {
            self.reset_active_set();
        } else {
            // Stale indices from a differently shaped problem would index
            // out of bounds when the rows are re-imposed.
            let num_inequalities = self.ineq_c.nrows();
            self.active_indices.retain(|&i| i < num_inequalities);
            self.rebuild_active_rows();
        }

        let num_variables = self.cost_h.nrows();
        let num_equalities = self.eq_a.nrows();
        let num_inequalities = self.ineq_c.nrows();

        reshape_vector(&mut self.x, num_variables);
        reshape_vector(&mut self.eq_multipliers, num_equalities);
        self.eq_multipliers.fill(0.0);
        reshape_vector(&mut self.ineq_multipliers, num_inequalities);
        self.ineq_multipliers.fill(0.0);

        self.compute_cost_inverse_blocks();
        self.solve_equality_constrained_subproblem();

        let mut iterations = 1;
        let mut active_set_stable = true;

        if num_inequalities > 0 {
            active_set_stable = false;
            iterations = 0;
            for _ in 0..self.config.max_iterations {
                let modified = self.adjust_active_set();
                iterations += 1;
                if !modified {
                    active_set_stable = true;
                    break;
                }
            }
        }

        let diverged = self.x.iter().any(|v| !v.is_finite());
        reshape_vector(solution, num_variables);

        if active_set_stable && !diverged {
            solution.copy_from(&self.x);
            return SolveOutcome {
                iterations,
                converged: true,
            };
        }

        tracing::warn!(
            iterations,
            diverged,
            "active-set QP failed to converge"
        );
        match self.config.failure_policy {
            FailurePolicy::NanFill => solution.fill(f64::NAN),
            FailurePolicy::LastIterate => solution.copy_from(&self.x),
        }
        SolveOutcome {
            iterations,
            converged: false,
        }
    }

    /// Compares the problem shape against the previous call and records the
    /// current one.
    fn problem_size_changed(&mut self) -> bool {
        let changed = self.previous_num_variables != self.cost_h.nrows()
            || self.previous_num_equalities != self.eq_a.nrows()
            || self.previous_num_inequalities != self.ineq_c.nrows();

        self.previous_num_variables = self.cost_h.nrows();
        self.previous_num_equalities = self.eq_a.nrows();
        self.previous_num_inequalities = self.ineq_c.nrows();

        changed
    }

    /// Gather the active inequality rows into `c_bar`/`d_bar`.
    fn rebuild_active_rows(&mut self) {
        let num_variables = self.cost_h.nrows();
        let active_set_size = self.active_indices.len();

        reshape(&mut self.c_bar, active_set_size, num_variables);
        reshape_vector(&mut self.d_bar, active_set_size);

        for (i, &row) in self.active_indices.iter().enumerate() {
            self.c_bar.row_mut(i).copy_from(&self.ineq_c.row(row));
            self.d_bar[i] = self.ineq_d[row];
        }
    }

    /// Compute `H^-1` and, when equalities exist, `A H^-1`, `H^-1 A^T`,
    /// `A H^-1 A^T`. Cached once per call; only the active-set blocks
    /// change across inner iterations.
    fn compute_cost_inverse_blocks(&mut self) {
        let num_variables = self.cost_h.nrows();
        let num_equalities = self.eq_a.nrows();

        reshape(&mut self.h_inv, num_variables, num_variables);
        self.inverse_calculator
            .compute_inverse(&self.cost_h, &mut self.h_inv);

        reshape(&mut self.eq_a_t, num_variables, num_equalities);
        reshape(&mut self.a_h_inv, num_equalities, num_variables);
        reshape(&mut self.h_inv_a_t, num_variables, num_equalities);
        reshape(&mut self.a_h_inv_a_t, num_equalities, num_equalities);

        if num_equalities > 0 {
            self.eq_a.transpose_to(&mut self.eq_a_t);
            self.a_h_inv.gemm(1.0, &self.eq_a, &self.h_inv, 0.0);
            self.h_inv_a_t.gemm(1.0, &self.h_inv, &self.eq_a_t, 0.0);
            self.a_h_inv_a_t.gemm(1.0, &self.a_h_inv, &self.eq_a_t, 0.0);
        }
    }

    /// Recompute the Schur blocks involving the active rows.
    fn compute_active_row_blocks(&mut self) {
        let num_variables = self.cost_h.nrows();
        let num_equalities = self.eq_a.nrows();
        let num_active = self.c_bar.nrows();

        reshape(&mut self.c_bar_h_inv_a_t, num_active, num_equalities);
        reshape(&mut self.a_h_inv_c_bar_t, num_equalities, num_active);
        reshape(&mut self.c_bar_h_inv, num_active, num_variables);
        reshape(&mut self.h_inv_c_bar_t, num_variables, num_active);
        reshape(&mut self.c_bar_h_inv_c_bar_t, num_active, num_active);

        if num_active > 0 {
            self.c_bar_h_inv_a_t.gemm(1.0, &self.c_bar, &self.h_inv_a_t, 0.0);
            self.c_bar_h_inv_a_t.transpose_to(&mut self.a_h_inv_c_bar_t);

            self.c_bar_h_inv.gemm(1.0, &self.c_bar, &self.h_inv, 0.0);
            self.c_bar_h_inv.transpose_to(&mut self.h_inv_c_bar_t);

            self.c_bar_h_inv_c_bar_t
                .gemm(1.0, &self.c_bar, &self.h_inv_c_bar_t, 0.0);
        }
    }

    /// Solve the equality-constrained subproblem for the current active set.
    ///
    /// Multipliers come from the Schur system
    /// `[A H^-1 A^T, A H^-1 Cb^T; Cb H^-1 A^T, Cb H^-1 Cb^T] [mu; lambda]
    ///  = -[b + A H^-1 f; d + Cb H^-1 f]`,
    /// then `x = -H^-1 (f + A^T mu + Cb^T lambda)`.
    fn solve_equality_constrained_subproblem(&mut self) {
        let num_variables = self.cost_h.nrows();
        let num_equalities = self.eq_a.nrows();
        let num_active = self.active_indices.len();
        let num_augmented = num_equalities + num_active;

        if num_augmented == 0 {
            self.x.gemm(-1.0, &self.h_inv, &self.cost_f, 0.0);
            self.notify_listeners();
            return;
        }

        self.compute_active_row_blocks();

        reshape(&mut self.schur, num_augmented, num_augmented);
        reshape_vector(&mut self.schur_rhs, num_augmented);

        self.schur
            .view_mut((0, 0), (num_equalities, num_equalities))
            .copy_from(&self.a_h_inv_a_t);
        self.schur
            .view_mut((0, num_equalities), (num_equalities, num_active))
            .copy_from(&self.a_h_inv_c_bar_t);
        self.schur
            .view_mut((num_equalities, 0), (num_active, num_equalities))
            .copy_from(&self.c_bar_h_inv_a_t);
        self.schur
            .view_mut((num_equalities, num_equalities), (num_active, num_active))
            .copy_from(&self.c_bar_h_inv_c_bar_t);

        if num_equalities > 0 {
            self.schur_rhs
                .rows_mut(0, num_equalities)
                .copy_from(&self.eq_b);
            self.schur_rhs
                .rows_mut(0, num_equalities)
                .gemm(1.0, &self.a_h_inv, &self.cost_f, 1.0);
        }
        if num_active > 0 {
            self.schur_rhs
                .rows_mut(num_equalities, num_active)
                .copy_from(&self.d_bar);
            self.schur_rhs
                .rows_mut(num_equalities, num_active)
                .gemm(1.0, &self.c_bar_h_inv, &self.cost_f, 1.0);
        }
        self.schur_rhs.neg_mut();

        reshape_vector(&mut self.augmented_multipliers, num_augmented);
        self.augmented_multipliers.copy_from(&self.schur_rhs);
        let factorization = self.schur.clone().lu();
        if !factorization.solve_mut(&mut self.augmented_multipliers) {
            // Singular augmented system: surfaces through the
            // non-convergence reporting path.
            self.augmented_multipliers.fill(f64::NAN);
        }

        reshape(&mut self.a_and_c_bar, num_augmented, num_variables);
        if num_equalities > 0 {
            self.a_and_c_bar
                .view_mut((0, 0), (num_equalities, num_variables))
                .copy_from(&self.eq_a);
        }
        if num_active > 0 {
            self.a_and_c_bar
                .view_mut((num_equalities, 0), (num_active, num_variables))
                .copy_from(&self.c_bar);
        }

        // x = -H^-1 (f + A^T mu + Cb^T lambda)
        reshape_vector(&mut self.constraint_gradient, num_variables);
        self.constraint_gradient
            .gemm_tr(1.0, &self.a_and_c_bar, &self.augmented_multipliers, 0.0);
        self.constraint_gradient += &self.cost_f;
        self.x.gemm(-1.0, &self.h_inv, &self.constraint_gradient, 0.0);
        self.notify_listeners();

        self.eq_multipliers
            .copy_from(&self.augmented_multipliers.rows(0, num_equalities));
        self.ineq_multipliers.fill(0.0);
        for (i, &row) in self.active_indices.iter().enumerate() {
            self.ineq_multipliers[row] = self.augmented_multipliers[num_equalities + i];
        }
    }

    /// One outer iteration of the active-set update rule. Returns true if
    /// any row was added or removed (and the subproblem was re-solved).
    fn adjust_active_set(&mut self) -> bool {
        if self.x.iter().any(|v| v.is_nan()) {
            return false;
        }

        let num_inequalities = self.ineq_c.nrows();
        let mut modified = false;

        // Violation scan over the inactive rows.
        let mut max_violation = f64::NEG_INFINITY;
        if num_inequalities > 0 {
            reshape_vector(&mut self.ineq_check, num_inequalities);
            self.ineq_check.copy_from(&self.ineq_d);
            self.ineq_check.neg_mut();
            self.ineq_check.gemm(1.0, &self.ineq_c, &self.x, 1.0);

            for i in 0..num_inequalities {
                if self.active_indices.contains(&i) {
                    continue;
                }
                if self.ineq_check[i] >= max_violation {
                    max_violation = self.ineq_check[i];
                }
            }
        }

        // Only add a row once its violation clears a comfortable fraction
        // of the worst one; a bare zero threshold makes marginal rows
        // oscillate in and out of the set.
        let min_violation_to_add = (1.0 - self.config.violation_fraction_to_add) * max_violation
            + self.config.convergence_threshold;

        self.indices_to_add.clear();
        if max_violation > min_violation_to_add {
            for i in 0..num_inequalities {
                // Active rows read as zero up to roundoff; skip them.
                if self.active_indices.contains(&i) {
                    continue;
                }
                if self.ineq_check[i] > min_violation_to_add {
                    modified = true;
                    self.indices_to_add.push(i);
                }
            }
        }

        // Multiplier scan over the active rows. A negative multiplier means
        // the row is no longer needed to hold the optimum.
        let mut min_multiplier = f64::INFINITY;
        if !self.active_indices.is_empty() {
            min_multiplier = self.ineq_multipliers.min();
        }

        let max_multiplier_to_remove = -(1.0 - self.config.violation_fraction_to_remove)
            * min_multiplier
            - self.config.multiplier_threshold;

        self.indices_to_remove.clear();
        if min_multiplier < max_multiplier_to_remove {
            for &index in &self.active_indices {
                if self.ineq_multipliers[index] < max_multiplier_to_remove {
                    modified = true;
                    self.indices_to_remove.push(index);
                }
            }
        }

        if !modified {
            return false;
        }

        tracing::debug!(
            added = ?self.indices_to_add,
            removed = ?self.indices_to_remove,
            "active set updated"
        );

        for &index in &self.indices_to_add {
            self.active_indices.push(index);
        }
        let to_remove = &self.indices_to_remove;
        self.active_indices.retain(|index| !to_remove.contains(index));

        self.rebuild_active_rows();
        self.solve_equality_constrained_subproblem();

        true
    }

    fn notify_listeners(&mut self) {
        for listener in &mut self.listeners {
            listener.solution_computed(&self.x, &self.active_indices);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn set_cost_rejects_non_square_matrix() {
        let mut solver = ActiveSetQpSolver::with_defaults();
        let h = DMatrix::zeros(2, 3);
        let f = DVector::zeros(2);
        assert_eq!(
            solver.set_cost(&h, &f),
            Err(ProblemError::CostMatrixNotSquare { rows: 2, cols: 3 })
        );
    }

    #[test]
    fn set_cost_rejects_mismatched_vector() {
        let mut solver = ActiveSetQpSolver::with_defaults();
        let h = DMatrix::identity(3, 3);
        let f = DVector::zeros(2);
        assert_eq!(
            solver.set_cost(&h, &f),
            Err(ProblemError::CostVectorDimMismatch {
                matrix_rows: 3,
                vector_rows: 2
            })
        );
    }

    #[test]
    fn constraint_setters_reject_wrong_variable_count() {
        let mut solver = ActiveSetQpSolver::with_defaults();
        solver
            .set_cost(&DMatrix::identity(2, 2), &DVector::zeros(2))
            .unwrap();

        let a = DMatrix::zeros(1, 3);
        let b = DVector::zeros(1);
        assert_eq!(
            solver.set_equality_constraints(&a, &b),
            Err(ProblemError::VariableCountMismatch { expected: 2, got: 3 })
        );
        assert_eq!(
            solver.set_inequality_constraints(&a, &b),
            Err(ProblemError::VariableCountMismatch { expected: 2, got: 3 })
        );
    }

    #[test]
    fn constraint_setters_reject_row_mismatch() {
        let mut solver = ActiveSetQpSolver::with_defaults();
        solver
            .set_cost(&DMatrix::identity(2, 2), &DVector::zeros(2))
            .unwrap();

        let a = DMatrix::zeros(2, 2);
        let b = DVector::zeros(1);
        assert_eq!(
            solver.set_equality_constraints(&a, &b),
            Err(ProblemError::EqualityRowMismatch {
                matrix_rows: 2,
                vector_rows: 1
            })
        );
        assert_eq!(
            solver.set_inequality_constraints(&a, &b),
            Err(ProblemError::InequalityRowMismatch {
                matrix_rows: 2,
                vector_rows: 1
            })
        );
    }

    #[test]
    fn asymmetric_cost_is_symmetrized() {
        // H and 0.5 (H + H^T) define the same quadratic form, so both must
        // give the same minimizer.
        let h = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 0.0, 2.0]);
        let h_sym = DMatrix::from_row_slice(2, 2, &[2.0, 0.5, 0.5, 2.0]);
        let f = DVector::from_column_slice(&[-1.0, -1.0]);

        let mut solver = ActiveSetQpSolver::with_defaults();
        solver.set_cost(&h, &f).unwrap();
        let mut x_raw = DVector::zeros(2);
        assert!(solver.solve(&mut x_raw).converged);

        let mut solver_sym = ActiveSetQpSolver::with_defaults();
        solver_sym.set_cost(&h_sym, &f).unwrap();
        let mut x_sym = DVector::zeros(2);
        assert!(solver_sym.solve(&mut x_sym).converged);

        assert_relative_eq!(x_raw[0], x_sym[0], epsilon = 1e-12);
        assert_relative_eq!(x_raw[1], x_sym[1], epsilon = 1e-12);
    }

    #[test]
    fn objective_cost_includes_constant() {
        // (x - 5)^2 = 1/2 * 2 x^2 - 10 x + 25
        let mut solver = ActiveSetQpSolver::with_defaults();
        solver
            .set_cost_with_constant(
                &DMatrix::from_row_slice(1, 1, &[2.0]),
                &DVector::from_column_slice(&[-10.0]),
                25.0,
            )
            .unwrap();
        let at_minimum = DVector::from_column_slice(&[5.0]);
        assert_relative_eq!(solver.objective_cost(&at_minimum), 0.0, epsilon = 1e-12);
        let at_three = DVector::from_column_slice(&[3.0]);
        assert_relative_eq!(solver.objective_cost(&at_three), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn clear_empties_problem_but_keeps_active_set() {
        let mut solver = ActiveSetQpSolver::with_defaults();
        solver
            .set_cost(&DMatrix::identity(2, 2), &DVector::zeros(2))
            .unwrap();
        solver.set_active_inequality_indices(&[1]);
        solver.clear();
        assert_eq!(solver.active_inequality_indices(), &[1]);

        // A solve on the cleared problem is a 0-variable no-op.
        let mut x = DVector::zeros(2);
        let outcome = solver.solve(&mut x);
        assert!(outcome.converged);
        assert_eq!(x.nrows(), 0);
    }
}
