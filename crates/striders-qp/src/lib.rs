//! Active-set QP solver for whole-body model-predictive control.
//!
//! Each control cycle the MPC hands this crate a dense quadratic program
//!
//! ```text
//! minimize   1/2 x^T H x + f^T x
//! subject to A x  = b
//!            C x <= d
//! ```
//!
//! and expects a solution back well inside the cycle deadline. The solver
//! uses the classical active-set method specialized for QPs, after the MIT
//! paper "An efficiently solvable quadratic program for stabilizing dynamic
//! locomotion" (Kuindersma, Permenter, Tedrake): the active inequality rows
//! are imposed as equalities, the resulting KKT system is solved through the
//! Schur complement of a precomputed cost-matrix inverse, and rows are added
//! or dropped based on constraint violations and multiplier signs until the
//! set stabilizes.
//!
//! # Design
//!
//! - **Warm starting**: the active set is the only state carried between
//!   calls. For a slowly changing problem the previous set is usually
//!   already correct and the solve converges in one iteration.
//! - **Graceful degradation**: an infeasible or fast-changing problem must
//!   not take down the control loop. Hitting the iteration cap (or a
//!   singular subproblem) is reported through [`SolveOutcome::converged`]
//!   and the configured [`FailurePolicy`], never a panic.
//! - **Scratch reuse**: all intermediate matrices are solver-owned buffers
//!   reshaped in place; this is a hot path called at control rate.
//!
//! The cost-matrix inverse is pluggable through [`InverseCalculator`], so a
//! caller that knows the structure of its cost matrix (block-diagonal, for
//! the usual MPC stacking) can swap in a cheaper inverse.

pub mod error;
pub mod inverse;
pub mod solver;
pub mod types;

pub use error::ProblemError;
pub use inverse::{BlockDiagonalInverse, DenseInverse, InverseCalculator};
pub use solver::ActiveSetQpSolver;
pub use types::{FailurePolicy, IntermediateSolutionListener, QpSolverConfig, SolveOutcome};
