use thiserror::Error;

/// Problem-definition errors raised by the setup methods.
///
/// These are programming errors in the upstream constraint builder, not
/// runtime conditions: the solver never truncates or pads a mismatched
/// matrix, it refuses it.
///
/// Copy + static messages for cheap propagation in hot paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProblemError {
    #[error("Cost matrix is not square: {rows}x{cols}")]
    CostMatrixNotSquare { rows: usize, cols: usize },

    #[error("Cost vector length mismatch: matrix has {matrix_rows} rows, vector has {vector_rows}")]
    CostVectorDimMismatch {
        matrix_rows: usize,
        vector_rows: usize,
    },

    #[error("Equality constraint rows mismatch: A has {matrix_rows}, b has {vector_rows}")]
    EqualityRowMismatch {
        matrix_rows: usize,
        vector_rows: usize,
    },

    #[error("Inequality constraint rows mismatch: C has {matrix_rows}, d has {vector_rows}")]
    InequalityRowMismatch {
        matrix_rows: usize,
        vector_rows: usize,
    },

    #[error("Constraint column count mismatch: problem has {expected} variables, got {got}")]
    VariableCountMismatch { expected: usize, got: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn problem_error_is_copy() {
        let err = ProblemError::VariableCountMismatch { expected: 4, got: 3 };
        let err2 = err; // Copy
        assert_eq!(err, err2);
    }

    #[test]
    fn problem_error_display_messages() {
        assert_eq!(
            ProblemError::CostMatrixNotSquare { rows: 3, cols: 2 }.to_string(),
            "Cost matrix is not square: 3x2"
        );
        assert_eq!(
            ProblemError::CostVectorDimMismatch {
                matrix_rows: 3,
                vector_rows: 2
            }
            .to_string(),
            "Cost vector length mismatch: matrix has 3 rows, vector has 2"
        );
        assert_eq!(
            ProblemError::EqualityRowMismatch {
                matrix_rows: 2,
                vector_rows: 1
            }
            .to_string(),
            "Equality constraint rows mismatch: A has 2, b has 1"
        );
        assert_eq!(
            ProblemError::InequalityRowMismatch {
                matrix_rows: 5,
                vector_rows: 4
            }
            .to_string(),
            "Inequality constraint rows mismatch: C has 5, d has 4"
        );
        assert_eq!(
            ProblemError::VariableCountMismatch { expected: 6, got: 5 }.to_string(),
            "Constraint column count mismatch: problem has 6 variables, got 5"
        );
    }
}
