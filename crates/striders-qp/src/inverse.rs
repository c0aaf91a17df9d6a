//! Pluggable cost-matrix inverse strategies.
//!
//! The KKT subproblem needs `H^-1` once per solve. For a generic dense cost
//! matrix a plain LU inverse is fine, but the MPC stacks its cost
//! block-diagonally (one block per knot point), and inverting the blocks
//! independently is much cheaper. The solver only depends on the
//! [`InverseCalculator`] capability, so the two are interchangeable.

use nalgebra::DMatrix;

/// Capability: given a matrix, produce its inverse into a caller-owned
/// buffer.
///
/// Implementations must not panic on a singular input; they fill the buffer
/// with NaN instead, which the solve then reports through its
/// non-convergence path.
pub trait InverseCalculator {
    /// Write the inverse of `matrix` into `inverse`. `inverse` is already
    /// sized to match `matrix`.
    fn compute_inverse(&self, matrix: &DMatrix<f64>, inverse: &mut DMatrix<f64>);
}

/// Default dense inverse.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenseInverse;

impl InverseCalculator for DenseInverse {
    fn compute_inverse(&self, matrix: &DMatrix<f64>, inverse: &mut DMatrix<f64>) {
        inverse.copy_from(matrix);
        if !inverse.try_inverse_mut() {
            inverse.fill(f64::NAN);
        }
    }
}

/// Inverse specialized to block-diagonal matrices.
///
/// Inverts each `block_size` x `block_size` diagonal block independently and
/// zeros everything off the block diagonal. Off-block entries of the input
/// are ignored; the caller guarantees the structure. A trailing partial
/// block (when the dimension is not a multiple of `block_size`) is inverted
/// at its actual size.
#[derive(Debug, Clone, Copy)]
pub struct BlockDiagonalInverse {
    block_size: usize,
}

impl BlockDiagonalInverse {
    /// `block_size` must be nonzero.
    pub fn new(block_size: usize) -> Self {
        assert!(block_size > 0, "block size must be nonzero");
        Self { block_size }
    }
}

impl InverseCalculator for BlockDiagonalInverse {
    fn compute_inverse(&self, matrix: &DMatrix<f64>, inverse: &mut DMatrix<f64>) {
        let n = matrix.nrows();
        inverse.fill(0.0);

        let mut start = 0;
        while start < n {
            let size = self.block_size.min(n - start);
            let mut block = matrix.view((start, start), (size, size)).clone_owned();
            if !block.try_inverse_mut() {
                inverse.fill(f64::NAN);
                return;
            }
            inverse.view_mut((start, start), (size, size)).copy_from(&block);
            start += size;
        }
    }
}
