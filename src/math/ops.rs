use std::ops::{Add, Mul, Sub};

use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;
use crate::math::par;

impl Matrix {
    fn zip_with<F>(&self, rhs: &Matrix, op: &'static str, f: F) -> Result<Matrix>
    where
        F: Fn(f64, f64) -> f64 + Sync + Send,
    {
        if self.shape() != rhs.shape() {
            return Err(NnError::shape(op, self.shape(), rhs.shape()));
        }
        log::trace!("{} on two {}x{} matrices", op, self.rows(), self.cols());
        let mut res = Matrix::alloc(self.rows(), self.cols());
        let (a, b) = (self.as_slice(), rhs.as_slice());
        par::fill_each(res.as_mut_slice(), |i| f(a[i], b[i]));
        Ok(res)
    }

    /// Elementwise `self + rhs`.
    pub fn add(&self, rhs: &Matrix) -> Result<Matrix> {
        self.zip_with(rhs, "add", |a, b| a + b)
    }

    /// Elementwise `self - rhs`.
    pub fn subtract(&self, rhs: &Matrix) -> Result<Matrix> {
        self.zip_with(rhs, "subtract", |a, b| a - b)
    }

    /// Hadamard product.
    pub fn multiply(&self, rhs: &Matrix) -> Result<Matrix> {
        self.zip_with(rhs, "multiply", |a, b| a * b)
    }

    pub fn add_scalar(&self, n: f64) -> Matrix {
        self.apply(|x| x + n)
    }

    /// Multiplies every element by `n`.
    pub fn scale(&self, n: f64) -> Matrix {
        self.apply(|x| x * n)
    }

    /// Adds the `1 x N` row vector `bias` to every row of this `M x N` matrix.
    pub fn add_bias(&self, bias: &Matrix) -> Result<Matrix> {
        if bias.rows() != 1 || bias.cols() != self.cols() {
            return Err(NnError::shape("add_bias", self.shape(), bias.shape()));
        }
        let mut res = Matrix::alloc(self.rows(), self.cols());
        let (src, b, cols) = (self.as_slice(), bias.as_slice(), self.cols());
        par::fill_rows(res.as_mut_slice(), cols, |i, row| {
            for (j, v) in row.iter_mut().enumerate() {
                *v = src[i * cols + j] + b[j];
            }
        });
        Ok(res)
    }

    /// Reduces `M x N` to `1 x N` by summing each column.
    pub fn sum_columns(&self) -> Matrix {
        let mut res = Matrix::alloc(1, self.cols());
        let (src, rows, cols) = (self.as_slice(), self.rows(), self.cols());
        par::fill_each(res.as_mut_slice(), |j| (0..rows).map(|i| src[i * cols + j]).sum());
        res
    }

    /// Matrix product `self · rhs`.
    pub fn dot(&self, rhs: &Matrix) -> Result<Matrix> {
        if self.cols() != rhs.rows() {
            return Err(NnError::shape("dot", self.shape(), rhs.shape()));
        }
        log::trace!(
            "dot of {}x{} and {}x{}",
            self.rows(),
            self.cols(),
            rhs.rows(),
            rhs.cols()
        );
        let mut res = Matrix::alloc(self.rows(), rhs.cols());
        let (a, b) = (self.as_slice(), rhs.as_slice());
        let (inner, out_cols) = (self.cols(), rhs.cols());
        par::fill_rows(res.as_mut_slice(), out_cols, |i, row| {
            for (j, v) in row.iter_mut().enumerate() {
                let mut sum = 0.0;
                for k in 0..inner {
                    sum += a[i * inner + k] * b[k * out_cols + j];
                }
                *v = sum;
            }
        });
        Ok(res)
    }
}

// Operator forms panic on shape mismatch; use the named methods to get a
// `Result` instead. `*` is the matrix product, not the Hadamard product.

impl Add for &Matrix {
    type Output = Matrix;

    fn add(self, rhs: Self) -> Self::Output {
        Matrix::add(self, rhs).unwrap_or_else(|e| panic!("{e}"))
    }
}

impl Sub for &Matrix {
    type Output = Matrix;

    fn sub(self, rhs: Self) -> Self::Output {
        self.subtract(rhs).unwrap_or_else(|e| panic!("{e}"))
    }
}

impl Mul for &Matrix {
    type Output = Matrix;

    fn mul(self, rhs: Self) -> Self::Output {
        self.dot(rhs).unwrap_or_else(|e| panic!("{e}"))
    }
}
