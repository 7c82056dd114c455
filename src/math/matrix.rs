use rand::prelude::*;
use std::f64::consts::PI;

use crate::error::{NnError, Result};
use crate::math::par;

/// Dense row-major matrix of `f64`.
///
/// The buffer always holds exactly `rows * cols` elements and both
/// dimensions are at least 1. Every operation that produces a matrix
/// allocates a fresh buffer, so two live matrices never share storage.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

/// Direction used by [`Matrix::flatten`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Row-major reading; reinterprets the shape as `1 x (rows*cols)` in place.
    Row,
    /// Column-major reading into a new `(rows*cols) x 1` matrix.
    Column,
}

impl Matrix {
    /// Allocates a zero-filled `rows x cols` matrix.
    pub fn new(rows: usize, cols: usize) -> Result<Matrix> {
        if rows == 0 || cols == 0 || rows.checked_mul(cols).is_none() {
            return Err(NnError::InvalidDimensions { rows, cols });
        }
        log::trace!("creating a {}x{} matrix", rows, cols);
        Ok(Matrix::alloc(rows, cols))
    }

    /// Like [`Matrix::new`] but panics on a zero dimension.
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix::new(rows, cols).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Internal constructor for shapes taken from already-valid matrices.
    pub(crate) fn alloc(rows: usize, cols: usize) -> Matrix {
        Matrix {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Wraps a row-major buffer.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Matrix> {
        let len = match rows.checked_mul(cols) {
            Some(len) if rows > 0 && cols > 0 => len,
            _ => return Err(NnError::InvalidDimensions { rows, cols }),
        };
        if data.len() != len {
            return Err(NnError::InvalidConfig(format!(
                "buffer of {} elements cannot back a {}x{} matrix",
                data.len(),
                rows,
                cols
            )));
        }
        Ok(Matrix { rows, cols, data })
    }

    /// Stacks equally sized rows into a matrix.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Matrix> {
        let cols = rows.first().map_or(0, Vec::len);
        if rows.is_empty() || cols == 0 {
            return Err(NnError::InvalidDimensions { rows: rows.len(), cols });
        }
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(NnError::InvalidConfig(format!(
                    "row {} has {} columns, expected {}",
                    i,
                    row.len(),
                    cols
                )));
            }
            data.extend_from_slice(row);
        }
        Ok(Matrix { rows: rows.len(), cols, data })
    }

    /// `n x n` identity matrix.
    pub fn identity(n: usize) -> Result<Matrix> {
        let mut m = Matrix::new(n, n)?;
        for i in 0..n {
            m.data[i * n + i] = 1.0;
        }
        Ok(m)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false; kept for clippy's `len_without_is_empty`.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Element at `(row, col)`; panics when out of bounds.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        assert!(row < self.rows && col < self.cols, "index ({row}, {col}) out of bounds");
        self.data[row * self.cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        assert!(row < self.rows && col < self.cols, "index ({row}, {col}) out of bounds");
        self.data[row * self.cols + col] = value;
    }

    /// Borrow of row `i`.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Copies the given rows, in order, into a new matrix.
    pub fn select_rows(&self, indices: &[usize]) -> Result<Matrix> {
        let mut out = Matrix::new(indices.len(), self.cols)?;
        for (dst, &src) in indices.iter().enumerate() {
            if src >= self.rows {
                return Err(NnError::InvalidConfig(format!(
                    "row {} out of range for {} rows",
                    src, self.rows
                )));
            }
            out.data[dst * self.cols..(dst + 1) * self.cols].copy_from_slice(self.row(src));
        }
        Ok(out)
    }

    pub fn fill(&mut self, value: f64) {
        self.data.iter_mut().for_each(|x| *x = value);
    }

    /// Fills with i.i.d. uniform samples in `[-1/sqrt(scale), 1/sqrt(scale)]`.
    ///
    /// `scale` is normally the fan-in of the layer the matrix belongs to.
    pub fn randomize(&mut self, scale: f64) {
        self.randomize_with(scale, &mut rand::thread_rng());
    }

    pub fn randomize_with<R: Rng + ?Sized>(&mut self, scale: f64, rng: &mut R) {
        assert!(scale > 0.0, "randomize scale must be positive, got {scale}");
        let bound = 1.0 / scale.sqrt();
        for x in self.data.iter_mut() {
            *x = rng.gen_range(-bound..=bound);
        }
    }

    /// Samples a single value from N(0, 1) using the Box-Muller transform.
    fn sample_standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
        // (0, 1] keeps ln() finite.
        let u1: f64 = 1.0 - rng.gen::<f64>();
        let u2: f64 = 1.0 - rng.gen::<f64>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }

    /// He initialization: N(0, sqrt(2 / fan_in)). Suited to ReLU-family layers.
    ///
    /// Weights are stored `D_in x D_out`, so the fan-in is `rows`.
    pub fn he_with<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Result<Matrix> {
        let std_dev = (2.0 / rows as f64).sqrt();
        let mut res = Matrix::new(rows, cols)?;
        for x in res.data.iter_mut() {
            *x = Matrix::sample_standard_normal(rng) * std_dev;
        }
        Ok(res)
    }

    /// Xavier (Glorot) initialization: N(0, sqrt(1 / fan_in)).
    /// Suited to Sigmoid/Tanh/Identity layers.
    pub fn xavier_with<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Result<Matrix> {
        let std_dev = (1.0 / rows as f64).sqrt();
        let mut res = Matrix::new(rows, cols)?;
        for x in res.data.iter_mut() {
            *x = Matrix::sample_standard_normal(rng) * std_dev;
        }
        Ok(res)
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::alloc(self.cols, self.rows);
        let (rows, cols) = (self.rows, self.cols);
        let src = &self.data;
        // Output row j is input column j.
        par::fill_rows(&mut res.data, rows, |j, out_row| {
            for (i, v) in out_row.iter_mut().enumerate() {
                *v = src[i * cols + j];
            }
        });
        res
    }

    /// Maps `functor` over every element into a new matrix.
    pub fn apply<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64 + Sync + Send,
    {
        let mut res = Matrix::alloc(self.rows, self.cols);
        let src = &self.data;
        par::fill_each(&mut res.data, |i| functor(src[i]));
        res
    }

    /// Flat index of the largest element; ties go to the first occurrence.
    pub fn argmax(&self) -> usize {
        let mut best = 0;
        for (i, &x) in self.data.iter().enumerate().skip(1) {
            if x > self.data[best] {
                best = i;
            }
        }
        best
    }

    /// Per-row argmax, used for classification accuracy.
    pub fn argmax_rows(&self) -> Vec<usize> {
        (0..self.rows)
            .map(|i| {
                let row = self.row(i);
                let mut best = 0;
                for (j, &x) in row.iter().enumerate().skip(1) {
                    if x > row[best] {
                        best = j;
                    }
                }
                best
            })
            .collect()
    }

    /// Flattens into a single row (`Axis::Row`, no copy) or a single column
    /// read column-major (`Axis::Column`, new buffer).
    pub fn flatten(self, axis: Axis) -> Matrix {
        match axis {
            Axis::Row => Matrix {
                rows: 1,
                cols: self.rows * self.cols,
                data: self.data,
            },
            Axis::Column => {
                let mut res = Matrix::alloc(self.rows * self.cols, 1);
                let mut k = 0;
                for j in 0..self.cols {
                    for i in 0..self.rows {
                        res.data[k] = self.data[i * self.cols + j];
                        k += 1;
                    }
                }
                res
            }
        }
    }

    /// Same shape and every element within `eps`.
    pub fn approx_eq(&self, other: &Matrix, eps: f64) -> bool {
        self.shape() == other.shape()
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(a, b)| (a - b).abs() <= eps)
    }
}
