//! Output-indexed loops shared by the matrix kernels.
//!
//! Every caller writes each output cell (or row) from read-only inputs, so the
//! iterations are independent. With the `parallel` feature the loops run on
//! the rayon pool; otherwise they are plain sequential iterators.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Sets `out[i] = f(i)` for every index.
pub(crate) fn fill_each<F>(out: &mut [f64], f: F)
where
    F: Fn(usize) -> f64 + Sync + Send,
{
    #[cfg(feature = "parallel")]
    out.par_iter_mut().enumerate().for_each(|(i, v)| *v = f(i));

    #[cfg(not(feature = "parallel"))]
    out.iter_mut().enumerate().for_each(|(i, v)| *v = f(i));
}

/// Calls `f(row_index, row)` for every `cols`-wide row of `out`.
pub(crate) fn fill_rows<F>(out: &mut [f64], cols: usize, f: F)
where
    F: Fn(usize, &mut [f64]) + Sync + Send,
{
    #[cfg(feature = "parallel")]
    out.par_chunks_mut(cols).enumerate().for_each(|(i, row)| f(i, row));

    #[cfg(not(feature = "parallel"))]
    out.chunks_mut(cols).enumerate().for_each(|(i, row)| f(i, row));
}
