use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;
use crate::math::par;

/// Row-wise softmax. Each row's maximum is subtracted before exponentiating,
/// so large logits do not overflow.
pub fn softmax(z: &Matrix) -> Matrix {
    let mut res = Matrix::alloc(z.rows(), z.cols());
    par::fill_rows(res.as_mut_slice(), z.cols(), |i, out| {
        let row = z.row(i);
        let max = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mut sum = 0.0;
        for (o, &x) in out.iter_mut().zip(row) {
            *o = (x - max).exp();
            sum += *o;
        }
        for o in out.iter_mut() {
            *o /= sum;
        }
    });
    res
}

/// Elementwise `o * (1 - o)` with `o = softmax(z)`: the diagonal of the
/// softmax Jacobian only.
pub fn softmax_prime(z: &Matrix) -> Matrix {
    softmax(z).apply(|o| o * (1.0 - o))
}

/// Exact Jacobian-vector product of softmax for each row:
/// `out_j = s_j * (g_j - Σ_k g_k s_k)`, where `s` is the softmax output and
/// `g` the upstream gradient with respect to it.
pub fn softmax_jvp(s: &Matrix, upstream: &Matrix) -> Result<Matrix> {
    if s.shape() != upstream.shape() {
        return Err(NnError::shape("softmax_jvp", s.shape(), upstream.shape()));
    }
    let mut res = Matrix::alloc(s.rows(), s.cols());
    par::fill_rows(res.as_mut_slice(), s.cols(), |i, out| {
        let (s_row, g_row) = (s.row(i), upstream.row(i));
        let weighted: f64 = s_row.iter().zip(g_row).map(|(s, g)| s * g).sum();
        for ((o, &s), &g) in out.iter_mut().zip(s_row).zip(g_row) {
            *o = s * (g - weighted);
        }
    });
    Ok(res)
}
