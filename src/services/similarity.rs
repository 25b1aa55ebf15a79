use ndarray::{Array1, Array2, Axis};

use super::text::SparseVector;

/// Cosine similarity of two sparse vectors sorted by index
///
/// A zero vector has similarity 0 with everything, itself included.
pub fn sparse_cosine(a: &SparseVector, b: &SparseVector) -> f64 {
    let norm_a = a.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let (mut i, mut j) = (0, 0);
    let mut dot = 0.0;
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                dot += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }

    dot / (norm_a * norm_b)
}

/// Symmetric matrix of pairwise cosine similarities between sparse rows
pub fn pairwise_cosine(rows: &[SparseVector]) -> Array2<f64> {
    let n = rows.len();
    let mut sim = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in i..n {
            let value = sparse_cosine(&rows[i], &rows[j]);
            sim[[i, j]] = value;
            sim[[j, i]] = value;
        }
    }
    sim
}

/// Cosine similarity between the columns of `matrix`
///
/// Returns a `cols x cols` matrix. Columns that are entirely zero get
/// similarity 0 with every column.
pub fn column_cosine(matrix: &Array2<f64>) -> Array2<f64> {
    let norms: Array1<f64> = matrix
        .map(|v| v * v)
        .sum_axis(Axis(0))
        .mapv(f64::sqrt);

    let mut sim = matrix.t().dot(matrix);
    for ((i, j), value) in sim.indexed_iter_mut() {
        let denom = norms[i] * norms[j];
        *value = if denom > 0.0 { *value / denom } else { 0.0 };
    }
    sim
}
