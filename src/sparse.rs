//! Compressed sparse containers.
//!
//! Sparse containers are operand leaves: they compose with any dense
//! expression and materialize into dense targets on assignment. The
//! dedicated sparse product nodes live in [`crate::expr`].

use crate::eval::PtrRange;
use crate::scalar::Scalar;
use crate::{ExprError, Result};

/// Compressed sparse row matrix.
///
/// `row_ptr` has `rows + 1` entries; row `i` occupies
/// `col_idx[row_ptr[i]..row_ptr[i + 1]]` with strictly increasing column
/// indices. The constructor validates this invariant once so the product
/// kernels never re-check it.
#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix<T> {
    rows: usize,
    cols: usize,
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    values: Vec<T>,
}

impl<T: Scalar> CsrMatrix<T> {
    /// Build from raw CSR arrays, validating the index structure.
    pub fn new(
        rows: usize,
        cols: usize,
        row_ptr: Vec<usize>,
        col_idx: Vec<usize>,
        values: Vec<T>,
    ) -> Result<Self> {
        if row_ptr.len() != rows + 1 {
            return Err(ExprError::BadSparse("row_ptr length must be rows + 1"));
        }
        if *row_ptr.first().unwrap_or(&0) != 0 || *row_ptr.last().unwrap_or(&0) != col_idx.len() {
            return Err(ExprError::BadSparse("row_ptr must span 0..=nnz"));
        }
        if col_idx.len() != values.len() {
            return Err(ExprError::BadSparse("col_idx and values length mismatch"));
        }
        for w in row_ptr.windows(2) {
            if w[0] > w[1] {
                return Err(ExprError::BadSparse("row_ptr must be non-decreasing"));
            }
        }
        for i in 0..rows {
            let row = &col_idx[row_ptr[i]..row_ptr[i + 1]];
            for w in row.windows(2) {
                if w[0] >= w[1] {
                    return Err(ExprError::BadSparse("column indices must increase per row"));
                }
            }
            if let Some(&last) = row.last() {
                if last >= cols {
                    return Err(ExprError::BadSparse("column index out of bounds"));
                }
            }
        }
        Ok(Self {
            rows,
            cols,
            row_ptr,
            col_idx,
            values,
        })
    }

    /// Build from `(row, col, value)` triplets. Duplicate positions are
    /// summed.
    pub fn from_triplets(
        rows: usize,
        cols: usize,
        triplets: &[(usize, usize, T)],
    ) -> Result<Self> {
        for &(i, j, _) in triplets {
            if i >= rows || j >= cols {
                return Err(ExprError::BadSparse("triplet index out of bounds"));
            }
        }
        let mut sorted: Vec<(usize, usize, T)> = triplets.to_vec();
        sorted.sort_by_key(|&(i, j, _)| (i, j));

        let mut row_ptr = vec![0usize; rows + 1];
        let mut col_idx: Vec<usize> = Vec::with_capacity(sorted.len());
        let mut values: Vec<T> = Vec::with_capacity(sorted.len());
        let mut k = 0usize;
        for i in 0..rows {
            row_ptr[i] = col_idx.len();
            while k < sorted.len() && sorted[k].0 == i {
                let (_, j, v) = sorted[k];
                match values.last_mut() {
                    Some(last) if col_idx.len() > row_ptr[i] && col_idx[col_idx.len() - 1] == j => {
                        *last += v;
                    }
                    _ => {
                        col_idx.push(j);
                        values.push(v);
                    }
                }
                k += 1;
            }
        }
        row_ptr[rows] = col_idx.len();
        Self::new(rows, cols, row_ptr, col_idx, values)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of explicitly stored entries.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Iterate the stored entries of row `i` as `(col, &value)`.
    pub fn row(&self, i: usize) -> impl Iterator<Item = (usize, &T)> {
        let span = self.row_ptr[i]..self.row_ptr[i + 1];
        self.col_idx[span.clone()]
            .iter()
            .copied()
            .zip(self.values[span].iter())
    }

    /// Element lookup by binary search within the row.
    pub fn get(&self, i: usize, j: usize) -> T {
        let span = self.row_ptr[i]..self.row_ptr[i + 1];
        match self.col_idx[span.clone()].binary_search(&j) {
            Ok(pos) => self.values[span.start + pos],
            Err(_) => T::zero(),
        }
    }

    pub fn ptr_range(&self) -> PtrRange {
        PtrRange::of_slice(&self.values)
    }
}

/// Sparse column vector: sorted `(index, value)` pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseVector<T> {
    len: usize,
    indices: Vec<usize>,
    values: Vec<T>,
}

impl<T: Scalar> SparseVector<T> {
    pub fn new(len: usize, indices: Vec<usize>, values: Vec<T>) -> Result<Self> {
        if indices.len() != values.len() {
            return Err(ExprError::BadSparse("indices and values length mismatch"));
        }
        for w in indices.windows(2) {
            if w[0] >= w[1] {
                return Err(ExprError::BadSparse("vector indices must increase"));
            }
        }
        if let Some(&last) = indices.last() {
            if last >= len {
                return Err(ExprError::BadSparse("vector index out of bounds"));
            }
        }
        Ok(Self {
            len,
            indices,
            values,
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.indices.iter().copied().zip(self.values.iter())
    }

    pub fn get(&self, i: usize) -> T {
        match self.indices.binary_search(&i) {
            Ok(pos) => self.values[pos],
            Err(_) => T::zero(),
        }
    }

    pub fn ptr_range(&self) -> PtrRange {
        PtrRange::of_slice(&self.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csr_validation() {
        // [1 0 2]
        // [0 0 3]
        let m = CsrMatrix::new(2, 3, vec![0, 2, 3], vec![0, 2, 2], vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(m.get(0, 2), 2.0);
        assert_eq!(m.get(1, 0), 0.0);
        assert_eq!(m.nnz(), 3);

        assert!(CsrMatrix::new(2, 3, vec![0, 2], vec![0, 2, 2], vec![1.0, 2.0, 3.0]).is_err());
        assert!(CsrMatrix::new(2, 3, vec![0, 2, 3], vec![2, 0, 2], vec![1.0, 2.0, 3.0]).is_err());
        assert!(CsrMatrix::new(2, 3, vec![0, 2, 3], vec![0, 5, 2], vec![1.0, 2.0, 3.0]).is_err());
    }

    #[test]
    fn triplets_fold_duplicates() {
        let m =
            CsrMatrix::from_triplets(2, 2, &[(0, 1, 1.0), (0, 1, 2.0), (1, 0, 4.0)]).unwrap();
        assert_eq!(m.get(0, 1), 3.0);
        assert_eq!(m.get(1, 0), 4.0);
        assert_eq!(m.nnz(), 2);
    }

    #[test]
    fn sparse_vector_lookup() {
        let v = SparseVector::new(5, vec![1, 4], vec![2.0, 7.0]).unwrap();
        assert_eq!(v.get(1), 2.0);
        assert_eq!(v.get(2), 0.0);
        assert_eq!(v.get(4), 7.0);
    }
}
