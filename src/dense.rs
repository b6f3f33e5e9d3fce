//! Owning dense containers.
//!
//! Containers are the only entities in the crate with mutable element
//! storage and a real lifetime; every expression node borrows them (or
//! owns a materialized temporary). Storage is column-major with a tight
//! leading dimension, which is what the product kernels and the
//! factorization adapters expect.

use crate::eval::PtrRange;
use crate::scalar::Scalar;
use crate::{ExprError, Result};

/// Owning column-major dense matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix<T> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
}

impl<T: Scalar> DenseMatrix<T> {
    /// A `rows` x `cols` matrix of zeros.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![T::zero(); rows * cols],
            rows,
            cols,
        }
    }

    /// The `n` x `n` identity matrix.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.data[i + i * n] = T::one();
        }
        m
    }

    /// Build element-by-element from a closure over `(row, col)`.
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for j in 0..cols {
            for i in 0..rows {
                data.push(f(i, j));
            }
        }
        Self { data, rows, cols }
    }

    /// Build from row slices. All rows must have the same length.
    pub fn from_rows(rows: &[&[T]]) -> Result<Self> {
        let nrows = rows.len();
        let ncols = rows.first().map_or(0, |r| r.len());
        for r in rows {
            if r.len() != ncols {
                return Err(ExprError::DimensionMismatch(nrows, ncols, nrows, r.len()));
            }
        }
        Ok(Self::from_fn(nrows, ncols, |i, j| rows[i][j]))
    }

    /// Wrap an existing column-major buffer.
    pub fn from_col_major(data: Vec<T>, rows: usize, cols: usize) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(ExprError::DimensionMismatch(rows, cols, data.len(), 1));
        }
        Ok(Self { data, rows, cols })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Column-major element storage.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Contiguous column `j`.
    pub fn col(&self, j: usize) -> &[T] {
        &self.data[j * self.rows..(j + 1) * self.rows]
    }

    pub fn col_mut(&mut self, j: usize) -> &mut [T] {
        &mut self.data[j * self.rows..(j + 1) * self.rows]
    }

    /// Address range of the element storage, for alias analysis.
    pub fn ptr_range(&self) -> PtrRange {
        PtrRange::of_slice(&self.data)
    }

    /// Resize, discarding contents.
    pub fn resize(&mut self, rows: usize, cols: usize) {
        self.data.clear();
        self.data.resize(rows * cols, T::zero());
        self.rows = rows;
        self.cols = cols;
    }
}

impl<T> std::ops::Index<[usize; 2]> for DenseMatrix<T> {
    type Output = T;

    #[inline]
    fn index(&self, [i, j]: [usize; 2]) -> &T {
        assert!(i < self.rows && j < self.cols, "index out of bounds");
        &self.data[i + j * self.rows]
    }
}

impl<T> std::ops::IndexMut<[usize; 2]> for DenseMatrix<T> {
    #[inline]
    fn index_mut(&mut self, [i, j]: [usize; 2]) -> &mut T {
        assert!(i < self.rows && j < self.cols, "index out of bounds");
        &mut self.data[i + j * self.rows]
    }
}

/// Owning dense column vector.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseVector<T> {
    data: Vec<T>,
}

impl<T: Scalar> DenseVector<T> {
    pub fn zeros(len: usize) -> Self {
        Self {
            data: vec![T::zero(); len],
        }
    }

    pub fn from_fn(len: usize, f: impl FnMut(usize) -> T) -> Self {
        Self {
            data: (0..len).map(f).collect(),
        }
    }

    pub fn from_slice(s: &[T]) -> Self {
        Self { data: s.to_vec() }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn ptr_range(&self) -> PtrRange {
        PtrRange::of_slice(&self.data)
    }
}

impl<T> std::ops::Index<usize> for DenseVector<T> {
    type Output = T;

    #[inline]
    fn index(&self, i: usize) -> &T {
        &self.data[i]
    }
}

impl<T> std::ops::IndexMut<usize> for DenseVector<T> {
    #[inline]
    fn index_mut(&mut self, i: usize) -> &mut T {
        &mut self.data[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_is_column_major() {
        let m = DenseMatrix::from_rows(&[&[1.0, 2.0], &[3.0, 4.0]]).unwrap();
        assert_eq!(m.as_slice(), &[1.0, 3.0, 2.0, 4.0]);
        assert_eq!(m[[0, 1]], 2.0);
        assert_eq!(m.col(1), &[2.0, 4.0]);
    }

    #[test]
    fn from_rows_rejects_ragged_input() {
        let ragged: &[&[f64]] = &[&[1.0, 2.0], &[3.0]];
        assert!(DenseMatrix::from_rows(ragged).is_err());
    }

    #[test]
    fn identity() {
        let m = DenseMatrix::<f64>::identity(3);
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(m[[i, j]], if i == j { 1.0 } else { 0.0 });
            }
        }
    }
}
