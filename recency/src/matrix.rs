use std::{
    fmt::Display,
    ops::{
        Index,
        IndexMut,
    },
};

use crate::{
    Error,
    LruCache,
};

/// An LRU cache from integer keys to integer matrices.
pub type MatrixCache = LruCache<i32, Matrix<i32>>;

/// A dense, row-major matrix.
///
/// ```
/// use recency::Matrix;
///
/// let m = Matrix::from_rows(vec![vec![1, 2], vec![3, 4]]).unwrap();
/// assert_eq!(m[(1, 0)], 3);
/// assert_eq!(m.to_string(), "1 2\n3 4");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T: Default + Clone> Matrix<T> {
    /// A `rows` x `cols` matrix filled with `T::default()`.
    pub fn new(rows: usize, cols: usize) -> Self {
        Matrix {
            rows,
            cols,
            data: vec![T::default(); rows * cols],
        }
    }
}

impl<T: Default + Clone + From<u8>> Matrix<T> {
    /// The `n` x `n` identity matrix.
    pub fn identity(n: usize) -> Self {
        let mut matrix = Self::new(n, n);
        for i in 0..n {
            matrix[(i, i)] = T::from(1);
        }
        matrix
    }
}

impl<T> Matrix<T> {
    /// Builds a matrix from its rows.
    ///
    /// Fails with [`Error::RaggedRows`] if the rows differ in length.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, Error> {
        let cols = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|row| row.len() != cols) {
            return Err(Error::RaggedRows);
        }
        Ok(Matrix {
            rows: rows.len(),
            cols,
            data: rows.into_iter().flatten().collect(),
        })
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    fn offset(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.rows && col < self.cols).then(|| row * self.cols + col)
    }

    /// The entry at `row`, `col`, if in range.
    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        self.data.get(self.offset(row, col)?)
    }

    /// The entry at `row`, `col` mutably, if in range.
    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut T> {
        let offset = self.offset(row, col)?;
        self.data.get_mut(offset)
    }

    /// The entries of `row`, if in range.
    pub fn row(&self, row: usize) -> Option<&[T]> {
        (row < self.rows).then(|| &self.data[row * self.cols..(row + 1) * self.cols])
    }
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    #[track_caller]
    fn index(&self, (row, col): (usize, usize)) -> &T {
        match self.get(row, col) {
            Some(value) => value,
            None => panic!(
                "index ({row}, {col}) out of range for a {}x{} matrix",
                self.rows, self.cols
            ),
        }
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T> {
    #[track_caller]
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        let (rows, cols) = (self.rows, self.cols);
        match self.get_mut(row, col) {
            Some(value) => value,
            None => panic!("index ({row}, {col}) out of range for a {rows}x{cols} matrix"),
        }
    }
}

impl<T: Display> Display for Matrix<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in 0..self.rows {
            if row > 0 {
                writeln!(f)?;
            }
            for (col, value) in self.data[row * self.cols..(row + 1) * self.cols]
                .iter()
                .enumerate()
            {
                if col > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{value}")?;
            }
        }
        Ok(())
    }
}
