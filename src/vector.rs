use crate::error::{ReactionError, Result};
use serde::{Deserialize, Serialize};
use std::ops::{Index, Mul};

/// Dense multi-group vector.
///
/// A zero-length vector stands for "no data". Adding or subtracting a
/// zero-length vector is a no-op, and an empty left hand side adopts the
/// right hand side, so sums over products can start from `Vector::default()`.
/// Two non-empty vectors of different sizes do not combine.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vector {
    values: Vec<f64>,
}

impl Vector {
    pub fn new(values: Vec<f64>) -> Self {
        Vector { values }
    }

    pub fn zeros(size: usize) -> Self {
        Vector {
            values: vec![0.0; size],
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.values.iter()
    }

    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }

    pub fn try_add(&mut self, other: &Vector) -> Result<()> {
        self.combine(other, 1.0)
    }

    pub fn try_sub(&mut self, other: &Vector) -> Result<()> {
        self.combine(other, -1.0)
    }

    fn combine(&mut self, other: &Vector, sign: f64) -> Result<()> {
        if other.is_empty() {
            return Ok(());
        }
        if self.is_empty() {
            self.values = other.values.iter().map(|v| sign * v).collect();
            return Ok(());
        }
        if self.len() != other.len() {
            return Err(ReactionError::SizeMismatch {
                expected: self.len(),
                found: other.len(),
            });
        }
        for (a, b) in self.values.iter_mut().zip(other.values.iter()) {
            *a += sign * b;
        }
        Ok(())
    }
}

impl From<Vec<f64>> for Vector {
    fn from(values: Vec<f64>) -> Self {
        Vector::new(values)
    }
}

impl From<&[f64]> for Vector {
    fn from(values: &[f64]) -> Self {
        Vector::new(values.to_vec())
    }
}

impl Index<usize> for Vector {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.values[index]
    }
}

impl Mul<f64> for Vector {
    type Output = Vector;

    fn mul(mut self, rhs: f64) -> Vector {
        for v in self.values.iter_mut() {
            *v *= rhs;
        }
        self
    }
}

impl Mul<f64> for &Vector {
    type Output = Vector;

    fn mul(self, rhs: f64) -> Vector {
        Vector::new(self.values.iter().map(|v| v * rhs).collect())
    }
}

/// Dense row-major multi-group transfer matrix (rows: incoming group,
/// columns: outgoing group). A 0x0 matrix means "no data" and follows the
/// same addition rules as [`Vector`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Matrix {
    rows: usize,
    columns: usize,
    values: Vec<f64>,
}

impl Matrix {
    pub fn zeros(rows: usize, columns: usize) -> Self {
        Matrix {
            rows,
            columns,
            values: vec![0.0; rows * columns],
        }
    }

    /// Build from nested rows; every row must have the same length.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let columns = rows.first().map_or(0, |row| row.len());
        let mut matrix = Matrix::zeros(rows.len(), columns);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns {
                return Err(ReactionError::RaggedMatrix {
                    row: i,
                    expected: columns,
                    found: row.len(),
                });
            }
            matrix.values[i * columns..(i + 1) * columns].copy_from_slice(row);
        }
        Ok(matrix)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, row: usize, column: usize) -> f64 {
        self.values[row * self.columns + column]
    }

    pub fn set(&mut self, row: usize, column: usize, value: f64) {
        self.values[row * self.columns + column] = value;
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.values[row * self.columns..(row + 1) * self.columns]
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.rows).map(|i| self.row(i).to_vec()).collect()
    }

    /// Element-wise sum with the same empty-operand rules as [`Vector`].
    pub fn try_add(&mut self, other: &Matrix) -> Result<()> {
        if other.is_empty() {
            return Ok(());
        }
        if self.is_empty() {
            *self = other.clone();
            return Ok(());
        }
        if self.rows != other.rows || self.columns != other.columns {
            return Err(ReactionError::SizeMismatch {
                expected: self.values.len(),
                found: other.values.len(),
            });
        }
        for (a, b) in self.values.iter_mut().zip(other.values.iter()) {
            *a += b;
        }
        Ok(())
    }
}
