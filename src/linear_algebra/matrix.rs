use std::fmt::Display;

use serde::Serialize;
use thiserror::Error;

#[derive(Error,Debug,Clone,PartialEq)]
pub enum MatrixError {
    #[error("Matrix size is:{matrix_size:?},but index at {accessed_index:?} was accessed")]
    IndexOutOfBounds{matrix_size:(usize,usize),accessed_index:(usize,usize)},
    #[error("Matrix have {row_count} rows ,but row at {accessed_row} was accessed")]
    RowOutOfBounds{row_count:usize,accessed_row:usize},
    #[error("Matrix have {col_count} cols ,but col at {accessed_col} was accessed")]
    ColOutOfBounds{col_count:usize,accessed_col:usize},
}

type Result<T> = std::result::Result<T,MatrixError>;

// A double precision matrix, row major order
// which means rows are stored continuously
#[derive(Clone,Debug,PartialEq,Serialize)]
pub struct Matrix {
    row_count:usize,
    col_count:usize,
    //row*col must equal elements.len()
    elements:Vec<f64>
}

impl Display for Matrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f,"[")?;
        if self.elements.is_empty() {
            return write!(f,"]");
        }
        for (i,elem) in self.elements.iter().enumerate() {
            write!(f,"{elem}")?;
            if i+1 == self.elements.len() {
                write!(f,"]")?;
            }else if (i+1)%self.col_count == 0 {
                writeln!(f,",")?;
            }else{
                write!(f,", ")?;
            }
        }
        Ok(())
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self {
            row_count:0,
            col_count:0,
            elements:vec![]
        }
    }
}

impl Matrix {
    pub fn filled(row:usize,col:usize,value:f64) -> Self {
        if row*col == 0 {
            return Self::default()
        }
        Self {
            row_count:row,
            col_count:col,
            elements:vec![value;row*col]
        }
    }
    pub fn zeros(row:usize,col:usize) -> Self {
        Self::filled(row,col,0.0)
    }
    pub fn get(&self,row:usize,col:usize) -> Result<f64> {
        debug_assert_eq!(self.row_count*self.col_count,self.elements.len());
        let out_of_bounds = MatrixError::IndexOutOfBounds { matrix_size:
            (self.row_count,self.col_count),
            accessed_index: (row,col)
        };
        if row >= self.row_count || col >= self.col_count {
            return Err(out_of_bounds)
        }
        self.elements.get(row*self.col_count + col).copied().ok_or(out_of_bounds)
    }
    // Overwrites a whole row, values must be exactly one row long.
    pub fn set_row(&mut self,row:usize,values:&[f64]) -> Result<()> {
        if row >= self.row_count {
            return Err(MatrixError::RowOutOfBounds { row_count: self.row_count, accessed_row: row })
        }
        if values.len() != self.col_count {
            return Err(MatrixError::ColOutOfBounds { col_count: self.col_count, accessed_col: values.len() })
        }
        let start = row*self.col_count;
        self.elements[start..start + self.col_count].copy_from_slice(values);
        Ok(())
    }
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        // chunks(0) panics, an empty matrix has no rows anyway
        self.elements.chunks(self.col_count.max(1))
    }
    pub fn col_sums(&self) -> Vec<f64> {
        let mut sums = vec![0.0;self.col_count];
        for row in self.rows() {
            for (sum,elem) in sums.iter_mut().zip(row) {
                *sum += elem;
            }
        }
        sums
    }

    pub fn is_square(&self) -> bool {
        self.row_count == self.col_count
    }

    pub fn is_symmetric(&self,eps:f64) -> bool {
        if !self.is_square() {return false}
        for i in 0..self.row_count {
            for j in i+1..self.col_count {
                let a = self.elements[i*self.col_count + j];
                let b = self.elements[j*self.col_count + i];
                if a == b {continue}
                if (a - b).abs() > eps {return false}
            }
        }
        true
    }
}
