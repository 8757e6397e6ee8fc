// src/tensor/mod.rs
// ============================================================================
// TENSOR - Tensor denso row-major para spikes binados
// ============================================================================
//
// Orden de ejes:
//   1D: [canal, ancho, tiempo]          (rango 3)
//   2D: [canal, alto, ancho, tiempo]    (rango 4)
//
// ============================================================================

pub mod binner;

pub use binner::{auto_shape, scatter_into, to_events, to_tensor};

use crate::error::{Result, SpikeError};

#[derive(Debug, Clone, PartialEq)]
pub struct DenseTensor {
    shape: Vec<usize>,
    data: Vec<f32>,
}

/// Producto de dimensiones con detección de overflow
fn checked_numel(shape: &[usize]) -> Result<usize> {
    shape
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or_else(|| SpikeError::ShapeMismatch(format!("tensor shape {:?} overflows usize", shape)))
}

impl DenseTensor {
    /// Tensor de ceros con la forma dada
    pub fn zeros(shape: &[usize]) -> Result<Self> {
        let numel = checked_numel(shape)?;
        Ok(Self {
            shape: shape.to_vec(),
            data: vec![0.0; numel],
        })
    }

    pub fn from_vec(shape: Vec<usize>, data: Vec<f32>) -> Result<Self> {
        let numel = checked_numel(&shape)?;
        if numel != data.len() {
            return Err(SpikeError::ShapeMismatch(format!(
                "shape {:?} needs {} elements, got {}",
                shape,
                numel,
                data.len()
            )));
        }
        Ok(Self { shape, data })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    pub fn numel(&self) -> usize {
        self.data.len()
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Offset lineal de un índice; None si el rango no coincide o algún eje
    /// queda fuera de límites.
    pub fn offset(&self, index: &[usize]) -> Option<usize> {
        if index.len() != self.shape.len() {
            return None;
        }
        let mut offset = 0usize;
        for (&i, &dim) in index.iter().zip(self.shape.iter()) {
            if i >= dim {
                return None;
            }
            offset = offset * dim + i;
        }
        Some(offset)
    }

    /// Índice multidimensional de un offset lineal
    pub fn unravel(&self, mut offset: usize) -> Vec<usize> {
        let mut index = vec![0usize; self.shape.len()];
        for (slot, &dim) in index.iter_mut().zip(self.shape.iter()).rev() {
            if dim == 0 {
                continue;
            }
            *slot = offset % dim;
            offset /= dim;
        }
        index
    }

    pub fn get(&self, index: &[usize]) -> Option<f32> {
        self.offset(index).map(|o| self.data[o])
    }

    /// Escribe un valor; false si el índice está fuera de límites
    pub fn set(&mut self, index: &[usize], value: f32) -> bool {
        match self.offset(index) {
            Some(o) => {
                self.data[o] = value;
                true
            }
            None => false,
        }
    }

    pub fn count_nonzero(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0.0).count()
    }

    pub fn sum(&self) -> f64 {
        self.data.iter().map(|&v| v as f64).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeros() {
        let t = DenseTensor::zeros(&[2, 3, 4]).unwrap();
        assert_eq!(t.numel(), 24);
        assert_eq!(t.rank(), 3);
        assert_eq!(t.count_nonzero(), 0);
    }

    #[test]
    fn test_overflow_shape() {
        assert!(matches!(
            DenseTensor::zeros(&[usize::MAX, 2]),
            Err(SpikeError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_offset_row_major() {
        let t = DenseTensor::zeros(&[2, 3, 4]).unwrap();
        assert_eq!(t.offset(&[0, 0, 0]), Some(0));
        assert_eq!(t.offset(&[0, 0, 3]), Some(3));
        assert_eq!(t.offset(&[0, 1, 0]), Some(4));
        assert_eq!(t.offset(&[1, 2, 3]), Some(23));
        assert_eq!(t.offset(&[2, 0, 0]), None);
        assert_eq!(t.offset(&[0, 0]), None);
    }

    #[test]
    fn test_unravel_inverts_offset() {
        let t = DenseTensor::zeros(&[2, 3, 4, 5]).unwrap();
        for o in 0..t.numel() {
            let idx = t.unravel(o);
            assert_eq!(t.offset(&idx), Some(o));
        }
    }

    #[test]
    fn test_get_set() {
        let mut t = DenseTensor::zeros(&[1, 2, 2]).unwrap();
        assert!(t.set(&[0, 1, 1], 2.5));
        assert!(!t.set(&[0, 2, 0], 1.0));
        assert_eq!(t.get(&[0, 1, 1]), Some(2.5));
        assert_eq!(t.count_nonzero(), 1);
        assert_eq!(t.sum(), 2.5);
    }

    #[test]
    fn test_from_vec_length_check() {
        assert!(DenseTensor::from_vec(vec![2, 2], vec![0.0; 4]).is_ok());
        assert!(matches!(
            DenseTensor::from_vec(vec![2, 2], vec![0.0; 3]),
            Err(SpikeError::ShapeMismatch(_))
        ));
    }
}
