// src/error.rs
// ============================================================================
// ERRORES - Fallos estructurales del codec AER
// ============================================================================
//
// Solo los desajustes estructurales son errores. La pérdida de rango
// (coordenadas o timestamps que no caben en su campo) se trunca en silencio.
//
// ============================================================================

use crate::aer::RecordFormat;
use crate::event::Dimensionality;

#[derive(Debug, thiserror::Error)]
pub enum SpikeError {
    /// Longitud del buffer no múltiplo del tamaño de registro
    #[error("Malformed {format} file: {len} bytes is not a multiple of the {record_size}-byte record")]
    MalformedFile {
        format: RecordFormat,
        len: usize,
        record_size: usize,
    },

    /// Encode con un SpikeEventSet de dimensionalidad incorrecta
    #[error("{format} records require {expected} events, got {found}")]
    DimensionMismatch {
        format: RecordFormat,
        expected: Dimensionality,
        found: Dimensionality,
    },

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("{0} records do not carry spike events")]
    NotAnEventFormat(RecordFormat),

    #[error("Invalid safetensor header: {0}")]
    Header(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SpikeError>;
