// src/aer/mod.rs
// ============================================================================
// AER - Codecs de registros binarios de spikes
// ============================================================================
//
// Ficheros = concatenación plana de registros de tamaño fijo. Sin header,
// sin magic, sin versión: el formato lo decide quien llama.
//
//   1D       5 bytes   neuronID:16 | sign:1 | t_us:23
//   2D       5 bytes   x:8 | y:8 | sign:1 | t_us:23
//   3D       7 bytes   x:12 | y:12 | channel:8 | t_us:24
//   Summary 10 bytes   neuronID:16 | tStart_us:24 | tEnd_us:24 | count:16
//
// ============================================================================

pub mod common;
pub mod spike1d;
pub mod spike2d;
pub mod spike3d;
pub mod summary;

pub use spike1d::{decode_1d, encode_1d, Spike1dRecord};
pub use spike2d::{decode_2d, encode_2d, Spike2dRecord};
pub use spike3d::{decode_3d, encode_3d, Spike3dRecord};
pub use summary::{decode_summary, encode_summary, SpikeCountRecord, SpikeCountSummary};

use crate::error::{Result, SpikeError};
use crate::event::{Dimensionality, SpikeEventSet};

/// Formato de registro binario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordFormat {
    Spike1D,
    Spike2D,
    Spike3D,
    SpikeCount,
}

impl RecordFormat {
    pub const ALL: [RecordFormat; 4] = [
        Self::Spike1D,
        Self::Spike2D,
        Self::Spike3D,
        Self::SpikeCount,
    ];

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "1d" | "spike1d" => Some(Self::Spike1D),
            "2d" | "spike2d" | "nmnist" => Some(Self::Spike2D),
            "3d" | "spike3d" => Some(Self::Spike3D),
            "summary" | "numspikes" | "count" => Some(Self::SpikeCount),
            _ => None,
        }
    }

    pub fn record_size(&self) -> usize {
        match self {
            Self::Spike1D => spike1d::RECORD_SIZE,
            Self::Spike2D => spike2d::RECORD_SIZE,
            Self::Spike3D => spike3d::RECORD_SIZE,
            Self::SpikeCount => summary::RECORD_SIZE,
        }
    }

    /// Dimensionalidad que exige el encode; None para el summary
    pub fn required_dimensionality(&self) -> Option<Dimensionality> {
        match self {
            Self::Spike1D => Some(Dimensionality::OneD),
            Self::Spike2D | Self::Spike3D => Some(Dimensionality::TwoD),
            Self::SpikeCount => None,
        }
    }
}

impl std::fmt::Display for RecordFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Spike1D => write!(f, "1D"),
            Self::Spike2D => write!(f, "2D"),
            Self::Spike3D => write!(f, "3D"),
            Self::SpikeCount => write!(f, "summary"),
        }
    }
}

/// Decodifica un buffer de eventos según el formato
pub fn decode_events(format: RecordFormat, data: &[u8]) -> Result<SpikeEventSet> {
    match format {
        RecordFormat::Spike1D => decode_1d(data),
        RecordFormat::Spike2D => decode_2d(data),
        RecordFormat::Spike3D => decode_3d(data),
        RecordFormat::SpikeCount => Err(SpikeError::NotAnEventFormat(format)),
    }
}

/// Codifica un SpikeEventSet según el formato
pub fn encode_events(format: RecordFormat, events: &SpikeEventSet) -> Result<Vec<u8>> {
    match format {
        RecordFormat::Spike1D => encode_1d(events),
        RecordFormat::Spike2D => encode_2d(events),
        RecordFormat::Spike3D => encode_3d(events),
        RecordFormat::SpikeCount => Err(SpikeError::NotAnEventFormat(format)),
    }
}
