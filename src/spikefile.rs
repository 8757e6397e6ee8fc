// src/spikefile.rs
// ============================================================================
// SPIKEFILE - Lectura/escritura de ficheros de registros
// ============================================================================
//
// Lee el fichero entero antes de decodificar y escribe un buffer ya
// materializado: si el encode falla, no se crea el fichero de salida.
//
// ============================================================================

use std::path::Path;

use crate::aer::{self, RecordFormat, SpikeCountSummary};
use crate::error::Result;
use crate::event::SpikeEventSet;

/// Lee un fichero de eventos 1D/2D/3D
pub fn read_events(path: impl AsRef<Path>, format: RecordFormat) -> Result<SpikeEventSet> {
    let data = std::fs::read(path.as_ref())?;
    aer::decode_events(format, &data)
}

/// Escribe un fichero de eventos 1D/2D/3D
pub fn write_events(
    path: impl AsRef<Path>,
    format: RecordFormat,
    events: &SpikeEventSet,
) -> Result<()> {
    let bytes = aer::encode_events(format, events)?;
    std::fs::write(path.as_ref(), bytes)?;
    Ok(())
}

pub fn read_summary(path: impl AsRef<Path>) -> Result<SpikeCountSummary> {
    let data = std::fs::read(path.as_ref())?;
    aer::decode_summary(&data)
}

pub fn write_summary(path: impl AsRef<Path>, summary: &SpikeCountSummary) -> Result<()> {
    let bytes = summary.encode()?;
    std::fs::write(path.as_ref(), bytes)?;
    Ok(())
}
