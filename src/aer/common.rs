// src/aer/common.rs
// ============================================================================
// AER COMMON - Conversión de tiempos y validación de longitud
// ============================================================================
//
// Tiempos en memoria: milisegundos (f64). En disco: microsegundos enteros.
// Encode: us = round_half_even(ms * 1000), luego se enmascara al ancho del
// campo. El overflow envuelve en silencio, no es un error.
//
// ============================================================================

use crate::aer::RecordFormat;
use crate::error::{Result, SpikeError};
use crate::event::SpikeEventSet;

pub const US_PER_MS: f64 = 1000.0;

/// Campo de timestamp de 23 bits (1D/2D, bit 23 = polaridad)
pub const MASK_23: u32 = 0x7F_FFFF;

/// Campo de 24 bits (3D y summary)
pub const MASK_24: u32 = 0xFF_FFFF;

pub const MASK_16: u32 = 0xFFFF;
pub const MASK_12: u32 = 0x0FFF;
pub const MASK_8: u32 = 0xFF;

/// ms -> us con redondeo half-to-even.
///
/// El resultado no está enmascarado; cada codec aplica su ancho. Valores
/// negativos o enormes envuelven módulo 2^32 antes del enmascarado.
#[inline]
pub fn ms_to_us(t_ms: f64) -> u32 {
    (t_ms * US_PER_MS).round_ties_even() as i64 as u32
}

#[inline]
pub fn us_to_ms(t_us: u32) -> f64 {
    t_us as f64 / US_PER_MS
}

/// Verifica que `len` sea múltiplo exacto del registro y devuelve el
/// número de registros.
pub fn record_count(format: RecordFormat, len: usize) -> Result<usize> {
    let record_size = format.record_size();
    if len % record_size != 0 {
        return Err(SpikeError::MalformedFile {
            format,
            len,
            record_size,
        });
    }
    Ok(len / record_size)
}

/// Verifica que el set tenga la dimensionalidad que exige `format` al codificar
pub fn check_dimensionality(format: RecordFormat, events: &SpikeEventSet) -> Result<()> {
    match format.required_dimensionality() {
        Some(expected) if expected == events.dimensionality() => Ok(()),
        Some(expected) => Err(SpikeError::DimensionMismatch {
            format,
            expected,
            found: events.dimensionality(),
        }),
        None => Err(SpikeError::NotAnEventFormat(format)),
    }
}
