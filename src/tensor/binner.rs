// src/tensor/binner.rs
// ============================================================================
// BINNER - SpikeEventSet <-> tensor denso binado en el tiempo
// ============================================================================
//
// Scatter: cada evento escribe 1/sampling_time en [p, (y,) x, round(t/ts)].
//   - Eventos fuera de límites se descartan en silencio (recorte, no error).
//   - Si dos eventos caen en la misma celda gana el último (overwrite).
//   - Orden de escritura = orden de entrada de los eventos.
//
// Gather: cada celda > 0 es un evento con t = bin * sampling_time.
//
// ============================================================================

use crate::error::{Result, SpikeError};
use crate::event::{Dimensionality, SpikeEventSet};
use crate::tensor::DenseTensor;

fn check_sampling_time(sampling_time: f64) -> Result<()> {
    if !sampling_time.is_finite() || sampling_time <= 0.0 {
        return Err(SpikeError::ShapeMismatch(format!(
            "sampling time must be a positive number of ms, got {}",
            sampling_time
        )));
    }
    Ok(())
}

/// Índice de bin temporal; None si es negativo o no finito
#[inline]
fn time_bin(t: f64, sampling_time: f64) -> Option<usize> {
    let bin = (t / sampling_time).round_ties_even();
    if bin.is_finite() && bin >= 0.0 {
        Some(bin as usize)
    } else {
        None
    }
}

/// Forma automática a partir de los extremos del propio set.
///
/// Bins temporales = floor(max t / ts) + 1, ampliado en uno cuando el evento
/// más tardío redondea por encima de ese bin.
pub fn auto_shape(events: &SpikeEventSet, sampling_time: f64) -> Result<Vec<usize>> {
    check_sampling_time(sampling_time)?;

    let stats = events.stats().ok_or_else(|| {
        SpikeError::ShapeMismatch("cannot derive a tensor shape from an empty event set".to_string())
    })?;

    let floor_bins = (stats.t_max / sampling_time).floor().max(0.0) as usize;
    let last_bin = time_bin(stats.t_max, sampling_time).unwrap_or(0);
    let num_bins = floor_bins.max(last_bin).checked_add(1).ok_or_else(|| {
        SpikeError::ShapeMismatch(format!(
            "latest timestamp {} ms needs more time bins than fit in usize",
            stats.t_max
        ))
    })?;

    let channels = stats.num_channels();
    let width = stats.max_x as usize + 1;

    let shape = match stats.max_y {
        Some(max_y) => vec![channels, max_y as usize + 1, width, num_bins],
        None => vec![channels, width, num_bins],
    };
    Ok(shape)
}

/// Scatter sobre un tensor proporcionado por quien llama.
///
/// Sets 1D aceptan `[C, W, T]` o `[C, H, W, T]` (escriben la fila 0).
/// Sets 2D requieren `[C, H, W, T]`. Devuelve los eventos escritos.
pub fn scatter_into(
    events: &SpikeEventSet,
    tensor: &mut DenseTensor,
    sampling_time: f64,
) -> Result<usize> {
    check_sampling_time(sampling_time)?;

    let value = (1.0 / sampling_time) as f32;
    let rank = tensor.rank();

    match (events.dimensionality(), rank) {
        (Dimensionality::OneD, 3) | (Dimensionality::OneD, 4) | (Dimensionality::TwoD, 4) => {}
        (dim, _) => {
            return Err(SpikeError::ShapeMismatch(format!(
                "cannot scatter {} events into a rank-{} tensor {:?}",
                dim,
                rank,
                tensor.shape()
            )))
        }
    }

    let ys = events.y();
    let mut written = 0usize;

    for (i, ev) in events.iter().enumerate() {
        let Some(ti) = time_bin(ev.t, sampling_time) else {
            continue;
        };
        let pi = ev.p as usize;
        let xi = ev.x as usize;

        // set() descarta índices fuera de límites
        let hit = match (rank, ys) {
            (4, Some(ys)) => tensor.set(&[pi, ys[i] as usize, xi, ti], value),
            (4, None) => tensor.set(&[pi, 0, xi, ti], value),
            _ => tensor.set(&[pi, xi, ti], value),
        };
        if hit {
            written += 1;
        }
    }

    Ok(written)
}

/// Construye el tensor denso; con `explicit_shape` recorta los eventos que
/// quedan fuera.
pub fn to_tensor(
    events: &SpikeEventSet,
    sampling_time: f64,
    explicit_shape: Option<&[usize]>,
) -> Result<DenseTensor> {
    let shape = match explicit_shape {
        Some(shape) => {
            let expected = events.dimensionality().tensor_rank();
            if shape.len() != expected {
                return Err(SpikeError::ShapeMismatch(format!(
                    "{} events need a rank-{} shape, got {:?}",
                    events.dimensionality(),
                    expected,
                    shape
                )));
            }
            shape.to_vec()
        }
        None => auto_shape(events, sampling_time)?,
    };

    let mut tensor = DenseTensor::zeros(&shape)?;
    let written = scatter_into(events, &mut tensor, sampling_time)?;

    log::debug!(
        "binned {} of {} events into {:?} (ts={} ms)",
        written,
        events.len(),
        shape,
        sampling_time
    );
    Ok(tensor)
}

/// Gather: celdas > 0 -> eventos, en orden row-major.
pub fn to_events(tensor: &DenseTensor, sampling_time: f64) -> Result<SpikeEventSet> {
    check_sampling_time(sampling_time)?;

    let dim = Dimensionality::from_rank(tensor.rank()).ok_or_else(|| {
        SpikeError::ShapeMismatch(format!(
            "expected a tensor of rank 3 or 4, got rank {}",
            tensor.rank()
        ))
    })?;

    let mut x = Vec::new();
    let mut y = Vec::new();
    let mut p = Vec::new();
    let mut t = Vec::new();

    let active = tensor
        .data()
        .iter()
        .enumerate()
        .filter(|&(_, &value)| value > 0.0);

    for (offset, _) in active {
        let index = tensor.unravel(offset);
        match dim {
            Dimensionality::OneD => {
                p.push(index[0] as u32);
                x.push(index[1] as u32);
                t.push(index[2] as f64 * sampling_time);
            }
            Dimensionality::TwoD => {
                p.push(index[0] as u32);
                y.push(index[1] as u32);
                x.push(index[2] as u32);
                t.push(index[3] as f64 * sampling_time);
            }
        }
    }

    log::debug!("gathered {} events from tensor {:?}", x.len(), tensor.shape());

    match dim {
        Dimensionality::OneD => SpikeEventSet::new_1d(x, p, t),
        Dimensionality::TwoD => SpikeEventSet::new_2d(x, y, p, t),
    }
}
