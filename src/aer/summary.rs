// src/aer/summary.rs
// ============================================================================
// SPIKE COUNT SUMMARY - Registros de 80 bits (10 bytes)
// ============================================================================
//
//   bits 79-64  neuronID (16)
//   bits 63-40  inicio de la región en us (24)
//   bits 39-16  fin de la región en us (24)
//   bits 15-0   número de spikes (16)
//
// Independiente del SpikeEventSet: cuatro columnas paralelas.
//
// ============================================================================

use byteorder::{BigEndian, ByteOrder};

use crate::aer::common::*;
use crate::aer::RecordFormat;
use crate::error::{Result, SpikeError};

pub const RECORD_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpikeCountRecord {
    pub neuron_id: u32,
    pub t_start_us: u32,
    pub t_end_us: u32,
    pub spike_count: u32,
}

impl SpikeCountRecord {
    pub fn pack(&self) -> [u8; RECORD_SIZE] {
        let mut out = [0u8; RECORD_SIZE];
        BigEndian::write_u16(&mut out[0..2], (self.neuron_id & MASK_16) as u16);
        BigEndian::write_u24(&mut out[2..5], self.t_start_us & MASK_24);
        BigEndian::write_u24(&mut out[5..8], self.t_end_us & MASK_24);
        BigEndian::write_u16(&mut out[8..10], (self.spike_count & MASK_16) as u16);
        out
    }

    pub fn unpack(bytes: &[u8]) -> Self {
        Self {
            neuron_id: BigEndian::read_u16(&bytes[0..2]) as u32,
            t_start_us: BigEndian::read_u24(&bytes[2..5]),
            t_end_us: BigEndian::read_u24(&bytes[5..8]),
            spike_count: BigEndian::read_u16(&bytes[8..10]) as u32,
        }
    }
}

/// Regiones de conteo de spikes; tiempos en ms
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpikeCountSummary {
    pub neuron_id: Vec<u32>,
    pub t_start: Vec<f64>,
    pub t_end: Vec<f64>,
    pub spike_count: Vec<u32>,
}

impl SpikeCountSummary {
    pub fn len(&self) -> usize {
        self.neuron_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neuron_id.is_empty()
    }

    pub fn total_spikes(&self) -> u64 {
        self.spike_count.iter().map(|&n| n as u64).sum()
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        encode_summary(&self.neuron_id, &self.t_start, &self.t_end, &self.spike_count)
    }
}

pub fn decode_summary(data: &[u8]) -> Result<SpikeCountSummary> {
    let n = record_count(RecordFormat::SpikeCount, data.len())?;

    let mut summary = SpikeCountSummary {
        neuron_id: Vec::with_capacity(n),
        t_start: Vec::with_capacity(n),
        t_end: Vec::with_capacity(n),
        spike_count: Vec::with_capacity(n),
    };

    for chunk in data.chunks_exact(RECORD_SIZE) {
        let record = SpikeCountRecord::unpack(chunk);
        summary.neuron_id.push(record.neuron_id);
        summary.t_start.push(us_to_ms(record.t_start_us));
        summary.t_end.push(us_to_ms(record.t_end_us));
        summary.spike_count.push(record.spike_count);
    }

    log::debug!("decoded {} spike count records", n);
    Ok(summary)
}

/// Las cuatro columnas deben tener la misma longitud; si no, no se escribe nada.
pub fn encode_summary(
    neuron_id: &[u32],
    t_start: &[f64],
    t_end: &[f64],
    spike_count: &[u32],
) -> Result<Vec<u8>> {
    let n = neuron_id.len();
    if t_start.len() != n || t_end.len() != n || spike_count.len() != n {
        return Err(SpikeError::ShapeMismatch(format!(
            "summary columns differ in length: neuron_id={}, t_start={}, t_end={}, spike_count={}",
            n,
            t_start.len(),
            t_end.len(),
            spike_count.len()
        )));
    }

    let mut out = Vec::with_capacity(n * RECORD_SIZE);
    for i in 0..n {
        let record = SpikeCountRecord {
            neuron_id: neuron_id[i],
            t_start_us: ms_to_us(t_start[i]),
            t_end_us: ms_to_us(t_end[i]),
            spike_count: spike_count[i],
        };
        out.extend_from_slice(&record.pack());
    }

    log::debug!("encoded {} spike count records", n);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_pack_layout() {
        let record = SpikeCountRecord {
            neuron_id: 0x0102,
            t_start_us: 0x03_0405,
            t_end_us: 0x06_0708,
            spike_count: 0x090A,
        };
        assert_eq!(record.pack(), [1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        assert_eq!(SpikeCountRecord::unpack(&record.pack()), record);
    }

    #[test]
    fn test_roundtrip() {
        let mut rng = rand::thread_rng();
        let n = 200;
        let summary = SpikeCountSummary {
            neuron_id: (0..n).map(|_| rng.gen_range(0..=MASK_16)).collect(),
            t_start: (0..n).map(|_| us_to_ms(rng.gen_range(0..=MASK_24))).collect(),
            t_end: (0..n).map(|_| us_to_ms(rng.gen_range(0..=MASK_24))).collect(),
            spike_count: (0..n).map(|_| rng.gen_range(0..=MASK_16)).collect(),
        };

        let bytes = summary.encode().unwrap();
        assert_eq!(bytes.len(), n * RECORD_SIZE);
        assert_eq!(decode_summary(&bytes).unwrap(), summary);
    }

    #[test]
    fn test_time_rounding_and_wrap() {
        let bytes = encode_summary(&[0x1_0001], &[0.0025], &[16_777.216], &[0x1_0002]).unwrap();
        let record = SpikeCountRecord::unpack(&bytes);
        assert_eq!(record.neuron_id, 1);
        assert_eq!(record.t_start_us, 2);
        assert_eq!(record.t_end_us, 0);
        assert_eq!(record.spike_count, 2);
    }

    #[test]
    fn test_shape_mismatch() {
        let result = encode_summary(&[1, 2, 3], &[0.0, 1.0, 2.0], &[1.0, 2.0, 3.0], &[5, 6]);
        assert!(matches!(result, Err(SpikeError::ShapeMismatch(_))));
    }

    #[test]
    fn test_malformed_length() {
        for len in [RECORD_SIZE - 1, RECORD_SIZE + 1] {
            assert!(matches!(decode_summary(&vec![0u8; len]), Err(SpikeError::MalformedFile { .. })));
        }
    }

    #[test]
    fn test_total_spikes() {
        let summary = SpikeCountSummary {
            neuron_id: vec![0, 1],
            t_start: vec![0.0, 0.0],
            t_end: vec![10.0, 10.0],
            spike_count: vec![40_000, 50_000],
        };
        assert_eq!(summary.total_spikes(), 90_000);
        assert_eq!(summary.len(), 2);
    }
}
