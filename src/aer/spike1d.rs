// src/aer/spike1d.rs
// ============================================================================
// SPIKE 1D - Registros de 40 bits (5 bytes, big-endian)
// ============================================================================
//
//   bits 39-24  neuronID (16)
//   bit  23     polaridad: 0 => OFF, 1 => ON
//   bits 22-0   timestamp en us (23)
//
// ============================================================================

use byteorder::{BigEndian, ByteOrder};

use crate::aer::common::*;
use crate::aer::RecordFormat;
use crate::error::Result;
use crate::event::SpikeEventSet;

pub const RECORD_SIZE: usize = 5;

/// Un registro 1D. `pack` enmascara cada campo a su ancho.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Spike1dRecord {
    pub neuron_id: u32,
    pub polarity: u32,
    pub t_us: u32,
}

impl Spike1dRecord {
    pub fn pack(&self) -> [u8; RECORD_SIZE] {
        let mut out = [0u8; RECORD_SIZE];

        // High byte = (x >> 8) & 0xFF, low byte = x & 0xFF
        BigEndian::write_u16(&mut out[0..2], (self.neuron_id & MASK_16) as u16);

        // Solo el bit 0 de la polaridad llega al bit 23; el resto se pierde
        let word = ((self.polarity << 23) | (self.t_us & MASK_23)) & MASK_24;
        BigEndian::write_u24(&mut out[2..5], word);

        out
    }

    /// Lee los primeros RECORD_SIZE bytes de `bytes`
    pub fn unpack(bytes: &[u8]) -> Self {
        let word = BigEndian::read_u24(&bytes[2..5]);
        Self {
            neuron_id: BigEndian::read_u16(&bytes[0..2]) as u32,
            polarity: word >> 23,
            t_us: word & MASK_23,
        }
    }
}

pub fn decode_1d(data: &[u8]) -> Result<SpikeEventSet> {
    let n = record_count(RecordFormat::Spike1D, data.len())?;

    let mut x = Vec::with_capacity(n);
    let mut p = Vec::with_capacity(n);
    let mut t = Vec::with_capacity(n);

    for chunk in data.chunks_exact(RECORD_SIZE) {
        let record = Spike1dRecord::unpack(chunk);
        x.push(record.neuron_id);
        p.push(record.polarity);
        t.push(us_to_ms(record.t_us));
    }

    log::debug!("decoded {} 1D spike records", n);
    SpikeEventSet::new_1d(x, p, t)
}

pub fn encode_1d(events: &SpikeEventSet) -> Result<Vec<u8>> {
    check_dimensionality(RecordFormat::Spike1D, events)?;

    let mut out = Vec::with_capacity(events.len() * RECORD_SIZE);
    for ev in events.iter() {
        let record = Spike1dRecord {
            neuron_id: ev.x,
            polarity: ev.p,
            t_us: ms_to_us(ev.t),
        };
        out.extend_from_slice(&record.pack());
    }

    log::debug!("encoded {} 1D spike records", events.len());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SpikeError;
    use crate::event::Dimensionality;
    use rand::Rng;

    #[test]
    fn test_pack_layout() {
        let record = Spike1dRecord { neuron_id: 0xABCD, polarity: 1, t_us: 0x12_3456 };
        assert_eq!(record.pack(), [0xAB, 0xCD, 0x92, 0x34, 0x56]);
        assert_eq!(Spike1dRecord::unpack(&record.pack()), record);
    }

    #[test]
    fn test_high_byte_of_neuron_id() {
        // 0x0100 debe producir 0x01 en el primer byte
        let record = Spike1dRecord { neuron_id: 0x0100, polarity: 0, t_us: 0 };
        assert_eq!(record.pack()[0], 0x01);
        assert_eq!(record.pack()[1], 0x00);
    }

    #[test]
    fn test_truncation() {
        let record = Spike1dRecord { neuron_id: 0x1_0005, polarity: 0, t_us: MASK_23 + 3 };
        let back = Spike1dRecord::unpack(&record.pack());
        assert_eq!(back.neuron_id, 5);
        assert_eq!(back.t_us, 2);
        assert_eq!(back.polarity, 0);
    }

    #[test]
    fn test_polarity_keeps_low_bit() {
        let two = Spike1dRecord { neuron_id: 0, polarity: 2, t_us: 0 };
        assert_eq!(Spike1dRecord::unpack(&two.pack()).polarity, 0);

        let three = Spike1dRecord { neuron_id: 0, polarity: 3, t_us: 0 };
        assert_eq!(Spike1dRecord::unpack(&three.pack()).polarity, 1);
    }

    #[test]
    fn test_roundtrip() {
        let mut rng = rand::thread_rng();
        let n = 500;
        let x: Vec<u32> = (0..n).map(|_| rng.gen_range(0..=0xFFFF)).collect();
        let mut p: Vec<u32> = (0..n).map(|_| rng.gen_range(0..=1)).collect();
        p[0] = 0;
        let t: Vec<f64> = (0..n).map(|_| us_to_ms(rng.gen_range(0..=MASK_23))).collect();

        let events = SpikeEventSet::new_1d(x, p, t).unwrap();
        let bytes = encode_1d(&events).unwrap();
        assert_eq!(bytes.len(), n * RECORD_SIZE);

        let decoded = decode_1d(&bytes).unwrap();
        assert_eq!(decoded, events);
    }

    #[test]
    fn test_microsecond_rounding() {
        let events = SpikeEventSet::new_1d(vec![7], vec![0], vec![1.0005]).unwrap();
        let bytes = encode_1d(&events).unwrap();

        let record = Spike1dRecord::unpack(&bytes);
        assert_eq!(record.t_us, 1000);

        let decoded = decode_1d(&bytes).unwrap();
        assert_eq!(decoded.t(), &[1.0]);
    }

    #[test]
    fn test_rejects_2d() {
        let events = SpikeEventSet::new_2d(vec![0], vec![0], vec![0], vec![0.0]).unwrap();
        assert!(matches!(
            encode_1d(&events),
            Err(SpikeError::DimensionMismatch { expected: Dimensionality::OneD, .. })
        ));
    }

    #[test]
    fn test_malformed_length() {
        for len in [RECORD_SIZE - 1, RECORD_SIZE + 1] {
            let data = vec![0u8; len];
            assert!(matches!(decode_1d(&data), Err(SpikeError::MalformedFile { .. })));
        }
    }
}
