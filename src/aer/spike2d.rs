// src/aer/spike2d.rs
// ============================================================================
// SPIKE 2D - Registros de 40 bits (formato NMNIST / NCALTECH101)
// ============================================================================
//
//   bits 39-32  xID (8)
//   bits 31-24  yID (8)
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Spike2dRecord {
    pub x: u32,
    pub y: u32,
    pub polarity: u32,
    pub t_us: u32,
}

impl Spike2dRecord {
    pub fn pack(&self) -> [u8; RECORD_SIZE] {
        let mut out = [0u8; RECORD_SIZE];
        out[0] = (self.x & MASK_8) as u8;
        out[1] = (self.y & MASK_8) as u8;

        let word = ((self.polarity << 23) | (self.t_us & MASK_23)) & MASK_24;
        BigEndian::write_u24(&mut out[2..5], word);

        out
    }

    pub fn unpack(bytes: &[u8]) -> Self {
        let word = BigEndian::read_u24(&bytes[2..5]);
        Self {
            x: bytes[0] as u32,
            y: bytes[1] as u32,
            polarity: word >> 23,
            t_us: word & MASK_23,
        }
    }
}

pub fn decode_2d(data: &[u8]) -> Result<SpikeEventSet> {
    let n = record_count(RecordFormat::Spike2D, data.len())?;

    let mut x = Vec::with_capacity(n);
    let mut y = Vec::with_capacity(n);
    let mut p = Vec::with_capacity(n);
    let mut t = Vec::with_capacity(n);

    for chunk in data.chunks_exact(RECORD_SIZE) {
        let record = Spike2dRecord::unpack(chunk);
        x.push(record.x);
        y.push(record.y);
        p.push(record.polarity);
        t.push(us_to_ms(record.t_us));
    }

    log::debug!("decoded {} 2D spike records", n);
    SpikeEventSet::new_2d(x, y, p, t)
}

pub fn encode_2d(events: &SpikeEventSet) -> Result<Vec<u8>> {
    check_dimensionality(RecordFormat::Spike2D, events)?;
    let ys = events.y().unwrap_or_default();

    let mut out = Vec::with_capacity(events.len() * RECORD_SIZE);
    for (i, &y) in ys.iter().enumerate() {
        let record = Spike2dRecord {
            x: events.x()[i],
            y,
            polarity: events.p()[i],
            t_us: ms_to_us(events.t()[i]),
        };
        out.extend_from_slice(&record.pack());
    }

    log::debug!("encoded {} 2D spike records", events.len());
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
        let record = Spike2dRecord { x: 0x22, y: 0x11, polarity: 0, t_us: 0x7F_0001 };
        assert_eq!(record.pack(), [0x22, 0x11, 0x7F, 0x00, 0x01]);
        assert_eq!(Spike2dRecord::unpack(&record.pack()), record);
    }

    #[test]
    fn test_coordinates_truncate_to_byte() {
        let record = Spike2dRecord { x: 300, y: 256, polarity: 1, t_us: 5 };
        let back = Spike2dRecord::unpack(&record.pack());
        assert_eq!(back.x, 44);
        assert_eq!(back.y, 0);
        assert_eq!(back.polarity, 1);
        assert_eq!(back.t_us, 5);
    }

    #[test]
    fn test_roundtrip() {
        let mut rng = rand::thread_rng();
        let n = 400;
        let x: Vec<u32> = (0..n).map(|_| rng.gen_range(0..=255)).collect();
        let y: Vec<u32> = (0..n).map(|_| rng.gen_range(0..=255)).collect();
        let mut p: Vec<u32> = (0..n).map(|_| rng.gen_range(0..=1)).collect();
        p[n - 1] = 0;
        let t: Vec<f64> = (0..n).map(|i| i as f64 * 0.25).collect();

        let events = SpikeEventSet::new_2d(x, y, p, t).unwrap();
        let bytes = encode_2d(&events).unwrap();
        assert_eq!(bytes.len(), n * RECORD_SIZE);
        assert_eq!(decode_2d(&bytes).unwrap(), events);
    }

    #[test]
    fn test_rejects_1d() {
        let events = SpikeEventSet::new_1d(vec![0], vec![0], vec![0.0]).unwrap();
        assert!(matches!(
            encode_2d(&events),
            Err(SpikeError::DimensionMismatch { found: Dimensionality::OneD, .. })
        ));
    }

    #[test]
    fn test_malformed_length() {
        for len in [RECORD_SIZE - 1, RECORD_SIZE + 1] {
            assert!(matches!(decode_2d(&vec![0u8; len]), Err(SpikeError::MalformedFile { .. })));
        }
    }
}
