// src/aer/spike3d.rs
// ============================================================================
// SPIKE 3D - Registros de 56 bits (alto, ancho y canal)
// ============================================================================
//
//   bits 55-44  xID (12)
//   bits 43-32  yID (12)
//   bits 31-24  canal (8) - sin bit de signo, el canal lleva la polaridad
//   bits 23-0   timestamp en us (24)
//
// Reutiliza el contenedor 2D con un rango de coordenadas mayor.
//
// ============================================================================

use byteorder::{BigEndian, ByteOrder};

use crate::aer::common::*;
use crate::aer::RecordFormat;
use crate::error::Result;
use crate::event::SpikeEventSet;

pub const RECORD_SIZE: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Spike3dRecord {
    pub x: u32,
    pub y: u32,
    pub channel: u32,
    pub t_us: u32,
}

impl Spike3dRecord {
    pub fn pack(&self) -> [u8; RECORD_SIZE] {
        let mut out = [0u8; RECORD_SIZE];

        // x ocupa los 12 bits altos, y los 12 bajos (byte 1 compartido)
        let coords = ((self.x & MASK_12) << 12) | (self.y & MASK_12);
        BigEndian::write_u24(&mut out[0..3], coords);
        out[3] = (self.channel & MASK_8) as u8;
        BigEndian::write_u24(&mut out[4..7], self.t_us & MASK_24);

        out
    }

    pub fn unpack(bytes: &[u8]) -> Self {
        let coords = BigEndian::read_u24(&bytes[0..3]);
        Self {
            x: coords >> 12,
            y: coords & MASK_12,
            channel: bytes[3] as u32,
            t_us: BigEndian::read_u24(&bytes[4..7]),
        }
    }
}

pub fn decode_3d(data: &[u8]) -> Result<SpikeEventSet> {
    let n = record_count(RecordFormat::Spike3D, data.len())?;

    let mut x = Vec::with_capacity(n);
    let mut y = Vec::with_capacity(n);
    let mut p = Vec::with_capacity(n);
    let mut t = Vec::with_capacity(n);

    for chunk in data.chunks_exact(RECORD_SIZE) {
        let record = Spike3dRecord::unpack(chunk);
        x.push(record.x);
        y.push(record.y);
        p.push(record.channel);
        t.push(us_to_ms(record.t_us));
    }

    log::debug!("decoded {} 3D spike records", n);
    SpikeEventSet::new_2d(x, y, p, t)
}

pub fn encode_3d(events: &SpikeEventSet) -> Result<Vec<u8>> {
    check_dimensionality(RecordFormat::Spike3D, events)?;
    let ys = events.y().unwrap_or_default();

    let mut out = Vec::with_capacity(events.len() * RECORD_SIZE);
    for (i, &y) in ys.iter().enumerate() {
        let record = Spike3dRecord {
            x: events.x()[i],
            y,
            channel: events.p()[i],
            t_us: ms_to_us(events.t()[i]),
        };
        out.extend_from_slice(&record.pack());
    }

    log::debug!("encoded {} 3D spike records", events.len());
    Ok(out)
}
