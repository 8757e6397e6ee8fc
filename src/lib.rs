// src/lib.rs
// ============================================================================
// SPIKE-CONVERT - Codec AER de spikes y binado a tensores densos
// ============================================================================

pub mod aer;
pub mod builder;
pub mod error;
pub mod event;
pub mod safetensor;
pub mod spikefile;
pub mod tensor;

// Re-exports principales
pub use aer::{decode_events, encode_events, RecordFormat, SpikeCountSummary};
pub use builder::{convert_dir, convert_file, ConvertStats};
pub use error::{Result, SpikeError};
pub use event::{Dimensionality, Event, SpikeEventSet};
pub use tensor::{to_events, to_tensor, DenseTensor};

/// Parsea una forma "C,H,W,T" (también acepta 'x' como separador)
pub fn parse_shape(s: &str) -> Option<Vec<usize>> {
    let dims: Option<Vec<usize>> = s
        .split(|c| c == ',' || c == 'x')
        .map(|d| d.trim().parse::<usize>().ok())
        .collect();
    dims.filter(|d| !d.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shape() {
        assert_eq!(parse_shape("2,34,34,300"), Some(vec![2, 34, 34, 300]));
        assert_eq!(parse_shape("1x256x100"), Some(vec![1, 256, 100]));
        assert_eq!(parse_shape("2, 3 ,4"), Some(vec![2, 3, 4]));
        assert_eq!(parse_shape("2,a,4"), None);
        assert_eq!(parse_shape(""), None);
    }
}
