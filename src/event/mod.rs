// src/event/mod.rs
// ============================================================================
// SPIKE EVENT SET - Contenedor columnar de eventos AER
// ============================================================================
//
// Cuatro columnas alineadas por índice: x, y (solo 2D), p, t (ms).
// Al construir, p se normaliza para que su mínimo sea 0. La normalización
// es por instancia: dos sets leídos de ficheros con offsets de canal
// distintos no son comparables directamente.
//
// ============================================================================

use crate::error::{Result, SpikeError};

/// Dimensionalidad espacial del set (fija en construcción)
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum Dimensionality {
    OneD,
    TwoD,
}

impl Dimensionality {
    /// Rango del tensor denso correspondiente
    pub fn tensor_rank(&self) -> usize {
        match self {
            Self::OneD => 3,
            Self::TwoD => 4,
        }
    }

    pub fn from_rank(rank: usize) -> Option<Self> {
        match rank {
            3 => Some(Self::OneD),
            4 => Some(Self::TwoD),
            _ => None,
        }
    }
}

impl std::fmt::Display for Dimensionality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OneD => write!(f, "1D"),
            Self::TwoD => write!(f, "2D"),
        }
    }
}

/// Un evento individual
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    pub x: u32,
    pub y: Option<u32>,
    pub p: u32,
    pub t: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpikeEventSet {
    dimensionality: Dimensionality,
    x: Vec<u32>,
    y: Option<Vec<u32>>,
    p: Vec<u32>,
    t: Vec<f64>,
}

impl SpikeEventSet {
    /// Construye un set; `y = None` implica 1D.
    pub fn new(
        x: impl Into<Vec<u32>>,
        y: Option<Vec<u32>>,
        p: impl Into<Vec<u32>>,
        t: impl Into<Vec<f64>>,
    ) -> Result<Self> {
        let x = x.into();
        let mut p = p.into();
        let t = t.into();

        let dimensionality = if y.is_some() {
            Dimensionality::TwoD
        } else {
            Dimensionality::OneD
        };

        if p.len() != x.len() || t.len() != x.len() {
            return Err(SpikeError::ShapeMismatch(format!(
                "event columns differ in length: x={}, p={}, t={}",
                x.len(),
                p.len(),
                t.len()
            )));
        }
        if let Some(y) = &y {
            if y.len() != x.len() {
                return Err(SpikeError::ShapeMismatch(format!(
                    "event columns differ in length: x={}, y={}",
                    x.len(),
                    y.len()
                )));
            }
        }

        // p := p - min(p)
        if let Some(&min) = p.iter().min() {
            if min > 0 {
                p.iter_mut().for_each(|v| *v -= min);
            }
        }

        Ok(Self { dimensionality, x, y, p, t })
    }

    pub fn new_1d(
        x: impl Into<Vec<u32>>,
        p: impl Into<Vec<u32>>,
        t: impl Into<Vec<f64>>,
    ) -> Result<Self> {
        Self::new(x, None, p, t)
    }

    pub fn new_2d(
        x: impl Into<Vec<u32>>,
        y: impl Into<Vec<u32>>,
        p: impl Into<Vec<u32>>,
        t: impl Into<Vec<f64>>,
    ) -> Result<Self> {
        Self::new(x, Some(y.into()), p, t)
    }

    pub fn dimensionality(&self) -> Dimensionality {
        self.dimensionality
    }

    pub fn x(&self) -> &[u32] {
        &self.x
    }

    pub fn y(&self) -> Option<&[u32]> {
        self.y.as_deref()
    }

    pub fn p(&self) -> &[u32] {
        &self.p
    }

    /// Timestamps en milisegundos
    pub fn t(&self) -> &[f64] {
        &self.t
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn event(&self, i: usize) -> Option<Event> {
        if i >= self.len() {
            return None;
        }
        Some(Event {
            x: self.x[i],
            y: self.y.as_ref().map(|y| y[i]),
            p: self.p[i],
            t: self.t[i],
        })
    }

    /// Itera en el orden de las columnas
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        (0..self.len()).filter_map(move |i| self.event(i))
    }

    /// Extremos por eje; None si el set está vacío
    pub fn stats(&self) -> Option<EventSetStats> {
        if self.is_empty() {
            return None;
        }

        let (t_min, t_max) = self
            .t
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &t| {
                (lo.min(t), hi.max(t))
            });

        Some(EventSetStats {
            count: self.len(),
            max_x: self.x.iter().copied().max().unwrap_or(0),
            max_y: self.y.as_ref().and_then(|y| y.iter().copied().max()),
            max_p: self.p.iter().copied().max().unwrap_or(0),
            t_min,
            t_max,
        })
    }
}

/// Resumen de extremos de un SpikeEventSet
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct EventSetStats {
    pub count: usize,
    pub max_x: u32,
    pub max_y: Option<u32>,
    pub max_p: u32,
    pub t_min: f64,
    pub t_max: f64,
}

impl EventSetStats {
    /// Número de canales (p ya normalizado a 0)
    pub fn num_channels(&self) -> usize {
        self.max_p as usize + 1
    }

    pub fn duration(&self) -> f64 {
        self.t_max - self.t_min
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_polarity_normalized() {
        let set = SpikeEventSet::new_2d(vec![1, 2, 3], vec![4, 5, 6], vec![3, 5, 4], vec![0.0, 1.0, 2.0]).unwrap();
        assert_eq!(set.p(), &[0, 2, 1]);
        assert_eq!(set.p().iter().min(), Some(&0));
    }

    #[test]
    fn test_polarity_normalized_random() {
        let mut rng = rand::thread_rng();
        for _ in 0..20 {
            let n = rng.gen_range(1..200);
            let offset = rng.gen_range(0..50u32);
            let x: Vec<u32> = (0..n).map(|_| rng.gen_range(0..256)).collect();
            let p: Vec<u32> = (0..n).map(|_| offset + rng.gen_range(0..4)).collect();
            let t: Vec<f64> = (0..n).map(|i| i as f64).collect();

            let set = SpikeEventSet::new_1d(x, p, t).unwrap();
            assert_eq!(set.p().iter().min(), Some(&0));
        }
    }

    #[test]
    fn test_dimensionality_from_y() {
        let one = SpikeEventSet::new_1d(vec![0], vec![0], vec![0.0]).unwrap();
        assert_eq!(one.dimensionality(), Dimensionality::OneD);
        assert!(one.y().is_none());

        let two = SpikeEventSet::new_2d(vec![0], vec![0], vec![0], vec![0.0]).unwrap();
        assert_eq!(two.dimensionality(), Dimensionality::TwoD);
        assert_eq!(two.y(), Some(&[0u32][..]));
    }

    #[test]
    fn test_length_mismatch() {
        let err = SpikeEventSet::new_1d(vec![0, 1], vec![0], vec![0.0, 1.0]).unwrap_err();
        assert!(matches!(err, SpikeError::ShapeMismatch(_)));

        let err = SpikeEventSet::new_2d(vec![0, 1], vec![0], vec![0, 0], vec![0.0, 1.0]).unwrap_err();
        assert!(matches!(err, SpikeError::ShapeMismatch(_)));
    }

    #[test]
    fn test_empty_set() {
        let set = SpikeEventSet::new_1d(Vec::new(), Vec::new(), Vec::new()).unwrap();
        assert!(set.is_empty());
        assert!(set.stats().is_none());
    }

    #[test]
    fn test_stats() {
        let set = SpikeEventSet::new_2d(vec![3, 7, 1], vec![2, 0, 9], vec![1, 2, 1], vec![5.0, 1.5, 8.25]).unwrap();
        let stats = set.stats().unwrap();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.max_x, 7);
        assert_eq!(stats.max_y, Some(9));
        assert_eq!(stats.max_p, 1);
        assert_eq!(stats.num_channels(), 2);
        assert_eq!(stats.t_min, 1.5);
        assert_eq!(stats.t_max, 8.25);
    }

    #[test]
    fn test_stats_to_json() {
        let set = SpikeEventSet::new_1d(vec![4, 2], vec![1, 2], vec![0.5, 3.0]).unwrap();
        let value = serde_json::json!({
            "dimensionality": set.dimensionality(),
            "stats": set.stats(),
        });

        assert_eq!(value["dimensionality"], "OneD");
        assert_eq!(value["stats"]["count"], 2);
        assert_eq!(value["stats"]["max_x"], 4);
        assert!(value["stats"]["max_y"].is_null());
        assert_eq!(value["stats"]["max_p"], 1);
        assert_eq!(value["stats"]["t_max"], 3.0);
    }

    #[test]
    fn test_iter_order() {
        let set = SpikeEventSet::new_1d(vec![9, 8], vec![0, 1], vec![0.5, 0.25]).unwrap();
        let events: Vec<Event> = set.iter().collect();
        assert_eq!(events[0], Event { x: 9, y: None, p: 0, t: 0.5 });
        assert_eq!(events[1], Event { x: 8, y: None, p: 1, t: 0.25 });
        assert!(set.event(2).is_none());
    }
}
