/// Converts a fractional per-frame spawn rate into whole spawns, carrying the remainder.
#[derive(Debug, Clone, Default)]
pub struct Emitter {
    carry: f64,
}

impl Emitter {
    /// Number of entities to emit this frame for `rate` per nominal frame.
    pub fn due(&mut self, rate: f64, step: f64) -> usize {
        self.carry += (rate * step).max(0.0);
        let whole = self.carry.floor();
        self.carry -= whole;
        whole as usize
    }
}

/// Keep only the newest `cap` items. Returns how many were dropped.
pub fn trim_to_cap<T>(items: &mut Vec<T>, cap: usize) -> usize {
    if items.len() <= cap {
        return 0;
    }
    let excess = items.len() - cap;
    items.drain(..excess);
    excess
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emitter_accumulates_fractions() {
        let mut e = Emitter::default();
        let total: usize = (0..10).map(|_| e.due(0.25, 1.0)).sum();
        assert_eq!(total, 2);
        assert_eq!(e.due(0.0, 1.0), 0);
    }

    #[test]
    fn test_trim_keeps_newest() {
        let mut v: Vec<u32> = (0..10).collect();
        assert_eq!(trim_to_cap(&mut v, 4), 6);
        assert_eq!(v, vec![6, 7, 8, 9]);
        assert_eq!(trim_to_cap(&mut v, 10), 0);
    }
}
