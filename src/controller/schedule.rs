/// Interval gate checked once per loop iteration
#[derive(Debug, Clone)]
pub struct Periodic {
    interval_ms: u64,
    last_ms: u64,
}

impl Periodic {
    /// First firing is one interval after time zero
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_ms: 0,
        }
    }

    /// True at most once per interval; rearms on firing
    pub fn due(&mut self, now_ms: u64) -> bool {
        if now_ms.saturating_sub(self.last_ms) >= self.interval_ms {
            self.last_ms = now_ms;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_per_interval() {
        let mut p = Periodic::new(1000);
        assert!(!p.due(999));
        assert!(p.due(1000));
        assert!(!p.due(1500));
        assert!(p.due(2100));
        assert!(!p.due(3099));
        assert!(p.due(3100));
    }
}
