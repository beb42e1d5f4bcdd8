use std::time::Duration;
use std::thread;
use rand::Rng;
use log::info;
use serde::Deserialize;

/// Random pause between requests, in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DelayRange {
    pub min_secs: u64,
    pub max_secs: u64,
}

impl Default for DelayRange {
    fn default() -> Self {
        DelayRange { min_secs: 2, max_secs: 6 }
    }
}

impl DelayRange {
    pub fn none() -> Self {
        DelayRange { min_secs: 0, max_secs: 0 }
    }

    pub fn pick(&self) -> Duration {
        let (low, high) = if self.min_secs <= self.max_secs {
            (self.min_secs, self.max_secs)
        } else {
            (self.max_secs, self.min_secs)
        };
        let mut rng = rand::thread_rng();
        Duration::from_secs(rng.gen_range(low..=high))
    }

    pub fn pause(&self) {
        let delay = self.pick();
        if delay.is_zero() {
            return;
        }
        info!("Waiting for {} seconds (Search Delay)...", delay.as_secs());
        thread::sleep(delay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pick_stays_in_range() {
        let range = DelayRange { min_secs: 3, max_secs: 5 };
        for _ in 0..50 {
            let secs = range.pick().as_secs();
            assert!((3..=5).contains(&secs));
        }
    }

    #[test]
    fn inverted_bounds_are_tolerated() {
        let range = DelayRange { min_secs: 4, max_secs: 1 };
        assert!((1..=4).contains(&range.pick().as_secs()));
    }

    #[test]
    fn none_never_sleeps() {
        assert_eq!(DelayRange::none().pick(), Duration::ZERO);
    }
}
