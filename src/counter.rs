use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct ProgressCounter {
    value: AtomicU64,
}

impl ProgressCounter {
    pub fn new(initial: u64) -> Self {
        ProgressCounter {
            value: AtomicU64::new(initial),
        }
    }

    pub fn increment(&self) -> u64 {
        self.value.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn value(&self) -> u64 {
        self.value.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn increment_returns_new_value() {
        let counter = ProgressCounter::new(5);
        assert_eq!(counter.increment(), 6);
        assert_eq!(counter.value(), 6);
    }

    #[test]
    fn concurrent_increments_hand_out_unique_values() {
        let counter = Arc::new(ProgressCounter::default());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let counter = counter.clone();
                thread::spawn(move || (0..100).map(|_| counter.increment()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for value in handle.join().unwrap() {
                assert!(seen.insert(value));
            }
        }
        assert_eq!(counter.value(), 800);
        assert_eq!(seen.len(), 800);
    }
}
