use dashmap::DashMap;

/// [`PendingActorCalls`] running count of actor calls waiting on their
/// per-actor lock, keyed by actor type.
///
/// Each entry is updated and read back under its shard lock, so the values
/// returned by [`apply`](Self::apply) for one actor type are the prefix sums of
/// the deltas in the order the lock was taken.
#[derive(Debug, Default)]
pub(crate) struct PendingActorCalls {
    totals: DashMap<String, i32>,
}

impl PendingActorCalls {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Adds `delta` to the total for `actor_type` and returns the new total.
    /// Missing entries start at zero. Overflow wraps.
    pub(crate) fn apply(&self, actor_type: &str, delta: i32) -> i32 {
        if let Some(mut total) = self.totals.get_mut(actor_type) {
            *total = total.wrapping_add(delta);
            return *total;
        }

        let mut total = self.totals.entry(actor_type.to_owned()).or_insert(0);
        *total = total.wrapping_add(delta);
        *total
    }

    pub(crate) fn get(&self, actor_type: &str) -> Option<i32> {
        self.totals.get(actor_type).map(|total| *total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_apply_creates_entry_at_zero() {
        let pending = PendingActorCalls::new();
        assert_eq!(pending.get("cart"), None);
        assert_eq!(pending.apply("cart", 3), 3);
        assert_eq!(pending.apply("cart", -1), 2);
        assert_eq!(pending.get("cart"), Some(2));
    }

    #[test]
    fn test_actor_types_are_independent() {
        let pending = PendingActorCalls::new();
        pending.apply("cart", 1);
        pending.apply("order", -4);
        assert_eq!(pending.get("cart"), Some(1));
        assert_eq!(pending.get("order"), Some(-4));
    }

    #[test]
    fn test_apply_wraps_on_overflow() {
        let pending = PendingActorCalls::new();
        pending.apply("cart", i32::MAX);
        assert_eq!(pending.apply("cart", 1), i32::MIN);
    }

    #[test]
    fn test_concurrent_apply_returns_every_prefix_sum_once() {
        let pending = PendingActorCalls::new();
        let threads = 8;
        let per_thread = 250;

        let observed: Vec<i32> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..threads)
                .map(|_| {
                    scope.spawn(|| {
                        (0..per_thread)
                            .map(|_| pending.apply("cart", 1))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|handle| handle.join().unwrap())
                .collect()
        });

        let total = threads * per_thread;
        let unique: HashSet<_> = observed.iter().copied().collect();
        assert_eq!(observed.len(), total as usize);
        assert_eq!(unique, (1..=total).collect::<HashSet<_>>());
        assert_eq!(pending.get("cart"), Some(total));
    }
}
