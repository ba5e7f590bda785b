use rand::Rng;

/// Draws one question index uniformly at random from `pool`, removing it.
///
/// An exhausted pool is refilled with the full `0..total` range before the
/// draw, so every question is shown once per cycle before any repeats. The
/// refill includes the index that ended the previous cycle, which may
/// therefore open the next one.
///
/// Callers must guard the empty-bank case (`total == 0`) before invoking.
pub fn draw_question_index(pool: &mut Vec<usize>, total: usize, rng: &mut impl Rng) -> usize {
    debug_assert!(total > 0, "draw_question_index called with an empty bank");

    if pool.is_empty() {
        tracing::debug!(bank.size = total, "Question pool exhausted, refilling");
        pool.extend(0..total);
    }

    let slot = rng.gen_range(0..pool.len());
    pool.swap_remove(slot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    #[test]
    fn test_pool_drains_without_repeats_then_refills() {
        let mut rng = StdRng::seed_from_u64(7);
        let total = 5;
        let mut pool: Vec<usize> = (0..total).collect();

        let mut seen = HashSet::new();
        for _ in 0..total {
            let drawn = draw_question_index(&mut pool, total, &mut rng);
            assert!(drawn < total);
            assert!(seen.insert(drawn), "index {drawn} drawn twice in one cycle");
        }
        assert!(pool.is_empty());

        // The next draw refills the pool to the full range before choosing.
        let drawn = draw_question_index(&mut pool, total, &mut rng);
        assert!(drawn < total);
        assert_eq!(pool.len(), total - 1);
        assert!(!pool.contains(&drawn));
    }

    #[test]
    fn test_last_remaining_index_is_drawn() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut pool = vec![3];

        assert_eq!(draw_question_index(&mut pool, 5, &mut rng), 3);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_single_question_bank_always_repeats() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut pool = vec![0];

        for _ in 0..4 {
            assert_eq!(draw_question_index(&mut pool, 1, &mut rng), 0);
            assert!(pool.is_empty());
        }
    }
}
