use chrono::{DateTime, Duration, TimeZone, Utc};
use kertaus_lib::flashcards::algorithm::{compute_statistics, is_due, review, sort_by_difficulty};
use kertaus_lib::flashcards::{ProgressState, MIN_EASE_FACTOR};
use proptest::prelude::*;
use uuid::Uuid;

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

fn make_state(interval: i32, repetitions: i32, ease_factor: f64, days_ago: i64) -> ProgressState {
    let mut state = ProgressState::new(Uuid::new_v4(), base_time());
    state.set_interval(interval);
    state.set_repetitions(repetitions);
    state.set_ease_factor(ease_factor);
    state.set_last_review_date(base_time() - Duration::days(days_ago));
    state
}

fn arb_state() -> impl Strategy<Value = ProgressState> {
    (1i32..3650, 0i32..50, 1.3f64..4.0, 0i64..400)
        .prop_map(|(interval, repetitions, ease, days_ago)| {
            make_state(interval, repetitions, ease, days_ago)
        })
}

// ── Quality is clamped before use ────────────────────────────────────────

proptest! {
    #[test]
    fn out_of_range_quality_behaves_like_clamped(state in arb_state(), quality in any::<i32>()) {
        let now = base_time();
        prop_assert_eq!(review(&state, quality, now), review(&state, quality.clamp(0, 5), now));
    }
}

// ── Floors hold after any review ─────────────────────────────────────────

proptest! {
    #[test]
    fn ease_and_interval_floors(state in arb_state(), quality in -10i32..15) {
        let next = review(&state, quality, base_time());
        prop_assert!(next.ease_factor() >= MIN_EASE_FACTOR);
        prop_assert!(next.interval() >= 1);
        prop_assert!(next.repetitions() >= 0);
        prop_assert!((0..=5).contains(&next.quality()));
    }
}

proptest! {
    #[test]
    fn repeated_reviews_keep_invariants(
        state in arb_state(),
        grades in proptest::collection::vec(0i32..=5, 1..30),
    ) {
        let mut current = state;
        let mut now = base_time();
        for grade in grades {
            current = review(&current, grade, now);
            prop_assert!(current.ease_factor() >= MIN_EASE_FACTOR);
            prop_assert!(current.interval() >= 1);
            now += Duration::days(i64::from(current.interval()).min(3650));
        }
    }
}

// ── Lapses reset scheduling progress ─────────────────────────────────────

proptest! {
    #[test]
    fn lapse_resets_interval_and_repetitions(state in arb_state(), quality in 0i32..3) {
        let next = review(&state, quality, base_time());
        prop_assert_eq!(next.interval(), 1);
        prop_assert_eq!(next.repetitions(), 0);
        prop_assert!(next.ease_factor() < state.ease_factor() || state.ease_factor() == MIN_EASE_FACTOR);
    }
}

proptest! {
    #[test]
    fn success_increments_repetitions(state in arb_state(), quality in 3i32..=5) {
        let next = review(&state, quality, base_time());
        prop_assert_eq!(next.repetitions(), state.repetitions() + 1);
        prop_assert_eq!(
            next.next_review_date(),
            Some(base_time() + Duration::days(i64::from(next.interval())))
        );
    }
}

// ── Progression ladder from a fresh card ─────────────────────────────────

#[test]
fn progression_ladder_with_perfect_answers() {
    let now = base_time();
    let fresh = ProgressState::new(Uuid::new_v4(), now);

    let first = review(&fresh, 5, now);
    assert_eq!((first.interval(), first.repetitions()), (1, 1));

    let second = review(&first, 5, now);
    assert_eq!((second.interval(), second.repetitions()), (3, 2));

    let third = review(&second, 5, now);
    assert_eq!(third.interval(), (3.0 * second.ease_factor()).floor() as i32);
    assert_eq!(third.repetitions(), 3);
}

// ── Due predicate is inclusive ───────────────────────────────────────────

proptest! {
    #[test]
    fn due_exactly_at_next_review(offset_secs in -1_000_000i64..1_000_000) {
        let mut state = ProgressState::new(Uuid::new_v4(), base_time());
        let next = base_time() + Duration::seconds(offset_secs);
        state.set_next_review_date(Some(next));

        prop_assert!(is_due(&state, next));
        prop_assert!(!is_due(&state, next - Duration::seconds(1)));

        state.set_next_review_date(None);
        prop_assert!(is_due(&state, next - Duration::days(1)));
    }
}

// ── Statistics ───────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn statistics_counts_are_consistent(states in proptest::collection::vec(arb_state(), 0..40)) {
        let stats = compute_statistics(&states, base_time());

        prop_assert_eq!(stats.total_cards, states.len());
        prop_assert!(stats.due_cards <= stats.total_cards);
        prop_assert!(stats.new_cards <= stats.total_cards);
        prop_assert_eq!(
            stats.total_repetitions,
            states.iter().map(|s| s.repetitions() as u64).sum::<u64>()
        );
        if states.is_empty() {
            prop_assert_eq!(stats.average_ease_factor, 0.0);
            prop_assert_eq!(stats.completion_rate, 0.0);
        } else {
            prop_assert!(stats.average_ease_factor >= MIN_EASE_FACTOR - 0.005);
            prop_assert!(stats.average_interval >= 1.0);
        }
    }
}

// ── Difficulty ordering ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn difficulty_order_is_sorted_permutation(states in proptest::collection::vec(arb_state(), 0..30)) {
        let sorted = sort_by_difficulty(&states);
        prop_assert_eq!(sorted.len(), states.len());

        for pair in sorted.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            prop_assert!(a.ease_factor() <= b.ease_factor());
            if a.ease_factor() == b.ease_factor() {
                prop_assert!(a.last_review_date() <= b.last_review_date());
            }
        }
        for state in &states {
            prop_assert!(sorted.contains(state));
        }
    }
}
