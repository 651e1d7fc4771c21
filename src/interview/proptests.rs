//! Property-based tests for the cadence and reduction rules

use super::aggregator::{mean_score, pair_answers, reduce, top_n, PairFeedback};
use super::orchestrator::should_request_turn_feedback;
use super::testing::message;
use crate::db::Speaker;
use proptest::prelude::*;
use std::collections::HashMap;

// ============================================================================
// Arbitrary Generators
// ============================================================================

/// Small vocabulary so duplicates are common
fn arb_phrase() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("clear".to_string()),
        Just("concise".to_string()),
        Just("detailed".to_string()),
        Just("confident".to_string()),
        "[a-e]{1,2}",
    ]
}

fn arb_lists() -> impl Strategy<Value = Vec<Vec<String>>> {
    prop::collection::vec(prop::collection::vec(arb_phrase(), 0..5), 0..8)
}

fn arb_pair() -> impl Strategy<Value = PairFeedback> {
    (
        prop::collection::vec(arb_phrase(), 0..4),
        prop::collection::vec(arb_phrase(), 0..4),
        prop::collection::vec(arb_phrase(), 0..7),
        0u8..=5,
    )
        .prop_map(|(strengths, improvements, suggestions, overall_score)| PairFeedback {
            question: "q".to_string(),
            answer: "a".to_string(),
            strengths,
            improvements,
            suggestions,
            overall_score,
        })
}

fn arb_speakers() -> impl Strategy<Value = Vec<Speaker>> {
    prop::collection::vec(prop_oneof![Just(Speaker::Ai), Just(Speaker::User)], 0..20)
}

fn counts(lists: &[Vec<String>]) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    for item in lists.iter().flatten() {
        *counts.entry(item.as_str()).or_insert(0) += 1;
    }
    counts
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_cadence_fires_on_even_totals(prior in 0usize..10_000) {
        prop_assert_eq!(should_request_turn_feedback(prior), (prior + 1) % 2 == 0);
    }

    #[test]
    fn prop_top_n_is_bounded_and_distinct(lists in arb_lists(), n in 0usize..6) {
        let top = top_n(lists.iter().map(Vec::as_slice), n);
        let distinct = counts(&lists).len();

        prop_assert_eq!(top.len(), n.min(distinct));
        let mut deduped = top.clone();
        deduped.sort();
        deduped.dedup();
        prop_assert_eq!(deduped.len(), top.len());
    }

    #[test]
    fn prop_top_n_is_ordered_by_frequency(lists in arb_lists()) {
        let top = top_n(lists.iter().map(Vec::as_slice), usize::MAX);
        let counts = counts(&lists);

        for window in top.windows(2) {
            prop_assert!(counts[window[0].as_str()] >= counts[window[1].as_str()]);
        }
        // Nothing left out ranks above what was kept
        let top3 = top_n(lists.iter().map(Vec::as_slice), 3);
        if let Some(last) = top3.last() {
            for (item, count) in &counts {
                if !top3.iter().any(|t| t == item) {
                    prop_assert!(*count <= counts[last.as_str()]);
                }
            }
        }
    }

    #[test]
    fn prop_mean_score_within_bounds(scores in prop::collection::vec(0u8..=5, 0..20)) {
        let mean = mean_score(&scores);
        if scores.is_empty() {
            prop_assert_eq!(mean, 0);
        } else {
            let min = *scores.iter().min().unwrap();
            let max = *scores.iter().max().unwrap();
            prop_assert!(mean >= min && mean <= max);
        }
    }

    #[test]
    fn prop_reduce_respects_limits(pairs in prop::collection::vec(arb_pair(), 0..10)) {
        let n = pairs.len();
        let report = reduce(pairs);

        prop_assert!(report.strengths.len() <= 3);
        prop_assert!(report.improvements.len() <= 3);
        prop_assert!(report.suggestions.len() <= 5);
        prop_assert!(report.overall_score <= 5);
        prop_assert_eq!(report.detailed.len(), n);
        if n == 0 {
            prop_assert_eq!(report.overall_score, 0);
        }
    }

    #[test]
    fn prop_one_pair_per_user_message(speakers in arb_speakers()) {
        let messages: Vec<_> = speakers
            .iter()
            .enumerate()
            .map(|(i, s)| message(*s, &format!("m{i}")))
            .collect();
        let pairs = pair_answers(&messages);

        let users = speakers.iter().filter(|s| **s == Speaker::User).count();
        prop_assert_eq!(pairs.len(), users);
        for pair in &pairs {
            prop_assert!(pair.question.is_empty() || messages.iter().any(|m| m.is_ai() && m.content == pair.question));
        }
    }
}
