//! Engagement/round/series bookkeeping tests against the pure flow API.

use bevy::prelude::*;
use duelsim::sim::combatant::Combatant;
use duelsim::sim::match_flow::{decide_winner, FlowDecision, MatchState};

#[test]
fn test_drafts_only_open_between_rounds() {
    for best_of in [1u32, 3, 5, 7] {
        let mut state = MatchState::new(best_of, 3);
        let needed = state.engagements_to_win();
        let mut engagements = 0;
        loop {
            engagements += 1;
            match state.record_engagement((engagements % 2) as u8) {
                FlowDecision::NextEngagement => {
                    // Round still open: no side has the majority yet
                    assert!(state.round_wins[0] < needed);
                    assert!(state.round_wins[1] < needed);
                }
                FlowDecision::OpenDraft { order } => {
                    // Round concluded: wins reset, loser drafts first
                    assert_eq!(state.round_wins, [0, 0]);
                    assert_eq!(order[1], state.last_engagement_winner.unwrap());
                    assert_ne!(order[0], order[1]);
                }
                FlowDecision::SeriesOver { winner } => {
                    assert_eq!(state.round_index, 3);
                    assert_eq!(state.series_score[0] + state.series_score[1], 3);
                    assert!(
                        state.series_score[winner as usize]
                            > state.series_score[1 - winner as usize]
                    );
                    break;
                }
            }
            assert!(
                engagements <= best_of * 3,
                "series ran past {} engagements",
                best_of * 3
            );
        }
        assert_eq!(state.engagements_played, engagements);
    }
}

#[test]
fn test_single_round_single_engagement_series() {
    let mut state = MatchState::new(1, 1);
    assert_eq!(
        state.record_engagement(1),
        FlowDecision::SeriesOver { winner: 1 }
    );
    assert_eq!(state.series_score, [0, 1]);
}

#[test]
fn test_round_majority_concludes_without_overshoot() {
    // Best-of-3 round inside a five-round series
    let mut state = MatchState::new(3, 5);
    assert_eq!(state.record_engagement(0), FlowDecision::NextEngagement);
    assert_eq!(state.record_engagement(1), FlowDecision::NextEngagement);
    assert_eq!(state.round_wins, [1, 1]);
    let decision = state.record_engagement(0);
    assert_eq!(decision, FlowDecision::OpenDraft { order: [1, 0] });
    // The concluding win landed exactly on the majority and the counters reset
    assert_eq!(state.round_wins, [0, 0]);
    assert_eq!(state.series_score, [1, 0]);
    assert_eq!(state.round_index, 1);
    // The next engagement belongs to round two
    assert_eq!(state.record_engagement(1), FlowDecision::NextEngagement);
    assert_eq!(state.round_wins, [0, 1]);
}

#[test]
fn test_every_round_is_played_even_after_a_clinch() {
    // Side 0 takes the first two of three rounds; the third is still played
    let mut state = MatchState::new(1, 3);
    assert!(matches!(
        state.record_engagement(0),
        FlowDecision::OpenDraft { .. }
    ));
    assert!(matches!(
        state.record_engagement(0),
        FlowDecision::OpenDraft { .. }
    ));
    assert_eq!(state.series_score, [2, 0]);
    assert!(state.series_winner.is_none());
    assert_eq!(
        state.record_engagement(1),
        FlowDecision::SeriesOver { winner: 0 }
    );
    assert_eq!(state.series_score, [2, 1]);
    assert_eq!(state.series_winner, Some(0));
}

#[test]
fn test_mutual_destruction_resolution_chain() {
    let mut a = Combatant::new(0, Vec2::ZERO);
    let mut b = Combatant::new(1, Vec2::ZERO);

    // Chain link 1: survivor wins outright
    a.health = 12.0;
    b.health = -3.0;
    assert_eq!(decide_winner(&a, &b), 0);

    // Chain link 2: both down, shallower overkill wins
    a.health = -1.0;
    b.health = -30.0;
    assert_eq!(decide_winner(&a, &b), 0);

    // Chain link 3: equal overkill, damage output decides
    b.health = -1.0;
    a.damage_dealt = 55.0;
    b.damage_dealt = 80.0;
    assert_eq!(decide_winner(&a, &b), 1);

    // Chain link 4: full tie falls to side 0
    b.damage_dealt = 55.0;
    assert_eq!(decide_winner(&a, &b), 0);
}
