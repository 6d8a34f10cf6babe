//! Match flow
//!
//! The engagement/round/series state machine. An engagement is one
//! life-or-death fight; a round is a best-of-N sequence of engagements; a
//! series is a fixed number of rounds. Drafts only open between rounds,
//! with the round loser picking first; between engagements inside a round
//! the fighters go straight back in. Scoring is a pure function on
//! [`MatchState`] so every transition rule is testable without an `App`.

use bevy::prelude::*;

use super::arena::{Arena, ArenaSpec};
use super::combatant::Combatant;
use super::draft::{generate_draft_pool, DraftPicked, DraftPoolReady, DraftSelection};
use super::intent::AiControlled;
use super::projectiles::{Bullets, Explosions};
use super::rng::GameRng;

#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MatchPhase {
    #[default]
    Idle,
    Engagement,
    RoundIntermission,
    Draft,
    SeriesComplete,
}

/// What the flow does after an engagement is scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowDecision {
    /// Round still undecided: straight into the next engagement, no draft.
    NextEngagement,
    /// Round concluded, series continues: loser drafts first.
    OpenDraft { order: [u8; 2] },
    /// All rounds played.
    SeriesOver { winner: u8 },
}

#[derive(Resource, Debug, Clone)]
pub struct MatchState {
    /// Engagements per round (best-of).
    pub best_of: u32,
    /// Rounds in the series; all of them are played.
    pub total_rounds: u32,
    /// Engagement wins inside the current round.
    pub round_wins: [u32; 2],
    /// Rounds won per side.
    pub series_score: [u32; 2],
    /// Rounds concluded so far.
    pub round_index: u32,
    /// Engagements concluded so far, across all rounds.
    pub engagements_played: u32,
    pub last_engagement_winner: Option<u8>,
    pub series_winner: Option<u8>,
}

impl MatchState {
    pub fn new(best_of: u32, total_rounds: u32) -> Self {
        Self {
            best_of: best_of.max(1),
            total_rounds: total_rounds.max(1),
            round_wins: [0, 0],
            series_score: [0, 0],
            round_index: 0,
            engagements_played: 0,
            last_engagement_winner: None,
            series_winner: None,
        }
    }

    /// Engagement wins that conclude a round.
    pub fn engagements_to_win(&self) -> u32 {
        self.best_of.div_ceil(2)
    }

    /// Score one engagement and decide what happens next.
    pub fn record_engagement(&mut self, winner: u8) -> FlowDecision {
        let w = (winner as usize).min(1);
        self.round_wins[w] += 1;
        self.engagements_played += 1;
        self.last_engagement_winner = Some(winner);

        if self.round_wins[w] < self.engagements_to_win() {
            return FlowDecision::NextEngagement;
        }

        // Round concluded
        self.series_score[w] += 1;
        self.round_wins = [0, 0];
        self.round_index += 1;

        if self.round_index < self.total_rounds {
            return FlowDecision::OpenDraft {
                order: [1 - winner, winner],
            };
        }

        // All rounds played; odd round totals cannot tie
        let champion = match self.series_score[0].cmp(&self.series_score[1]) {
            std::cmp::Ordering::Greater => 0,
            std::cmp::Ordering::Less => 1,
            std::cmp::Ordering::Equal => winner,
        };
        self.series_winner = Some(champion);
        FlowDecision::SeriesOver { winner: champion }
    }
}

/// Winner of a finished (or timed-out) engagement. Simultaneous deaths go
/// to the side with more health remaining, then to the side that dealt more
/// damage, then to side 0.
pub fn decide_winner(a: &Combatant, b: &Combatant) -> u8 {
    debug_assert_ne!(a.side, b.side);
    let (s0, s1) = if a.side == 0 { (a, b) } else { (b, a) };
    match (s0.health > 0.0, s1.health > 0.0) {
        (true, false) => 0,
        (false, true) => 1,
        _ => {
            if s0.health > s1.health {
                0
            } else if s1.health > s0.health {
                1
            } else if s1.damage_dealt > s0.damage_dealt {
                1
            } else {
                0
            }
        }
    }
}

/// Wall-clock guard on a single engagement.
#[derive(Resource, Debug, Clone)]
pub struct EngagementClock {
    pub elapsed: f32,
    pub limit: f32,
}

impl EngagementClock {
    pub fn new(limit: f32) -> Self {
        Self {
            elapsed: 0.0,
            limit,
        }
    }
}

/// Which built-in arena the series is played on.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct ArenaChoice(pub usize);

#[derive(Resource, Debug, Clone)]
pub struct IntermissionTimer(pub Timer);

impl Default for IntermissionTimer {
    fn default() -> Self {
        Self(Timer::from_seconds(1.0, TimerMode::Once))
    }
}

/// Draft turn order and progress for the current draft phase.
#[derive(Resource, Debug, Clone, Default)]
pub struct DraftQueue {
    pub pending: Vec<u8>,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct EngagementOver {
    pub winner: u8,
    pub engagement_index: u32,
}

/// A round concluded (one side took the engagement majority).
#[derive(Event, Debug, Clone, Copy)]
pub struct RoundConcluded {
    pub winner: u8,
    pub round_index: u32,
    pub series_score: [u32; 2],
}

#[derive(Event, Debug, Clone, Copy)]
pub struct SeriesOutcome {
    pub winner: u8,
    pub score: [u32; 2],
}

/// Rebuild the arena and reset both combatants at engagement start.
pub fn setup_engagement(
    choice: Res<ArenaChoice>,
    mut commands: Commands,
    mut clock: ResMut<EngagementClock>,
    mut bullets: ResMut<Bullets>,
    mut explosions: ResMut<Explosions>,
    mut query: Query<&mut Combatant>,
) {
    let arena = Arena::from_spec(&ArenaSpec::builtin(choice.0));
    bullets.0.clear();
    explosions.0.clear();
    clock.elapsed = 0.0;
    for mut c in query.iter_mut() {
        let spawn = arena.spawns[(c.side as usize).min(1)];
        c.reset_for_engagement(spawn);
    }
    commands.insert_resource(arena);
}

/// Detect engagement end: a death, a simultaneous death, or the clock
/// running out. Sends [`EngagementOver`] and moves to the intermission,
/// which scores the result and routes onward.
pub fn detect_engagement_end(
    time: Res<Time>,
    mut clock: ResMut<EngagementClock>,
    mut state: ResMut<MatchState>,
    mut query: Query<&mut Combatant>,
    mut over: EventWriter<EngagementOver>,
    mut next: ResMut<NextState<MatchPhase>>,
) {
    clock.elapsed += time.delta_secs();
    let timed_out = clock.elapsed >= clock.limit;

    let mut list: Vec<Mut<Combatant>> = query.iter_mut().collect();
    if list.len() != 2 {
        return;
    }
    let someone_down = list.iter().any(|c| c.health <= 0.0);
    if !someone_down && !timed_out {
        return;
    }

    let winner = decide_winner(&list[0], &list[1]);
    for c in list.iter_mut() {
        if c.health <= 0.0 {
            c.defeated = true;
        }
    }
    if timed_out && !someone_down {
        info!("Engagement timed out, side {} ahead on health", winner);
    }
    state.last_engagement_winner = Some(winner);
    over.send(EngagementOver {
        winner,
        engagement_index: state.engagements_played,
    });
    next.set(MatchPhase::RoundIntermission);
}

/// Score the finished engagement and route: straight back into combat while
/// the round is open, to the draft when a round concludes mid-series, or to
/// series completion after the final round.
pub fn enter_intermission(
    mut commands: Commands,
    mut state: ResMut<MatchState>,
    mut round_events: EventWriter<RoundConcluded>,
    mut outcome: EventWriter<SeriesOutcome>,
    mut next: ResMut<NextState<MatchPhase>>,
) {
    let Some(winner) = state.last_engagement_winner else {
        return;
    };
    match state.record_engagement(winner) {
        FlowDecision::NextEngagement => {
            next.set(MatchPhase::Engagement);
        }
        FlowDecision::OpenDraft { order } => {
            info!(
                "Round {} to side {}, series {}-{}",
                state.round_index, winner, state.series_score[0], state.series_score[1]
            );
            round_events.send(RoundConcluded {
                winner,
                round_index: state.round_index,
                series_score: state.series_score,
            });
            commands.insert_resource(DraftQueue {
                pending: order.to_vec(),
            });
            commands.insert_resource(IntermissionTimer::default());
        }
        FlowDecision::SeriesOver { winner: champion } => {
            info!(
                "Series over: side {} wins {}-{}",
                champion, state.series_score[0], state.series_score[1]
            );
            round_events.send(RoundConcluded {
                winner,
                round_index: state.round_index,
                series_score: state.series_score,
            });
            outcome.send(SeriesOutcome {
                winner: champion,
                score: state.series_score,
            });
            next.set(MatchPhase::SeriesComplete);
        }
    }
}

pub fn tick_intermission(
    time: Res<Time>,
    timer: Option<ResMut<IntermissionTimer>>,
    mut next: ResMut<NextState<MatchPhase>>,
) {
    let Some(mut timer) = timer else { return };
    if timer.0.tick(time.delta()).just_finished() {
        next.set(MatchPhase::Draft);
    }
}

/// Series progression (ability levels) clears when the series ends.
pub fn clear_series_progression(mut query: Query<&mut Combatant>) {
    for mut c in query.iter_mut() {
        c.clear_progression();
    }
}

/// Drive the draft queue: AI sides pick a random card from their pool
/// immediately, other sides get a [`DraftPoolReady`] and block until a
/// [`DraftSelection`] arrives. An empty pool (everything maxed) skips the
/// side. Combat resumes when the queue drains.
pub fn process_draft(
    mut queue: ResMut<DraftQueue>,
    mut rng: ResMut<GameRng>,
    mut pool_events: EventWriter<DraftPoolReady>,
    mut picked_events: EventWriter<DraftPicked>,
    mut picks: EventReader<DraftSelection>,
    mut query: Query<(&mut Combatant, Option<&AiControlled>)>,
    mut next: ResMut<NextState<MatchPhase>>,
    mut offered: Local<Option<u8>>,
) {
    let selections: Vec<DraftSelection> = picks.read().cloned().collect();
    loop {
        let Some(&side) = queue.pending.first() else {
            *offered = None;
            next.set(MatchPhase::Engagement);
            return;
        };
        let Some((mut combatant, ai)) = query.iter_mut().find(|(c, _)| c.side == side) else {
            queue.pending.remove(0);
            continue;
        };

        if ai.is_some() {
            let pool = generate_draft_pool(&combatant.levels, &mut rng);
            if !pool.is_empty() {
                let offer = pool[rng.random_index(pool.len())];
                let level = combatant.levels.raise(offer.id);
                combatant.recompute_from_levels();
                info!("Side {} drafts {} (level {})", side, offer.id.name(), level);
                picked_events.send(DraftPicked {
                    side,
                    id: offer.id,
                    level,
                });
            }
            queue.pending.remove(0);
            continue;
        }

        // Human side: offer once, then wait for the selection event. A side
        // with nothing left to draft is skipped outright.
        if *offered != Some(side) {
            let offers = generate_draft_pool(&combatant.levels, &mut rng);
            if offers.is_empty() {
                queue.pending.remove(0);
                continue;
            }
            pool_events.send(DraftPoolReady { side, offers });
            *offered = Some(side);
            return;
        }
        if let Some(sel) = selections.iter().find(|s| s.side == side) {
            let level = combatant.levels.raise(sel.id);
            combatant.recompute_from_levels();
            picked_events.send(DraftPicked {
                side,
                id: sel.id,
                level,
            });
            queue.pending.remove(0);
            *offered = None;
            continue;
        }
        return;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_needs_the_engagement_majority() {
        let mut state = MatchState::new(3, 5);
        assert_eq!(state.engagements_to_win(), 2);
        // First engagement win leaves the round open: no draft yet
        assert_eq!(state.record_engagement(0), FlowDecision::NextEngagement);
        assert_eq!(state.round_wins, [1, 0]);
        assert_eq!(state.series_score, [0, 0]);
        // Second win concludes the round and opens the draft
        assert_eq!(
            state.record_engagement(0),
            FlowDecision::OpenDraft { order: [1, 0] }
        );
        assert_eq!(state.round_wins, [0, 0]);
        assert_eq!(state.series_score, [1, 0]);
        assert_eq!(state.round_index, 1);
    }

    #[test]
    fn test_split_round_goes_the_distance() {
        let mut state = MatchState::new(3, 3);
        assert_eq!(state.record_engagement(0), FlowDecision::NextEngagement);
        assert_eq!(state.record_engagement(1), FlowDecision::NextEngagement);
        // 1-1: the third engagement decides the round
        assert!(matches!(
            state.record_engagement(1),
            FlowDecision::OpenDraft { order: [0, 1] }
        ));
        assert_eq!(state.engagements_played, 3);
    }

    #[test]
    fn test_all_rounds_are_played_and_the_score_decides() {
        let mut state = MatchState::new(1, 3);
        // best-of-1 rounds: every engagement concludes a round
        assert!(matches!(
            state.record_engagement(0),
            FlowDecision::OpenDraft { .. }
        ));
        assert!(matches!(
            state.record_engagement(1),
            FlowDecision::OpenDraft { .. }
        ));
        assert_eq!(
            state.record_engagement(0),
            FlowDecision::SeriesOver { winner: 0 }
        );
        assert_eq!(state.series_score, [2, 1]);
        assert_eq!(state.series_winner, Some(0));
        assert_eq!(state.round_index, 3);
    }

    #[test]
    fn test_loser_drafts_first() {
        let mut state = MatchState::new(1, 5);
        let FlowDecision::OpenDraft { order } = state.record_engagement(1) else {
            panic!("expected a draft");
        };
        assert_eq!(order, [0, 1]);
    }

    #[test]
    fn test_simultaneous_death_tiebreaks() {
        let mut a = Combatant::new(0, Vec2::ZERO);
        let mut b = Combatant::new(1, Vec2::ZERO);

        // Less-negative health wins
        a.health = -5.0;
        b.health = -20.0;
        assert_eq!(decide_winner(&a, &b), 0);

        // Equal overkill: more damage dealt wins
        a.health = -10.0;
        b.health = -10.0;
        a.damage_dealt = 40.0;
        b.damage_dealt = 90.0;
        assert_eq!(decide_winner(&a, &b), 1);
    }

    #[test]
    fn test_timeout_goes_to_the_healthier_side() {
        let mut a = Combatant::new(0, Vec2::ZERO);
        let mut b = Combatant::new(1, Vec2::ZERO);
        a.health = 60.0;
        b.health = 75.0;
        assert_eq!(decide_winner(&a, &b), 1);
    }

    #[test]
    fn test_decide_winner_is_side_order_independent() {
        let mut a = Combatant::new(0, Vec2::ZERO);
        let mut b = Combatant::new(1, Vec2::ZERO);
        a.health = 10.0;
        b.health = 0.0;
        assert_eq!(decide_winner(&a, &b), decide_winner(&b, &a));
    }
}
