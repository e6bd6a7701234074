use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::bracket::{Bracket, Slot, SlotSide};
use crate::error::{Error, Result};
use crate::results::ResultSubmission;
use crate::seeding::{self, Seeding};
use crate::standings::{self, Placement, Standing};
use crate::topology::Topology;
use crate::types::{EventConfig, Team, TeamId, TeamStatus};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EventPhase {
    Registration,
    Closed,
}

impl EventPhase {
    fn label(self) -> &'static str {
        match self {
            EventPhase::Registration => "registration open",
            EventPhase::Closed => "registration closed",
        }
    }
}

// ── Snapshot types ─────────────────────────────────────────────────────

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedEntry {
    pub seed: u32,
    pub team: Team,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotView {
    pub source: Slot,
    pub seed: Option<u32>,
    pub team_id: Option<TeamId>,
    pub members: Option<String>,
    pub score: Option<u32>,
    pub disqualified: bool,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchView {
    pub number: u32,
    pub round: u32,
    pub slots: Vec<SlotView>,
    pub victor_seed: Option<u32>,
    pub victor_team_id: Option<TeamId>,
    /// Whether an administrator may enter or edit this result right now.
    pub editable: bool,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingView {
    pub placement: Placement,
    pub seed: u32,
    pub team_id: Option<TeamId>,
    pub members: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSnapshot {
    pub name: String,
    pub phase: EventPhase,
    pub topology: Topology,
    pub seeds: Vec<SeedEntry>,
    pub waitlist: Vec<Team>,
    pub rank_order: Vec<u32>,
    pub byes: Vec<u32>,
    pub matches: Vec<MatchView>,
    pub standings: Vec<StandingView>,
}

// ── Event ──────────────────────────────────────────────────────────────

/// One tournament: roster snapshot, seeding and, once registration closes,
/// the bracket.
pub struct Event {
    config: EventConfig,
    phase: EventPhase,
    roster: Vec<Team>,
    seeding: Seeding,
    bracket: Option<Bracket>,
}

impl Event {
    pub fn new(config: EventConfig) -> Self {
        Event {
            config,
            phase: EventPhase::Registration,
            roster: Vec::new(),
            seeding: Seeding::default(),
            bracket: None,
        }
    }

    pub fn config(&self) -> &EventConfig {
        &self.config
    }

    pub fn phase(&self) -> EventPhase {
        self.phase
    }

    pub fn roster(&self) -> &[Team] {
        &self.roster
    }

    pub fn seeding(&self) -> &Seeding {
        &self.seeding
    }

    pub fn bracket(&self) -> Option<&Bracket> {
        self.bracket.as_ref()
    }

    pub fn team_status(&self, team_id: TeamId) -> TeamStatus {
        self.seeding.status_of(team_id)
    }

    /// Replaces the roster snapshot while registration is open. The seeding
    /// is recomputed as a preview.
    pub fn set_roster(&mut self, roster: Vec<Team>) -> Result<()> {
        self.expect_phase(EventPhase::Registration)?;
        self.seeding = Seeding::from_roster(&roster, self.config.max_teams);
        self.roster = roster;
        Ok(())
    }

    /// Applies a change in a team's member count while registration is open.
    /// Reaching the minimum team size stamps the qualification time; falling
    /// below it clears the stamp and the team loses its place in line.
    pub fn update_membership(&mut self, team_id: TeamId, member_count: u32, now: DateTime<Utc>) -> Result<()> {
        self.expect_phase(EventPhase::Registration)?;
        if member_count > self.config.max_team_size {
            return Err(Error::Validation(format!(
                "team {team_id} would have {member_count} members, the limit is {}",
                self.config.max_team_size
            )));
        }
        let min_team_size = self.config.min_team_size;
        let team = self
            .roster
            .iter_mut()
            .find(|team| team.id == team_id)
            .ok_or_else(|| Error::Validation(format!("team {team_id} is not on the roster")))?;
        seeding::refresh_qualification(team, member_count, min_team_size, now);
        self.seeding = Seeding::from_roster(&self.roster, self.config.max_teams);
        Ok(())
    }

    /// Freezes the roster and lays out the bracket. With no qualifying teams
    /// the event closes without a bracket.
    pub fn close_registration(&mut self) -> Result<()> {
        self.expect_phase(EventPhase::Registration)?;
        self.seeding = Seeding::from_roster(&self.roster, self.config.max_teams);
        self.bracket = self.build_bracket()?;
        self.phase = EventPhase::Closed;
        info!(
            event = %self.config.name,
            teams = self.seeding.team_count(),
            waitlisted = self.seeding.waitlist.len(),
            "registration closed"
        );
        Ok(())
    }

    /// Moves a closed event back to registration. Refused once any result
    /// has been entered.
    pub fn reopen_registration(&mut self) -> Result<()> {
        self.expect_phase(EventPhase::Closed)?;
        if self.bracket.as_ref().is_some_and(|bracket| bracket.has_results()) {
            return Err(Error::InvalidState {
                expected: "no recorded results",
                actual: "results already entered".to_string(),
            });
        }
        self.bracket = None;
        self.phase = EventPhase::Registration;
        info!(event = %self.config.name, "registration reopened");
        Ok(())
    }

    /// Re-reads ratings from a fresh roster snapshot. Once any result exists
    /// the seeding is locked.
    pub fn update_seeding(&mut self, roster: Vec<Team>) -> Result<()> {
        if self.phase == EventPhase::Registration {
            return self.set_roster(roster);
        }
        if self.bracket.as_ref().is_some_and(|bracket| bracket.has_results()) {
            return Err(Error::InvalidState {
                expected: "no recorded results",
                actual: "results already entered".to_string(),
            });
        }
        self.seeding = Seeding::from_roster(&roster, self.config.max_teams);
        self.roster = roster;
        self.bracket = self.build_bracket()?;
        info!(event = %self.config.name, teams = self.seeding.team_count(), "seeding updated");
        Ok(())
    }

    /// Drops every recorded result and lays the bracket out again from the
    /// current seeding.
    pub fn reset(&mut self) -> Result<()> {
        self.expect_phase(EventPhase::Closed)?;
        self.bracket = self.build_bracket()?;
        info!(event = %self.config.name, "bracket reset");
        Ok(())
    }

    pub fn record_result(&mut self, submission: &ResultSubmission) -> Result<u32> {
        self.bracket_mut()?.record_result(submission)
    }

    pub fn clear_result(&mut self, match_number: u32) -> Result<()> {
        self.bracket_mut()?.clear_result(match_number)
    }

    pub fn standings(&self) -> Vec<Standing> {
        standings::compute_for(self.bracket.as_ref())
    }

    pub fn snapshot(&self) -> EventSnapshot {
        let seeds = self
            .seeding
            .seeds
            .iter()
            .cloned()
            .enumerate()
            .map(|(index, team)| SeedEntry {
                seed: index as u32 + 1,
                team,
            })
            .collect::<Vec<_>>();

        let (topology, rank_order, byes, matches) = match self.bracket.as_ref() {
            Some(bracket) => (
                bracket.topology(),
                bracket.rank_order().to_vec(),
                bracket.byes(),
                self.match_views(bracket),
            ),
            None => (Topology::new(0), Vec::new(), Vec::new(), Vec::new()),
        };

        let standings = self
            .standings()
            .into_iter()
            .map(|standing| {
                let team = self.seeding.team_for_seed(standing.seed);
                StandingView {
                    placement: standing.placement,
                    seed: standing.seed,
                    team_id: team.map(|t| t.id),
                    members: team.map(|t| t.members.clone()),
                }
            })
            .collect();

        EventSnapshot {
            name: self.config.name.clone(),
            phase: self.phase,
            topology,
            seeds,
            waitlist: self.seeding.waitlist.clone(),
            rank_order,
            byes,
            matches,
            standings,
        }
    }

    fn match_views(&self, bracket: &Bracket) -> Vec<MatchView> {
        bracket
            .matches()
            .iter()
            .map(|m| {
                let slots = m
                    .slots
                    .iter()
                    .enumerate()
                    .map(|(index, slot)| {
                        let seed = bracket.resolve_slot(*slot);
                        let team = seed.and_then(|s| self.seeding.team_for_seed(s));
                        SlotView {
                            source: *slot,
                            seed,
                            team_id: team.map(|t| t.id),
                            members: team.map(|t| t.members.clone()),
                            score: m.scores[index],
                            disqualified: m.disqualified.is_some() && m.disqualified == SlotSide::from_index(index),
                        }
                    })
                    .collect();
                MatchView {
                    number: m.number,
                    round: m.round,
                    slots,
                    victor_seed: m.victor,
                    victor_team_id: m
                        .victor
                        .and_then(|seed| self.seeding.team_for_seed(seed))
                        .map(|t| t.id),
                    editable: bracket.is_editable(m.number),
                }
            })
            .collect()
    }

    fn build_bracket(&self) -> Result<Option<Bracket>> {
        if self.seeding.is_empty() {
            warn!(event = %self.config.name, "no qualifying teams, event has no bracket");
            return Ok(None);
        }
        Bracket::build(self.seeding.team_count()).map(Some)
    }

    fn bracket_mut(&mut self) -> Result<&mut Bracket> {
        self.expect_phase(EventPhase::Closed)?;
        self.bracket
            .as_mut()
            .ok_or_else(|| Error::Configuration("event has no contestants, so there is no bracket".to_string()))
    }

    fn expect_phase(&self, expected: EventPhase) -> Result<()> {
        if self.phase != expected {
            return Err(Error::InvalidState {
                expected: expected.label(),
                actual: self.phase.label().to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn at(minute: i64) -> Option<DateTime<Utc>> {
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 18, 0, 0).single()?;
        Some(base + Duration::minutes(minute))
    }

    fn scenario_roster() -> Vec<Team> {
        vec![
            Team::new(1, "alpha, bravo", 1600, at(2)),
            Team::new(2, "charlie, delta", 1500, at(4)),
            Team::new(3, "echo, foxtrot", 1400, at(1)),
            Team::new(4, "golf, hotel", 1700, at(5)),
            Team::new(5, "india, juliet", 1300, at(3)),
        ]
    }

    fn closed_event(max_teams: u32, roster: Vec<Team>) -> Event {
        let mut event = Event::new(EventConfig {
            max_teams,
            ..EventConfig::default()
        });
        event.set_roster(roster).unwrap();
        event.close_registration().unwrap();
        event
    }

    #[test]
    fn end_to_end_five_teams_capacity_four() {
        let mut event = closed_event(4, scenario_roster());

        let seed_ids = event.seeding().seeds.iter().map(|t| t.id).collect::<Vec<_>>();
        assert_eq!(seed_ids, vec![1, 2, 3, 5]);
        assert_eq!(event.seeding().waitlist.iter().map(|t| t.id).collect::<Vec<_>>(), vec![4]);
        assert_eq!(event.team_status(4), TeamStatus::Waitlisted { position: 1 });

        let bracket = event.bracket().unwrap();
        assert_eq!(bracket.matches().len(), 3);
        assert_eq!(bracket.participants(3), Some([1, 4]));
        assert!(bracket.byes().is_empty());

        assert_eq!(event.record_result(&ResultSubmission::new(3, 10, 2)).unwrap(), 1);
        let err = event.record_result(&ResultSubmission::new(1, 4, 2)).unwrap_err();
        assert!(matches!(err, Error::Precondition { match_number: 1, antecedent: 2 }));

        assert_eq!(event.record_result(&ResultSubmission::new(2, 1, 3)).unwrap(), 3);
        assert_eq!(event.record_result(&ResultSubmission::new(1, 4, 2)).unwrap(), 1);

        let snapshot = event.snapshot();
        let standings = snapshot
            .standings
            .iter()
            .map(|s| (s.placement, s.team_id))
            .collect::<Vec<_>>();
        assert_eq!(
            standings,
            vec![
                (Placement::Place(1), Some(1)),
                (Placement::Place(2), Some(3)),
                (Placement::Place(3), Some(2)),
                (Placement::Place(4), Some(5)),
            ]
        );
    }

    #[test]
    fn snapshot_resolves_slots_to_teams() {
        let mut event = closed_event(8, scenario_roster());
        event.record_result(&ResultSubmission::new(4, 2, 2)).unwrap();

        let snapshot = event.snapshot();
        assert_eq!(snapshot.topology.teams, 5);
        assert_eq!(snapshot.byes, vec![1, 2, 3]);

        let match3 = &snapshot.matches[2];
        assert_eq!(match3.slots[0].team_id, Some(4));
        // Seed 5 advanced over seed 4 on the tie.
        assert_eq!(match3.slots[1].seed, Some(5));
        assert_eq!(match3.slots[1].team_id, Some(5));
        assert!(match3.editable);

        let final_match = &snapshot.matches[0];
        assert_eq!(final_match.slots[0].seed, None);
        assert!(!final_match.editable);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["matches"][2]["slots"][1]["source"]["kind"], "pendingOn");
        assert_eq!(json["phase"], "closed");
    }

    #[test]
    fn no_qualifying_teams_closes_without_bracket() {
        let mut roster = scenario_roster();
        for team in roster.iter_mut() {
            team.qualifies = false;
        }
        let mut event = closed_event(4, roster);
        assert!(event.bracket().is_none());
        assert!(event.standings().is_empty());
        assert!(event.snapshot().matches.is_empty());
        assert!(matches!(
            event.record_result(&ResultSubmission::new(1, 1, 0)),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn single_team_event_has_a_winner() {
        let event = closed_event(4, vec![Team::new(9, "solo", 1000, at(0))]);
        let standings = event.standings();
        assert_eq!(standings.len(), 1);
        assert_eq!(standings[0].placement, Placement::Place(1));
        assert_eq!(event.snapshot().standings[0].team_id, Some(9));
    }

    #[test]
    fn results_require_closed_registration() {
        let mut event = Event::new(EventConfig::default());
        event.set_roster(scenario_roster()).unwrap();
        assert!(matches!(
            event.record_result(&ResultSubmission::new(1, 1, 0)),
            Err(Error::InvalidState { .. })
        ));
        event.close_registration().unwrap();
        assert!(matches!(event.set_roster(Vec::new()), Err(Error::InvalidState { .. })));
        assert!(matches!(event.close_registration(), Err(Error::InvalidState { .. })));
    }

    #[test]
    fn membership_changes_move_teams_in_and_out_of_line() {
        let mut event = Event::new(EventConfig {
            max_teams: 2,
            ..EventConfig::default()
        });
        event
            .set_roster(vec![
                Team::new(1, "alpha, bravo", 1500, at(1)),
                Team::new(2, "charlie", 1600, None),
                Team::new(3, "delta, echo", 1400, at(2)),
            ])
            .unwrap();
        assert_eq!(event.team_status(2), TeamStatus::Insufficient);

        // Team 2 fills up after both others, so it waits behind them.
        event.update_membership(2, 2, at(10).unwrap()).unwrap();
        assert_eq!(event.team_status(2), TeamStatus::Waitlisted { position: 1 });

        // Team 1 drops below the minimum and loses its spot.
        event.update_membership(1, 1, at(11).unwrap()).unwrap();
        assert_eq!(event.team_status(1), TeamStatus::Insufficient);
        assert_eq!(event.team_status(2), TeamStatus::Qualified { seed: 1 });
        assert_eq!(event.team_status(3), TeamStatus::Qualified { seed: 2 });

        assert!(matches!(event.update_membership(3, 5, at(12).unwrap()), Err(Error::Validation(_))));
        assert!(matches!(event.update_membership(7, 2, at(12).unwrap()), Err(Error::Validation(_))));

        event.close_registration().unwrap();
        assert!(matches!(
            event.update_membership(1, 2, at(13).unwrap()),
            Err(Error::InvalidState { .. })
        ));
    }

    #[test]
    fn reopening_registration_drops_the_bracket() {
        let mut event = closed_event(4, scenario_roster());
        event.reopen_registration().unwrap();
        assert_eq!(event.phase(), EventPhase::Registration);
        assert!(event.bracket().is_none());
        assert!(matches!(event.reopen_registration(), Err(Error::InvalidState { .. })));

        // The roster can change again before closing a second time.
        let mut roster = scenario_roster();
        roster.push(Team::new(6, "kilo, lima", 1800, at(6)));
        event.set_roster(roster).unwrap();
        event.close_registration().unwrap();
        assert_eq!(event.bracket().unwrap().team_count(), 4);
        assert_eq!(event.seeding().waitlist.iter().map(|t| t.id).collect::<Vec<_>>(), vec![4, 6]);
    }

    #[test]
    fn reopening_is_refused_once_results_exist() {
        let mut event = closed_event(4, scenario_roster());
        event.record_result(&ResultSubmission::new(3, 10, 2)).unwrap();
        assert!(matches!(event.reopen_registration(), Err(Error::InvalidState { .. })));
        assert_eq!(event.phase(), EventPhase::Closed);
        assert!(event.bracket().unwrap().has_results());
    }

    #[test]
    fn reset_lays_out_a_fresh_bracket() {
        let mut event = closed_event(8, scenario_roster());
        event.record_result(&ResultSubmission::new(4, 3, 0)).unwrap();
        event.record_result(&ResultSubmission::new(3, 0, 3)).unwrap();
        event.reset().unwrap();
        assert_eq!(event.bracket(), Some(&Bracket::build(5).unwrap()));
        assert!(matches!(
            Event::new(EventConfig::default()).reset(),
            Err(Error::InvalidState { .. })
        ));
    }

    #[test]
    fn seeding_locks_once_results_exist() {
        let mut event = closed_event(8, scenario_roster());
        let mut refreshed = scenario_roster();
        refreshed[2].rating = 2000;
        event.update_seeding(refreshed.clone()).unwrap();
        assert_eq!(event.seeding().seed_of(3), Some(1));

        event.record_result(&ResultSubmission::new(4, 1, 0)).unwrap();
        assert!(matches!(event.update_seeding(refreshed), Err(Error::InvalidState { .. })));

        event.reset().unwrap();
        assert!(!event.bracket().unwrap().has_results());
        event.update_seeding(scenario_roster()).unwrap();
        assert_eq!(event.seeding().seed_of(4), Some(1));
    }
}
