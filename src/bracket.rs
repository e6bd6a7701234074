use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::topology::{feeder_numbers, Topology};

/// Where a match participant comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "value")]
pub enum Slot {
  /// A seed placed directly into the match.
  Literal(u32),
  /// The victor of another match.
  PendingOn(u32),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotSide {
  A,
  B,
}

impl SlotSide {
  pub fn index(self) -> usize {
    match self {
      SlotSide::A => 0,
      SlotSide::B => 1,
    }
  }

  pub fn other(self) -> SlotSide {
    match self {
      SlotSide::A => SlotSide::B,
      SlotSide::B => SlotSide::A,
    }
  }

  pub fn from_index(index: usize) -> Option<SlotSide> {
    match index {
      0 => Some(SlotSide::A),
      1 => Some(SlotSide::B),
      _ => None,
    }
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
  pub number: u32,
  pub round: u32,
  pub slots: [Slot; 2],
  pub scores: [Option<u32>; 2],
  pub disqualified: Option<SlotSide>,
  /// Seed number of the winner once a result is recorded.
  pub victor: Option<u32>,
}

impl Match {
  fn new(number: u32, round: u32, slots: [Slot; 2]) -> Self {
    Match {
      number,
      round,
      slots,
      scores: [None, None],
      disqualified: None,
      victor: None,
    }
  }

  pub fn is_resolved(&self) -> bool {
    self.victor.is_some()
  }

  pub(crate) fn reset(&mut self) {
    self.scores = [None, None];
    self.disqualified = None;
    self.victor = None;
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bracket {
  pub(crate) topology: Topology,
  /// `matches[0]` is match 1.
  pub(crate) matches: Vec<Match>,
  pub(crate) rank_order: Vec<u32>,
}

impl Bracket {
  /// Lays out a bracket for `teams` seeds. Zero teams is a configuration error.
  pub fn build(teams: u32) -> Result<Self> {
    if teams == 0 {
      return Err(Error::Configuration("no qualifying teams, nothing to seed".to_string()));
    }
    let topology = Topology::new(teams);
    let matches = (1..=topology.matches)
      .map(|number| Match::new(number, topology.round(number), assign_slots(number, &topology)))
      .collect::<Vec<_>>();
    tracing::debug!(teams, rounds = topology.rounds, matches = topology.matches, "bracket laid out");
    Ok(Bracket {
      topology,
      matches,
      rank_order: rank_order(topology.rounds),
    })
  }

  pub fn topology(&self) -> Topology {
    self.topology
  }

  pub fn team_count(&self) -> u32 {
    self.topology.teams
  }

  pub fn matches(&self) -> &[Match] {
    &self.matches
  }

  pub fn get(&self, match_number: u32) -> Option<&Match> {
    let index = (match_number as usize).checked_sub(1)?;
    self.matches.get(index)
  }

  pub(crate) fn get_mut(&mut self, match_number: u32) -> Option<&mut Match> {
    let index = (match_number as usize).checked_sub(1)?;
    self.matches.get_mut(index)
  }

  /// Left-to-right bracket position of every seed, padded to a power of two.
  /// Entries above the team count are empty positions.
  pub fn rank_order(&self) -> &[u32] {
    &self.rank_order
  }

  /// Seeds that skip the opening round.
  pub fn byes(&self) -> Vec<u32> {
    let mut seeds = self
      .matches
      .iter()
      .filter(|m| m.round < self.topology.rounds)
      .flat_map(|m| m.slots)
      .filter_map(|slot| match slot {
        Slot::Literal(seed) => Some(seed),
        Slot::PendingOn(_) => None,
      })
      .collect::<Vec<_>>();
    seeds.sort_unstable();
    seeds
  }
}

fn assign_slots(match_number: u32, topology: &Topology) -> [Slot; 2] {
  let total = topology.matches as u64;
  if match_number == 1 {
    return match total {
      1 => [Slot::Literal(1), Slot::Literal(2)],
      2 => [Slot::Literal(1), Slot::PendingOn(2)],
      _ => [Slot::PendingOn(3), Slot::PendingOn(2)],
    };
  }
  let m = match_number as u64;
  let span = 1u64 << topology.round(match_number);
  let (feeder_a, feeder_b) = feeder_numbers(match_number);
  let slot_a = if feeder_a > total {
    Slot::Literal((span - m) as u32)
  } else {
    Slot::PendingOn(feeder_a as u32)
  };
  let slot_b = if feeder_b > total {
    Slot::Literal(match_number + 1)
  } else {
    Slot::PendingOn(feeder_b as u32)
  };
  [slot_a, slot_b]
}

/// Standard seeding permutation for a `2^rounds` bracket.
///
/// Grown one doubling at a time: each new seed `rank` is paired with
/// `2^round - rank + 1`, inserted alternately after and before it.
pub fn rank_order(rounds: u32) -> Vec<u32> {
  let mut order = vec![1u32];
  for round in 1..=rounds {
    let size = 1u32 << round;
    let half = size / 2;
    let mut insert_after = true;
    for rank in (half + 1..=size).rev() {
      let target = size - rank + 1;
      let position = order.iter().position(|seed| *seed == target).unwrap_or(order.len());
      let at = if insert_after { position + 1 } else { position };
      order.insert(at.min(order.len()), rank);
      insert_after = !insert_after;
    }
  }
  order
}
