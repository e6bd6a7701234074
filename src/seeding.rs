use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;

use crate::types::{Team, TeamId, TeamStatus};

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterSplit {
  /// Qualifying teams inside capacity, in qualification order.
  pub included: Vec<Team>,
  /// Qualifying teams over capacity, first-qualified first.
  pub waitlisted: Vec<Team>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Seeding {
  /// `seeds[0]` is seed 1.
  pub seeds: Vec<Team>,
  pub waitlist: Vec<Team>,
}

impl Seeding {
  pub fn from_roster(roster: &[Team], capacity: u32) -> Self {
    let split = split(roster, capacity);
    Seeding {
      seeds: seed_order(&split.included),
      waitlist: split.waitlisted,
    }
  }

  pub fn team_count(&self) -> u32 {
    self.seeds.len() as u32
  }

  pub fn is_empty(&self) -> bool {
    self.seeds.is_empty()
  }

  pub fn team_for_seed(&self, seed: u32) -> Option<&Team> {
    let index = (seed as usize).checked_sub(1)?;
    self.seeds.get(index)
  }

  pub fn seed_of(&self, team_id: TeamId) -> Option<u32> {
    self
      .seeds
      .iter()
      .position(|team| team.id == team_id)
      .map(|index| index as u32 + 1)
  }

  pub fn status_of(&self, team_id: TeamId) -> TeamStatus {
    if let Some(seed) = self.seed_of(team_id) {
      return TeamStatus::Qualified { seed };
    }
    match self.waitlist.iter().position(|team| team.id == team_id) {
      Some(index) => TeamStatus::Waitlisted { position: index as u32 + 1 },
      None => TeamStatus::Insufficient,
    }
  }
}

/// Splits qualifying teams into the first `capacity` to qualify and the waitlist.
pub fn split(roster: &[Team], capacity: u32) -> RosterSplit {
  let mut qualifying = roster
    .iter()
    .filter(|team| team.is_qualifying())
    .cloned()
    .collect::<Vec<_>>();
  qualifying.sort_by(arrival_order);

  let capacity = capacity as usize;
  let waitlisted = if qualifying.len() > capacity {
    qualifying.split_off(capacity)
  } else {
    Vec::new()
  };
  RosterSplit {
    included: qualifying,
    waitlisted,
  }
}

/// Competitive order of the included teams: best rating first.
pub fn seed_order(included: &[Team]) -> Vec<Team> {
  let mut seeds = included.to_vec();
  seeds.sort_by(|a, b| {
    b.rating
      .cmp(&a.rating)
      .then_with(|| compare_qualified_at(a.qualified_at, b.qualified_at))
      .then_with(|| a.id.cmp(&b.id))
  });
  seeds
}

fn arrival_order(a: &Team, b: &Team) -> Ordering {
  compare_qualified_at(a.qualified_at, b.qualified_at)
    .then_with(|| b.rating.cmp(&a.rating))
    .then_with(|| a.id.cmp(&b.id))
}

fn compare_qualified_at(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
  match (a, b) {
    (Some(a), Some(b)) => a.cmp(&b),
    (Some(_), None) => Ordering::Less,
    (None, Some(_)) => Ordering::Greater,
    (None, None) => Ordering::Equal,
  }
}

/// Floor of the mean member rating; `None` when nobody on the team is rated.
pub fn average_rating(ratings: &[i32]) -> Option<i32> {
  if ratings.is_empty() {
    return None;
  }
  let sum = ratings.iter().map(|rating| *rating as i64).sum::<i64>();
  Some(sum.div_euclid(ratings.len() as i64) as i32)
}

/// Keeps `qualified_at` in step with the roster size.
///
/// The timestamp is stamped when the team reaches `min_team_size`, kept while
/// it stays there, and cleared as soon as it drops below.
pub fn refresh_qualification(team: &mut Team, member_count: u32, min_team_size: u32, now: DateTime<Utc>) {
  if member_count >= min_team_size {
    if team.qualified_at.is_none() {
      team.qualified_at = Some(now);
    }
    team.qualifies = true;
  } else {
    team.qualified_at = None;
    team.qualifies = false;
  }
}
