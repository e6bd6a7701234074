use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::bracket::{Bracket, Slot, SlotSide};
use crate::error::{Error, Result};

/// A result as entered by an administrator. Scores stay raw until validated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSubmission {
  pub match_number: u32,
  pub score_a: Option<i64>,
  pub score_b: Option<i64>,
  #[serde(default)]
  pub disqualified: Option<SlotSide>,
}

impl ResultSubmission {
  pub fn new(match_number: u32, score_a: i64, score_b: i64) -> Self {
    ResultSubmission {
      match_number,
      score_a: Some(score_a),
      score_b: Some(score_b),
      disqualified: None,
    }
  }

  pub fn disqualify(mut self, side: SlotSide) -> Self {
    self.disqualified = Some(side);
    self
  }
}

impl Bracket {
  /// Seed currently occupying `slot`, if it is known yet.
  pub fn resolve_slot(&self, slot: Slot) -> Option<u32> {
    match slot {
      Slot::Literal(seed) => Some(seed),
      Slot::PendingOn(source) => self.get(source)?.victor,
    }
  }

  /// Both seeds of a match once its antecedents are decided.
  pub fn participants(&self, match_number: u32) -> Option<[u32; 2]> {
    let m = self.get(match_number)?;
    Some([self.resolve_slot(m.slots[0])?, self.resolve_slot(m.slots[1])?])
  }

  /// Whether a result may be entered or edited for this match right now.
  pub fn is_editable(&self, match_number: u32) -> bool {
    self.participants(match_number).is_some() && self.ensure_parent_open(match_number).is_ok()
  }

  pub fn editable_matches(&self) -> Vec<u32> {
    (1..=self.topology.matches)
      .filter(|number| self.is_editable(*number))
      .collect()
  }

  pub fn champion(&self) -> Option<u32> {
    if self.topology.teams == 1 {
      return Some(1);
    }
    self.get(1)?.victor
  }

  pub fn has_results(&self) -> bool {
    self.matches.iter().any(|m| m.is_resolved())
  }

  /// Stores a result and returns the seed that advances.
  pub fn record_result(&mut self, submission: &ResultSubmission) -> Result<u32> {
    let number = submission.match_number;
    if !self.topology.contains(number) {
      return Err(Error::Validation(format!("match {number} does not exist in this bracket")));
    }
    let score_a = validate_score("first", submission.score_a)?;
    let score_b = validate_score("second", submission.score_b)?;
    self.ensure_parent_open(number)?;

    let Some(seeds) = self.participants(number) else {
      let antecedent = self.matches[number as usize - 1]
        .slots
        .iter()
        .find_map(|slot| match slot {
          Slot::PendingOn(source) if self.resolve_slot(*slot).is_none() => Some(*source),
          _ => None,
        })
        .unwrap_or(number);
      return Err(Error::Precondition {
        match_number: number,
        antecedent,
      });
    };

    let winner = decide_victor(seeds, [score_a, score_b], submission.disqualified);
    let victor = seeds[winner.index()];
    let m = self
      .get_mut(number)
      .ok_or_else(|| Error::Validation(format!("match {number} does not exist in this bracket")))?;
    m.scores = [Some(score_a), Some(score_b)];
    m.disqualified = submission.disqualified;
    m.victor = Some(victor);
    info!(
      match_number = number,
      score_a,
      score_b,
      disqualified = ?submission.disqualified,
      victor,
      "match result recorded"
    );
    Ok(victor)
  }

  /// Removes a result, returning the match to unresolved.
  pub fn clear_result(&mut self, match_number: u32) -> Result<()> {
    if !self.topology.contains(match_number) {
      return Err(Error::Validation(format!("match {match_number} does not exist in this bracket")));
    }
    self.ensure_parent_open(match_number)?;
    if let Some(m) = self.get_mut(match_number) {
      if m.is_resolved() {
        info!(match_number, "match result cleared");
      }
      m.reset();
    }
    Ok(())
  }

  fn ensure_parent_open(&self, match_number: u32) -> Result<()> {
    let parent = self.topology.parent(match_number);
    if parent == 0 {
      return Ok(());
    }
    match self.get(parent) {
      Some(m) if m.is_resolved() => {
        warn!(match_number, parent, "result change rejected, later match already decided");
        Err(Error::Conflict { match_number, parent })
      }
      _ => Ok(()),
    }
  }
}

/// Which slot advances.
///
/// A disqualification decides the match outright. A tied score sends the
/// numerically larger (lower-ranked) seed through. Otherwise the higher
/// score wins.
pub fn decide_victor(seeds: [u32; 2], scores: [u32; 2], disqualified: Option<SlotSide>) -> SlotSide {
  if let Some(side) = disqualified {
    return side.other();
  }
  if scores[0] == scores[1] {
    return if seeds[0] > seeds[1] { SlotSide::A } else { SlotSide::B };
  }
  if scores[0] > scores[1] {
    SlotSide::A
  } else {
    SlotSide::B
  }
}

fn validate_score(label: &str, raw: Option<i64>) -> Result<u32> {
  let Some(value) = raw else {
    return Err(Error::Validation(format!(
      "the {label} team score is missing; use zeros if a team was disqualified before the match was played"
    )));
  };
  u32::try_from(value).map_err(|_| Error::Validation(format!("the {label} team score must be a non-negative number, got {value}")))
}
