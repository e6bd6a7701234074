use serde::Serialize;

use crate::bracket::Bracket;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "value")]
pub enum Placement {
  Place(u32),
  /// Disqualified, listed below every ranked team.
  Dnf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
  pub placement: Placement,
  pub seed: u32,
}

/// Standings for an event that may not have a bracket at all.
pub fn compute_for(bracket: Option<&Bracket>) -> Vec<Standing> {
  bracket.map(compute).unwrap_or_default()
}

/// Champion first, then losers grouped by the round they went out in (the
/// final's loser first), best seed first within a round, then DNF entries
/// from the latest round back to the opening one.
pub fn compute(bracket: &Bracket) -> Vec<Standing> {
  let rounds = bracket.topology().rounds as usize;
  let mut buckets: Vec<Vec<u32>> = vec![Vec::new(); rounds + 1];
  let mut dq_per_round = vec![0u32; rounds + 1];
  let mut disqualified: Vec<(u32, u32)> = Vec::new();

  for m in bracket.matches() {
    let Some(victor) = m.victor else {
      continue;
    };
    let Some([a, b]) = bracket.participants(m.number) else {
      continue;
    };
    let loser = if a == victor { b } else { a };
    let round = m.round as usize;
    if m.disqualified.is_some() {
      disqualified.push((m.number, loser));
      dq_per_round[round] += 1;
    } else {
      buckets[round].push(loser);
    }
  }

  let mut standings = Vec::new();
  if let Some(champion) = bracket.champion() {
    standings.push(Standing {
      placement: Placement::Place(1),
      seed: champion,
    });
  }

  // Teams above round r: the champion plus one loser per match of rounds < r,
  // minus the ones that went out disqualified.
  let mut dq_above = 0u32;
  for round in 1..=rounds {
    let bucket = &mut buckets[round];
    bucket.sort_unstable();
    let first = (1u32 << (round - 1)) + 1 - dq_above;
    for (offset, seed) in bucket.iter().enumerate() {
      standings.push(Standing {
        placement: Placement::Place(first + offset as u32),
        seed: *seed,
      });
    }
    dq_above += dq_per_round[round];
  }

  disqualified.sort_by_key(|(number, _)| *number);
  standings.extend(disqualified.into_iter().map(|(_, seed)| Standing {
    placement: Placement::Dnf,
    seed,
  }));
  standings
}
