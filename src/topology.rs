use serde::Serialize;

// Match 1 is the final, 2..=3 feed it, 4..=7 feed those. Round 1 is the final
// and round `rounds` is the opening round.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Topology {
  pub teams: u32,
  pub rounds: u32,
  pub matches: u32,
}

impl Topology {
  pub fn new(teams: u32) -> Self {
    Topology {
      teams,
      rounds: round_count(teams),
      matches: match_count(teams),
    }
  }

  pub fn contains(&self, match_number: u32) -> bool {
    match_number >= 1 && match_number <= self.matches
  }

  pub fn round(&self, match_number: u32) -> u32 {
    round_of(match_number)
  }

  pub fn parent(&self, match_number: u32) -> u32 {
    parent_of(match_number)
  }

  /// Earlier matches whose victors fill a slot of `match_number`, in slot order.
  pub fn children(&self, match_number: u32) -> Vec<u32> {
    if !self.contains(match_number) {
      return Vec::new();
    }
    if match_number == 1 {
      return match self.matches {
        0 | 1 => Vec::new(),
        2 => vec![2],
        _ => vec![3, 2],
      };
    }
    let (a, b) = feeder_numbers(match_number);
    [a, b]
      .into_iter()
      .filter(|candidate| *candidate <= self.matches as u64)
      .map(|candidate| candidate as u32)
      .collect()
  }
}

/// `ceil(log2(n))`, with 0 for `n <= 1`.
pub fn ceil_log2(n: u64) -> u32 {
  if n <= 1 {
    0
  } else {
    u64::BITS - (n - 1).leading_zeros()
  }
}

pub fn round_count(teams: u32) -> u32 {
  ceil_log2(teams as u64)
}

pub fn match_count(teams: u32) -> u32 {
  teams.saturating_sub(1)
}

/// Round of a match number; the final is round 1.
pub fn round_of(match_number: u32) -> u32 {
  ceil_log2(match_number as u64 + 1)
}

/// The later-round match fed by the victor of `match_number`, or 0 for the final.
pub fn parent_of(match_number: u32) -> u32 {
  if match_number <= 1 {
    return 0;
  }
  let m = match_number as u64;
  let r = round_of(match_number);
  let span = 1u64 << r;
  let base = 1u64 << (r - 1);
  let parent = if span - m > (span - base) / 2 {
    base - 1 - (m - base)
  } else {
    base - 1 - (span - 1 - m)
  };
  parent as u32
}

/// Candidate antecedents of a non-final match before bounding by the match count.
pub(crate) fn feeder_numbers(match_number: u32) -> (u64, u64) {
  let m = match_number as u64;
  let r = round_of(match_number);
  ((1u64 << r) + m, (1u64 << (r + 1)) - m - 1)
}
