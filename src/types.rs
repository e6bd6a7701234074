use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

use crate::event::Event;

// ── Constants ──────────────────────────────────────────────────────────

pub const DEFAULT_MAX_TEAMS: u32 = 32;
pub const DEFAULT_MIN_TEAM_SIZE: u32 = 2;
pub const DEFAULT_MAX_TEAM_SIZE: u32 = 4;

// ── Shared state type aliases ──────────────────────────────────────────

pub type SharedEvent = Arc<Mutex<Event>>;

pub type TeamId = u32;

// ── Roster types ───────────────────────────────────────────────────────

/// Snapshot of a registered team as handed over by the registration side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: TeamId,
    /// Member callsigns, already joined for display.
    pub members: String,
    pub rating: i32,
    /// When the team last reached the minimum roster size.
    #[serde(default)]
    pub qualified_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub qualifies: bool,
}

impl Team {
    pub fn new(id: TeamId, members: &str, rating: i32, qualified_at: Option<DateTime<Utc>>) -> Self {
        Team {
            id,
            members: members.to_string(),
            rating,
            qualified_at,
            qualifies: qualified_at.is_some(),
        }
    }

    pub fn is_qualifying(&self) -> bool {
        self.qualifies && self.qualified_at.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum TeamStatus {
    Qualified { seed: u32 },
    Waitlisted { position: u32 },
    Insufficient,
}

// ── Event config ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventConfig {
    pub name: String,
    pub max_teams: u32,
    pub min_team_size: u32,
    pub max_team_size: u32,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            name: "Funmatch".to_string(),
            max_teams: DEFAULT_MAX_TEAMS,
            min_team_size: DEFAULT_MIN_TEAM_SIZE,
            max_team_size: DEFAULT_MAX_TEAM_SIZE,
        }
    }
}
