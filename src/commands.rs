use crate::error::Result;
use crate::event::{Event, EventSnapshot};
use crate::results::ResultSubmission;
use crate::types::{EventConfig, SharedEvent, Team};
use std::sync::{Arc, Mutex};
use tracing::info;

/// An administrator the web layer has already authenticated. Holding one is
/// what allows a caller to reach the result and seeding commands.
#[derive(Debug, Clone)]
pub struct Admin {
    name: String,
}

impl Admin {
    pub fn new(name: &str) -> Self {
        Admin {
            name: name.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

// ── Helpers ─────────────────────────────────────────────────────────────

/// Lock the event for the whole read-modify-write so a match and its parent
/// can never be written from stale state.
fn with_event<F, R>(event: &SharedEvent, f: F) -> Result<R>
where
    F: FnOnce(&mut Event) -> Result<R>,
{
    let mut guard = event.lock().unwrap_or_else(|e| e.into_inner());
    f(&mut guard)
}

pub fn new_shared_event(config: EventConfig) -> SharedEvent {
    Arc::new(Mutex::new(Event::new(config)))
}

// ── Commands ────────────────────────────────────────────────────────────

pub fn event_snapshot(event: &SharedEvent) -> EventSnapshot {
    let guard = event.lock().unwrap_or_else(|e| e.into_inner());
    guard.snapshot()
}

/// Roster push from the registration side while sign-ups are open.
pub fn sync_roster(event: &SharedEvent, roster: Vec<Team>) -> Result<EventSnapshot> {
    with_event(event, |event| {
        event.set_roster(roster)?;
        Ok(event.snapshot())
    })
}

pub fn close_registration(event: &SharedEvent, admin: &Admin) -> Result<EventSnapshot> {
    with_event(event, |event| {
        event.close_registration()?;
        info!(admin = admin.name(), "registration closed by admin");
        Ok(event.snapshot())
    })
}

pub fn reopen_registration(event: &SharedEvent, admin: &Admin) -> Result<EventSnapshot> {
    with_event(event, |event| {
        event.reopen_registration()?;
        info!(admin = admin.name(), "registration reopened by admin");
        Ok(event.snapshot())
    })
}

pub fn update_seeding(event: &SharedEvent, admin: &Admin, roster: Vec<Team>) -> Result<EventSnapshot> {
    with_event(event, |event| {
        event.update_seeding(roster)?;
        info!(admin = admin.name(), "seeding refreshed by admin");
        Ok(event.snapshot())
    })
}

pub fn enter_result(event: &SharedEvent, admin: &Admin, submission: ResultSubmission) -> Result<EventSnapshot> {
    with_event(event, |event| {
        let victor = event.record_result(&submission)?;
        info!(
            admin = admin.name(),
            match_number = submission.match_number,
            victor,
            "result entered"
        );
        Ok(event.snapshot())
    })
}

pub fn delete_result(event: &SharedEvent, admin: &Admin, match_number: u32) -> Result<EventSnapshot> {
    with_event(event, |event| {
        event.clear_result(match_number)?;
        info!(admin = admin.name(), match_number, "result deleted");
        Ok(event.snapshot())
    })
}

pub fn reset_bracket(event: &SharedEvent, admin: &Admin) -> Result<EventSnapshot> {
    with_event(event, |event| {
        event.reset()?;
        info!(admin = admin.name(), "bracket reset by admin");
        Ok(event.snapshot())
    })
}
