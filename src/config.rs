use crate::error::{Error, Result};
use crate::types::*;
use std::{
  env,
  fs,
  path::Path,
};

const ENV_PREFIX: &str = "BRACKET_";
const COUNT_KEYS: [&str; 3] = ["BRACKET_MAX_TEAMS", "BRACKET_MIN_TEAM_SIZE", "BRACKET_MAX_TEAM_SIZE"];

pub fn env_default(key: &str) -> Option<String> {
  env::var(key)
    .ok()
    .map(|value| value.trim().to_string())
    .filter(|value| !value.is_empty())
}

/// Applies `BRACKET_*` overrides looked up through `lookup`.
pub fn apply_overrides<F>(mut config: EventConfig, lookup: F) -> Result<EventConfig>
where
  F: Fn(&str) -> Option<String>,
{
  if let Some(value) = lookup("BRACKET_EVENT_NAME") {
    config.name = value;
  }
  if let Some(value) = parse_count(&lookup, "BRACKET_MAX_TEAMS")? {
    config.max_teams = value;
  }
  if let Some(value) = parse_count(&lookup, "BRACKET_MIN_TEAM_SIZE")? {
    config.min_team_size = value;
  }
  if let Some(value) = parse_count(&lookup, "BRACKET_MAX_TEAM_SIZE")? {
    config.max_team_size = value;
  }
  Ok(config)
}

pub fn apply_env_overrides(config: EventConfig) -> Result<EventConfig> {
  apply_overrides(config, env_default)
}

fn parse_count<F>(lookup: &F, key: &str) -> Result<Option<u32>>
where
  F: Fn(&str) -> Option<String>,
{
  lookup(key).map(|raw| parse_count_value(key, &raw)).transpose()
}

fn parse_count_value(key: &str, raw: &str) -> Result<u32> {
  raw
    .parse::<u32>()
    .map_err(|e| Error::Configuration(format!("{key}={raw:?} is not a valid count: {e}")))
}

pub fn validate_event_config(config: &EventConfig) -> Result<()> {
  if config.max_teams == 0 {
    return Err(Error::Configuration("max_teams must be at least 1".to_string()));
  }
  if config.min_team_size == 0 {
    return Err(Error::Configuration("min_team_size must be at least 1".to_string()));
  }
  if config.min_team_size > config.max_team_size {
    return Err(Error::Configuration(format!(
      "min_team_size {} exceeds max_team_size {}",
      config.min_team_size, config.max_team_size
    )));
  }
  Ok(())
}

/// Reads an event config from JSON, falling back to defaults when the file is
/// absent, then applies environment overrides.
pub fn load_event_config(path: &Path) -> Result<EventConfig> {
  let config = if path.is_file() {
    let data = fs::read_to_string(path)?;
    serde_json::from_str::<EventConfig>(&data)?
  } else {
    tracing::debug!("no event config at {}, using defaults", path.display());
    EventConfig::default()
  };
  let config = apply_env_overrides(config)?;
  validate_event_config(&config)?;
  Ok(config)
}

pub fn save_event_config(path: &Path, config: &EventConfig) -> Result<()> {
  validate_event_config(config)?;
  let payload = serde_json::to_string_pretty(config)?;
  fs::write(path, payload)?;
  Ok(())
}

/// Exports the `BRACKET_*` assignments of a dotenv-style file. Variables that
/// are already set keep their value. Returns the keys that were exported.
pub fn load_env_file(env_path: &Path) -> Result<Vec<String>> {
  if !env_path.is_file() {
    return Ok(Vec::new());
  }
  let contents = fs::read_to_string(env_path)?;
  let mut exported = Vec::new();
  for line in contents.lines() {
    let Some((key, value)) = parse_env_line(line)? else {
      continue;
    };
    if !key.starts_with(ENV_PREFIX) {
      tracing::debug!("skipping {key} from {}", env_path.display());
      continue;
    }
    if COUNT_KEYS.contains(&key.as_str()) {
      parse_count_value(&key, &value)?;
    }
    if env::var_os(&key).is_some() {
      continue;
    }
    env::set_var(&key, &value);
    exported.push(key);
  }
  Ok(exported)
}

/// One `.env` line as `(key, value)`; blank lines and `#` comments give `None`.
pub fn parse_env_line(line: &str) -> Result<Option<(String, String)>> {
  let line = line.trim();
  if line.is_empty() || line.starts_with('#') {
    return Ok(None);
  }
  let Some((key, value)) = line.split_once('=') else {
    return Err(Error::Configuration(format!("expected KEY=value, got {line:?}")));
  };
  let key = key.trim();
  if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
    return Err(Error::Configuration(format!("invalid variable name {key:?}")));
  }
  Ok(Some((key.to_string(), unquote(value.trim()).to_string())))
}

fn unquote(value: &str) -> &str {
  for quote in ['"', '\''] {
    if let Some(inner) = value.strip_prefix(quote).and_then(|rest| rest.strip_suffix(quote)) {
      return inner;
    }
  }
  value
}
