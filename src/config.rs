//! Engine policy: permitted cut sizes, Swiss tie-breaks, side balance, scoring.
//!
//! Defaults match a standard card game event. `EngineConfig::from_env` lets a deployment
//! override them without a rebuild.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Metric used to order players on equal points before falling back to registration order.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Average points-per-round of opponents faced.
    #[default]
    StrengthOfSchedule,
    /// Strength of schedule, then the average strength of schedule of opponents.
    ExtendedStrengthOfSchedule,
    /// No metric; equal points are ordered by registration.
    RegistrationOrder,
}

impl FromStr for TieBreak {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sos" => Ok(TieBreak::StrengthOfSchedule),
            "esos" => Ok(TieBreak::ExtendedStrengthOfSchedule),
            "none" => Ok(TieBreak::RegistrationOrder),
            other => Err(format!("unknown tie-break '{other}' (expected sos, esos or none)")),
        }
    }
}

/// Match points per result.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Scoring {
    pub win: u32,
    pub draw: u32,
    pub loss: u32,
    pub bye: u32,
}

impl Default for Scoring {
    fn default() -> Self {
        Self {
            win: 3,
            draw: 1,
            loss: 0,
            bye: 3,
        }
    }
}

/// Soft objectives and scoring for Swiss pairing and standings.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PairingPolicy {
    pub tie_break: TieBreak,
    /// Assign corp/runner so each player's side counts stay even.
    pub side_balance: bool,
    pub scoring: Scoring,
}

impl Default for PairingPolicy {
    fn default() -> Self {
        Self {
            tie_break: TieBreak::default(),
            side_balance: true,
            scoring: Scoring::default(),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Sizes a Swiss stage may be cut to.
    pub cut_sizes: Vec<u32>,
    pub pairing: PairingPolicy,
    /// Timer length for newly paired rounds.
    pub round_minutes: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cut_sizes: vec![3, 4, 8, 16],
            pairing: PairingPolicy::default(),
            round_minutes: 65,
        }
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

impl EngineConfig {
    /// Read overrides from `CUT_SIZES`, `TIE_BREAK`, `SIDE_BALANCE` and `ROUND_MINUTES`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = lookup("CUT_SIZES") {
            config.cut_sizes = parse_cut_sizes(&raw)?;
        }
        if let Some(raw) = lookup("TIE_BREAK") {
            config.pairing.tie_break = raw
                .parse()
                .map_err(|reason| invalid("TIE_BREAK", reason))?;
        }
        if let Some(raw) = lookup("SIDE_BALANCE") {
            config.pairing.side_balance = raw
                .trim()
                .parse()
                .map_err(|_| invalid("SIDE_BALANCE", format!("expected true or false, got '{raw}'")))?;
        }
        if let Some(raw) = lookup("ROUND_MINUTES") {
            config.round_minutes = raw
                .trim()
                .parse()
                .map_err(|_| invalid("ROUND_MINUTES", format!("expected minutes, got '{raw}'")))?;
        }

        Ok(config)
    }

    pub fn permits_cut(&self, size: u32) -> bool {
        self.cut_sizes.contains(&size)
    }
}

fn parse_cut_sizes(raw: &str) -> Result<Vec<u32>, ConfigError> {
    let mut sizes = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let size: u32 = part
            .parse()
            .map_err(|_| invalid("CUT_SIZES", format!("'{part}' is not a number")))?;
        if size < 3 || (size != 3 && !size.is_power_of_two()) {
            return Err(invalid("CUT_SIZES", format!("cut of {size} cannot form a bracket")));
        }
        sizes.push(size);
    }
    if sizes.is_empty() {
        return Err(invalid("CUT_SIZES", "no sizes given".to_string()));
    }
    Ok(sizes)
}

fn invalid(var: &str, reason: String) -> ConfigError {
    ConfigError::Invalid {
        var: var.to_string(),
        reason,
    }
}
