//! Deployment statistics and their verification.

use crate::error::{ClientError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A named per-device status counter in deployment statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StatCounter {
    Success,
    Pending,
    Failure,
    Downloading,
    Installing,
    Rebooting,
    NoArtifact,
    AlreadyInstalled,
    Aborted,
}

impl StatCounter {
    /// Every counter, in the order they are checked.
    pub const ALL: [StatCounter; 9] = [
        Self::Success,
        Self::Pending,
        Self::Failure,
        Self::Downloading,
        Self::Installing,
        Self::Rebooting,
        Self::NoArtifact,
        Self::AlreadyInstalled,
        Self::Aborted,
    ];

    /// The counter's name on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Pending => "pending",
            Self::Failure => "failure",
            Self::Downloading => "downloading",
            Self::Installing => "installing",
            Self::Rebooting => "rebooting",
            Self::NoArtifact => "noartifact",
            Self::AlreadyInstalled => "already-installed",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for StatCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatCounter {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|counter| counter.as_str() == s)
            .ok_or_else(|| ClientError::Config(format!("unknown statistics counter: {}", s)))
    }
}

/// Per-status device counts of a deployment.
///
/// Counters the server omits or sends as `null` read as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentStats {
    #[serde(default)]
    pub success: Option<u32>,
    #[serde(default)]
    pub pending: Option<u32>,
    #[serde(default)]
    pub failure: Option<u32>,
    #[serde(default)]
    pub downloading: Option<u32>,
    #[serde(default)]
    pub installing: Option<u32>,
    #[serde(default)]
    pub rebooting: Option<u32>,
    #[serde(default)]
    pub noartifact: Option<u32>,
    #[serde(default, rename = "already-installed")]
    pub already_installed: Option<u32>,
    #[serde(default)]
    pub aborted: Option<u32>,
}

impl DeploymentStats {
    /// Value of a counter, zero when absent.
    pub fn get(&self, counter: StatCounter) -> u32 {
        let value = match counter {
            StatCounter::Success => self.success,
            StatCounter::Pending => self.pending,
            StatCounter::Failure => self.failure,
            StatCounter::Downloading => self.downloading,
            StatCounter::Installing => self.installing,
            StatCounter::Rebooting => self.rebooting,
            StatCounter::NoArtifact => self.noartifact,
            StatCounter::AlreadyInstalled => self.already_installed,
            StatCounter::Aborted => self.aborted,
        };
        value.unwrap_or(0)
    }

    /// Total number of devices counted.
    pub fn total(&self) -> u32 {
        StatCounter::ALL.iter().map(|c| self.get(*c)).sum()
    }

    /// Compare every counter against `expected`.
    ///
    /// # Errors
    ///
    /// Returns a [`StatsMismatch`] listing every counter that differs.
    pub fn verify(&self, expected: &ExpectedStats) -> std::result::Result<(), StatsMismatch> {
        let mismatches: Vec<CounterMismatch> = StatCounter::ALL
            .into_iter()
            .filter_map(|counter| {
                let expected = expected.get(counter);
                let actual = self.get(counter);
                (expected != actual).then_some(CounterMismatch {
                    counter,
                    expected,
                    actual,
                })
            })
            .collect();

        if mismatches.is_empty() {
            Ok(())
        } else {
            Err(StatsMismatch { mismatches })
        }
    }
}

/// Expected counter values. Counters not set are expected to be zero.
///
/// ```
/// use deployments_client::{ExpectedStats, StatCounter};
///
/// let expected = ExpectedStats::new()
///     .with(StatCounter::Success, 3)
///     .with(StatCounter::Pending, 0);
/// assert_eq!(expected.get(StatCounter::Failure), 0);
///
/// let parsed: ExpectedStats = "success=3,already-installed=1".parse().unwrap();
/// assert_eq!(parsed.get(StatCounter::AlreadyInstalled), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpectedStats {
    counters: BTreeMap<StatCounter, u32>,
}

impl ExpectedStats {
    /// No expectations: every counter zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Expect `counter` to equal `value`.
    #[must_use]
    pub fn with(mut self, counter: StatCounter, value: u32) -> Self {
        self.counters.insert(counter, value);
        self
    }

    /// Expected value of a counter.
    pub fn get(&self, counter: StatCounter) -> u32 {
        self.counters.get(&counter).copied().unwrap_or(0)
    }
}

impl FromIterator<(StatCounter, u32)> for ExpectedStats {
    fn from_iter<I: IntoIterator<Item = (StatCounter, u32)>>(iter: I) -> Self {
        Self {
            counters: iter.into_iter().collect(),
        }
    }
}

impl FromStr for ExpectedStats {
    type Err = ClientError;

    /// Parse comma or whitespace separated `name=value` pairs.
    fn from_str(s: &str) -> Result<Self> {
        s.split(|c: char| c == ',' || c.is_whitespace())
            .filter(|pair| !pair.is_empty())
            .map(|pair| -> Result<(StatCounter, u32)> {
                let (name, value) = pair.split_once('=').ok_or_else(|| {
                    ClientError::Config(format!("expected name=value, got: {}", pair))
                })?;
                let value = value.parse::<u32>().map_err(|_| {
                    ClientError::Config(format!("invalid count for {}: {}", name, value))
                })?;
                Ok((name.parse::<StatCounter>()?, value))
            })
            .collect()
    }
}

/// One counter that differs from its expected value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterMismatch {
    pub counter: StatCounter,
    pub expected: u32,
    pub actual: u32,
}

impl fmt::Display for CounterMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expected {}, got {}",
            self.counter, self.expected, self.actual
        )
    }
}

/// Statistics that did not match expectations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("deployment statistics mismatch: {}", format_mismatches(.mismatches))]
pub struct StatsMismatch {
    /// Every mismatching counter, in [`StatCounter::ALL`] order.
    pub mismatches: Vec<CounterMismatch>,
}

fn format_mismatches(mismatches: &[CounterMismatch]) -> String {
    mismatches
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
