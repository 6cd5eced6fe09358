use serde::{Deserialize, Serialize};
use std::{fmt, time::Duration};

use crate::error::{Result, ZenMatError};

/// Tri-state link status of the mat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConnectionStatus {
    /// No link to the mat
    #[default]
    Disconnected,
    /// A connect or disconnect is in flight
    Connecting,
    /// Link established
    Connected,
}

impl ConnectionStatus {
    /// Whether the status is a resting state (not in flight)
    #[must_use]
    pub const fn is_settled(self) -> bool {
        !matches!(self, Self::Connecting)
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "Disconnected"),
            Self::Connecting => write!(f, "Connecting"),
            Self::Connected => write!(f, "Connected"),
        }
    }
}

/// Observable connection state held by the connectivity container
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConnectionState {
    /// Current link status
    pub status: ConnectionStatus,
    /// Message of the last failed operation, cleared when a new attempt starts
    pub last_error: Option<String>,
}

impl ConnectionState {
    /// Check if the mat is connected
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        matches!(self.status, ConnectionStatus::Connected)
    }

    /// Check if an operation is in flight
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        matches!(self.status, ConnectionStatus::Connecting)
    }
}

/// Which kind of provider backs the connectivity container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderKind {
    /// Randomized stand-in with artificial latency
    Simulated,
    /// A real device transport
    Transport,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simulated => write!(f, "Simulated"),
            Self::Transport => write!(f, "Transport"),
        }
    }
}

/// Reported radio signal strength
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalStrength {
    /// Strong, stable link
    Excellent,
    /// Usable link
    Good,
    /// Occasional drops expected
    Fair,
    /// Link likely to fail
    Weak,
}

impl fmt::Display for SignalStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Excellent => write!(f, "Excellent"),
            Self::Good => write!(f, "Good"),
            Self::Fair => write!(f, "Fair"),
            Self::Weak => write!(f, "Weak"),
        }
    }
}

/// Link details shown while connected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatTelemetry {
    /// Radio signal strength
    pub signal: SignalStrength,
    /// Battery charge in percent
    pub battery_percent: u8,
}

impl MatTelemetry {
    /// Create new telemetry, clamping the battery level to 100 %
    #[must_use]
    pub fn new(signal: SignalStrength, battery_percent: u8) -> Self {
        Self {
            signal,
            battery_percent: battery_percent.min(100),
        }
    }
}

/// Simulator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Simulated handshake latency in milliseconds
    pub connect_latency_ms: u64,
    /// Simulated teardown latency in milliseconds
    pub disconnect_latency_ms: u64,
    /// Probability that a connect attempt succeeds
    pub success_probability: f64,
    /// Seed for the outcome generator; `None` seeds from entropy
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            connect_latency_ms: 2_000,
            disconnect_latency_ms: 1_000,
            success_probability: 0.9,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Configuration with no latency, for tests and tooling
    #[must_use]
    pub fn instant() -> Self {
        Self {
            connect_latency_ms: 0,
            disconnect_latency_ms: 0,
            ..Self::default()
        }
    }

    /// Connect latency as a [`Duration`]
    #[must_use]
    pub const fn connect_latency(&self) -> Duration {
        Duration::from_millis(self.connect_latency_ms)
    }

    /// Disconnect latency as a [`Duration`]
    #[must_use]
    pub const fn disconnect_latency(&self) -> Duration {
        Duration::from_millis(self.disconnect_latency_ms)
    }

    /// Check the configuration for values the simulator cannot use
    ///
    /// # Errors
    ///
    /// Returns [`ZenMatError::InvalidParameters`] if the success probability is
    /// not a finite value in `0.0..=1.0`.
    pub fn validate(&self) -> Result<()> {
        if !self.success_probability.is_finite()
            || !(0.0..=1.0).contains(&self.success_probability)
        {
            return Err(ZenMatError::InvalidParameters(format!(
                "Success probability {} is out of range (0.0 - 1.0)",
                self.success_probability
            )));
        }
        Ok(())
    }
}
