use async_trait::async_trait;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    error::{Result, ZenMatError},
    types::{MatTelemetry, ProviderKind, SignalStrength, SimulationConfig},
    CONNECTION_FAILED_MESSAGE,
};

/// Capability that establishes and tears down the link to a mat
///
/// The connectivity container drives exactly one provider. The simulator below is
/// one implementation; a real transport implements the same trait and is swapped
/// in without touching any consumer.
#[async_trait]
pub trait ConnectivityProvider: Send + Sync {
    /// Which kind of provider this is
    fn kind(&self) -> ProviderKind;

    /// Establish the link
    ///
    /// # Errors
    ///
    /// Returns [`ZenMatError::ConnectionFailed`] if the link could not be established.
    async fn connect(&self) -> Result<()>;

    /// Tear the link down
    ///
    /// # Errors
    ///
    /// Returns [`ZenMatError::DisconnectFailed`] if the transport reports a failure.
    async fn disconnect(&self) -> Result<()>;

    /// Link details for an established connection
    async fn telemetry(&self) -> MatTelemetry;
}

/// Simulated mat link with randomized outcome and artificial latency
///
/// `connect` sleeps for the configured latency and then succeeds with the
/// configured probability. `disconnect` sleeps and always succeeds. No radio is
/// touched.
pub struct SimulatedProvider<R = StdRng> {
    config: SimulationConfig,
    rng: Mutex<R>,
}

impl SimulatedProvider<StdRng> {
    /// Create a simulator from configuration
    ///
    /// Seeds the outcome generator from `config.seed` when present, from entropy
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ZenMatError::InvalidParameters`] if the configuration is invalid.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }

    /// Simulator whose connect attempts always succeed
    #[must_use]
    pub fn always_succeed(config: SimulationConfig) -> Self {
        Self::forced(config, 1.0)
    }

    /// Simulator whose connect attempts always fail
    #[must_use]
    pub fn always_fail(config: SimulationConfig) -> Self {
        Self::forced(config, 0.0)
    }

    fn forced(config: SimulationConfig, success_probability: f64) -> Self {
        Self {
            config: SimulationConfig {
                success_probability,
                ..config
            },
            rng: Mutex::new(StdRng::seed_from_u64(0)),
        }
    }
}

impl<R: Rng + Send> SimulatedProvider<R> {
    /// Create a simulator drawing outcomes from the given generator
    ///
    /// # Errors
    ///
    /// Returns [`ZenMatError::InvalidParameters`] if the configuration is invalid.
    pub fn with_rng(config: SimulationConfig, rng: R) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            rng: Mutex::new(rng),
        })
    }

    /// Simulator configuration
    #[must_use]
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    async fn roll_success(&self) -> bool {
        self.rng
            .lock()
            .await
            .gen_bool(self.config.success_probability)
    }
}

#[async_trait]
impl<R: Rng + Send> ConnectivityProvider for SimulatedProvider<R> {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Simulated
    }

    async fn connect(&self) -> Result<()> {
        debug!(
            "Simulating handshake for {}ms",
            self.config.connect_latency_ms
        );
        tokio::time::sleep(self.config.connect_latency()).await;

        if self.roll_success().await {
            info!("Simulated mat link established");
            Ok(())
        } else {
            warn!("Simulated mat link failed");
            Err(ZenMatError::ConnectionFailed(
                CONNECTION_FAILED_MESSAGE.to_string(),
            ))
        }
    }

    async fn disconnect(&self) -> Result<()> {
        debug!(
            "Simulating teardown for {}ms",
            self.config.disconnect_latency_ms
        );
        tokio::time::sleep(self.config.disconnect_latency()).await;
        info!("Simulated mat link closed");
        Ok(())
    }

    async fn telemetry(&self) -> MatTelemetry {
        MatTelemetry::new(SignalStrength::Excellent, 87)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_forced_outcomes() {
        let ok = SimulatedProvider::always_succeed(SimulationConfig::instant());
        assert!(ok.connect().await.is_ok());

        let failing = SimulatedProvider::always_fail(SimulationConfig::instant());
        match failing.connect().await {
            Err(ZenMatError::ConnectionFailed(message)) => {
                assert_eq!(message, CONNECTION_FAILED_MESSAGE);
            }
            other => panic!("expected connection failure, got {other:?}"),
        }
        assert!(failing.disconnect().await.is_ok());
    }

    #[tokio::test]
    async fn test_success_rate_with_seeded_rng() {
        let provider = SimulatedProvider::with_rng(
            SimulationConfig::instant(),
            StdRng::seed_from_u64(0x5EED),
        )
        .unwrap();

        let attempts = 10_000;
        let mut successes = 0;
        for _ in 0..attempts {
            if provider.connect().await.is_ok() {
                successes += 1;
            }
        }

        let rate = f64::from(successes) / f64::from(attempts);
        assert!((0.87..=0.93).contains(&rate), "success rate was {rate}");
    }

    #[tokio::test]
    async fn test_same_seed_same_outcomes() {
        let config = SimulationConfig {
            seed: Some(42),
            ..SimulationConfig::instant()
        };
        let a = SimulatedProvider::new(config.clone()).unwrap();
        let b = SimulatedProvider::new(config).unwrap();

        for _ in 0..50 {
            assert_eq!(a.connect().await.is_ok(), b.connect().await.is_ok());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_is_applied() {
        let provider = SimulatedProvider::always_succeed(SimulationConfig::default());

        let start = tokio::time::Instant::now();
        provider.connect().await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(2_000));

        let start = tokio::time::Instant::now();
        provider.disconnect().await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(1_000));
    }

    #[test]
    fn test_invalid_probability_rejected() {
        let config = SimulationConfig {
            success_probability: 1.2,
            ..SimulationConfig::default()
        };
        assert!(matches!(
            SimulatedProvider::new(config),
            Err(ZenMatError::InvalidParameters(_))
        ));
    }

    #[tokio::test]
    async fn test_simulated_telemetry() {
        let provider = SimulatedProvider::always_succeed(SimulationConfig::instant());
        assert_eq!(provider.kind(), ProviderKind::Simulated);
        let telemetry = provider.telemetry().await;
        assert_eq!(telemetry.signal, SignalStrength::Excellent);
        assert_eq!(telemetry.battery_percent, 87);
    }
}
