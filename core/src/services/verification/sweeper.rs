//! Periodic removal of expired OTP records
//!
//! Expired records are already treated as absent on read, so the sweeper only
//! bounds storage growth. Nothing depends on it running on schedule.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::errors::DomainResult;

use super::traits::OtpStoreTrait;

/// Configuration for the expiry sweeper
#[derive(Debug, Clone)]
pub struct ExpirySweeperConfig {
    /// How often to sweep (in seconds)
    pub interval_seconds: u64,
    /// Whether to run the background task at all
    pub enabled: bool,
}

impl Default for ExpirySweeperConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 60,
            enabled: true,
        }
    }
}

impl ExpirySweeperConfig {
    /// Sweeper cadence from the OTP settings; an interval of 0 disables it
    pub fn from_interval(interval_seconds: u64) -> Self {
        Self {
            interval_seconds,
            enabled: interval_seconds > 0,
        }
    }
}

/// Background task calling `sweep_expired` on a fixed interval
pub struct ExpirySweeper<S: OtpStoreTrait + ?Sized + 'static> {
    store: Arc<S>,
    config: ExpirySweeperConfig,
}

impl<S: OtpStoreTrait + ?Sized + 'static> ExpirySweeper<S> {
    pub fn new(store: Arc<S>, config: ExpirySweeperConfig) -> Self {
        Self { store, config }
    }

    /// Run a single sweep and return the number of removed records
    pub async fn run_once(&self) -> DomainResult<usize> {
        let removed = self.store.sweep_expired().await?;
        if removed > 0 {
            info!(removed = removed, event = "otp_sweep", "Removed expired verification codes");
        } else {
            debug!(event = "otp_sweep", "No expired verification codes to remove");
        }
        Ok(removed)
    }

    /// Start the sweeper as a background task
    ///
    /// Returns `None` when the sweeper is disabled. Failed sweeps are logged
    /// and retried on the next tick.
    pub fn start_background_task(self: Arc<Self>) -> Option<JoinHandle<()>> {
        if !self.config.enabled || self.config.interval_seconds == 0 {
            warn!("OTP expiry sweeper is disabled");
            return None;
        }

        let interval = Duration::from_secs(self.config.interval_seconds);

        Some(tokio::spawn(async move {
            info!(
                "OTP expiry sweeper started - will run every {} seconds",
                self.config.interval_seconds
            );

            let mut interval_timer = tokio::time::interval(interval);
            interval_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                interval_timer.tick().await;

                if let Err(e) = self.run_once().await {
                    error!(error = %e, "OTP expiry sweep failed");
                }
            }
        }))
    }
}
