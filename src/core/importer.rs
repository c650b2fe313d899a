use std::{future::Future, sync::Mutex, time::Duration};

use rand::{Rng, SeedableRng, rngs::StdRng};
use thiserror::Error;

use crate::core::validation::RepoUrl;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    #[error("Failed to import {url}. Please check the URL and try again.")]
    Rejected { url: String },
    #[error("The import service is unavailable: {0}")]
    Unavailable(String),
}

/// The backend that actually imports a repository.
pub trait RepositoryImporter: Send + Sync + 'static {
    fn import_repository(
        &self,
        url: &RepoUrl,
    ) -> impl Future<Output = Result<(), ImportError>> + Send;
}

/// Stand-in backend: waits for a fixed latency, then succeeds or fails at
/// random.
#[derive(Debug)]
pub struct SimulatedImporter {
    latency: Duration,
    success_probability: f64,
    rng: Mutex<StdRng>,
}

impl SimulatedImporter {
    pub const DEFAULT_LATENCY: Duration = Duration::from_millis(2500);
    pub const DEFAULT_SUCCESS_PROBABILITY: f64 = 0.8;

    pub fn new(latency: Duration, success_probability: f64) -> Self {
        Self::with_rng(latency, success_probability, StdRng::from_os_rng())
    }

    /// Deterministic outcomes for a given seed.
    pub fn with_seed(latency: Duration, success_probability: f64, seed: u64) -> Self {
        Self::with_rng(latency, success_probability, StdRng::seed_from_u64(seed))
    }

    fn with_rng(latency: Duration, success_probability: f64, rng: StdRng) -> Self {
        let success_probability = if success_probability.is_nan() {
            0.0
        } else {
            success_probability.clamp(0.0, 1.0)
        };
        Self {
            latency,
            success_probability,
            rng: Mutex::new(rng),
        }
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    pub fn success_probability(&self) -> f64 {
        self.success_probability
    }

    fn draw(&self) -> Result<bool, ImportError> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| ImportError::Unavailable("random source poisoned".to_string()))?;
        Ok(rng.random_bool(self.success_probability))
    }
}

impl Default for SimulatedImporter {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LATENCY, Self::DEFAULT_SUCCESS_PROBABILITY)
    }
}

impl RepositoryImporter for SimulatedImporter {
    async fn import_repository(&self, url: &RepoUrl) -> Result<(), ImportError> {
        tracing::debug!(%url, latency_ms = self.latency.as_millis() as u64, "Simulating repository import");
        tokio::time::sleep(self.latency).await;

        if self.draw()? {
            tracing::info!(%url, "Repository imported");
            Ok(())
        } else {
            tracing::info!(%url, "Repository import failed");
            Err(ImportError::Rejected {
                url: url.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url() -> RepoUrl {
        RepoUrl::parse("https://github.com/foo/bar").unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn waits_for_the_configured_latency() {
        let importer = SimulatedImporter::with_seed(Duration::from_millis(2500), 1.0, 7);
        let started = tokio::time::Instant::now();
        importer.import_repository(&url()).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(2500));
    }

    #[tokio::test]
    async fn probability_bounds_are_certain() {
        let always = SimulatedImporter::with_seed(Duration::ZERO, 1.0, 1);
        let never = SimulatedImporter::with_seed(Duration::ZERO, 0.0, 1);
        for _ in 0..20 {
            assert!(always.import_repository(&url()).await.is_ok());
            assert_eq!(
                never.import_repository(&url()).await,
                Err(ImportError::Rejected {
                    url: "https://github.com/foo/bar".to_string()
                })
            );
        }
    }

    #[tokio::test]
    async fn mostly_succeeds_at_the_default_rate() {
        let importer = SimulatedImporter::with_seed(
            Duration::ZERO,
            SimulatedImporter::DEFAULT_SUCCESS_PROBABILITY,
            42,
        );
        let mut successes = 0;
        for _ in 0..1000 {
            if importer.import_repository(&url()).await.is_ok() {
                successes += 1;
            }
        }
        assert!((700..=900).contains(&successes), "got {successes} successes");
    }

    #[test]
    fn out_of_range_probabilities_are_clamped() {
        assert_eq!(SimulatedImporter::new(Duration::ZERO, 3.0).success_probability(), 1.0);
        assert_eq!(SimulatedImporter::new(Duration::ZERO, -1.0).success_probability(), 0.0);
        assert_eq!(SimulatedImporter::new(Duration::ZERO, f64::NAN).success_probability(), 0.0);
    }
}
