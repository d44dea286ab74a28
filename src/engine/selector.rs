// Random round selection with asset-failure retry.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use super::candidate::{Candidate, CandidateSource, Mode};
use crate::error::GameError;
use crate::metrics;

/// Checks whether a candidate's image can be shown. Network errors and
/// missing files are both plain `false`.
pub trait AssetResolver: Send + Sync {
    fn resolve<'a>(&'a self, image_ref: &'a str) -> BoxFuture<'a, bool>;
}

/// The candidate currently being guessed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Round {
    /// Sequence number within this selector, starting at 1.
    pub number: u64,
    pub candidate: Candidate,
    pub started_at: DateTime<Utc>,
}

pub struct RoundSelector {
    mode: Mode,
    resolver: Arc<dyn AssetResolver>,
    rng: StdRng,
    rounds_issued: u64,
}

impl RoundSelector {
    pub fn new(mode: Mode, resolver: Arc<dyn AssetResolver>) -> Self {
        Self::with_rng(mode, resolver, StdRng::from_entropy())
    }

    /// Deterministic selector for reproducible sessions and tests.
    pub fn seeded(mode: Mode, resolver: Arc<dyn AssetResolver>, seed: u64) -> Self {
        Self::with_rng(mode, resolver, StdRng::seed_from_u64(seed))
    }

    fn with_rng(mode: Mode, resolver: Arc<dyn AssetResolver>, rng: StdRng) -> Self {
        Self {
            mode,
            resolver,
            rng,
            rounds_issued: 0,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub async fn select_round(&mut self, source: &CandidateSource) -> Result<Round, GameError> {
        self.select_round_excluding(source, &HashSet::new()).await
    }

    /// Draw uniformly among candidates not in `exclude` and not yet tried in
    /// this call, until one resolves. Each candidate is probed at most once.
    pub async fn select_round_excluding(
        &mut self,
        source: &CandidateSource,
        exclude: &HashSet<Candidate>,
    ) -> Result<Round, GameError> {
        let mut remaining: Vec<usize> = (0..source.len())
            .filter(|&i| !exclude.contains(&source[i]))
            .collect();

        while !remaining.is_empty() {
            let pick = self.rng.gen_range(0..remaining.len());
            let candidate = &source[remaining.swap_remove(pick)];

            if self.resolver.resolve(&candidate.image_ref).await {
                self.rounds_issued += 1;
                metrics::ROUNDS_SELECTED_TOTAL
                    .with_label_values(&[self.mode.as_str()])
                    .inc();
                tracing::info!(
                    mode = %self.mode,
                    round = self.rounds_issued,
                    "Selected '{}'",
                    candidate.name
                );
                return Ok(Round {
                    number: self.rounds_issued,
                    candidate: candidate.clone(),
                    started_at: Utc::now(),
                });
            }

            tracing::debug!(
                mode = %self.mode,
                image = %candidate.image_ref,
                "Image failed to resolve, drawing another candidate"
            );
            metrics::ASSET_FAILURES_TOTAL
                .with_label_values(&[self.mode.as_str()])
                .inc();
        }

        metrics::SELECTION_EXHAUSTED_TOTAL
            .with_label_values(&[self.mode.as_str()])
            .inc();
        Err(GameError::NoPlayableCandidates)
    }
}
