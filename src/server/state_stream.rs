use crate::evolution::{Champion, GenerationReport, Phase};
use crate::stats::GenerationStats;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// What the trainer has published so far.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainerStatus {
    pub run_seed: u64,
    pub generations_completed: u64,
    pub phase: Option<Phase>,
    pub history: Vec<GenerationStats>,
    pub champion: Option<Champion>,
    pub stopped: bool,
}

impl TrainerStatus {
    pub fn latest(&self) -> Option<&GenerationStats> {
        self.history.last()
    }
}

/// Shared handle between the trainer thread (writer) and the server (readers).
#[derive(Clone, Default)]
pub struct StateStream {
    state: Arc<RwLock<TrainerStatus>>,
}

impl StateStream {
    pub fn new(run_seed: u64) -> Self {
        Self {
            state: Arc::new(RwLock::new(TrainerStatus {
                run_seed,
                phase: Some(Phase::Evaluating),
                ..TrainerStatus::default()
            })),
        }
    }

    pub async fn get_state(&self) -> TrainerStatus {
        self.state.read().await.clone()
    }

    pub async fn history(&self) -> Vec<GenerationStats> {
        self.state.read().await.history.clone()
    }

    /// Records a finished generation. Must be called outside the async runtime
    /// (the trainer runs on a blocking thread).
    pub fn publish_blocking(&self, report: &GenerationReport) {
        let mut status = self.state.blocking_write();
        status.apply(report);
    }

    pub async fn publish(&self, report: &GenerationReport) {
        self.state.write().await.apply(report);
    }

    pub fn set_phase_blocking(&self, phase: Phase) {
        self.state.blocking_write().phase = Some(phase);
    }

    pub fn mark_stopped_blocking(&self) {
        let mut status = self.state.blocking_write();
        status.stopped = true;
        status.phase = None;
    }
}

impl TrainerStatus {
    fn apply(&mut self, report: &GenerationReport) {
        self.generations_completed = report.stats.generation;
        self.history.push(report.stats.clone());
        self.champion = Some(report.champion.clone());
        self.phase = Some(Phase::Evaluating);
    }
}
