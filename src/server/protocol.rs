use crate::brain::trace::BrainTrace;
use crate::stats::GenerationStats;
use crate::world::WorldSnapshot;
use serde::{Deserialize, Serialize};

use super::state_stream::TrainerStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "update")]
    Update {
        generations_completed: u64,
        stopped: bool,
        latest: Option<GenerationStats>,
        champion: Option<WorldSnapshot>,
    },
    #[serde(rename = "full_state")]
    FullState { status: TrainerStatus },
    #[serde(rename = "history")]
    History { stats: Vec<GenerationStats> },
    #[serde(rename = "trace")]
    Trace {
        generation: u64,
        champion_index: usize,
        trace: BrainTrace,
    },
    #[serde(rename = "frame")]
    Frame { generation: u64, snapshot: WorldSnapshot },
    #[serde(rename = "replay_finished")]
    ReplayFinished { generation: u64, score: i64 },
    #[serde(rename = "error")]
    Error { message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "get_state")]
    GetState,
    #[serde(rename = "get_history")]
    GetHistory,
    #[serde(rename = "trace_best")]
    TraceBest,
    #[serde(rename = "watch_best")]
    WatchBest,
    #[serde(rename = "stop_watching")]
    StopWatching,
}

impl ServerMessage {
    pub fn update(status: &TrainerStatus) -> Self {
        ServerMessage::Update {
            generations_completed: status.generations_completed,
            stopped: status.stopped,
            latest: status.latest().cloned(),
            champion: status.champion.as_ref().map(|c| c.final_snapshot.clone()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }
}
