//! `LoCoMo` benchmark dataset.
//!
//! `LoCoMo` pairs long, multi-session conversations between two speakers with
//! question-answer pairs about them. Each sample holds:
//!
//! | Field | Content |
//! |-------|---------|
//! | `qa` | questions with gold answers, evidence ids and a category (5 = adversarial) |
//! | `conversation` | dated sessions of turns, image turns carry a caption |
//! | `event_summary` | per-session, per-speaker event lists |
//! | `observation` | per-session, per-speaker observations with evidence ids |
//! | `session_summary` | free-text summary per session |

mod loader;
mod models;
mod stats;

pub use loader::{
    LoadReport, LoadedDataset, SampleLoadSummary, load_locomo_dataset, parse_locomo_dataset,
};
pub use models::{
    ADVERSARIAL_CATEGORY, Conversation, EventSummary, LocomoSample, Observation, Qa, Session,
    Turn,
};
pub use stats::DatasetStatistics;
