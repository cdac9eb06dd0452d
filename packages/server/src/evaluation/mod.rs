pub mod best_result;
pub mod orchestrator;
pub mod ranking;
pub mod recovery;
pub mod store;

pub use best_result::{BestResultTracker, TrackerOutcome};
pub use orchestrator::{EvaluationOutcome, EvaluationService};
pub use ranking::{BestRow, RankedEntry, position_of, rank_entries};
pub use recovery::{PairRepair, RecoveryService, RepairReport};
pub use store::{SubmissionStore, Transition, TransitionOutcome};
