pub mod best_result;
pub mod competition;
pub mod participant;
pub mod submission;
