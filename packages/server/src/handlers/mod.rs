pub mod competition;
pub mod evaluation;
pub mod leaderboard;
pub mod participant;
pub mod submission;
