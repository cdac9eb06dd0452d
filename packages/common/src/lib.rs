pub mod backoff;
pub mod evaluation_status;
pub mod metric;

pub use evaluation_status::EvaluationStatus;
pub use metric::{MetricDirection, MetricSpec, ScoreError};
