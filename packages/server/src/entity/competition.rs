use common::{MetricDirection, MetricSpec};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "competition")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub title: String,

    /// Whether a higher or lower score wins this competition.
    pub metric_direction: MetricDirection,
    /// Inclusive score range accepted from reviewers.
    pub score_min: f64,
    pub score_max: f64,

    #[sea_orm(has_many)]
    pub submissions: HasMany<super::submission::Entity>,

    pub created_at: DateTimeUtc,
}

impl Model {
    /// The metric definition used by the scorer, tracker and ranking engine.
    pub fn metric(&self) -> MetricSpec {
        MetricSpec::new(self.metric_direction, self.score_min, self.score_max)
    }
}

impl ActiveModelBehavior for ActiveModel {}
