use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Minimal talent-directory record. Profile ownership lives in the wider
/// platform; the engine only needs a display name to attribute leaderboard
/// entries.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "participant")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub display_name: String,

    #[sea_orm(has_many)]
    pub submissions: HasMany<super::submission::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
