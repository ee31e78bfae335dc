use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Curated "initial signatories" shown on the site alongside public
/// signatures. Managed out-of-band; the verification workflows never touch
/// this table.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "initial_signatories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub name: String,

    pub position: Option<String>,

    pub institution: Option<String>,

    pub display_order: i32,

    /// Unix timestamp (seconds).
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
