use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A delivered verification code, stored hashed.
///
/// Exactly two rows exist per signature: one `email`, one `sms`. A row with
/// `verified_at` set is immutable; once `attempts` reaches the limit the whole
/// pair is permanently blocked (there is no resend path).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "verification_codes")]
pub struct Model {
    /// Random 128-bit id, hex-encoded.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Owning signature; rows are cascade-deleted with it.
    pub signature_id: String,

    /// "email" or "sms".
    pub code_type: String,

    /// SHA-256 hex of the 6-digit code. The code itself is never stored.
    pub code_hash: String,

    /// Unix timestamp (seconds): creation time + 10 minutes.
    pub expires_at: i64,

    /// Failed check counter, shared accounting across the pair.
    pub attempts: i32,

    /// Unix timestamp (seconds); set once when the code is confirmed.
    pub verified_at: Option<i64>,

    /// Unix timestamp (seconds).
    pub created_at: i64,
}

pub const CODE_TYPE_EMAIL: &str = "email";
pub const CODE_TYPE_SMS: &str = "sms";

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::signature::Entity",
        from = "Column::SignatureId",
        to = "super::signature::Column::Id",
        on_delete = "Cascade"
    )]
    Signature,
}

impl Related<super::signature::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Signature.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
