use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One petition signature per signing attempt.
///
/// Identity values are stored only as SHA-256 hashes of the normalized email
/// (trimmed, lowercased) and mobile (digits only). The row starts with both
/// verified flags false and becomes publicly visible only once both are true.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "signatures")]
pub struct Model {
    /// Random 128-bit id, hex-encoded.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub name: String,

    pub position: Option<String>,

    pub institution: Option<String>,

    /// Free-text address as entered by the signer.
    pub address: Option<String>,

    /// Geocoded address identifier (G-NAF persistent id).
    pub address_gnaf_id: Option<String>,

    pub federal_electorate: Option<String>,

    pub state_electorate: Option<String>,

    pub latitude: Option<f64>,

    pub longitude: Option<f64>,

    /// Census statistical area (SA2) code.
    pub sa2_code: Option<String>,

    /// Local-government area name.
    pub lga_name: Option<String>,

    pub postcode: Option<String>,

    pub state: Option<String>,

    /// SHA-256 hex of the normalized email. Plaintext is never stored.
    pub email_hash: String,

    /// SHA-256 hex of the digits-only mobile. Plaintext is never stored.
    pub phone_hash: String,

    pub email_verified: bool,

    pub phone_verified: bool,

    /// Unix timestamp (seconds); set exactly once, when both flags become true.
    pub verification_completed_at: Option<i64>,

    /// Unix timestamp (seconds).
    pub created_at: i64,

    /// Unix timestamp (seconds).
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::verification_code::Entity")]
    VerificationCode,
}

impl Related<super::verification_code::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VerificationCode.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
