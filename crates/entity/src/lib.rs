pub mod signature;
pub mod verification_code;
pub mod initial_signatory;

pub use signature::Entity as Signature;
pub use verification_code::Entity as VerificationCode;
pub use initial_signatory::Entity as InitialSignatory;
