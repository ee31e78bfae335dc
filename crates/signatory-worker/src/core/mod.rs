pub mod codes;
pub mod identity;
pub mod validate;
pub mod verify;
pub mod window;
