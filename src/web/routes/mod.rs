pub mod account;
pub mod activities;
pub mod comments;
pub mod identity;
pub mod location;
pub mod profiles;
