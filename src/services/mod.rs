pub mod account_service;
pub mod activities_service;
pub mod comment_hub;
pub mod comment_service;
pub mod email_service;
pub mod location_service;
pub mod password_service;
pub mod photo_service;
pub mod photo_store;
pub mod profile_service;
pub mod validation;
