pub mod experiment;
pub mod me;
pub mod profile;
pub mod user;
