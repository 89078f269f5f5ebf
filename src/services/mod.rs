pub mod account_events;
pub mod invites;
pub mod oauth;
