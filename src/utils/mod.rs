pub mod jwt;
pub mod state_token;
pub mod timestamps;
