pub mod client;
pub mod errors;
#[cfg(test)]
pub mod mock_fxa_oauth;
pub mod service;
