pub mod claims;
pub mod fxa_login;
pub mod session;

pub use fxa_login::{fxa_callback, fxa_login};
pub use session::AuthSession;
