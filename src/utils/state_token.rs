use base64::{prelude::BASE64_URL_SAFE_NO_PAD, Engine};
use rand_core::RngCore;

/// Random 256-bit token for the OAuth `state` round trip.
pub fn generate_state_token() -> String {
    let mut bytes = [0u8; 32];
    rand_core::OsRng.fill_bytes(&mut bytes);
    BASE64_URL_SAFE_NO_PAD.encode(bytes)
}
