//! Mock wallet. Stands in for a browser wallet extension; nothing here is
//! cryptographically meaningful.

use rand::Rng;

/// `0x` followed by a random 24-bit hex value right-padded with `0` to 40
/// hex digits.
pub fn mock_wallet_address() -> String {
    let value: u32 = rand::thread_rng().gen_range(0..0xFF_FFFF);
    format!("0x{:0<40}", format!("{:x}", value))
}

pub fn mock_signature() -> String {
    format!("0xmock_signature_{}", chrono::Utc::now().timestamp_millis())
}
