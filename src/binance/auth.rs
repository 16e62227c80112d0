//! Request signing for the Binance futures API

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::common::errors::{GatewayError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the API key on every signed request
pub const API_KEY_HEADER: &str = "X-MBX-APIKEY";

/// Generate the hex HMAC-SHA256 signature of a query string
///
/// # Arguments
/// * `secret` - API secret (raw, not encoded)
/// * `query` - The exact url-encoded query or form body being sent
pub fn sign_query(secret: &str, query: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| GatewayError::Authentication(format!("Failed to create HMAC: {}", e)))?;
    mac.update(query.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Append `timestamp`, `recvWindow` and `signature` to a set of parameters
/// and return the encoded payload.
pub fn signed_payload(
    secret: &str,
    params: &[(&str, String)],
    timestamp_ms: i64,
    recv_window_ms: u64,
) -> Result<String> {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        serializer.append_pair(key, value);
    }
    serializer.append_pair("recvWindow", &recv_window_ms.to_string());
    serializer.append_pair("timestamp", &timestamp_ms.to_string());
    let query = serializer.finish();

    let signature = sign_query(secret, &query)?;
    Ok(format!("{}&signature={}", query, signature))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_query_matches_reference_vector() {
        // Example from the Binance API documentation
        let secret = "NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j";
        let query = "symbol=LTCBTC&side=BUY&type=LIMIT&timeInForce=GTC&quantity=1&price=0.1&recvWindow=5000&timestamp=1499827319559";

        let signature = sign_query(secret, query).unwrap();
        assert_eq!(
            signature,
            "c8db56825ae71d6d79447849e617115f4a920fa2acdcab2b053c4b2838bd6b71"
        );
    }

    #[test]
    fn test_signed_payload_layout() {
        let params = [("symbol", "BTCUSDT".to_string()), ("leverage", "10".to_string())];
        let payload = signed_payload("secret", &params, 1700000000000, 5000).unwrap();

        assert!(payload.starts_with(
            "symbol=BTCUSDT&leverage=10&recvWindow=5000&timestamp=1700000000000&signature="
        ));
        let (query, signature) = payload.rsplit_once("&signature=").unwrap();
        assert_eq!(signature, sign_query("secret", query).unwrap());
        assert_eq!(signature.len(), 64);
    }
}
