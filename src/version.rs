// Version information for the secp256k1 gateway

/// Full version string with feature description
pub const VERSION: &str = "v1.0.0-secp256k1-gateway-2025-11-03";

/// Semantic version number
pub const VERSION_NUMBER: &str = "1.0.0";

/// Major version number
pub const VERSION_MAJOR: u32 = 1;

/// Minor version number
pub const VERSION_MINOR: u32 = 0;

/// Patch version number
pub const VERSION_PATCH: u32 = 0;

/// Build date
pub const BUILD_DATE: &str = "2025-11-03";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "ecdsa-sign",
    "ecdsa-verify",
    "ecdsa-recover",
    "low-s-normalization",
    "custom-nonce-function",
    "der-strict",
    "der-lax",
    "sec1-private-key-der",
    "key-tweaks",
    "public-key-combine",
    "ecdh-sha256",
    "schnorr-legacy",
    "async-worker-pool",
    "callback-delivery",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("secp256k1 gateway {} ({})", VERSION_NUMBER, BUILD_DATE)
}

/// Get full version info as JSON
pub fn get_version_info() -> serde_json::Value {
    serde_json::json!({
        "version": VERSION_NUMBER,
        "build": VERSION,
        "date": BUILD_DATE,
        "features": FEATURES,
    })
}
