//! Text codec for the link's message-send capability
//!
//! The transport only carries text, so frames travel as standard-alphabet,
//! padded base64. That is what the hub-side decoder expects.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Encoding tag carried alongside wire text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireEncoding {
    #[default]
    Base64,
}

impl WireEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            WireEncoding::Base64 => "base64",
        }
    }
}

/// Encode raw frame bytes as wire text
pub fn to_wire_text(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode wire text back to raw bytes
pub fn from_wire_text(text: &str) -> Result<Vec<u8>> {
    Ok(STANDARD.decode(text.trim())?)
}
