//! Textual IP addresses as reported by collaborators
//!
//! Discovery services and resolvers hand back text. The raw text is kept and
//! available through [`Address::as_str`]; `Display` shows it trimmed.
//! Comparison goes through [`Address::ip`], so `"2001:db8::1"` and
//! `"2001:0db8:0:0:0:0:0:1"` are the same address.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

/// An IPv4 or IPv6 address in textual form
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Wrap the raw text of an address
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The text exactly as received
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the trimmed text as an IP address
    pub fn ip(&self) -> Option<IpAddr> {
        self.0.trim().parse().ok()
    }

    /// The form written to a DNS provider
    ///
    /// Parsed addresses are rendered in their standard form; anything that
    /// does not parse is passed through trimmed.
    pub fn canonical(&self) -> String {
        match self.ip() {
            Some(ip) => ip.to_string(),
            None => self.0.trim().to_string(),
        }
    }
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        match (self.ip(), other.ip()) {
            (Some(a), Some(b)) => a == b,
            _ => self.0.trim() == other.0.trim(),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.trim())
    }
}

impl From<IpAddr> for Address {
    fn from(ip: IpAddr) -> Self {
        Self(ip.to_string())
    }
}

impl From<&str> for Address {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for Address {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}
