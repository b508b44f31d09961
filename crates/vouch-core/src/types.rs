use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::config::LedgerConfig;

/// Decentralized Identifier.
///
/// Treated as an opaque, comparable string: the network decides the format,
/// the protocol only compares identifiers for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Did(pub String);

impl Did {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    /// `did:key:<base58>` style identifier for a raw public key.
    pub fn from_key_bs58(encoded_key: &str) -> Self {
        Self(format!("did:key:z{}", encoded_key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Did {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Did {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Reference to a ledger transaction. Audit pointer only; never consulted
/// when deciding whether a claim is valid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxRef(pub String);

impl TxRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An additional output attached to a ledger write (e.g. a fee or a deposit
/// returned to another address).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
    pub address: String,
    pub amount: u64,
}

/// Per-call knobs for ledger writes: an optional gas limit and any extra
/// outputs the caller wants included in the transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_outputs: Vec<TxOutput>,
}

impl TxOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options seeded with the configured default gas limit.
    pub fn from_config(config: &LedgerConfig) -> Self {
        Self {
            gas: config.default_gas,
            extra_outputs: Vec::new(),
        }
    }

    pub fn with_gas(mut self, gas: u64) -> Self {
        self.gas = Some(gas);
        self
    }

    pub fn with_output(mut self, address: impl Into<String>, amount: u64) -> Self {
        self.extra_outputs.push(TxOutput {
            address: address.into(),
            amount,
        });
        self
    }
}

/// A named attribute-set definition that claims conform to.
///
/// Immutable once registered; `tx` is filled in by the registration write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Unique within one issuer's contract.
    pub name: String,
    /// Ordered attribute names; each appears once.
    pub attributes: Vec<String>,
    /// Whether claims of this schema may be revoked.
    pub revocable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx: Option<TxRef>,
}

impl Schema {
    pub fn new(name: impl Into<String>, attributes: Vec<String>, revocable: bool) -> Self {
        Self {
            name: name.into(),
            attributes,
            revocable,
            tx: None,
        }
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a == name)
    }

    /// First attribute name that occurs more than once, if any.
    pub fn duplicate_attribute(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        self.attributes
            .iter()
            .find(|a| !seen.insert(a.as_str()))
            .map(String::as_str)
    }

    pub fn with_tx(mut self, tx: TxRef) -> Self {
        self.tx = Some(tx);
        self
    }
}

/// Root-of-trust entry: whether `issuer_did` is authorised for `schema_name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustRecord {
    pub issuer_did: Did,
    pub schema_name: String,
    pub active: bool,
}
