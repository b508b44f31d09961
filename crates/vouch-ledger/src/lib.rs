//! Vouch Ledger
//!
//! The narrow interface the protocol needs from a ledger-backed contract:
//! schema reads and writes, claim issuance and revocation markers, issuer key
//! resolution, and root-of-trust records. `MemoryLedger` implements all of it
//! in process for tests and local runs.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::LedgerError;
pub use memory::{MemoryLedger, TxRecord};
pub use traits::{ClaimRegistry, SchemaRegistry, TrustLedger};
