//! Vouch Core: fundamental types, errors, configuration and the ledger-side
//! claim state machine shared by every Vouch crate.

pub mod claim_state;
pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use claim_state::{ClaimEvent, ClaimState, ClaimStateMachine};
pub use config::{LedgerConfig, LoggingConfig, TrustConfig, VouchConfig};
pub use error::CoreError;
pub use types::{Did, Schema, TrustRecord, TxOptions, TxOutput, TxRef};
