//! PDA Bank - a client for the solanapdas custodial bank program.
//!
//! This library provides:
//! - Deterministic bank address derivation per owner
//! - Create, deposit and reserve-aware withdraw operations
//! - A ledger gateway over JSON-RPC, plus an in-memory ledger
//! - An explicitly refreshed cache of all bank accounts

pub mod config;
pub mod domain;
pub mod infra;
