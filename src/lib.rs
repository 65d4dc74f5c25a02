// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 GameBridge Contributors

//! GameBridge - Game Economy Bridge Validator
//!
//! This crate validates in-game exchange intents against per-session asset
//! ledgers and countersigns approved intents with a secp256k1 key unlocked
//! from an encrypted V3 keystore at startup.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `config` - Environment-driven runtime configuration
//! - `correlation` - UUID to session correlation store
//! - `hmac_auth` - HMAC-SHA256 request authentication
//! - `keystore` - Encrypted keystore decryption and recoverable signing
//! - `ledger` - In-memory per-session asset ledger
//! - `settlement` - On-chain result reconciliation
//! - `validation` - Intent validation pipeline

pub mod api;
pub mod config;
pub mod correlation;
pub mod error;
pub mod hmac_auth;
pub mod keystore;
pub mod ledger;
pub mod models;
pub mod settlement;
pub mod state;
pub mod validation;
