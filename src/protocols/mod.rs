//! Protocol Validators for Word-Guard
//!
//! This module provides:
//! - TCP three-way handshake validation with a pushdown stack

pub mod handshake;

pub use handshake::{
    HandshakeOutcome, HandshakePhase, HandshakeReport, HandshakeStep, HandshakeSymbol,
    HandshakeValidator, HANDSHAKE_SEQUENCE,
};
