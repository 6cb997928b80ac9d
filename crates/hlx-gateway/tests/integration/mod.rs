//! Integration tests for hlx-gateway.
//!
//! These tests verify the interaction between components:
//! - Real HTTP exchange client against a mock exchange
//! - Signed action payloads as they leave the process
//! - The compiled binary's stdin/stdout/exit-code contract

pub mod common;
