//! Adversarial and property test suite for the BMail wallet.
//!
//! The tests under `tests/` drive the public API of `bmail-core` and
//! `bmail-wallet` the way an attacker or a careless caller would.

pub mod helpers;
