//! Content hashing for ReqCorder.
//!
//! Provides domain-separated BLAKE3 hashing that turns canonical artifact
//! bytes into stable, filesystem-safe identities. Wraps an established
//! library; no custom cryptography.

pub mod hasher;

pub use hasher::ContentHasher;
