//! Certificate generation module.
//!
//! This module provides X.509 certificate generation for a single-level CA:
//! a self-signed root that issues server and client leaf certificates.

pub mod builder;
pub mod ca;
pub mod certificate;
pub mod entity;
pub mod identity;
pub mod loader;
pub mod verify;

pub use certificate::Certificate;
pub use identity::Identity;
