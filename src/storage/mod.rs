//! Artifact storage module.
//!
//! This module writes keys and certificates to disk under fixed file names.

pub mod layout;
pub mod pem_writer;
