//! # Memory CLI Library
//!
//! Thin wiring between command-line arguments and `do-memory-core`'s
//! harness, matrix, and self-improvement runners. Argument parsing
//! itself is kept deliberately small: this binary's job is to load
//! [`do_memory_core::settings::Settings`] and an agent program path,
//! then hand off to the library.

pub mod commands;
pub mod output;
