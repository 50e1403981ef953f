//! Storage infrastructure: configuration file persistence.
//!
//! A thin adapter between the daemon and the file system. The `config`
//! sub-module reads and writes the TOML configuration file and supplies
//! defaults on first run, so nothing else in the daemon touches paths or
//! file formats.

pub mod config;
