//! Voltreon - project and ticket tracking with a ticket dependency graph.
//!
//! This crate provides both a CLI application and a library. The library
//! holds the domain model, the entity store and its backends, the dependency
//! subsystem (edge validation and graph building), and the summarization
//! adapter; `voltreon-server` exposes the same operations over HTTP.

#![forbid(unsafe_code)]

// Public modules for library usage
pub mod app;
pub mod config;
pub mod dependency;
pub mod domain;
pub mod error;
pub mod store;
pub mod summary;

// Public CLI module (needed by binary)
pub mod cli;

// Command implementations
pub mod commands;

// Output formatting
pub mod output;
