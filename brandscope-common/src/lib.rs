//! Shared utilities for the Brandscope workspace.
//!
//! Currently this is the home of the [`observability`] module, which
//! centralises `tracing` initialisation so the server binary and the
//! integration test suites all emit into the same rolling file sink.

pub mod observability;
