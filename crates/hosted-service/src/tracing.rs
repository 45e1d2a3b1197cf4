//! # Observability & Tracing
//!
//! The [`setup_tracing`] function initializes structured logging with the `tracing` crate.
//!
//! ## Configuration
//!
//! The compact format hides the crate/module prefix (`with_target(false)`); every log line
//! carries a `service` field instead, and cycle logs are nested in a `cycle` span:
//!
//! ```text
//! INFO Background service started service="OrderForwardingJob"
//! INFO cycle{service="OrderForwardingJob" cycle=3}: order 42 forwarded for stock decrement order_id=42
//! ERROR cycle{service="OrderForwardingJob" cycle=4}: Cycle failed error=Job error: bus closed
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Lifecycle and forwarded orders
//! RUST_LOG=info cargo run
//!
//! # Also idle cycles, scope creation and cycle reports
//! RUST_LOG=debug cargo run
//!
//! # Only the framework
//! RUST_LOG=hosted_service=debug cargo run
//! ```

/// Installs the global `fmt` subscriber, filtered by `RUST_LOG`.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
