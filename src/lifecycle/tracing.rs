//! # Observability & Tracing
//!
//! [`setup_tracing`] initializes structured logging with the `tracing` crate.
//!
//! ## Configuration
//!
//! Compact format with the module prefix hidden (`with_target(false)`); every actor log line
//! carries an `entity_type` field instead. Levels come from `RUST_LOG`.
//!
//! ```bash
//! RUST_LOG=info cargo run
//! RUST_LOG=debug cargo run     # full payloads, per-request spans
//! RUST_LOG=outreach_allocator::allocation=debug cargo run
//! ```
//!
//! ## What Gets Traced
//!
//! - **Actor Lifecycle**: startup, shutdown, and final store size
//! - **Entity Operations**: Create, Get, Update, Delete, Action and Query
//! - **Service Calls**: one span per allocation operation (`signup_for_round`,
//!   `accept_order`, ...) with its arguments as fields
//! - **Swallowed Failures**: notification drops, inventory release failures and binding
//!   failures at `warn`
//!
//! ## Workflow Trace Example
//!
//! A volunteer cancelling a confirmed seat, with `RUST_LOG=info`:
//!
//! ```text
//! INFO cancel_signup: Action ok entity_type="Round" id=round_1
//! INFO cancel_signup: Signup removed signup_id=round_1/signup_2 status=Confirmed
//! INFO cancel_signup:run_lottery_for_round: Action ok entity_type="Round" id=round_1
//! INFO cancel_signup:run_lottery_for_round: Lottery promoted signups round_id=round_1 promoted=1
//! INFO cancel_signup:handle_volunteer_cancellation: Volunteer left round, bound orders unchanged round_id=round_1
//! ```

/// Installs the global subscriber. Call once, at program start.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false) // entity_type replaces module paths
        .compact()
        .init();
}
