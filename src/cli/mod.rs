//! Command line entry points
//!
//! Argument parsing lives here, apart from the library logic, so both
//! binaries stay thin and the workflows can be driven programmatically.

pub mod commit;
pub mod release;

pub use commit::CommitArgs;
pub use release::ReleaseArgs;

/// Install the stderr log subscriber.
///
/// Filtered by `RUST_LOG`, defaulting to `warn` so regular runs print
/// nothing but their own output.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();
}
