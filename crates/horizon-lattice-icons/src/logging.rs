//! Logging for the icon pipeline.
//!
//! The crate logs through `tracing` and never installs a subscriber. To see
//! the pipeline's output, install one in the application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_lattice_icons=debug")
//!     .init();
//! ```

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Crate-wide target: pipeline start and stop.
    pub const ICONS: &str = "horizon_lattice_icons";
    /// Facade: start, stop, cancellation.
    pub const SYSTEM: &str = "horizon_lattice_icons::system";
    /// Background worker: queue activity and decode outcomes.
    pub const WORKER: &str = "horizon_lattice_icons::worker";
    /// Source tables and decoders.
    pub const SOURCE: &str = "horizon_lattice_icons::source";
}
