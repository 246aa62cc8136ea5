//! Asynchronous icon loading for Horizon Lattice.
//!
//! Widgets ask for icons by name and display scale. Decoding and rasterizing
//! happens on a dedicated worker thread, and results are kept in a bounded LRU
//! cache shared by every caller.
//!
//! # Getting Started
//!
//! ```no_run
//! use horizon_lattice_icons::IconSystem;
//!
//! let icons = IconSystem::new()?;
//!
//! // Block until the icon is ready
//! let settings = icons.get("Settings", 1.0).expect("built-in icon");
//! assert_eq!(settings.size(), (16, 16));
//!
//! // Or fire off a request and poll it from the render loop
//! let mut request = icons.request("Settings", 2.0);
//! if let Some(image) = request.future.try_get() {
//!     println!("ready: {}x{}", image.width(), image.height());
//! }
//! # Ok::<(), horizon_lattice_icons::IconError>(())
//! ```
//!
//! # Icon Sources
//!
//! The default [`IconSystem`] serves the built-in SVG icon set through a
//! [`VectorIconSource`]. Other sets can be supplied as data tables:
//!
//! ```no_run
//! use horizon_lattice_icons::{
//!     IconSystem, IconSystemConfig, TieredIconSource, TieredSourceTable,
//! };
//!
//! # fn load(name: &str) -> Vec<u8> { Vec::new() }
//! let table = TieredSourceTable::from_entries([
//!     ("Logo", 96, load("logo.png")),
//!     ("Logo", 192, load("logo@2x.png")),
//!     ("Logo", 288, load("logo@3x.png")),
//! ]);
//!
//! let icons = IconSystem::with_source(TieredIconSource::new(table), IconSystemConfig::default())?;
//! let logo = icons.get("Logo", 2.0);
//! # Ok::<(), horizon_lattice_icons::IconError>(())
//! ```
//!
//! # Failures
//!
//! Unknown names, decode failures, cancelled requests and requests made after
//! shutdown all resolve to `None`. Failed decodes are cached like successful
//! ones, so a broken icon is only attempted once per scale.
//!
//! # Logging
//!
//! The crate logs through `tracing`; see [`logging::targets`] for filter
//! targets.

pub mod builtin;
mod config;
mod decode;
mod error;
mod icon_image;
pub mod logging;
mod lru_cache;
mod queue;
mod request;
mod source;
mod system;
mod worker;

pub use config::IconSystemConfig;
pub use decode::{ImageDecoder, RasterDecoder, SvgRasterizer, VectorRasterizer};
pub use error::{IconError, IconResult};
pub use icon_image::IconImage;
pub use lru_cache::{CacheStats, LruCache};
pub use request::{IconFuture, IconKey, IconOutcome, IconRequest, IconState};
pub use source::{
    BASE_DPI, DPI_TIERS, IconSource, TieredIconSource, TieredSourceTable, VectorIconSource,
    VectorSourceTable,
};
pub use system::IconSystem;
