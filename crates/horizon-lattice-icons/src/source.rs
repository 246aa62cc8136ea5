//! Icon sources: where icon data comes from and how it is decoded.
//!
//! An [`IconSource`] maps logical icon names to pixels. Two sources are
//! provided:
//!
//! - [`VectorIconSource`] keeps one vector document per name and rasterizes it
//!   at `natural size * display scale`. Entries can be added at runtime.
//! - [`TieredIconSource`] keeps pre-rendered bitmaps at fixed DPI tiers
//!   (96, 192 and 288) and picks the tier that best fits the display scale.
//!
//! Both are built from plain data tables, so applications can supply their own
//! icon sets without touching the pipeline.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::builtin;
use crate::decode::{ImageDecoder, RasterDecoder, SvgRasterizer, VectorRasterizer};
use crate::error::IconResult;
use crate::icon_image::IconImage;
use crate::logging::targets;

/// DPI of a display at scale 1.0.
pub const BASE_DPI: u32 = 96;

/// Standard bitmap tiers: 1x, 2x and 3x.
pub const DPI_TIERS: [u32; 3] = [BASE_DPI, BASE_DPI * 2, BASE_DPI * 3];

/// Produces icon pixels by name.
///
/// Implementations are called from the worker thread only, one request at a
/// time.
pub trait IconSource: Send + Sync + 'static {
    /// All names this source can load, sorted.
    fn names(&self) -> Vec<String>;

    /// Load `name` at `display_scale`.
    ///
    /// Returns `Ok(None)` for an unknown name and `Err` when the data exists
    /// but cannot be decoded.
    fn load(&self, name: &str, display_scale: f32) -> IconResult<Option<IconImage>>;
}

// ============================================================================
// Vector sources
// ============================================================================

/// Name to vector document table.
#[derive(Debug, Clone, Default)]
pub struct VectorSourceTable {
    entries: HashMap<String, Arc<[u8]>>,
}

impl VectorSourceTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(name, data)` pairs. Later duplicates win.
    pub fn from_entries<N, D, I>(entries: I) -> Self
    where
        N: Into<String>,
        D: Into<Arc<[u8]>>,
        I: IntoIterator<Item = (N, D)>,
    {
        let mut table = Self::new();
        for (name, data) in entries {
            table.insert(name, data);
        }
        table
    }

    /// Insert or replace an entry.
    pub fn insert(&mut self, name: impl Into<String>, data: impl Into<Arc<[u8]>>) {
        self.entries.insert(name.into(), data.into());
    }

    /// Get the document for `name`.
    pub fn get(&self, name: &str) -> Option<Arc<[u8]>> {
        self.entries.get(name).cloned()
    }

    /// Check if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Source that rasterizes vector documents on demand.
///
/// # Example
///
/// ```
/// use horizon_lattice_icons::{IconSource, VectorIconSource, VectorSourceTable};
///
/// let source = VectorIconSource::new(VectorSourceTable::new());
/// source.add(
///     "Dot",
///     br#"<svg xmlns="http://www.w3.org/2000/svg" width="8" height="8"><rect width="8" height="8"/></svg>"#.to_vec(),
/// );
///
/// let image = source.load("Dot", 2.0).unwrap().unwrap();
/// assert_eq!(image.size(), (16, 16));
/// assert!(source.load("Missing", 1.0).unwrap().is_none());
/// ```
pub struct VectorIconSource {
    table: RwLock<VectorSourceTable>,
    rasterizer: Box<dyn VectorRasterizer>,
}

impl VectorIconSource {
    /// Create a source rendering `table` with [`SvgRasterizer`].
    pub fn new(table: VectorSourceTable) -> Self {
        Self::with_rasterizer(table, SvgRasterizer)
    }

    /// Create a source with a custom rasterizer.
    pub fn with_rasterizer(
        table: VectorSourceTable,
        rasterizer: impl VectorRasterizer + 'static,
    ) -> Self {
        Self {
            table: RwLock::new(table),
            rasterizer: Box::new(rasterizer),
        }
    }

    /// Create a source holding the built-in icon set.
    pub fn builtin() -> Self {
        Self::new(builtin::builtin_table())
    }

    /// Register or replace the document for `name`.
    ///
    /// Only decodes that happen afterwards see the new data.
    pub fn add(&self, name: impl Into<String>, data: impl Into<Arc<[u8]>>) {
        let name = name.into();
        tracing::debug!(target: targets::SOURCE, name = %name, "registering vector icon");
        self.table.write().insert(name, data);
    }

    /// Check if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.table.read().contains(name)
    }
}

impl Default for VectorIconSource {
    fn default() -> Self {
        Self::builtin()
    }
}

impl IconSource for VectorIconSource {
    fn names(&self) -> Vec<String> {
        self.table.read().names()
    }

    fn load(&self, name: &str, display_scale: f32) -> IconResult<Option<IconImage>> {
        // Release the lock before rasterizing
        let Some(data) = self.table.read().get(name) else {
            return Ok(None);
        };
        self.rasterizer.render(&data, display_scale).map(Some)
    }
}

impl std::fmt::Debug for VectorIconSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorIconSource")
            .field("icons", &self.table.read().len())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tiered bitmap sources
// ============================================================================

/// Name to `{dpi -> encoded bitmap}` table.
#[derive(Debug, Clone, Default)]
pub struct TieredSourceTable {
    entries: HashMap<String, BTreeMap<u32, Arc<[u8]>>>,
}

impl TieredSourceTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(name, dpi, data)` triples.
    pub fn from_entries<N, D, I>(entries: I) -> Self
    where
        N: Into<String>,
        D: Into<Arc<[u8]>>,
        I: IntoIterator<Item = (N, u32, D)>,
    {
        let mut table = Self::new();
        for (name, dpi, data) in entries {
            table.insert(name, dpi, data);
        }
        table
    }

    /// Insert or replace one tier of an icon.
    pub fn insert(&mut self, name: impl Into<String>, dpi: u32, data: impl Into<Arc<[u8]>>) {
        self.entries
            .entry(name.into())
            .or_default()
            .insert(dpi, data.into());
    }

    /// Pick the tier of `name` for `display_scale`.
    ///
    /// The smallest tier whose DPI is at least `96 * display_scale` wins. If
    /// every tier is smaller, the largest one is used.
    pub fn select(&self, name: &str, display_scale: f32) -> Option<(u32, Arc<[u8]>)> {
        let tiers = self.entries.get(name)?;
        let required = BASE_DPI as f32 * display_scale;
        tiers
            .iter()
            .find(|&(&dpi, _)| dpi as f32 >= required)
            .or_else(|| tiers.iter().next_back())
            .map(|(&dpi, data)| (dpi, Arc::clone(data)))
    }

    /// Available tiers of `name`, ascending.
    pub fn tiers(&self, name: &str) -> Vec<u32> {
        self.entries
            .get(name)
            .map(|tiers| tiers.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of icons (not tiers).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Source that decodes pre-rendered bitmaps, choosing a DPI tier per request.
pub struct TieredIconSource {
    table: TieredSourceTable,
    decoder: Box<dyn RasterDecoder>,
}

impl TieredIconSource {
    /// Create a source decoding `table` with [`ImageDecoder`].
    pub fn new(table: TieredSourceTable) -> Self {
        Self::with_decoder(table, ImageDecoder)
    }

    /// Create a source with a custom decoder.
    pub fn with_decoder(table: TieredSourceTable, decoder: impl RasterDecoder + 'static) -> Self {
        Self {
            table,
            decoder: Box::new(decoder),
        }
    }

    /// The underlying table.
    pub fn table(&self) -> &TieredSourceTable {
        &self.table
    }
}

impl IconSource for TieredIconSource {
    fn names(&self) -> Vec<String> {
        self.table.names()
    }

    fn load(&self, name: &str, display_scale: f32) -> IconResult<Option<IconImage>> {
        let Some((dpi, data)) = self.table.select(name, display_scale) else {
            return Ok(None);
        };
        tracing::trace!(
            target: targets::SOURCE,
            name,
            display_scale,
            dpi,
            "selected bitmap tier"
        );
        self.decoder.decode(name, &data).map(Some)
    }
}

impl std::fmt::Debug for TieredIconSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TieredIconSource")
            .field("icons", &self.table.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Decoder reporting which tier it was handed through the image width.
    struct TierWidthDecoder;

    impl RasterDecoder for TierWidthDecoder {
        fn decode(&self, _name_hint: &str, bytes: &[u8]) -> IconResult<IconImage> {
            let dpi = std::str::from_utf8(bytes).unwrap().parse::<u32>().unwrap();
            IconImage::solid(dpi, 1, [0; 4])
        }
    }

    struct CountingRasterizer(Arc<AtomicUsize>);

    impl VectorRasterizer for CountingRasterizer {
        fn render(&self, source: &[u8], display_scale: f32) -> IconResult<IconImage> {
            self.0.fetch_add(1, Ordering::SeqCst);
            let side = (source.len() as f32 * display_scale) as u32;
            IconImage::solid(side, side, [1, 2, 3, 4])
        }
    }

    fn tiered(name: &str, dpis: &[u32]) -> TieredSourceTable {
        TieredSourceTable::from_entries(
            dpis.iter()
                .map(|&dpi| (name.to_string(), dpi, dpi.to_string().into_bytes())),
        )
    }

    #[test]
    fn test_vector_table() {
        let table = VectorSourceTable::from_entries([("b", b"1".to_vec()), ("a", b"2".to_vec())]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.names(), vec!["a", "b"]);
        assert_eq!(table.get("a").as_deref(), Some(&b"2"[..]));
        assert!(table.get("c").is_none());
        assert!(!table.is_empty());
    }

    #[test]
    fn test_tier_selection() {
        let table = tiered("Close", &DPI_TIERS);

        assert_eq!(table.select("Close", 1.0).map(|(dpi, _)| dpi), Some(96));
        assert_eq!(table.select("Close", 1.5).map(|(dpi, _)| dpi), Some(192));
        assert_eq!(table.select("Close", 2.0).map(|(dpi, _)| dpi), Some(192));
        assert_eq!(table.select("Close", 2.5).map(|(dpi, _)| dpi), Some(288));
        assert_eq!(table.select("Close", 3.0).map(|(dpi, _)| dpi), Some(288));
        assert_eq!(table.select("Close", 0.5).map(|(dpi, _)| dpi), Some(96));
        assert!(table.select("Open", 1.0).is_none());
    }

    #[test]
    fn test_tier_fallback_to_largest() {
        let table = tiered("Close", &[96, 192]);
        assert_eq!(table.select("Close", 3.0).map(|(dpi, _)| dpi), Some(192));
        assert_eq!(table.tiers("Close"), vec![96, 192]);
        assert!(table.tiers("Open").is_empty());
    }

    #[test]
    fn test_tiered_source_load() {
        let source = TieredIconSource::with_decoder(tiered("Close", &DPI_TIERS), TierWidthDecoder);

        let image = source.load("Close", 2.0).unwrap().unwrap();
        assert_eq!(image.width(), 192);
        assert!(source.load("Open", 2.0).unwrap().is_none());
        assert_eq!(source.names(), vec!["Close"]);
    }

    #[test]
    fn test_vector_source_add_replaces() {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = VectorIconSource::with_rasterizer(
            VectorSourceTable::from_entries([("Dot", b"abcd".to_vec())]),
            CountingRasterizer(Arc::clone(&calls)),
        );

        assert_eq!(source.load("Dot", 1.0).unwrap().unwrap().width(), 4);
        source.add("Dot", b"ab".to_vec());
        assert_eq!(source.load("Dot", 1.0).unwrap().unwrap().width(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        // Unknown names never reach the rasterizer
        assert!(source.load("Missing", 1.0).unwrap().is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_builtin_source_has_settings() {
        let source = VectorIconSource::builtin();
        assert!(source.contains("Settings"));
        assert!(source.names().contains(&"Settings".to_string()));
    }
}
