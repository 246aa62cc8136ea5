//! Icon gallery example.
//!
//! Requests every built-in icon at 1x and 2x, waits for the worker, and logs
//! the decoded sizes along with the cache statistics.
//!
//! Run with: cargo run -p horizon-lattice-icons --example icon_gallery
//!
//! Set `RUST_LOG=horizon_lattice_icons=trace` to watch the queue.

use std::time::Instant;

use horizon_lattice_icons::{IconResult, IconSystem, IconSystemConfig};
use tracing_subscriber::EnvFilter;

const SCALES: [f32; 2] = [1.0, 2.0];

fn main() -> IconResult<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let icons = IconSystem::with_config(IconSystemConfig::default().with_batch_size(4))?;
    let names = icons.names();

    let started = Instant::now();
    let requests: Vec<_> = names
        .iter()
        .flat_map(|name| SCALES.map(|scale| (name.as_str(), scale)))
        .map(|(name, scale)| (name, scale, icons.request(name, scale)))
        .collect();
    tracing::info!(
        requests = requests.len(),
        pending = icons.pending_requests(),
        "queued icon requests"
    );

    for (name, scale, request) in requests {
        match request.future.wait() {
            Some(image) => tracing::info!(
                id = request.id,
                name,
                scale,
                width = image.width(),
                height = image.height(),
                "icon ready"
            ),
            None => tracing::warn!(id = request.id, name, scale, "icon unavailable"),
        }
    }

    // Second pass is served from the cache
    for name in &names {
        let _ = icons.get(name, 1.0);
    }

    let stats = icons.cache_stats();
    tracing::info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        entries = stats.entries,
        usage = %format!("{:.1}%", stats.usage_percent()),
        hit_rate = %format!("{:.1}%", stats.hit_rate * 100.0),
        "gallery complete"
    );

    icons.shutdown();
    Ok(())
}
