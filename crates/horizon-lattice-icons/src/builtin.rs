//! The built-in icon set.
//!
//! Icons are SVG files in the crate's `icons/` directory, embedded at compile
//! time. An icon's name is its file stem: `icons/Settings.svg` is `"Settings"`.

use std::path::Path;

use include_dir::{Dir, include_dir};

use crate::source::VectorSourceTable;

static BUILTIN_ICONS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/icons");

/// Get the SVG data of a built-in icon.
pub fn builtin_svg(name: &str) -> Option<&'static [u8]> {
    BUILTIN_ICONS
        .get_file(format!("{name}.svg"))
        .map(|file| file.contents())
}

/// Names of all built-in icons, sorted.
pub fn builtin_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = BUILTIN_ICONS
        .files()
        .filter_map(|file| svg_stem(file.path()))
        .collect();
    names.sort_unstable();
    names
}

/// Build a source table holding every built-in icon.
pub fn builtin_table() -> VectorSourceTable {
    VectorSourceTable::from_entries(BUILTIN_ICONS.files().filter_map(|file| {
        svg_stem(file.path()).map(|name| (name, file.contents().to_vec()))
    }))
}

fn svg_stem(path: &'static Path) -> Option<&'static str> {
    if path.extension()? != "svg" {
        return None;
    }
    path.file_stem()?.to_str()
}
