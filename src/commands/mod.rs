//! CLI command implementations
//!
//! Every command works on a [`Layout`]: either the built-in area table or
//! one loaded from a TOML file with `--layout`.

pub mod io;
pub mod layout;
pub mod sectors;
pub mod slot;

use std::path::Path;

use flashmap_core::area::{AreaKind, Layout};
use flashmap_core::FlashArea;

use crate::error::{CliError, Result};

/// Load the layout named on the command line, or the built-in one
pub fn load_layout(path: Option<&Path>) -> Result<Layout> {
    let layout = match path {
        Some(path) => {
            log::debug!("Loading layout from {}", path.display());
            Layout::from_toml_file(path)?
        }
        None => Layout::internal(),
    };
    log::debug!("Layout has {} areas", layout.areas.len());
    Ok(layout)
}

/// Find an area by numeric id or by name
pub fn resolve_area(layout: &Layout, name: &str) -> Result<FlashArea> {
    let id = match name.parse::<u8>() {
        Ok(id) => Some(id),
        Err(_) => layout
            .areas
            .iter()
            .find(|area| AreaKind::of(area.id).to_string() == name)
            .map(|area| area.id),
    };

    let id = id.ok_or_else(|| CliError::UnknownArea(name.to_string()))?;
    Ok(*layout.open(id)?)
}
