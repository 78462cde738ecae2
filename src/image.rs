//! Flash image files
//!
//! A flash image file holds the full contents of the internal flash. It is
//! loaded into a [`DummyFlash`] so that every command goes through the
//! same controller rules as the device itself.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use flashmap_core::FlashGeometry;
use flashmap_dummy::{DummyConfig, DummyFlash};

use crate::error::{CliError, Result};

/// Load a flash image, or create a fully erased one if the file is missing
pub fn load(path: &Path, geometry: &FlashGeometry) -> Result<DummyFlash> {
    let config = DummyConfig::from_geometry(geometry);

    match fs::read(path) {
        Ok(data) => {
            if data.len() != config.size {
                return Err(CliError::InvalidArgument(format!(
                    "image {} is {} bytes, expected {}",
                    path.display(),
                    data.len(),
                    config.size
                )));
            }
            log::debug!("Loaded {} bytes from {}", data.len(), path.display());
            Ok(DummyFlash::with_data(config, &data))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::info!(
                "{} does not exist, starting from an erased device",
                path.display()
            );
            Ok(DummyFlash::new(config))
        }
        Err(e) => Err(CliError::io(path, e)),
    }
}

/// Write the emulated flash contents back to an image file
pub fn save(path: &Path, flash: &DummyFlash) -> Result<()> {
    fs::write(path, flash.data()).map_err(|e| CliError::io(path, e))?;
    log::debug!("Saved {} bytes to {}", flash.data().len(), path.display());
    Ok(())
}
