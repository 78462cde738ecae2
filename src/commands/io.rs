//! Read, write and erase command implementations
//!
//! These operate on a flash image file through the emulated controller, so
//! requests are checked exactly as the bootloader would check them.

use std::fs;
use std::path::Path;
use std::time::Duration;

use flashmap_core::area::{format_size, Layout};
use flashmap_core::validate::validate_rw;
use flashmap_core::{Error, FlashArea, FlashMap};
use flashmap_dummy::DummyFlash;
use indicatif::{ProgressBar, ProgressStyle};

use super::resolve_area;
use crate::cli::AreaArgs;
use crate::error::{CliError, Result};
use crate::image;

/// Load the image named by `target` and bind it to the layout
fn open_map<'a>(layout: &'a Layout, target: &AreaArgs) -> Result<FlashMap<'a, DummyFlash>> {
    let flash = image::load(&target.image_file, &layout.geometry)?;
    Ok(FlashMap::with_table(flash, layout.geometry, &layout.areas)?)
}

/// Requested length, or the rest of the area after `offset`
fn request_len(area: &FlashArea, target: &AreaArgs) -> Result<u32> {
    match target.length {
        Some(len) => Ok(len),
        None => area.size.checked_sub(target.offset).ok_or(CliError::Flash(
            Error::OutOfBounds {
                offset: target.offset,
                len: 0,
                area_size: area.size,
            },
        )),
    }
}

/// Save the image if the request reached the controller
///
/// A request rejected by validation has had no effect on the device.
fn save_if_touched(target: &AreaArgs, flash: &DummyFlash) -> Result<()> {
    if flash.ops().is_empty() {
        return Ok(());
    }
    image::save(&target.image_file, flash)
}

/// Read part of an area to a file
pub fn cmd_read(layout: &Layout, target: &AreaArgs, output: &Path) -> Result<()> {
    let area = resolve_area(layout, &target.area)?;
    let len = request_len(&area, target)?;
    validate_rw(&area, target.offset, len)?;
    let map = open_map(layout, target)?;

    let mut buf = vec![0u8; len as usize];
    map.read(&area, target.offset, &mut buf)?;
    fs::write(output, &buf).map_err(|e| CliError::io(output, e))?;

    println!(
        "Read {} from area {} ({}) offset 0x{:X} to {:?}",
        format_size(len),
        area.id,
        area.kind(),
        target.offset,
        output
    );
    Ok(())
}

/// Program a file into an area
///
/// The image is saved even if programming fails part way, since the
/// chunks before the failure stay programmed.
pub fn cmd_write(layout: &Layout, target: &AreaArgs, input: &Path) -> Result<()> {
    let area = resolve_area(layout, &target.area)?;
    let mut data = fs::read(input).map_err(|e| CliError::io(input, e))?;
    if let Some(len) = target.length {
        if len as usize > data.len() {
            return Err(CliError::InvalidArgument(format!(
                "length 0x{:X} exceeds input size 0x{:X}",
                len,
                data.len()
            )));
        }
        data.truncate(len as usize);
    }

    let mut map = open_map(layout, target)?;
    let result = map.write(&area, target.offset, &data);
    save_if_touched(target, map.controller())?;
    result?;

    println!(
        "Wrote {} bytes to area {} ({}) offset 0x{:X}",
        data.len(),
        area.id,
        area.kind(),
        target.offset
    );
    Ok(())
}

/// Erase pages of an area with a progress spinner
pub fn cmd_erase(layout: &Layout, target: &AreaArgs) -> Result<()> {
    let area = resolve_area(layout, &target.area)?;
    let mut map = open_map(layout, target)?;
    let len = request_len(&area, target)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(format!(
        "Erasing {} of area {} ({})...",
        format_size(len),
        area.id,
        area.kind()
    ));
    pb.enable_steady_tick(Duration::from_millis(100));

    let result = map.erase(&area, target.offset, len);
    if result.is_err() {
        pb.abandon_with_message("Erase failed");
    }
    save_if_touched(target, map.controller())?;
    result?;

    pb.finish_with_message(format!("Erased {}", format_size(len)));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn target(image_file: PathBuf, area: &str, offset: u32, length: Option<u32>) -> AreaArgs {
        AreaArgs {
            image_file,
            area: area.to_string(),
            offset,
            length,
        }
    }

    #[test]
    fn test_write_read_erase_image() {
        let dir = tempdir().unwrap();
        let image_file = dir.path().join("flash.bin");
        let input = dir.path().join("in.bin");
        let output = dir.path().join("out.bin");
        let layout = Layout::internal();

        let payload: Vec<u8> = (0..100u8).collect();
        fs::write(&input, &payload).unwrap();

        let args = target(image_file.clone(), "image-0-primary", 0x800, None);
        cmd_write(&layout, &args, &input).unwrap();

        let image = fs::read(&image_file).unwrap();
        assert_eq!(&image[0x6800..0x6800 + 100], payload.as_slice());
        // Tail of the last double word is padded
        assert_eq!(&image[0x6800 + 100..0x6800 + 104], &[0xFF; 4]);

        let args = target(image_file.clone(), "1", 0x800, Some(100));
        cmd_read(&layout, &args, &output).unwrap();
        assert_eq!(fs::read(&output).unwrap(), payload);

        let args = target(image_file.clone(), "1", 0x800, Some(2048));
        cmd_erase(&layout, &args).unwrap();
        let image = fs::read(&image_file).unwrap();
        assert!(image[0x6800..0x7000].iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_erase_misaligned_leaves_no_image() {
        let dir = tempdir().unwrap();
        let image_file = dir.path().join("flash.bin");
        let layout = Layout::internal();

        let args = target(image_file.clone(), "scratch", 0x10, Some(2048));
        assert!(matches!(
            cmd_erase(&layout, &args),
            Err(CliError::Flash(Error::Misaligned { .. }))
        ));
        assert!(!image_file.exists());
    }

    #[test]
    fn test_write_over_programmed_data_fails() {
        let dir = tempdir().unwrap();
        let image_file = dir.path().join("flash.bin");
        let input = dir.path().join("in.bin");
        let layout = Layout::internal();
        fs::write(&input, [0u8; 8]).unwrap();

        let args = target(image_file, "scratch", 0, None);
        cmd_write(&layout, &args, &input).unwrap();
        assert!(matches!(
            cmd_write(&layout, &args, &input),
            Err(CliError::Flash(Error::ProgramFailed { addr: 0x1F000, .. }))
        ));
    }

    #[test]
    fn test_read_past_area_end() {
        let dir = tempdir().unwrap();
        let layout = Layout::internal();
        let args = target(dir.path().join("flash.bin"), "scratch", 0x2000, None);
        assert!(matches!(
            cmd_read(&layout, &args, &dir.path().join("out.bin")),
            Err(CliError::Flash(Error::OutOfBounds { .. }))
        ));
    }

    #[test]
    fn test_read_huge_length_is_rejected() {
        let dir = tempdir().unwrap();
        let layout = Layout::internal();
        let output = dir.path().join("out.bin");
        let args = target(dir.path().join("flash.bin"), "scratch", 0, Some(0xFFFF_FFFF));
        assert!(matches!(
            cmd_read(&layout, &args, &output),
            Err(CliError::Flash(Error::OutOfBounds {
                offset: 0,
                len: 0xFFFF_FFFF,
                area_size: 0x1000
            }))
        ));
        assert!(!output.exists());
    }
}
