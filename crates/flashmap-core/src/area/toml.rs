//! TOML layout file parsing
//!
//! Parses layout files in TOML format:
//!
//! ```toml
//! [device]
//! name = "internal"
//! base_address = 0x08000000
//! size = "128 KiB"
//! page_size = "2 KiB"
//! program_granularity = 8
//! erased_value = 0xFF
//!
//! [[area]]
//! id = 0
//! offset = 0x000000
//! size = "24 KiB"
//!
//! [[area]]
//! id = 1
//! offset = 0x006000
//! size = "50 KiB"
//! ```
//!
//! Numbers may be decimal, hex (`0x...`), or sizes with a `B`/`KiB`/`MiB`
//! suffix. Loaded layouts are validated before they are returned.

use std::format;
use std::fs;
use std::path::Path;
use std::string::String;
use std::vec::Vec;

use super::layout::Layout;
use super::table::LayoutError;
use super::types::{AreaKind, FlashArea};
use crate::geometry::{FlashGeometry, INTERNAL_FLASH_DEVICE};

/// TOML layout file structure
#[derive(Debug, serde::Deserialize)]
struct TomlLayoutFile {
    device: Option<TomlDevice>,
    #[serde(default)]
    area: Vec<TomlArea>,
}

/// Device geometry section
#[derive(Debug, serde::Deserialize)]
struct TomlDevice {
    name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_number")]
    base_address: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_opt_number")]
    size: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_opt_number")]
    page_size: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_opt_number")]
    program_granularity: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_opt_number")]
    erased_value: Option<u32>,
}

/// Area definition in TOML
#[derive(Debug, serde::Deserialize)]
struct TomlArea {
    id: u8,
    #[serde(default)]
    device: Option<u8>,
    #[serde(deserialize_with = "deserialize_number")]
    offset: u32,
    #[serde(deserialize_with = "deserialize_number")]
    size: u32,
}

/// Integer or string form of a number
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Int(u32),
    Str(String),
}

impl NumberOrString {
    fn resolve(self) -> Result<u32, String> {
        match self {
            Self::Int(n) => Ok(n),
            Self::Str(s) => parse_size(&s),
        }
    }
}

/// Deserialize a u32 that can be hex (0x...), decimal or a size string
fn deserialize_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;

    NumberOrString::deserialize(deserializer)?
        .resolve()
        .map_err(serde::de::Error::custom)
}

/// Optional form of [`deserialize_number`]
fn deserialize_opt_number<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;

    match Option::<NumberOrString>::deserialize(deserializer)? {
        Some(value) => value.resolve().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Parse a size string like "2 KiB", "0x800" or "2048"
fn parse_size(s: &str) -> Result<u32, String> {
    let s = s.trim();

    // Try plain number first
    if let Ok(n) = s.parse::<u32>() {
        return Ok(n);
    }

    // Try hex
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        return u32::from_str_radix(hex.trim(), 16).map_err(|e| format!("invalid hex: {}", e));
    }

    // Try with suffix
    let s_lower = s.to_lowercase();
    let (num_str, multiplier) = if let Some(n) = s_lower.strip_suffix("mib") {
        (n.trim(), 1024 * 1024)
    } else if let Some(n) = s_lower.strip_suffix("kib") {
        (n.trim(), 1024)
    } else if let Some(n) = s_lower.strip_suffix("b") {
        (n.trim(), 1)
    } else {
        return Err(format!("invalid size: {}", s));
    };

    let num: u32 = num_str.parse().map_err(|_| format!("invalid size: {}", s))?;
    num.checked_mul(multiplier)
        .ok_or_else(|| format!("size too large: {}", s))
}

impl Layout {
    /// Load a layout from a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, LayoutError> {
        let content = fs::read_to_string(path).map_err(|_| LayoutError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parse a layout from a TOML string
    ///
    /// Geometry fields that are left out default to the internal flash.
    pub fn from_toml_str(content: &str) -> Result<Self, LayoutError> {
        let file: TomlLayoutFile = toml::from_str(content).map_err(|e| {
            log::debug!("layout parse error: {}", e);
            LayoutError::ParseError
        })?;

        let defaults = FlashGeometry::INTERNAL;
        let mut layout = Layout::new(defaults);

        if let Some(device) = file.device {
            let erased_value = match device.erased_value {
                Some(v) => u8::try_from(v).map_err(|_| LayoutError::ParseError)?,
                None => defaults.erased_value,
            };
            layout.name = device.name;
            layout.geometry = FlashGeometry {
                base_address: device.base_address.unwrap_or(defaults.base_address),
                total_size: device.size.unwrap_or(defaults.total_size),
                page_size: device.page_size.unwrap_or(defaults.page_size),
                program_granularity: device
                    .program_granularity
                    .unwrap_or(defaults.program_granularity),
                erased_value,
            };
        }

        for area in file.area {
            layout.add_area(FlashArea::new(
                area.id,
                area.device.unwrap_or(INTERNAL_FLASH_DEVICE),
                area.offset,
                area.size,
            ));
        }

        layout.sort_by_offset();
        layout.validate()?;
        Ok(layout)
    }

    /// Save layout to a TOML file
    pub fn to_toml_file(&self, path: impl AsRef<Path>) -> Result<(), LayoutError> {
        fs::write(path, self.to_toml_string()).map_err(|_| LayoutError::IoError)
    }

    /// Convert layout to TOML string
    pub fn to_toml_string(&self) -> String {
        let geo = &self.geometry;
        let mut output = String::new();

        output.push_str("[device]\n");
        if let Some(name) = &self.name {
            output.push_str(&format!("name = \"{}\"\n", name));
        }
        output.push_str(&format!("base_address = 0x{:08X}\n", geo.base_address));
        output.push_str(&format!("size = \"{}\"\n", format_size(geo.total_size)));
        output.push_str(&format!("page_size = \"{}\"\n", format_size(geo.page_size)));
        output.push_str(&format!("program_granularity = {}\n", geo.program_granularity));
        output.push_str(&format!("erased_value = 0x{:02X}\n", geo.erased_value));
        output.push('\n');

        for area in &self.areas {
            output.push_str(&format!("# {}\n", AreaKind::of(area.id)));
            output.push_str("[[area]]\n");
            output.push_str(&format!("id = {}\n", area.id));
            if area.device_id != INTERNAL_FLASH_DEVICE {
                output.push_str(&format!("device = {}\n", area.device_id));
            }
            output.push_str(&format!("offset = 0x{:08X}\n", area.base_offset));
            output.push_str(&format!("size = \"{}\"\n", format_size(area.size)));
            output.push('\n');
        }

        output
    }
}

/// Format a size as human-readable string
pub fn format_size(size: u32) -> String {
    if size >= 1024 * 1024 && size % (1024 * 1024) == 0 {
        format!("{} MiB", size / (1024 * 1024))
    } else if size >= 1024 && size % 1024 == 0 {
        format!("{} KiB", size / 1024)
    } else {
        format!("{}", size)
    }
}
