//! Flash area registry
//!
//! Areas are named regions of the internal flash identified by a small
//! integer id. The registry is a fixed table searched linearly; areas are
//! never created or destroyed at run time, so opening and closing them is
//! free.
//!
//! Host-side tools can also describe layouts in TOML files (with the `std`
//! feature), which are validated against the same invariants as the
//! built-in table.

mod table;
mod types;

#[cfg(feature = "alloc")]
mod layout;
#[cfg(feature = "std")]
mod toml;

pub use table::*;
pub use types::*;

#[cfg(feature = "alloc")]
pub use layout::Layout;
#[cfg(feature = "std")]
pub use toml::format_size;
