//! Flash area access
//!
//! This module provides [`FlashMap`], which binds the area table to the
//! flash controller and performs validated reads, writes and erases.

mod map;

pub use map::FlashMap;
