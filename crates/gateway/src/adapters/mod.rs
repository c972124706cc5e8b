//! Venue adapters
//!
//! Each adapter converts one venue's codes and record shapes to the
//! canonical model and implements [`crate::exchange::Exchange`].

pub mod bitmex;

pub use bitmex::BitmexAdapter;
