//! Facility snapshots with indexed lookups.

pub mod static_directory;

pub use static_directory::FacilityDirectory;
