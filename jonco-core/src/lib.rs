pub mod api;
pub mod config;
pub mod handoff;
pub mod itinerary_store;
pub mod media;
pub mod media_store;
pub mod site;
pub mod snapshot_storage;
pub mod supabase;
pub mod uploader;

pub use jonco_common;
