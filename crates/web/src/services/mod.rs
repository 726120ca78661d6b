//! Application services sitting between route handlers and the backend.

pub mod listing;

pub use listing::{Listing, ListingService};
