//! Pure data structures shared by the site backend and its clients.

mod itinerary;
mod media_type;
pub mod upload_policy;

pub use itinerary::{ExperienceInput, Itinerary, ItineraryParts, LineItem};
pub use media_type::MediaType;
