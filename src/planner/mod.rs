//! Display data derived from a trip: local time labels, travel estimates
//! between stops, day load, and map-link parsing. Nothing here touches the
//! database.

pub mod links;
pub mod load;
pub mod timezone;
pub mod travel;
pub mod view;

pub use links::{parse_place_link, ParsedLink};
pub use view::{build_itinerary, Itinerary};
