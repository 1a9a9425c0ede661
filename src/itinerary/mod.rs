//! Rules that keep a trip's schedule consistent: one day per calendar date,
//! gap-free positions, and turning ideas or places into activities.

pub mod days;
pub mod ordering;
pub mod promotion;
