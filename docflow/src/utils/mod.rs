//! Utility functions for time handling.

pub mod timestamps;

pub use timestamps::{
    format_date, format_timestamp, iso_timestamp, Clock, FixedClock, SystemClock, Timestamp,
};
