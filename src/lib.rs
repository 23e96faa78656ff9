//! Decoder for Estimote nearable advertisements.
//!
//! A nearable broadcasts its sensor readings inside a BLE advertisement. The
//! [`decode`] function validates one advertisement structure against the
//! nearable frame markers and turns the raw fields into a [`Nearable`]
//! record: identifiers, temperature, acceleration, orientation, battery level
//! and version strings. [`decode_advertisement`] walks a whole payload.
//!
//! ```
//! use nearable_decoder::{decode, DecodedRecord};
//!
//! let flags_only = [0x02, 0x01, 0x06];
//! let record = decode(&flags_only).unwrap();
//! assert_eq!(record, DecodedRecord::Unrecognized { bytes_consumed: 3 });
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod nearable;
pub mod utils;

pub use error::DecodeError;
pub use models::{
    Acceleration, BatteryLevel, DecodedAdvertisement, DecodedRecord, Nearable, Orientation,
};
pub use nearable::{decode, decode_advertisement, AdStructures};
