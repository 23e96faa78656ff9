pub mod decoder;
pub mod interpreters;

pub use decoder::{decode, decode_advertisement, AdStructures};
