//! Data models for the image pipeline
//!
//! `image` holds the in-memory gallery entry owned by the image manager; `record`
//! holds the wire types exchanged with the persistence API.

mod image;
mod record;

pub use image::*;
pub use record::*;
