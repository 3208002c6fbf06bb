pub mod download;
pub mod image;

pub use download::*;
pub use image::*;
