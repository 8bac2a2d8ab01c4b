/// Error type shared by the core and the asset loader.
///
/// Missing or unreadable files are not errors: the loader substitutes
/// defaults. Only malformed pixel data, a layout image that does not
/// line up with the scenery, and a maze with nowhere to stand are fatal.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid image: {0}")]
    InvalidImage(String),

    #[error("layout image is {layout_w}x{layout_h} but scenery is {scenery_w}x{scenery_h}")]
    DimensionMismatch {
        scenery_w: u32,
        scenery_h: u32,
        layout_w: u32,
        layout_h: u32,
    },

    #[error("layout has no walkable cell")]
    NoWalkableCell,

    #[error("image decode failed: {0}")]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
