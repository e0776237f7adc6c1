//! Blogforge-Media: image normalization for uploads.
//!
//! Every user-supplied image passes through [`normalize`] before it is
//! stored, so that storage and bandwidth stay bounded no matter how large the
//! original photo was.
//!
//! # Pipeline
//!
//! 1. Decode the input bytes with whatever codec matches their signature
//! 2. Compute the target size with [`fit_within`] (never upscales)
//! 3. Resample with a CatmullRom filter when the size changes
//! 4. Re-encode as JPEG at the requested quality
//!
//! # Example
//!
//! ```
//! use blogforge_media::fit_within;
//!
//! assert_eq!(fit_within(4000, 3000, 1200, 1200), (1200, 900));
//! assert_eq!(fit_within(800, 2400, 1200, 1200), (400, 1200));
//! assert_eq!(fit_within(600, 400, 1200, 1200), (600, 400));
//! ```

pub mod error;
pub mod normalize;

pub use error::{Error, Result};
pub use normalize::{
    fit_within, normalize, ImageAsset, NormalizeOptions, NormalizedImage, DEFAULT_MAX_HEIGHT,
    DEFAULT_MAX_WIDTH, DEFAULT_QUALITY,
};
