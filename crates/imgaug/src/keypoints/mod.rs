//! Keypoint annotations that follow their image through augmentation.
//!
//! ```text
//! keypoints/
//! ├── keypoint.rs   → single integer 2D point (project, shift)
//! ├── on_image.rs   → KeypointsOnImage: points anchored to an image shape
//! └── dense.rs      → dense H×W×K keypoint image encode/decode
//! ```

mod dense;
mod keypoint;
mod on_image;

pub use dense::{IfNotFound, KEYPOINT_PIXEL};
pub use keypoint::Keypoint;
pub use on_image::KeypointsOnImage;
