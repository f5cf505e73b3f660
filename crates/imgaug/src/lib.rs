//! Image augmentation primitives for machine-learning data pipelines.
//!
//! # Crate Organization
//!
//! ```text
//! src/
//! ├── error.rs       # AugmentError, the primitives' failure categories
//! ├── geometry.rs    # Value classification, Shape, coordinate projection
//! ├── random.rs      # RandomState, explicit seedable generators
//! ├── imresize.rs    # batch / single-image / grayscale resizing
//! ├── keypoints/     # Keypoint, KeypointsOnImage, dense keypoint images
//! ├── batch.rs       # Batch: images plus optional keypoints
//! ├── hooks.rs       # activator / propagator / pre- and postprocessor callbacks
//! ├── augmenters/    # Augmenter trait, Sequential, Resize, Fliplr
//! └── background/    # worker threads feeding a bounded queue of batches
//! ```
//!
//! # Example
//! ```
//! use imgaug::augmenters::{Augmenter, Fliplr, Resize, Sequential};
//! use imgaug::random::RandomState;
//! use imgaug::{Batch, Keypoint, KeypointsOnImage};
//! use ndarray::Array4;
//!
//! let seq = Sequential::new(vec![])
//!     .then(Resize::new(32, 32)?)
//!     .then(Fliplr::new(0.5)?);
//!
//! let batch = Batch::new(Array4::<u8>::zeros((1, 64, 64, 3))).with_keypoints(vec![
//!     KeypointsOnImage::new(vec![Keypoint::new(10, 20)], (64, 64, 3)),
//! ])?;
//! let out = seq.transform(batch, &mut RandomState::new(1))?;
//! assert_eq!(out.images().dim(), (1, 32, 32, 3));
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod augmenters;
pub mod background;
pub mod batch;
pub mod error;
pub mod geometry;
pub mod hooks;
pub mod imresize;
pub mod keypoints;
pub mod random;

pub use batch::{Batch, Images};
pub use error::{AugResult, AugmentError};
pub use geometry::{Shape, Value};
pub use imresize::Interpolation;
pub use keypoints::{IfNotFound, Keypoint, KeypointsOnImage};
pub use random::RandomState;
