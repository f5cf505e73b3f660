//! Dense keypoint images.
//!
//! A collection of `K` keypoints on an `H×W` image is encoded as an `H×W×K`
//! `u8` array holding exactly one `255` pixel per channel at the keypoint's
//! location. The encoding is lossy: a keypoint outside the image leaves its
//! channel all-zero, and decoding such a channel falls back to the
//! [`IfNotFound`] policy.

use super::{Keypoint, KeypointsOnImage};
use crate::error::{AugResult, AugmentError};
use crate::geometry::Value;
use ndarray::{Array3, Axis};

/// Pixel value marking a keypoint in its channel.
pub const KEYPOINT_PIXEL: u8 = 255;

/// What to emit for a channel whose maximum is below the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IfNotFound {
    /// Leave the keypoint out; the decoded collection shrinks.
    Drop,
    /// Emit a keypoint at these fallback coordinates.
    Coords { x: i32, y: i32 },
}

impl Default for IfNotFound {
    fn default() -> Self {
        IfNotFound::Coords { x: -1, y: -1 }
    }
}

impl From<(i32, i32)> for IfNotFound {
    fn from((x, y): (i32, i32)) -> Self {
        IfNotFound::Coords { x, y }
    }
}

impl TryFrom<Option<&Value>> for IfNotFound {
    type Error = AugmentError;

    /// `None` drops missing keypoints; a two-element sequence `[x, y]` or a
    /// mapping with `x` and `y` entries gives fallback coordinates.
    fn try_from(value: Option<&Value>) -> AugResult<Self> {
        let coords = match value {
            None => return Ok(IfNotFound::Drop),
            Some(Value::Sequence(items)) if items.len() == 2 => {
                Keypoint::from_values(&items[0], &items[1])?
            }
            Some(Value::Sequence(items)) => {
                return Err(AugmentError::invalid(format!(
                    "fallback coordinates need exactly 2 entries, got {}",
                    items.len()
                )))
            }
            Some(Value::Mapping(fields)) => match (fields.get("x"), fields.get("y")) {
                (Some(x), Some(y)) => Keypoint::from_values(x, y)?,
                _ => {
                    return Err(AugmentError::invalid(
                        "fallback coordinates mapping needs both 'x' and 'y'",
                    ))
                }
            },
            Some(other) => {
                return Err(AugmentError::invalid(format!(
                    "expected fallback coordinates as none, a sequence or a mapping, got {}",
                    other.kind()
                )))
            }
        };
        Ok(IfNotFound::Coords {
            x: coords.x(),
            y: coords.y(),
        })
    }
}

impl KeypointsOnImage {
    /// Encodes the collection as an `H×W×K` dense keypoint image.
    ///
    /// Fails on an empty collection since the channel count comes from the
    /// number of keypoints.
    pub fn to_keypoint_image(&self) -> AugResult<Array3<u8>> {
        if self.is_empty() {
            return Err(AugmentError::precondition(
                "cannot encode an empty keypoint collection as a keypoint image",
            ));
        }
        let (height, width) = (self.height(), self.width());
        let mut image = Array3::<u8>::zeros((height, width, self.len()));
        for (i, kp) in self.keypoints().iter().enumerate() {
            let (Ok(x), Ok(y)) = (usize::try_from(kp.x()), usize::try_from(kp.y())) else {
                continue;
            };
            if y < height && x < width {
                image[[y, x, i]] = KEYPOINT_PIXEL;
            }
        }
        Ok(image)
    }

    /// Decodes a dense keypoint image.
    ///
    /// Each channel yields the location of its maximum when that maximum is
    /// at least `threshold`. Ties resolve to the first pixel in row-major
    /// order. Channels below the threshold follow `if_not_found`.
    pub fn from_keypoint_image(
        image: &Array3<u8>,
        if_not_found: IfNotFound,
        threshold: u8,
    ) -> AugResult<Self> {
        let (height, width, nb_keypoints) = image.dim();
        let mut keypoints = Vec::with_capacity(nb_keypoints);

        for channel in image.axis_iter(Axis(2)) {
            let mut best: Option<((usize, usize), u8)> = None;
            for (pos, &value) in channel.indexed_iter() {
                if best.map_or(true, |(_, max)| value > max) {
                    best = Some((pos, value));
                }
            }

            match (best, if_not_found) {
                (Some(((y, x), max)), _) if max >= threshold => {
                    keypoints.push(Keypoint::new(to_i32(x)?, to_i32(y)?));
                }
                (_, IfNotFound::Drop) => {}
                (_, IfNotFound::Coords { x, y }) => keypoints.push(Keypoint::new(x, y)),
            }
        }

        Ok(Self::new(keypoints, (height, width)))
    }

    /// [`from_keypoint_image`](Self::from_keypoint_image) with dynamically
    /// typed fallback coordinates.
    pub fn from_keypoint_image_value(
        image: &Array3<u8>,
        if_not_found_coords: Option<&Value>,
        threshold: u8,
    ) -> AugResult<Self> {
        let policy = IfNotFound::try_from(if_not_found_coords)?;
        Self::from_keypoint_image(image, policy, threshold)
    }
}

fn to_i32(v: usize) -> AugResult<i32> {
    i32::try_from(v).map_err(|_| AugmentError::invalid(format!("pixel index {} exceeds i32", v)))
}
