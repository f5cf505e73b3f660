use crate::error::{AugResult, AugmentError};
use crate::keypoints::KeypointsOnImage;
use ndarray::Array4;

/// A batch of images laid out as `N×H×W×C`.
pub type Images = Array4<u8>;

/// The unit of work passed through augmenters and the background pipeline.
///
/// Holds the images and, optionally, one [`KeypointsOnImage`] per image so
/// that annotations travel alongside the pixels they describe.
///
/// # Example
/// ```
/// use imgaug::{Batch, Keypoint, KeypointsOnImage};
/// use ndarray::Array4;
///
/// let images = Array4::<u8>::zeros((2, 32, 32, 3));
/// let keypoints = vec![
///     KeypointsOnImage::new(vec![Keypoint::new(4, 4)], (32, 32, 3)),
///     KeypointsOnImage::new(vec![], (32, 32, 3)),
/// ];
/// let batch = Batch::new(images).with_keypoints(keypoints).unwrap();
/// assert_eq!(batch.nb_images(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    images: Images,
    keypoints: Option<Vec<KeypointsOnImage>>,
}

impl Batch {
    pub fn new(images: Images) -> Self {
        Self {
            images,
            keypoints: None,
        }
    }

    /// Attaches per-image keypoints. Fails unless there is exactly one
    /// collection per image.
    pub fn with_keypoints(self, keypoints: Vec<KeypointsOnImage>) -> AugResult<Self> {
        Self::from_parts(self.images, Some(keypoints))
    }

    pub fn from_parts(
        images: Images,
        keypoints: Option<Vec<KeypointsOnImage>>,
    ) -> AugResult<Self> {
        if let Some(kps) = &keypoints {
            if kps.len() != images.dim().0 {
                return Err(AugmentError::invalid(format!(
                    "got {} keypoint collection(s) for {} image(s)",
                    kps.len(),
                    images.dim().0
                )));
            }
        }
        Ok(Self { images, keypoints })
    }

    pub fn into_parts(self) -> (Images, Option<Vec<KeypointsOnImage>>) {
        (self.images, self.keypoints)
    }

    pub fn images(&self) -> &Images {
        &self.images
    }

    pub fn keypoints(&self) -> Option<&[KeypointsOnImage]> {
        self.keypoints.as_deref()
    }

    pub fn nb_images(&self) -> usize {
        self.images.dim().0
    }

    pub fn height(&self) -> usize {
        self.images.dim().1
    }

    pub fn width(&self) -> usize {
        self.images.dim().2
    }

    pub fn nb_channels(&self) -> usize {
        self.images.dim().3
    }
}

impl From<Images> for Batch {
    fn from(images: Images) -> Self {
        Self::new(images)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keypoints::Keypoint;
    use anyhow::Result;

    #[test]
    fn test_batch_dimensions() {
        let batch = Batch::new(Images::zeros((3, 8, 10, 1)));
        assert_eq!(batch.nb_images(), 3);
        assert_eq!((batch.height(), batch.width()), (8, 10));
        assert_eq!(batch.nb_channels(), 1);
        assert!(batch.keypoints().is_none());
    }

    #[test]
    fn test_batch_keypoint_count_must_match() -> Result<()> {
        let kps = KeypointsOnImage::new(vec![Keypoint::new(1, 1)], (8, 10));
        let batch = Batch::new(Images::zeros((2, 8, 10, 1)));
        assert!(matches!(
            batch.clone().with_keypoints(vec![kps.clone()]),
            Err(AugmentError::InvalidArgument(_))
        ));

        let batch = batch.with_keypoints(vec![kps.clone(), kps])?;
        assert_eq!(batch.keypoints().map(<[_]>::len), Some(2));
        Ok(())
    }
}
