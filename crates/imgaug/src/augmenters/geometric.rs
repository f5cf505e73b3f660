use super::Augmenter;
use crate::batch::Images;
use crate::geometry::Shape;
use crate::hooks::{HooksImages, HooksKeypoints};
use crate::imresize::{imresize_many_images, Interpolation};
use crate::keypoints::KeypointsOnImage;
use crate::random::RandomState;
use anyhow::{ensure, Result};

// ============================================================================
// Resize
// ============================================================================

/// Resizes all images of a batch to a fixed `(height, width)`.
/// Keypoints are projected onto the new size.
///
/// Without an explicit interpolation the choice is left to
/// [`imresize_many_images`]: `Area` when enlarging, `Linear` otherwise.
///
/// # Example
/// ```
/// use imgaug::augmenters::{Augmenter, Resize};
/// use imgaug::random::RandomState;
/// use imgaug::Batch;
/// use ndarray::Array4;
///
/// let resize = Resize::new(16, 24).unwrap();
/// let batch = Batch::new(Array4::<u8>::zeros((2, 32, 48, 3)));
/// let out = resize.transform(batch, &mut RandomState::default()).unwrap();
/// assert_eq!(out.images().dim(), (2, 16, 24, 3));
/// ```
#[derive(Debug, Clone)]
pub struct Resize {
    height: usize,
    width: usize,
    interpolation: Option<Interpolation>,
}

impl Resize {
    pub fn new(height: usize, width: usize) -> Result<Self> {
        ensure!(
            height > 0 && width > 0,
            "Image dimensions must be positive after resizing (got {}x{})",
            height,
            width
        );
        Ok(Self {
            height,
            width,
            interpolation: None,
        })
    }

    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = Some(interpolation);
        self
    }

    /// Parses the interpolation by name (`"linear"`, `"area"`, ...).
    pub fn with_interpolation_name(self, name: &str) -> Result<Self> {
        Ok(self.with_interpolation(name.parse()?))
    }

    /// Shape keypoints are projected onto: new height and width, any
    /// trailing dimensions of the old shape kept.
    fn target_shape(&self, from: &Shape) -> Result<Shape> {
        let mut dims = from.dims().to_vec();
        dims[0] = self.height;
        dims[1] = self.width;
        Ok(Shape::new(&dims)?)
    }
}

impl Augmenter for Resize {
    fn name(&self) -> &str {
        "Resize"
    }

    fn augment_images_impl(
        &self,
        images: Images,
        _rng: &mut RandomState,
        _hooks: Option<&HooksImages>,
        _parents: &[&dyn Augmenter],
    ) -> Result<Images> {
        Ok(imresize_many_images(
            &images,
            (self.height, self.width),
            self.interpolation,
        )?)
    }

    fn augment_keypoints_impl(
        &self,
        keypoints: Vec<KeypointsOnImage>,
        _rng: &mut RandomState,
        _hooks: Option<&HooksKeypoints>,
        _parents: &[&dyn Augmenter],
    ) -> Result<Vec<KeypointsOnImage>> {
        keypoints
            .iter()
            .map(|kps| Ok(kps.on(self.target_shape(kps.shape())?)?))
            .collect()
    }
}
