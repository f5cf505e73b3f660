use super::Augmenter;
use crate::batch::Images;
use crate::hooks::{HooksImages, HooksKeypoints};
use crate::keypoints::{Keypoint, KeypointsOnImage};
use crate::random::RandomState;
use anyhow::{anyhow, ensure, Context, Result};
use ndarray::s;

// ============================================================================
// Fliplr
// ============================================================================

/// Mirrors images horizontally, each with probability `p`.
/// Keypoints are mirrored to `width - 1 - x` on the same images.
///
/// # Example
/// ```
/// use imgaug::augmenters::Fliplr;
///
/// let flip = Fliplr::new(0.5).unwrap(); // 50% flip chance
/// assert_eq!(flip.p(), 0.5);
/// assert!(Fliplr::new(1.5).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Fliplr {
    p: f64,
}

impl Fliplr {
    pub fn new(p: f64) -> Result<Self> {
        ensure!(
            (0.0..=1.0).contains(&p),
            "Probability must be in [0.0, 1.0] range (got {})",
            p
        );
        Ok(Self { p })
    }

    pub fn p(&self) -> f64 {
        self.p
    }

    /// One decision per image. The fast paths draw nothing, so images and
    /// keypoints still consume the same amount of randomness.
    fn should_flip(&self, rng: &mut RandomState) -> bool {
        match self.p {
            p if p <= 0.0 => false,
            p if p >= 1.0 => true,
            p => rng.gen_bool(p),
        }
    }
}

impl Augmenter for Fliplr {
    fn name(&self) -> &str {
        "Fliplr"
    }

    fn augment_images_impl(
        &self,
        mut images: Images,
        rng: &mut RandomState,
        _hooks: Option<&HooksImages>,
        _parents: &[&dyn Augmenter],
    ) -> Result<Images> {
        for i in 0..images.dim().0 {
            if self.should_flip(rng) {
                let flipped = images.slice(s![i, .., ..;-1, ..]).to_owned();
                images.slice_mut(s![i, .., .., ..]).assign(&flipped);
            }
        }
        Ok(images)
    }

    fn augment_keypoints_impl(
        &self,
        mut keypoints: Vec<KeypointsOnImage>,
        rng: &mut RandomState,
        _hooks: Option<&HooksKeypoints>,
        _parents: &[&dyn Augmenter],
    ) -> Result<Vec<KeypointsOnImage>> {
        for kps in keypoints.iter_mut() {
            if self.should_flip(rng) {
                let width = kps.width();
                let last_x = i32::try_from(width)
                    .with_context(|| format!("Image width {} does not fit in i32", width))?
                    - 1;
                let mirrored = kps
                    .keypoints()
                    .iter()
                    .map(|kp| {
                        last_x
                            .checked_sub(kp.x())
                            .map(|x| Keypoint::new(x, kp.y()))
                            .ok_or_else(|| anyhow!("Mirroring {} overflows i32", kp))
                    })
                    .collect::<Result<Vec<_>>>()?;
                *kps.keypoints_mut() = mirrored;
            }
        }
        Ok(keypoints)
    }
}
