//! Augmenter contract and the hook-aware entry points.
//!
//! # Module Organization
//!
//! ```text
//! augmenters/
//! ├── mod.rs        → Augmenter trait, augment_images / augment_keypoints
//! ├── meta.rs       → Sequential (composite, honours propagation hooks)
//! ├── geometric.rs  → Resize (images resized, keypoints projected)
//! └── flip.rs       → Fliplr (random horizontal flip)
//! ```
//!
//! Concrete augmenters implement the `*_impl` methods. Callers go through
//! [`augment_images`] / [`augment_keypoints`], which consult the hooks, or
//! through [`Augmenter::transform`] for a whole [`Batch`].

use crate::batch::{Batch, Images};
use crate::hooks::{HooksImages, HooksKeypoints};
use crate::keypoints::KeypointsOnImage;
use crate::random::RandomState;
use anyhow::{Context, Result};

pub mod flip;
pub mod geometric;
pub mod meta;

pub use flip::Fliplr;
pub use geometric::Resize;
pub use meta::Sequential;

/// An operation applied to batches of images and their keypoints.
///
/// Implementations must consume randomness identically in
/// `augment_images_impl` and `augment_keypoints_impl`, so that two equally
/// seeded states produce matching image and keypoint changes.
pub trait Augmenter: Send + Sync {
    fn name(&self) -> &str;

    /// Whether the augmenter runs when no activator hook decides otherwise.
    fn activated(&self) -> bool {
        true
    }

    fn augment_images_impl(
        &self,
        images: Images,
        rng: &mut RandomState,
        hooks: Option<&HooksImages>,
        parents: &[&dyn Augmenter],
    ) -> Result<Images>;

    fn augment_keypoints_impl(
        &self,
        keypoints: Vec<KeypointsOnImage>,
        rng: &mut RandomState,
        hooks: Option<&HooksKeypoints>,
        parents: &[&dyn Augmenter],
    ) -> Result<Vec<KeypointsOnImage>>;

    /// Applies the augmenter to a batch. Images and keypoints see random
    /// states derived from the same seed so they change consistently.
    fn transform(&self, batch: Batch, rng: &mut RandomState) -> Result<Batch> {
        if !self.activated() {
            return Ok(batch);
        }
        let seed = rng.next_seed();
        let (images, keypoints) = batch.into_parts();

        let images = self
            .augment_images_impl(images, &mut RandomState::derive(seed), None, &[])
            .with_context(|| format!("Augmenter '{}' failed on images", self.name()))?;
        let keypoints = keypoints
            .map(|kps| {
                self.augment_keypoints_impl(kps, &mut RandomState::derive(seed), None, &[])
                    .with_context(|| format!("Augmenter '{}' failed on keypoints", self.name()))
            })
            .transpose()?;

        Ok(Batch::from_parts(images, keypoints)?)
    }
}

/// Runs `augmenter` on `images`, consulting `hooks` for activation and
/// pre/post-processing. `parents` lists the enclosing augmenters.
pub fn augment_images(
    augmenter: &dyn Augmenter,
    images: Images,
    rng: &mut RandomState,
    hooks: Option<&HooksImages>,
    parents: &[&dyn Augmenter],
) -> Result<Images> {
    let fallback = HooksImages::default();
    let active_hooks = hooks.unwrap_or(&fallback);

    if !active_hooks.is_activated(&images, augmenter, parents) {
        return Ok(images);
    }
    let images = active_hooks.preprocess(images, augmenter, parents);
    let images = augmenter
        .augment_images_impl(images, rng, hooks, parents)
        .with_context(|| format!("Augmenter '{}' failed on images", augmenter.name()))?;
    Ok(active_hooks.postprocess(images, augmenter, parents))
}

/// Keypoint counterpart of [`augment_images`].
pub fn augment_keypoints(
    augmenter: &dyn Augmenter,
    keypoints: Vec<KeypointsOnImage>,
    rng: &mut RandomState,
    hooks: Option<&HooksKeypoints>,
    parents: &[&dyn Augmenter],
) -> Result<Vec<KeypointsOnImage>> {
    let fallback = HooksKeypoints::default();
    let active_hooks = hooks.unwrap_or(&fallback);

    if !active_hooks.is_activated(&keypoints, augmenter, parents) {
        return Ok(keypoints);
    }
    let keypoints = active_hooks.preprocess(keypoints, augmenter, parents);
    let keypoints = augmenter
        .augment_keypoints_impl(keypoints, rng, hooks, parents)
        .with_context(|| format!("Augmenter '{}' failed on keypoints", augmenter.name()))?;
    Ok(active_hooks.postprocess(keypoints, augmenter, parents))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AugResult;
    use crate::keypoints::Keypoint;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Adds one to every pixel and counts its invocations.
    struct AddOne {
        calls: Arc<AtomicUsize>,
        activated: bool,
    }

    impl Augmenter for AddOne {
        fn name(&self) -> &str {
            "AddOne"
        }

        fn activated(&self) -> bool {
            self.activated
        }

        fn augment_images_impl(
            &self,
            images: Images,
            _rng: &mut RandomState,
            _hooks: Option<&HooksImages>,
            _parents: &[&dyn Augmenter],
        ) -> Result<Images> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(images.mapv(|v| v.saturating_add(1)))
        }

        fn augment_keypoints_impl(
            &self,
            keypoints: Vec<KeypointsOnImage>,
            _rng: &mut RandomState,
            _hooks: Option<&HooksKeypoints>,
            _parents: &[&dyn Augmenter],
        ) -> Result<Vec<KeypointsOnImage>> {
            Ok(keypoints
                .iter()
                .map(|kps| kps.shift(1, 0))
                .collect::<AugResult<Vec<_>>>()?)
        }
    }

    fn add_one(activated: bool) -> AddOne {
        AddOne {
            calls: Arc::new(AtomicUsize::new(0)),
            activated,
        }
    }

    #[test]
    fn test_augment_images_without_hooks() -> Result<()> {
        let aug = add_one(true);
        let mut rng = RandomState::default();
        let out = augment_images(&aug, Images::zeros((1, 2, 2, 1)), &mut rng, None, &[])?;
        assert!(out.iter().all(|&v| v == 1));

        let inactive = add_one(false);
        let out = augment_images(&inactive, Images::zeros((1, 2, 2, 1)), &mut rng, None, &[])?;
        assert!(out.iter().all(|&v| v == 0));
        assert_eq!(inactive.calls.load(Ordering::SeqCst), 0);
        Ok(())
    }

    #[test]
    fn test_augment_images_pre_and_post_order() -> Result<()> {
        // (0 + 10) + 1 = 11, then * 2 = 22
        let hooks = HooksImages::new()
            .with_preprocessor(|images, _, _| images.mapv(|v| v + 10))
            .with_postprocessor(|images, _, _| images.mapv(|v| v * 2));
        let out = augment_images(
            &add_one(true),
            Images::zeros((1, 1, 1, 1)),
            &mut RandomState::default(),
            Some(&hooks),
            &[],
        )?;
        assert_eq!(out[[0, 0, 0, 0]], 22);
        Ok(())
    }

    #[test]
    fn test_activator_hook_skips_processing() -> Result<()> {
        let hooks = HooksImages::new()
            .with_activator(|_, _, _| false)
            .with_preprocessor(|images, _, _| images.mapv(|v| v + 10));
        let aug = add_one(true);
        let mut rng = RandomState::default();
        let out = augment_images(&aug, Images::zeros((1, 1, 1, 1)), &mut rng, Some(&hooks), &[])?;
        assert_eq!(out[[0, 0, 0, 0]], 0);
        assert_eq!(aug.calls.load(Ordering::SeqCst), 0);
        Ok(())
    }

    #[test]
    fn test_augment_keypoints_hooks() -> Result<()> {
        let kps = vec![KeypointsOnImage::new(vec![Keypoint::new(1, 1)], (4, 4))];
        let hooks = HooksKeypoints::new().with_postprocessor(|kps, _, _| {
            kps.iter()
                .map(|k| k.shift(0, 2).expect("small shift"))
                .collect()
        });
        let mut rng = RandomState::default();
        let out = augment_keypoints(&add_one(true), kps, &mut rng, Some(&hooks), &[])?;
        assert_eq!(out[0].keypoints(), &[Keypoint::new(2, 3)]);
        Ok(())
    }

    #[test]
    fn test_transform_batch() -> Result<()> {
        let batch = Batch::new(Images::zeros((2, 2, 2, 1))).with_keypoints(vec![
            KeypointsOnImage::new(vec![Keypoint::new(0, 0)], (2, 2)),
            KeypointsOnImage::new(vec![], (2, 2)),
        ])?;
        let out = add_one(true).transform(batch.clone(), &mut RandomState::default())?;
        assert!(out.images().iter().all(|&v| v == 1));
        assert_eq!(out.keypoints().map(|k| k[0].keypoints()[0]), Some(Keypoint::new(1, 0)));

        let unchanged = add_one(false).transform(batch.clone(), &mut RandomState::default())?;
        assert_eq!(unchanged, batch);
        Ok(())
    }
}
