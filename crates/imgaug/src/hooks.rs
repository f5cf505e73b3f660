//! Hooks let callers steer an augmenter without subclassing it.
//!
//! A [`Hooks`] value bundles four optional callbacks:
//!
//! | Slot            | Consulted                              | When unset                       |
//! |-----------------|----------------------------------------|----------------------------------|
//! | `activator`     | before the augmenter runs on a payload | the augmenter's `activated()`    |
//! | `propagator`    | before a composite enters its children | the caller's default (propagate) |
//! | `preprocessor`  | right before the augmenter's transform | identity                         |
//! | `postprocessor` | right after the augmenter's transform  | identity                         |
//!
//! Every callback receives the payload, the augmenter being applied and its
//! chain of parent augmenters (outermost first).
//!
//! # Example
//! ```
//! use imgaug::augmenters::{Augmenter, Fliplr, Sequential, augment_images};
//! use imgaug::hooks::HooksImages;
//! use imgaug::random::RandomState;
//! use ndarray::Array4;
//!
//! // Never flip, whatever the augmenter says.
//! let hooks = HooksImages::new().with_activator(|_, aug, _| aug.name() != "Fliplr");
//! let seq = Sequential::new(vec![Box::new(Fliplr::new(1.0).unwrap())]);
//! let images = Array4::<u8>::from_shape_fn((1, 1, 2, 1), |(_, _, x, _)| x as u8);
//! let mut rng = RandomState::default();
//! let out = augment_images(&seq, images.clone(), &mut rng, Some(&hooks), &[]).unwrap();
//! assert_eq!(out, images);
//! ```

use crate::augmenters::Augmenter;
use crate::batch::Images;
use crate::keypoints::KeypointsOnImage;
use std::fmt;

pub type Activator<T> = Box<dyn Fn(&T, &dyn Augmenter, &[&dyn Augmenter]) -> bool + Send + Sync>;
pub type Propagator<T> =
    Box<dyn Fn(&T, &dyn Augmenter, &[&dyn Augmenter], bool) -> bool + Send + Sync>;
pub type Processor<T> = Box<dyn Fn(T, &dyn Augmenter, &[&dyn Augmenter]) -> T + Send + Sync>;

/// Optional callbacks over payloads of type `T`.
pub struct Hooks<T> {
    activator: Option<Activator<T>>,
    propagator: Option<Propagator<T>>,
    preprocessor: Option<Processor<T>>,
    postprocessor: Option<Processor<T>>,
}

/// Hooks consulted while augmenting image batches.
pub type HooksImages = Hooks<Images>;

/// Hooks consulted while augmenting keypoints.
pub type HooksKeypoints = Hooks<Vec<KeypointsOnImage>>;

impl<T> Default for Hooks<T> {
    fn default() -> Self {
        Self {
            activator: None,
            propagator: None,
            preprocessor: None,
            postprocessor: None,
        }
    }
}

impl<T> Hooks<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_activator<F>(mut self, activator: F) -> Self
    where
        F: Fn(&T, &dyn Augmenter, &[&dyn Augmenter]) -> bool + Send + Sync + 'static,
    {
        self.activator = Some(Box::new(activator));
        self
    }

    /// The propagator also receives the resolved default flag.
    pub fn with_propagator<F>(mut self, propagator: F) -> Self
    where
        F: Fn(&T, &dyn Augmenter, &[&dyn Augmenter], bool) -> bool + Send + Sync + 'static,
    {
        self.propagator = Some(Box::new(propagator));
        self
    }

    pub fn with_preprocessor<F>(mut self, preprocessor: F) -> Self
    where
        F: Fn(T, &dyn Augmenter, &[&dyn Augmenter]) -> T + Send + Sync + 'static,
    {
        self.preprocessor = Some(Box::new(preprocessor));
        self
    }

    pub fn with_postprocessor<F>(mut self, postprocessor: F) -> Self
    where
        F: Fn(T, &dyn Augmenter, &[&dyn Augmenter]) -> T + Send + Sync + 'static,
    {
        self.postprocessor = Some(Box::new(postprocessor));
        self
    }

    /// Whether `augmenter` should run on `items`.
    pub fn is_activated(
        &self,
        items: &T,
        augmenter: &dyn Augmenter,
        parents: &[&dyn Augmenter],
    ) -> bool {
        match &self.activator {
            Some(activator) => activator(items, augmenter, parents),
            None => augmenter.activated(),
        }
    }

    /// Whether a composite `augmenter` should hand `items` to its children.
    /// A `default` of `None` means propagate.
    pub fn is_propagating(
        &self,
        items: &T,
        augmenter: &dyn Augmenter,
        parents: &[&dyn Augmenter],
        default: Option<bool>,
    ) -> bool {
        let default = default.unwrap_or(true);
        match &self.propagator {
            Some(propagator) => propagator(items, augmenter, parents, default),
            None => default,
        }
    }

    pub fn preprocess(
        &self,
        items: T,
        augmenter: &dyn Augmenter,
        parents: &[&dyn Augmenter],
    ) -> T {
        match &self.preprocessor {
            Some(preprocessor) => preprocessor(items, augmenter, parents),
            None => items,
        }
    }

    pub fn postprocess(
        &self,
        items: T,
        augmenter: &dyn Augmenter,
        parents: &[&dyn Augmenter],
    ) -> T {
        match &self.postprocessor {
            Some(postprocessor) => postprocessor(items, augmenter, parents),
            None => items,
        }
    }
}

impl<T> fmt::Debug for Hooks<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("activator", &self.activator.is_some())
            .field("propagator", &self.propagator.is_some())
            .field("preprocessor", &self.preprocessor.is_some())
            .field("postprocessor", &self.postprocessor.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::RandomState;
    use anyhow::Result;

    struct Marker {
        activated: bool,
    }

    impl Augmenter for Marker {
        fn name(&self) -> &str {
            "Marker"
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
            Ok(images)
        }

        fn augment_keypoints_impl(
            &self,
            keypoints: Vec<KeypointsOnImage>,
            _rng: &mut RandomState,
            _hooks: Option<&HooksKeypoints>,
            _parents: &[&dyn Augmenter],
        ) -> Result<Vec<KeypointsOnImage>> {
            Ok(keypoints)
        }
    }

    fn images() -> Images {
        Images::from_elem((1, 2, 2, 1), 7)
    }

    #[test]
    fn test_defaults_follow_augmenter_and_caller() {
        let hooks = HooksImages::new();
        let on = Marker { activated: true };
        let off = Marker { activated: false };

        assert!(hooks.is_activated(&images(), &on, &[]));
        assert!(!hooks.is_activated(&images(), &off, &[]));

        assert!(hooks.is_propagating(&images(), &on, &[], None));
        assert!(hooks.is_propagating(&images(), &on, &[], Some(true)));
        assert!(!hooks.is_propagating(&images(), &on, &[], Some(false)));

        assert_eq!(hooks.preprocess(images(), &on, &[]), images());
        assert_eq!(hooks.postprocess(images(), &on, &[]), images());
    }

    #[test]
    fn test_callbacks_override_defaults() {
        let hooks = HooksImages::new()
            .with_activator(|_, aug, parents| !aug.activated() && parents.is_empty())
            .with_propagator(|_, _, _, default| !default)
            .with_preprocessor(|images, _, _| images.mapv(|v| v + 1))
            .with_postprocessor(|images, _, _| images.mapv(|v| v * 2));
        let off = Marker { activated: false };

        assert!(hooks.is_activated(&images(), &off, &[]));
        assert!(!hooks.is_activated(&images(), &off, &[&off]));
        assert!(!hooks.is_propagating(&images(), &off, &[], None));
        assert!(hooks.preprocess(images(), &off, &[]).iter().all(|&v| v == 8));
        assert!(hooks.postprocess(images(), &off, &[]).iter().all(|&v| v == 14));
    }

    #[test]
    fn test_hooks_debug_lists_set_slots() {
        let hooks = HooksKeypoints::new().with_preprocessor(|kps, _, _| kps);
        let text = format!("{:?}", hooks);
        assert!(text.contains("preprocessor: true"));
        assert!(text.contains("activator: false"));
    }
}
