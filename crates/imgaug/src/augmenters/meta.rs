use super::{augment_images, augment_keypoints, Augmenter};
use crate::batch::Images;
use crate::hooks::{HooksImages, HooksKeypoints};
use crate::keypoints::KeypointsOnImage;
use crate::random::RandomState;
use anyhow::{Context, Result};
use std::fmt;

// ============================================================================
// Sequential
// ============================================================================

/// Applies its children one after another.
///
/// Children are only visited when the hooks report that the batch should
/// propagate (the default). Each child sees this augmenter appended to its
/// parent chain.
///
/// # Example
/// ```
/// use imgaug::augmenters::{Augmenter, Fliplr, Resize, Sequential};
///
/// let seq = Sequential::new(vec![])
///     .then(Resize::new(64, 64).unwrap())
///     .then(Fliplr::new(0.5).unwrap());
/// assert_eq!(seq.children().len(), 2);
/// ```
pub struct Sequential {
    name: String,
    children: Vec<Box<dyn Augmenter>>,
    activated: bool,
}

impl Sequential {
    pub fn new(children: Vec<Box<dyn Augmenter>>) -> Self {
        Self {
            name: "Sequential".to_string(),
            children,
            activated: true,
        }
    }

    /// Appends a child augmenter.
    pub fn then<A: Augmenter + 'static>(mut self, child: A) -> Self {
        self.children.push(Box::new(child));
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_activated(mut self, activated: bool) -> Self {
        self.activated = activated;
        self
    }

    pub fn children(&self) -> &[Box<dyn Augmenter>] {
        &self.children
    }
}

impl fmt::Debug for Sequential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.children.iter().map(|c| c.name()).collect();
        f.debug_struct("Sequential")
            .field("name", &self.name)
            .field("children", &names)
            .field("activated", &self.activated)
            .finish()
    }
}

impl Augmenter for Sequential {
    fn name(&self) -> &str {
        &self.name
    }

    fn activated(&self) -> bool {
        self.activated
    }

    fn augment_images_impl(
        &self,
        mut images: Images,
        rng: &mut RandomState,
        hooks: Option<&HooksImages>,
        parents: &[&dyn Augmenter],
    ) -> Result<Images> {
        let fallback = HooksImages::default();
        if !hooks
            .unwrap_or(&fallback)
            .is_propagating(&images, self, parents, None)
        {
            return Ok(images);
        }

        let mut chain: Vec<&dyn Augmenter> = parents.to_vec();
        chain.push(self);
        for (i, child) in self.children.iter().enumerate() {
            images = augment_images(child.as_ref(), images, rng, hooks, &chain)
                .with_context(|| format!("{} child {} failed", self.name, i))?;
        }
        Ok(images)
    }

    fn augment_keypoints_impl(
        &self,
        mut keypoints: Vec<KeypointsOnImage>,
        rng: &mut RandomState,
        hooks: Option<&HooksKeypoints>,
        parents: &[&dyn Augmenter],
    ) -> Result<Vec<KeypointsOnImage>> {
        let fallback = HooksKeypoints::default();
        if !hooks
            .unwrap_or(&fallback)
            .is_propagating(&keypoints, self, parents, None)
        {
            return Ok(keypoints);
        }

        let mut chain: Vec<&dyn Augmenter> = parents.to_vec();
        chain.push(self);
        for (i, child) in self.children.iter().enumerate() {
            keypoints = augment_keypoints(child.as_ref(), keypoints, rng, hooks, &chain)
                .with_context(|| format!("{} child {} failed", self.name, i))?;
        }
        Ok(keypoints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::augmenters::{Fliplr, Resize};
    use crate::batch::Batch;
    use crate::keypoints::Keypoint;
    use std::sync::{Arc, Mutex};

    fn ramp(width: usize) -> Images {
        Images::from_shape_fn((1, 1, width, 1), |(_, _, x, _)| x as u8)
    }

    #[test]
    fn test_sequential_applies_children_in_order() -> Result<()> {
        let seq = Sequential::new(vec![])
            .then(Fliplr::new(1.0)?)
            .then(Resize::new(1, 8)?.with_interpolation(crate::imresize::Interpolation::Nearest));
        let out = augment_images(&seq, ramp(4), &mut RandomState::default(), None, &[])?;
        assert_eq!(out.dim(), (1, 1, 8, 1));
        assert_eq!(out[[0, 0, 0, 0]], 3);
        assert_eq!(out[[0, 0, 7, 0]], 0);
        Ok(())
    }

    #[test]
    fn test_propagator_blocks_children() -> Result<()> {
        let seq = Sequential::new(vec![Box::new(Fliplr::new(1.0)?)]);
        let hooks = HooksImages::new().with_propagator(|_, aug, _, _| aug.name() != "Sequential");
        let out = augment_images(&seq, ramp(3), &mut RandomState::default(), Some(&hooks), &[])?;
        assert_eq!(out, ramp(3));
        Ok(())
    }

    #[test]
    fn test_children_receive_parent_chain() -> Result<()> {
        let seen: Arc<Mutex<Vec<(String, Vec<String>)>>> = Arc::new(Mutex::new(Vec::new()));
        let record = seen.clone();
        let hooks = HooksImages::new().with_activator(move |_, aug, parents| {
            let names = parents.iter().map(|p| p.name().to_string()).collect();
            record.lock().unwrap().push((aug.name().to_string(), names));
            true
        });

        let inner = Sequential::new(vec![Box::new(Fliplr::new(0.0)?)]).with_name("inner");
        let outer = Sequential::new(vec![Box::new(inner)]).with_name("outer");
        augment_images(&outer, ramp(2), &mut RandomState::default(), Some(&hooks), &[])?;

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0], ("outer".to_string(), vec![]));
        assert_eq!(seen[1], ("inner".to_string(), vec!["outer".to_string()]));
        assert_eq!(
            seen[2],
            (
                "Fliplr".to_string(),
                vec!["outer".to_string(), "inner".to_string()]
            )
        );
        Ok(())
    }

    #[test]
    fn test_deactivated_sequential_passes_batch_through() -> Result<()> {
        let seq = Sequential::new(vec![Box::new(Fliplr::new(1.0)?)]).with_activated(false);
        let batch = Batch::new(ramp(3));
        assert_eq!(seq.transform(batch.clone(), &mut RandomState::default())?, batch);
        Ok(())
    }

    #[test]
    fn test_keypoints_follow_images_through_sequential() -> Result<()> {
        let seq = Sequential::new(vec![])
            .then(Resize::new(20, 40)?)
            .then(Fliplr::new(1.0)?);
        let batch = Batch::new(Images::zeros((1, 10, 20, 3)))
            .with_keypoints(vec![KeypointsOnImage::new(vec![Keypoint::new(5, 5)], (10, 20, 3))])?;

        let out = seq.transform(batch, &mut RandomState::default())?;
        let kps = &out.keypoints().expect("keypoints kept")[0];
        assert_eq!(kps.shape().dims(), &[20, 40, 3]);
        // (5,5) -> resize (10,10) -> flip x = 40 - 1 - 10
        assert_eq!(kps.keypoints(), &[Keypoint::new(29, 10)]);
        Ok(())
    }
}
