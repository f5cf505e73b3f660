#![allow(dead_code)]

use imgaug::augmenters::Augmenter;
use imgaug::hooks::{HooksImages, HooksKeypoints};
use imgaug::{Batch, Images, KeypointsOnImage, RandomState};

use anyhow::{bail, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Installs the test logger once per test binary.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Single-image batch whose pixels all hold `value`.
pub fn tagged_batch(value: u8) -> Batch {
    Batch::new(Images::from_elem((1, 4, 4, 1), value))
}

/// Source yielding `tagged_batch(0..n)` and counting how many were pulled.
pub fn counting_source(
    n: usize,
    pulled: Arc<AtomicUsize>,
) -> impl Iterator<Item = Result<Batch>> + Send {
    (0..n).map(move |i| {
        pulled.fetch_add(1, Ordering::SeqCst);
        Ok(tagged_batch(i as u8))
    })
}

/// Reads the tag written by `tagged_batch`.
pub fn tag_of(batch: &Batch) -> u8 {
    batch.images()[[0, 0, 0, 0]]
}

/// Polls `condition` until it holds or `deadline` elapses.
pub fn wait_until(deadline: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    condition()
}

/// Passes batches through, failing on images tagged `fail_on` and
/// panicking on images tagged `panic_on`.
pub struct Faulty {
    pub fail_on: Option<u8>,
    pub panic_on: Option<u8>,
    pub delay: Duration,
}

impl Faulty {
    pub fn passthrough() -> Self {
        Self {
            fail_on: None,
            panic_on: None,
            delay: Duration::ZERO,
        }
    }
}

impl Augmenter for Faulty {
    fn name(&self) -> &str {
        "Faulty"
    }

    fn augment_images_impl(
        &self,
        images: Images,
        _rng: &mut RandomState,
        _hooks: Option<&HooksImages>,
        _parents: &[&dyn Augmenter],
    ) -> Result<Images> {
        std::thread::sleep(self.delay);
        let tag = images[[0, 0, 0, 0]];
        if self.panic_on == Some(tag) {
            panic!("augmenter panicked on batch {}", tag);
        }
        if self.fail_on == Some(tag) {
            bail!("augmenter rejected batch {}", tag);
        }
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

/// Writes a value drawn from the random state into every pixel.
pub struct RandomFill;

impl Augmenter for RandomFill {
    fn name(&self) -> &str {
        "RandomFill"
    }

    fn augment_images_impl(
        &self,
        images: Images,
        rng: &mut RandomState,
        _hooks: Option<&HooksImages>,
        _parents: &[&dyn Augmenter],
    ) -> Result<Images> {
        let value: u8 = rng.gen_range(0..=255);
        Ok(images.mapv(|_| value))
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
