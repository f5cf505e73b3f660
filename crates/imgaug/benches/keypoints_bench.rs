use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use imgaug::imresize::{imresize_many_images, Interpolation};
use imgaug::{IfNotFound, Keypoint, KeypointsOnImage};
use ndarray::Array4;

/// Benchmarks for the dense keypoint format and batch resizing.
///
/// To run these, use:
/// ```bash
/// cargo bench --bench keypoints_bench
/// ```

/// Keypoint counts swept by the dense encode/decode benchmarks.
const NB_KEYPOINTS: [usize; 3] = [4, 16, 64];

fn make_keypoints(n: usize) -> KeypointsOnImage {
    let kps = (0..n)
        .map(|i| Keypoint::new((i * 7 % 128) as i32, (i * 13 % 128) as i32))
        .collect();
    KeypointsOnImage::new(kps, (128, 128, 3))
}

/// Encode sparse keypoints into an H×W×K image and decode them again.
fn bench_dense_keypoints(c: &mut Criterion) {
    let mut group = c.benchmark_group("Dense Keypoints");

    for &n in &NB_KEYPOINTS {
        let kps = make_keypoints(n);
        let image = kps.to_keypoint_image().expect("encode");
        group.throughput(Throughput::Elements(n as u64));

        group.bench_with_input(BenchmarkId::new("encode", n), &kps, |b, kps| {
            b.iter(|| black_box(kps.to_keypoint_image().expect("encode")))
        });

        group.bench_with_input(BenchmarkId::new("decode", n), &image, |b, image| {
            b.iter(|| {
                black_box(
                    KeypointsOnImage::from_keypoint_image(image, IfNotFound::Drop, 1)
                        .expect("decode"),
                )
            })
        });
    }
    group.finish();
}

/// Resize a batch of 16 RGB images up and down with each interpolation.
fn bench_imresize(c: &mut Criterion) {
    let mut group = c.benchmark_group("Imresize");
    let images = Array4::<u8>::from_shape_fn((16, 64, 64, 3), |(n, y, x, c)| {
        ((n + y * 3 + x * 5 + c) % 256) as u8
    });

    for interpolation in [
        Interpolation::Nearest,
        Interpolation::Linear,
        Interpolation::Area,
        Interpolation::Cubic,
    ] {
        for (label, size) in [("down", (32, 32)), ("up", (128, 128))] {
            group.bench_function(BenchmarkId::new(format!("{}", interpolation), label), |b| {
                b.iter(|| {
                    black_box(
                        imresize_many_images(&images, size, Some(interpolation)).expect("resize"),
                    )
                })
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_dense_keypoints, bench_imresize);
criterion_main!(benches);
