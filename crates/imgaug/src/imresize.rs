//! Batch image resizing.
//!
//! Images are `u8` arrays laid out as `N×H×W×C` (batches) or `H×W×C` /
//! `H×W` (single images). The per-channel resampling kernel comes from the
//! `image` crate; this module only handles layout and interpolation choice.

use crate::error::{AugResult, AugmentError};
use image::imageops::{self, FilterType};
use image::GrayImage;
use ndarray::{s, Array2, Array3, Array4, ArrayView2, Axis};
use std::fmt;
use std::str::FromStr;

/// Resampling method used by [`imresize_many_images`].
///
/// | Variant   | Kernel                                   |
/// |-----------|------------------------------------------|
/// | `Nearest` | nearest neighbour                        |
/// | `Linear`  | bilinear (`FilterType::Triangle`)        |
/// | `Area`    | box averaging (`imageops::thumbnail`);   |
/// |           | bilinear when either axis grows          |
/// | `Cubic`   | bicubic (`FilterType::CatmullRom`)       |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    Nearest,
    Linear,
    Area,
    Cubic,
}

impl FromStr for Interpolation {
    type Err = AugmentError;

    fn from_str(s: &str) -> AugResult<Self> {
        match s {
            "nearest" => Ok(Interpolation::Nearest),
            "linear" => Ok(Interpolation::Linear),
            "area" => Ok(Interpolation::Area),
            "cubic" => Ok(Interpolation::Cubic),
            other => Err(AugmentError::UnsupportedOption(format!(
                "invalid interpolation '{}', expected one of nearest, linear, area, cubic",
                other
            ))),
        }
    }
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Interpolation::Nearest => "nearest",
            Interpolation::Linear => "linear",
            Interpolation::Area => "area",
            Interpolation::Cubic => "cubic",
        };
        f.write_str(name)
    }
}

fn to_u32(value: usize, what: &str) -> AugResult<u32> {
    u32::try_from(value)
        .map_err(|_| AugmentError::invalid(format!("{} {} does not fit in u32", what, value)))
}

fn resize_channel(channel: &GrayImage, width: u32, height: u32, ip: Interpolation) -> GrayImage {
    // Box averaging only defines shrinking; thumbnail skews enlarged images.
    let grows = width > channel.width() || height > channel.height();
    let filter = match ip {
        Interpolation::Area if !grows => return imageops::thumbnail(channel, width, height),
        Interpolation::Nearest => FilterType::Nearest,
        Interpolation::Linear | Interpolation::Area => FilterType::Triangle,
        Interpolation::Cubic => FilterType::CatmullRom,
    };
    imageops::resize(channel, width, height, filter)
}

/// Resizes every image of an `N×H×W×C` batch to `(height, width)`.
///
/// Returns a copy when the size does not change. Without an explicit
/// interpolation, `Area` is used when either axis grows and `Linear`
/// otherwise.
pub fn imresize_many_images(
    images: &Array4<u8>,
    (height, width): (usize, usize),
    interpolation: Option<Interpolation>,
) -> AugResult<Array4<u8>> {
    let (nb_images, im_height, im_width, nb_channels) = images.dim();

    if height == 0 || width == 0 {
        return Err(AugmentError::invalid(format!(
            "target size must be positive, got {}x{}",
            height, width
        )));
    }
    if height == im_height && width == im_width {
        return Ok(images.clone());
    }
    if im_height == 0 || im_width == 0 {
        return Err(AugmentError::invalid(format!(
            "cannot resize images of size {}x{}",
            im_height, im_width
        )));
    }

    let ip = interpolation.unwrap_or(if height > im_height || width > im_width {
        Interpolation::Area
    } else {
        Interpolation::Linear
    });

    let (src_w, src_h) = (to_u32(im_width, "width")?, to_u32(im_height, "height")?);
    let (dst_w, dst_h) = (to_u32(width, "width")?, to_u32(height, "height")?);

    let mut result = Array4::<u8>::zeros((nb_images, height, width, nb_channels));
    for (img_idx, image) in images.outer_iter().enumerate() {
        for c in 0..nb_channels {
            let pixels: Vec<u8> = image.index_axis(Axis(2), c).iter().copied().collect();
            let channel = GrayImage::from_raw(src_w, src_h, pixels).ok_or_else(|| {
                AugmentError::invalid(format!(
                    "channel {} of image {} does not match {}x{}",
                    c, img_idx, im_width, im_height
                ))
            })?;
            let resized = resize_channel(&channel, dst_w, dst_h, ip);
            let view = ArrayView2::from_shape((height, width), resized.as_raw().as_slice())
                .map_err(|e| AugmentError::invalid(format!("resized channel: {}", e)))?;
            result.slice_mut(s![img_idx, .., .., c]).assign(&view);
        }
    }
    Ok(result)
}

/// Resizes one `H×W×C` image.
pub fn imresize_single_image(
    image: &Array3<u8>,
    sizes: (usize, usize),
    interpolation: Option<Interpolation>,
) -> AugResult<Array3<u8>> {
    let batch = image.clone().insert_axis(Axis(0));
    let resized = imresize_many_images(&batch, sizes, interpolation)?;
    Ok(resized.index_axis_move(Axis(0), 0))
}

/// Resizes one `H×W` grayscale image.
pub fn imresize_single_grayscale(
    image: &Array2<u8>,
    sizes: (usize, usize),
    interpolation: Option<Interpolation>,
) -> AugResult<Array2<u8>> {
    let with_channel = image.clone().insert_axis(Axis(2));
    let resized = imresize_single_image(&with_channel, sizes, interpolation)?;
    Ok(resized.index_axis_move(Axis(2), 0))
}
