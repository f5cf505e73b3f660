use super::Keypoint;
use crate::error::{AugResult, AugmentError};
use crate::geometry::{is_integer_array, Shape, Value};
use ndarray::Array2;
use std::fmt;
use std::sync::Arc;

/// An ordered set of keypoints anchored to the shape of one image.
///
/// The keypoint list is reference counted: [`copy`](Self::copy) shares it,
/// [`deepcopy`](Self::deepcopy) duplicates it. Mutation through
/// [`keypoints_mut`](Self::keypoints_mut) is copy-on-write, so a shared list
/// is never changed behind another collection's back.
#[derive(Debug, Clone, PartialEq)]
pub struct KeypointsOnImage {
    keypoints: Arc<Vec<Keypoint>>,
    shape: Shape,
}

impl KeypointsOnImage {
    /// `shape` accepts `(height, width)` tuples, a [`Shape`], or a reference
    /// to an image array whose shape is captured.
    pub fn new(keypoints: Vec<Keypoint>, shape: impl Into<Shape>) -> Self {
        Self {
            keypoints: Arc::new(keypoints),
            shape: shape.into(),
        }
    }

    /// Like [`new`](Self::new) with a dynamically typed shape: an array value
    /// contributes its shape, a sequence is read as explicit dimensions.
    pub fn from_value(keypoints: Vec<Keypoint>, shape: &Value) -> AugResult<Self> {
        Ok(Self::new(keypoints, Shape::try_from(shape)?))
    }

    pub fn keypoints(&self) -> &[Keypoint] {
        &self.keypoints
    }

    pub fn keypoints_mut(&mut self) -> &mut Vec<Keypoint> {
        Arc::make_mut(&mut self.keypoints)
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn height(&self) -> usize {
        self.shape.height()
    }

    pub fn width(&self) -> usize {
        self.shape.width()
    }

    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }

    /// Projects every keypoint onto a new image shape, e.g. after a resize.
    pub fn on(&self, shape: impl Into<Shape>) -> AugResult<Self> {
        let shape = shape.into();
        let keypoints = self
            .keypoints
            .iter()
            .map(|kp| kp.project(&self.shape, &shape))
            .collect::<AugResult<Vec<_>>>()?;
        Ok(Self::new(keypoints, shape))
    }

    /// Moves every keypoint by `(dx, dy)`; the shape is unchanged.
    pub fn shift(&self, dx: i32, dy: i32) -> AugResult<Self> {
        let keypoints = self
            .keypoints
            .iter()
            .map(|kp| kp.shift(dx, dy))
            .collect::<AugResult<Vec<_>>>()?;
        Ok(Self::new(keypoints, self.shape.clone()))
    }

    /// `N×2` array, row `i` = `(x_i, y_i)`.
    pub fn get_coords_array(&self) -> Array2<i32> {
        let mut result = Array2::<i32>::zeros((self.keypoints.len(), 2));
        for (i, kp) in self.keypoints.iter().enumerate() {
            result[[i, 0]] = kp.x();
            result[[i, 1]] = kp.y();
        }
        result
    }

    /// Inverse of [`get_coords_array`](Self::get_coords_array).
    pub fn from_coords_array(coords: &Array2<i32>, shape: impl Into<Shape>) -> AugResult<Self> {
        if coords.ncols() != 2 {
            return Err(AugmentError::invalid(format!(
                "expected an N×2 coordinate array, got {} column(s)",
                coords.ncols()
            )));
        }
        let keypoints = coords
            .rows()
            .into_iter()
            .map(|row| Keypoint::new(row[0], row[1]))
            .collect();
        Ok(Self::new(keypoints, shape))
    }

    /// [`from_coords_array`](Self::from_coords_array) for dynamically typed
    /// input. Fails unless `coords` is an integer-typed `N×2` array.
    pub fn from_coords_value(coords: &Value, shape: impl Into<Shape>) -> AugResult<Self> {
        let array = match coords {
            Value::Array(array) if is_integer_array(coords) => array,
            other => {
                return Err(AugmentError::invalid(format!(
                    "expected an integer array of coordinates, got {}",
                    other.kind()
                )))
            }
        };
        let wide = array
            .to_i64()
            .ok_or_else(|| AugmentError::invalid("coordinate array is not integer typed"))?;
        let wide = wide
            .into_dimensionality::<ndarray::Ix2>()
            .map_err(|e| AugmentError::invalid(format!("coordinate array: {}", e)))?;
        let narrow = wide
            .iter()
            .map(|&v| {
                i32::try_from(v).map_err(|_| {
                    AugmentError::invalid(format!("coordinate {} out of i32 range", v))
                })
            })
            .collect::<AugResult<Vec<i32>>>()?;
        let coords = Array2::from_shape_vec(wide.raw_dim(), narrow)
            .map_err(|e| AugmentError::invalid(format!("coordinate array: {}", e)))?;
        Self::from_coords_array(&coords, shape)
    }

    /// Shares the keypoint list with `self`.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Fully independent duplicate.
    pub fn deepcopy(&self) -> Self {
        Self {
            keypoints: Arc::new(self.keypoints.as_ref().clone()),
            shape: self.shape.clone(),
        }
    }

    /// True when both collections point at the same keypoint list.
    pub fn shares_keypoints_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.keypoints, &other.keypoints)
    }
}

impl fmt::Display for KeypointsOnImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let points: Vec<String> = self.keypoints.iter().map(Keypoint::to_string).collect();
        write!(
            f,
            "KeypointsOnImage([{}], shape={})",
            points.join(", "),
            self.shape
        )
    }
}
