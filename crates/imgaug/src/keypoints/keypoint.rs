use crate::error::{AugResult, AugmentError};
use crate::geometry::{is_single_integer, project_coordinate, Shape, Value};
use std::fmt;

/// A single integer pixel coordinate.
///
/// Coordinates may be negative or exceed the image; such points are kept
/// but are invisible in the dense encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Keypoint {
    x: i32,
    y: i32,
}

impl Keypoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Builds a keypoint from dynamically typed coordinates.
    /// Both values must be whole numbers that fit in `i32`.
    pub fn from_values(x: &Value, y: &Value) -> AugResult<Self> {
        Ok(Self::new(coordinate(x, "x")?, coordinate(y, "y")?))
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    /// Moves the point from an image of `from_shape` to the same relative
    /// location in an image of `to_shape`.
    ///
    /// # Example
    /// ```
    /// use imgaug::keypoints::Keypoint;
    /// use imgaug::geometry::Shape;
    ///
    /// let kp = Keypoint::new(10, 20);
    /// let projected = kp.project(&Shape::from((100, 100)), &Shape::from((50, 50))).unwrap();
    /// assert_eq!(projected, Keypoint::new(5, 10));
    /// ```
    pub fn project(&self, from_shape: &Shape, to_shape: &Shape) -> AugResult<Self> {
        let x = project_coordinate(self.x, from_shape.width(), to_shape.width())?;
        let y = project_coordinate(self.y, from_shape.height(), to_shape.height())?;
        Ok(Self::new(x, y))
    }

    /// Moves the point by `(dx, dy)`. Fails if a coordinate leaves the
    /// `i32` range.
    pub fn shift(&self, dx: i32, dy: i32) -> AugResult<Self> {
        match (self.x.checked_add(dx), self.y.checked_add(dy)) {
            (Some(x), Some(y)) => Ok(Self::new(x, y)),
            _ => Err(AugmentError::invalid(format!(
                "shifting {} by ({}, {}) overflows i32",
                self, dx, dy
            ))),
        }
    }
}

fn coordinate(value: &Value, axis: &str) -> AugResult<i32> {
    if !is_single_integer(value) {
        return Err(AugmentError::invalid(format!(
            "keypoint {} must be an integer, got {}",
            axis,
            value.kind()
        )));
    }
    value
        .as_integer()
        .and_then(|v| i32::try_from(v).ok())
        .ok_or_else(|| AugmentError::invalid(format!("keypoint {} out of i32 range", axis)))
}

impl fmt::Display for Keypoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypoint(x={}, y={})", self.x, self.y)
    }
}

impl From<(i32, i32)> for Keypoint {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_keypoint_from_values() -> Result<()> {
        let kp = Keypoint::from_values(&Value::from(3), &Value::from(-4))?;
        assert_eq!((kp.x(), kp.y()), (3, -4));

        assert!(matches!(
            Keypoint::from_values(&Value::from(3.5), &Value::from(1)),
            Err(AugmentError::InvalidArgument(_))
        ));
        assert!(Keypoint::from_values(&Value::from(1), &Value::from("2")).is_err());
        assert!(Keypoint::from_values(&Value::from(i64::MAX), &Value::from(0)).is_err());
        Ok(())
    }

    #[test]
    fn test_keypoint_project() -> Result<()> {
        let kp = Keypoint::new(10, 20);
        assert_eq!(
            kp.project(&Shape::from((100, 100)), &Shape::from((50, 50)))?,
            Keypoint::new(5, 10)
        );
        // x follows width, y follows height
        assert_eq!(
            kp.project(&Shape::from((100, 50)), &Shape::from((200, 25)))?,
            Keypoint::new(5, 40)
        );
        // Shrinking is lossy, the way back does not restore the point.
        let (large, small) = (Shape::from((100, 100)), Shape::from((10, 10)));
        let back = Keypoint::new(14, 14).project(&large, &small)?.project(&small, &large)?;
        assert_eq!(back, Keypoint::new(10, 10));
        Ok(())
    }

    #[test]
    fn test_keypoint_shift_and_display() -> Result<()> {
        let kp = Keypoint::new(5, 5).shift(2, 3)?;
        assert_eq!(kp, Keypoint::new(7, 8));
        assert_eq!(kp.to_string(), "Keypoint(x=7, y=8)");
        assert_eq!(Keypoint::new(-1, -1).to_string(), "Keypoint(x=-1, y=-1)");
        Ok(())
    }

    #[test]
    fn test_keypoint_shift_overflow_is_an_error() -> Result<()> {
        assert!(matches!(
            Keypoint::new(i32::MAX, 0).shift(1, 0),
            Err(AugmentError::InvalidArgument(_))
        ));
        assert!(Keypoint::new(0, i32::MIN).shift(0, -1).is_err());
        assert_eq!(Keypoint::new(i32::MAX, 0).shift(-1, 0)?, Keypoint::new(i32::MAX - 1, 0));
        Ok(())
    }
}
