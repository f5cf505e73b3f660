//! Value classification and coordinate-scaling helpers.
//!
//! Inputs that arrive from configuration files or foreign callers are not
//! statically typed. They are represented as a [`Value`] and classified into a
//! closed set of [`ValueKind`]s before the keypoint constructors accept them.

use crate::error::{AugResult, AugmentError};
use ndarray::{Array2, Array3, Array4, ArrayD};
use std::collections::BTreeMap;
use std::fmt;

/// Element storage of an array-valued [`Value`].
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayValue {
    Int(ArrayD<i64>),
    UInt8(ArrayD<u8>),
    Float(ArrayD<f64>),
}

impl ArrayValue {
    pub fn shape(&self) -> &[usize] {
        match self {
            ArrayValue::Int(a) => a.shape(),
            ArrayValue::UInt8(a) => a.shape(),
            ArrayValue::Float(a) => a.shape(),
        }
    }

    /// True when the element type is an integer type.
    pub fn is_integer(&self) -> bool {
        matches!(self, ArrayValue::Int(_) | ArrayValue::UInt8(_))
    }

    /// Integer elements widened to `i64`. `None` for floating point arrays.
    pub fn to_i64(&self) -> Option<ArrayD<i64>> {
        match self {
            ArrayValue::Int(a) => Some(a.clone()),
            ArrayValue::UInt8(a) => Some(a.mapv(i64::from)),
            ArrayValue::Float(_) => None,
        }
    }
}

/// A dynamically-typed scalar, container or array.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Real(f64),
    Text(String),
    Sequence(Vec<Value>),
    Mapping(BTreeMap<String, Value>),
    Array(ArrayValue),
}

/// The semantic kind of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Integer,
    Real,
    Text,
    Sequence,
    Mapping,
    Array,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Integer => "integer",
            ValueKind::Real => "real",
            ValueKind::Text => "text",
            ValueKind::Sequence => "sequence",
            ValueKind::Mapping => "mapping",
            ValueKind::Array => "array",
        };
        f.write_str(name)
    }
}

/// Classifies a value into its semantic kind.
pub fn classify(value: &Value) -> ValueKind {
    match value {
        Value::Integer(_) => ValueKind::Integer,
        Value::Real(_) => ValueKind::Real,
        Value::Text(_) => ValueKind::Text,
        Value::Sequence(_) => ValueKind::Sequence,
        Value::Mapping(_) => ValueKind::Mapping,
        Value::Array(_) => ValueKind::Array,
    }
}

pub fn is_array(value: &Value) -> bool {
    classify(value) == ValueKind::Array
}

/// Whole numbers only. A real such as `3.0` is not an integer.
pub fn is_single_integer(value: &Value) -> bool {
    classify(value) == ValueKind::Integer
}

pub fn is_single_float(value: &Value) -> bool {
    classify(value) == ValueKind::Real
}

pub fn is_single_number(value: &Value) -> bool {
    is_single_integer(value) || is_single_float(value)
}

pub fn is_iterable(value: &Value) -> bool {
    classify(value) == ValueKind::Sequence
}

pub fn is_string(value: &Value) -> bool {
    classify(value) == ValueKind::Text
}

pub fn is_integer_array(value: &Value) -> bool {
    matches!(value, Value::Array(a) if a.is_integer())
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        classify(self)
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Builds a mapping value from `(name, value)` pairs.
    pub fn mapping<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Mapping(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Sequence(v)
    }
}

impl From<ArrayD<i64>> for Value {
    fn from(v: ArrayD<i64>) -> Self {
        Value::Array(ArrayValue::Int(v))
    }
}

impl From<ArrayD<u8>> for Value {
    fn from(v: ArrayD<u8>) -> Self {
        Value::Array(ArrayValue::UInt8(v))
    }
}

impl From<ArrayD<f64>> for Value {
    fn from(v: ArrayD<f64>) -> Self {
        Value::Array(ArrayValue::Float(v))
    }
}

/// Rescales one coordinate from an extent of `from_extent` pixels to
/// `to_extent` pixels, rounding half away from zero.
pub fn project_coordinate(value: i32, from_extent: usize, to_extent: usize) -> AugResult<i32> {
    if from_extent == 0 {
        return Err(AugmentError::invalid(
            "cannot project from an image with a zero-sized axis",
        ));
    }
    let scaled = (f64::from(value) / from_extent as f64) * to_extent as f64;
    Ok(scaled.round() as i32)
}

// ============================================================================
// Shape
// ============================================================================

/// Dimensions `(height, width[, channels, ...])` of a reference image.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    /// Fails unless at least height and width are given.
    pub fn new(dims: &[usize]) -> AugResult<Self> {
        if dims.len() < 2 {
            return Err(AugmentError::invalid(format!(
                "shape needs at least (height, width), got {} dimension(s)",
                dims.len()
            )));
        }
        Ok(Self {
            dims: dims.to_vec(),
        })
    }

    pub fn height(&self) -> usize {
        self.dims[0]
    }

    pub fn width(&self) -> usize {
        self.dims[1]
    }

    pub fn channels(&self) -> Option<usize> {
        self.dims.get(2).copied()
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dims: Vec<String> = self.dims.iter().map(usize::to_string).collect();
        write!(f, "({})", dims.join(", "))
    }
}

impl From<(usize, usize)> for Shape {
    fn from((height, width): (usize, usize)) -> Self {
        Self {
            dims: vec![height, width],
        }
    }
}

impl From<(usize, usize, usize)> for Shape {
    fn from((height, width, channels): (usize, usize, usize)) -> Self {
        Self {
            dims: vec![height, width, channels],
        }
    }
}

impl From<&Shape> for Shape {
    fn from(shape: &Shape) -> Self {
        shape.clone()
    }
}

impl<T> From<&Array2<T>> for Shape {
    fn from(image: &Array2<T>) -> Self {
        Self {
            dims: image.shape().to_vec(),
        }
    }
}

impl<T> From<&Array3<T>> for Shape {
    fn from(image: &Array3<T>) -> Self {
        Self {
            dims: image.shape().to_vec(),
        }
    }
}

/// Shape of a single image inside an `N×H×W×C` batch.
impl<T> From<&Array4<T>> for Shape {
    fn from(images: &Array4<T>) -> Self {
        Self {
            dims: images.shape()[1..].to_vec(),
        }
    }
}

impl TryFrom<&Value> for Shape {
    type Error = AugmentError;

    /// Arrays contribute their own shape; sequences are read as explicit
    /// dimensions and must hold non-negative integers.
    fn try_from(value: &Value) -> AugResult<Self> {
        match value {
            Value::Array(array) => Shape::new(array.shape()),
            Value::Sequence(items) => {
                let dims = items
                    .iter()
                    .map(|item| match item.as_integer() {
                        Some(d) if d >= 0 => Ok(d as usize),
                        _ => Err(AugmentError::invalid(format!(
                            "shape entries must be non-negative integers, got {:?}",
                            item
                        ))),
                    })
                    .collect::<AugResult<Vec<usize>>>()?;
                Shape::new(&dims)
            }
            other => Err(AugmentError::invalid(format!(
                "expected an array or a sequence as shape, got {}",
                other.kind()
            ))),
        }
    }
}
