//! Axis-aligned bounding box representation with utility methods.
//!
//! This module provides the [`Bounds`] type used for every box that flows through
//! the layout pipeline, from recovered detections to merged regions.

use geo::{coord, Rect};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An axis-aligned bounding box in page-pixel (or model) space.
///
/// Backed by a [`geo::Rect`], so the corners are always normalised: `x1 <= x2`
/// and `y1 <= y2` regardless of the order they were supplied in.
///
/// # Coordinate System
///
/// - **X-axis**: Increases from left to right
/// - **Y-axis**: Increases from top to bottom (standard image coordinates)
///
/// ```text
/// (x1, y1) -------------+
///     |                 |
///     |                 |
///     +------------- (x2, y2)
/// ```
///
/// # Serialization
///
/// Serializes as a flat `[x1, y1, x2, y2]` array.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    rect: Rect<f32>,
}

impl Bounds {
    /// Creates a new `Bounds` from two opposite corners.
    #[inline]
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            rect: Rect::new(coord! { x: x1, y: y1 }, coord! { x: x2, y: y2 }),
        }
    }

    #[inline]
    pub fn x1(&self) -> f32 {
        self.rect.min().x
    }

    #[inline]
    pub fn y1(&self) -> f32 {
        self.rect.min().y
    }

    #[inline]
    pub fn x2(&self) -> f32 {
        self.rect.max().x
    }

    #[inline]
    pub fn y2(&self) -> f32 {
        self.rect.max().y
    }

    /// Returns the width of the box (`x2 - x1`), never negative.
    #[inline]
    pub fn width(&self) -> f32 {
        self.rect.width()
    }

    /// Returns the height of the box (`y2 - y1`), never negative.
    #[inline]
    pub fn height(&self) -> f32 {
        self.rect.height()
    }

    /// Returns the area of the box.
    #[inline]
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Returns the horizontal centre.
    #[inline]
    pub fn center_x(&self) -> f32 {
        (self.x1() + self.x2()) / 2.0
    }

    /// Returns the vertical centre.
    #[inline]
    pub fn center_y(&self) -> f32 {
        (self.y1() + self.y2()) / 2.0
    }

    /// Returns `true` if `other` lies entirely inside this box (edges inclusive).
    #[inline]
    pub fn contains(&self, other: &Bounds) -> bool {
        self.x1() <= other.x1()
            && self.y1() <= other.y1()
            && self.x2() >= other.x2()
            && self.y2() >= other.y2()
    }

    /// Returns the corners as `[x1, y1, x2, y2]`.
    #[inline]
    pub fn to_array(&self) -> [f32; 4] {
        [self.x1(), self.y1(), self.x2(), self.y2()]
    }
}

impl From<[f32; 4]> for Bounds {
    #[inline]
    fn from(values: [f32; 4]) -> Self {
        Self::new(values[0], values[1], values[2], values[3])
    }
}

impl From<Bounds> for [f32; 4] {
    #[inline]
    fn from(bounds: Bounds) -> Self {
        bounds.to_array()
    }
}

impl Serialize for Bounds {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_array().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Bounds {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let values: Vec<f32> = Vec::deserialize(deserializer)?;
        if values.len() != 4 {
            return Err(serde::de::Error::custom(format!(
                "Expected 4 coordinates, got {}",
                values.len()
            )));
        }
        Ok(Self::new(values[0], values[1], values[2], values[3]))
    }
}
