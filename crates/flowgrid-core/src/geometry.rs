#![forbid(unsafe_code)]

//! Geometric primitives.
//!
//! All values are container-relative pixels stored as `f64`. Measured input
//! coming from a host is normalized (negative or non-finite values become
//! zero) so downstream layout stays total.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Clamp a measured length to a finite, non-negative value.
#[inline]
#[must_use]
pub fn normalize_length(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// A point (or a 2D vector) in container coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise sum.
    #[inline]
    #[must_use]
    pub fn offset(self, delta: Point) -> Self {
        Self::new(self.x + delta.x, self.y + delta.y)
    }

    /// Vector from `origin` to `self`.
    #[inline]
    #[must_use]
    pub fn delta_from(self, origin: Point) -> Self {
        Self::new(self.x - origin.x, self.y - origin.y)
    }

    /// Euclidean length when treated as a vector.
    #[inline]
    #[must_use]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Dot product when treated as a vector.
    #[inline]
    #[must_use]
    pub fn dot(self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Unsigned angle in radians between two vectors, in `[0, PI]`.
    ///
    /// Returns 0 when either vector has zero length.
    #[must_use]
    pub fn angle_to(self, other: Point) -> f64 {
        let lengths = self.length() * other.length();
        if lengths <= f64::EPSILON {
            return 0.0;
        }
        (self.dot(other) / lengths).clamp(-1.0, 1.0).acos()
    }

    /// Swap the axes.
    #[inline]
    #[must_use]
    pub fn transpose(self) -> Self {
        Self::new(self.y, self.x)
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const ZERO: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    #[inline]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    #[inline]
    #[must_use]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    #[inline]
    #[must_use]
    pub fn transpose(self) -> Self {
        Self::new(self.height, self.width)
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: f64,
    /// Top edge (inclusive).
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[inline]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle at `origin` with the given size.
    #[inline]
    pub const fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    /// Right edge (exclusive).
    #[inline]
    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    #[inline]
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[inline]
    #[must_use]
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    #[inline]
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    #[inline]
    #[must_use]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Check if the rectangle has zero area.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Compute the intersection with another rectangle, returning `None` if
    /// the rectangles do not overlap with positive area.
    #[must_use]
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if x < right && y < bottom {
            Some(Rect::new(x, y, right - x, bottom - y))
        } else {
            None
        }
    }

    /// Area shared with another rectangle (0 when disjoint).
    #[inline]
    #[must_use]
    pub fn overlap_area(&self, other: &Rect) -> f64 {
        self.intersection(other).map_or(0.0, |r| r.area())
    }

    /// Whether `other` lies entirely inside `self`.
    #[must_use]
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    #[inline]
    #[must_use]
    pub fn transpose(self) -> Self {
        Self::new(self.y, self.x, self.height, self.width)
    }
}

/// Sides for padding/margin.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Sides {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Sides {
    pub const ZERO: Self = Self::all(0.0);

    /// Create new sides with equal values.
    pub const fn all(val: f64) -> Self {
        Self {
            top: val,
            right: val,
            bottom: val,
            left: val,
        }
    }

    /// Create new sides with specific values.
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Sum of left and right.
    #[inline]
    #[must_use]
    pub fn horizontal_sum(&self) -> f64 {
        self.left + self.right
    }

    /// Sum of top and bottom.
    #[inline]
    #[must_use]
    pub fn vertical_sum(&self) -> f64 {
        self.top + self.bottom
    }

    /// Every side passed through [`normalize_length`].
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            top: normalize_length(self.top),
            right: normalize_length(self.right),
            bottom: normalize_length(self.bottom),
            left: normalize_length(self.left),
        }
    }

    /// Swap the horizontal and vertical sides (top<->left, bottom<->right).
    #[must_use]
    pub fn transpose(self) -> Self {
        Self {
            top: self.left,
            right: self.bottom,
            bottom: self.right,
            left: self.top,
        }
    }
}

impl From<f64> for Sides {
    fn from(val: f64) -> Self {
        Self::all(val)
    }
}

/// Measured box of one element, relative to its container.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ItemBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub margin: Sides,
}

impl ItemBox {
    pub const fn new(left: f64, top: f64, width: f64, height: f64, margin: Sides) -> Self {
        Self {
            left,
            top,
            width,
            height,
            margin,
        }
    }

    /// Box of the given size at the origin with no margins.
    pub const fn sized(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height, Sides::ZERO)
    }

    /// Negative or non-finite dimensions and margins become zero.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            left: if self.left.is_finite() { self.left } else { 0.0 },
            top: if self.top.is_finite() { self.top } else { 0.0 },
            width: normalize_length(self.width),
            height: normalize_length(self.height),
            margin: self.margin.normalized(),
        }
    }

    /// Dimensions and margins rounded to whole pixels.
    #[must_use]
    pub fn rounded(self) -> Self {
        Self {
            left: self.left.round(),
            top: self.top.round(),
            width: self.width.round(),
            height: self.height.round(),
            margin: Sides::new(
                self.margin.top.round(),
                self.margin.right.round(),
                self.margin.bottom.round(),
                self.margin.left.round(),
            ),
        }
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Size including margins.
    #[inline]
    #[must_use]
    pub fn outer_size(&self) -> Size {
        Size::new(
            self.width + self.margin.horizontal_sum(),
            self.height + self.margin.vertical_sum(),
        )
    }
}

/// Measured container: its content-box size plus padding.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContainerBox {
    pub width: f64,
    pub height: f64,
    pub padding: Sides,
}

impl ContainerBox {
    pub const fn new(width: f64, height: f64, padding: Sides) -> Self {
        Self {
            width,
            height,
            padding,
        }
    }

    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            width: normalize_length(self.width),
            height: normalize_length(self.height),
            padding: self.padding.normalized(),
        }
    }
}
