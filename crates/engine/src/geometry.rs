use std::ops::{Add, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct IVec2 {
    pub x: i32,
    pub y: i32,
}

impl IVec2 {
    pub const ZERO: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for IVec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for IVec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Axis-aligned box with inclusive pixel bounds on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Aabb {
    pub xmin: i32,
    pub ymin: i32,
    pub xmax: i32,
    pub ymax: i32,
}

impl Aabb {
    pub const fn new(xmin: i32, ymin: i32, xmax: i32, ymax: i32) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    /// Box covering `size` pixels starting at `min`. Empty sizes yield a box
    /// whose max is below its min.
    pub fn from_min_size(min: IVec2, size: IVec2) -> Self {
        Self::new(min.x, min.y, min.x + size.x - 1, min.y + size.y - 1)
    }

    /// Like [`Aabb::from_min_size`] but `None` when either corner overflows.
    pub fn checked_from_min_size(min: IVec2, size: IVec2) -> Option<Self> {
        let xmax = min.x.checked_add(size.x)?.checked_sub(1)?;
        let ymax = min.y.checked_add(size.y)?.checked_sub(1)?;
        Some(Self::new(min.x, min.y, xmax, ymax))
    }

    pub fn width(&self) -> i32 {
        (self.xmax - self.xmin + 1).max(0)
    }

    pub fn height(&self) -> i32 {
        (self.ymax - self.ymin + 1).max(0)
    }

    pub fn is_empty(&self) -> bool {
        self.xmax < self.xmin || self.ymax < self.ymin
    }

    pub fn min(&self) -> IVec2 {
        IVec2::new(self.xmin, self.ymin)
    }

    pub fn intersects(&self, other: &Self) -> bool {
        self.xmin <= other.xmax
            && other.xmin <= self.xmax
            && self.ymin <= other.ymax
            && other.ymin <= self.ymax
    }

    pub fn overlap(&self, other: &Self) -> Option<Self> {
        if !self.intersects(other) {
            return None;
        }
        Some(Self::new(
            self.xmin.max(other.xmin),
            self.ymin.max(other.ymin),
            self.xmax.min(other.xmax),
            self.ymax.min(other.ymax),
        ))
    }

    pub fn translated(&self, offset: IVec2) -> Self {
        Self::new(
            self.xmin + offset.x,
            self.ymin + offset.y,
            self.xmax + offset.x,
            self.ymax + offset.y,
        )
    }
}
