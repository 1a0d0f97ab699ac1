use super::geom::{Rect, Size};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Insets {
    pub left: u16,
    pub right: u16,
    pub top: u16,
    pub bottom: u16,
}

impl Insets {
    pub const fn all(v: u16) -> Self {
        Self {
            left: v,
            right: v,
            top: v,
            bottom: v,
        }
    }

    pub fn horizontal(&self) -> u16 {
        self.left.saturating_add(self.right)
    }

    pub fn vertical(&self) -> u16 {
        self.top.saturating_add(self.bottom)
    }
}

/// Direction along which a linear container lays out its children.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    pub fn main(self, size: Size) -> u16 {
        match self {
            Axis::Horizontal => size.w,
            Axis::Vertical => size.h,
        }
    }

    pub fn cross(self, size: Size) -> u16 {
        match self {
            Axis::Horizontal => size.h,
            Axis::Vertical => size.w,
        }
    }

    pub fn size(self, main: u16, cross: u16) -> Size {
        match self {
            Axis::Horizontal => Size::new(main, cross),
            Axis::Vertical => Size::new(cross, main),
        }
    }
}

impl Rect {
    pub fn inset(self, insets: Insets) -> Self {
        Rect::new(
            self.x.saturating_add(insets.left),
            self.y.saturating_add(insets.top),
            self.w.saturating_sub(insets.horizontal()),
            self.h.saturating_sub(insets.vertical()),
        )
    }

    /// Cuts `len` cells off the start of `self` along `axis`; the first
    /// rectangle never exceeds `self`.
    pub fn split(self, axis: Axis, len: u16) -> (Rect, Rect) {
        match axis {
            Axis::Vertical => {
                let head = len.min(self.h);
                (
                    Rect::new(self.x, self.y, self.w, head),
                    Rect::new(self.x, self.y.saturating_add(head), self.w, self.h - head),
                )
            }
            Axis::Horizontal => {
                let head = len.min(self.w);
                (
                    Rect::new(self.x, self.y, head, self.h),
                    Rect::new(self.x.saturating_add(head), self.y, self.w - head, self.h),
                )
            }
        }
    }

    /// A `w` by `h` rectangle centred in `self`, clamped to its bounds.
    pub fn centered(self, w: u16, h: u16) -> Rect {
        let w = w.min(self.w);
        let h = h.min(self.h);
        Rect::new(
            self.x.saturating_add((self.w - w) / 2),
            self.y.saturating_add((self.h - h) / 2),
            w,
            h,
        )
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/ui/core/layout.rs"]
mod tests;
