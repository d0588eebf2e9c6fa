/// Integer rectangle in target pixels (top-left origin).
///
/// Used for scissor rects and viewports, which the backend consumes as integers.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct IRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl IRect {
    #[inline]
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// Clamps the rect to `[0, width) × [0, height)` and returns it as
    /// `(x, y, w, h)` in unsigned pixels.
    ///
    /// Returns `None` if nothing of the rect remains inside the bounds.
    pub fn clamp_to(self, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        if self.is_empty() {
            return None;
        }
        let max_x = width.min(i32::MAX as u32) as i32;
        let max_y = height.min(i32::MAX as u32) as i32;

        let x0 = self.x.clamp(0, max_x);
        let y0 = self.y.clamp(0, max_y);
        let x1 = self.x.saturating_add(self.w).clamp(0, max_x);
        let y1 = self.y.saturating_add(self.h).clamp(0, max_y);

        if x1 <= x0 || y1 <= y0 {
            None
        } else {
            Some((x0 as u32, y0 as u32, (x1 - x0) as u32, (y1 - y0) as u32))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_inside_is_identity() {
        assert_eq!(IRect::new(2, 3, 10, 20).clamp_to(100, 100), Some((2, 3, 10, 20)));
    }

    #[test]
    fn clamp_cuts_negative_origin() {
        assert_eq!(IRect::new(-5, -5, 10, 10).clamp_to(100, 100), Some((0, 0, 5, 5)));
    }

    #[test]
    fn clamp_outside_is_none() {
        assert_eq!(IRect::new(200, 0, 10, 10).clamp_to(100, 100), None);
        assert_eq!(IRect::new(0, 0, 0, 10).clamp_to(100, 100), None);
    }
}
