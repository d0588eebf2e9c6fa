use core::ops::{Deref, DerefMut};

use super::RenderContext2D;

/// Restores one piece of pending state when dropped.
///
/// Created by the `scoped_*` methods of [`RenderContext2D`]. The guard borrows
/// the context mutably and derefs to it, so drawing continues through the
/// guard. Guards nest; inner guards restore first.
///
/// ```ignore
/// {
///     let mut ctx = ctx.scoped_blend_state(BlendState::ADDITIVE);
///     ctx.draw_circle(center, 12.0, glow);
/// } // blend state restored here
/// ```
#[must_use = "state is restored as soon as the guard is dropped"]
pub struct ScopedState<'a, T: Copy> {
    ctx: &'a mut RenderContext2D,
    saved: T,
    restore: fn(&mut RenderContext2D, T),
}

impl<'a, T: Copy> ScopedState<'a, T> {
    pub(crate) fn new(ctx: &'a mut RenderContext2D, saved: T, restore: fn(&mut RenderContext2D, T)) -> Self {
        Self { ctx, saved, restore }
    }

    /// The value that will be restored on drop.
    #[inline]
    pub fn saved(&self) -> T {
        self.saved
    }
}

impl<T: Copy> Deref for ScopedState<'_, T> {
    type Target = RenderContext2D;

    #[inline]
    fn deref(&self) -> &RenderContext2D {
        self.ctx
    }
}

impl<T: Copy> DerefMut for ScopedState<'_, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut RenderContext2D {
        self.ctx
    }
}

impl<T: Copy> Drop for ScopedState<'_, T> {
    fn drop(&mut self) {
        (self.restore)(self.ctx, self.saved);
    }
}
