//! Column widths and drag-to-resize gestures.
//!
//! A resize gesture holds a [`CaptureLease`] for its whole lifetime. The lease
//! releases the pointer capture when dropped, so ending, cancelling,
//! replacing the gesture or dropping the layout all release it exactly once.

use crate::error::{GridError, GridResult};
use crate::record::ColumnSpec;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Surface-wide pointer capture, acquired for the duration of one drag.
///
/// While acquired, the host must deliver pointer moves and the release event
/// to the layout even when the pointer leaves the column header.
pub trait PointerCapture: Send + Sync {
    fn acquire(&self, column: &str);
    fn release(&self);
}

/// Capture for hosts that route every pointer event to the layout anyway.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCapture;

impl PointerCapture for NoCapture {
    fn acquire(&self, _column: &str) {}
    fn release(&self) {}
}

/// Releases its capture on drop.
pub struct CaptureLease {
    capture: Arc<dyn PointerCapture>,
}

impl CaptureLease {
    pub fn acquire(capture: Arc<dyn PointerCapture>, column: &str) -> Self {
        capture.acquire(column);
        Self { capture }
    }
}

impl Drop for CaptureLease {
    fn drop(&mut self) {
        self.capture.release();
    }
}

impl fmt::Debug for CaptureLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureLease").finish_non_exhaustive()
    }
}

/// `max(min_width, start_width + delta)`, saturating at `u16::MAX`.
pub fn resized_width(start_width: u16, delta: i32, min_width: u16) -> u16 {
    let width = i64::from(start_width) + i64::from(delta);
    width.clamp(i64::from(min_width), i64::from(u16::MAX)) as u16
}

#[derive(Debug)]
struct ResizeGesture {
    column: &'static str,
    start_x: i32,
    start_width: u16,
    _lease: CaptureLease,
}

pub struct ColumnLayout {
    columns: &'static [ColumnSpec],
    widths: HashMap<&'static str, u16>,
    capture: Arc<dyn PointerCapture>,
    gesture: Option<ResizeGesture>,
}

impl ColumnLayout {
    pub fn new(columns: &'static [ColumnSpec]) -> Self {
        Self::with_capture(columns, Arc::new(NoCapture))
    }

    pub fn with_capture(columns: &'static [ColumnSpec], capture: Arc<dyn PointerCapture>) -> Self {
        Self {
            columns,
            widths: HashMap::new(),
            capture,
            gesture: None,
        }
    }

    /// Swap the capture used by future gestures. An active gesture ends first.
    pub fn set_capture(&mut self, capture: Arc<dyn PointerCapture>) {
        self.gesture = None;
        self.capture = capture;
    }

    pub fn columns(&self) -> &'static [ColumnSpec] {
        self.columns
    }

    /// Current width, falling back to the column default.
    pub fn width(&self, key: &str) -> Option<u16> {
        let spec = self.spec(key)?;
        Some(self.widths.get(spec.key).copied().unwrap_or(spec.default_width))
    }

    /// `(key, width)` for every column in display order.
    pub fn widths(&self) -> Vec<(&'static str, u16)> {
        self.columns
            .iter()
            .map(|c| (c.key, self.widths.get(c.key).copied().unwrap_or(c.default_width)))
            .collect()
    }

    pub fn is_resizing(&self) -> bool {
        self.gesture.is_some()
    }

    pub fn resizing_column(&self) -> Option<&'static str> {
        self.gesture.as_ref().map(|g| g.column)
    }

    /// Start a drag on `key`'s handle at pointer position `pointer_x`.
    pub fn begin_resize(&mut self, key: &str, pointer_x: i32) -> GridResult<()> {
        let spec = self.resizable_spec(key)?;
        // Release any gesture that never saw its end event before acquiring again.
        self.gesture = None;
        let start_width = self.widths.get(spec.key).copied().unwrap_or(spec.default_width);
        let lease = CaptureLease::acquire(Arc::clone(&self.capture), spec.key);
        tracing::trace!(column = spec.key, pointer_x, start_width, "column resize started");
        self.gesture = Some(ResizeGesture {
            column: spec.key,
            start_x: pointer_x,
            start_width,
            _lease: lease,
        });
        Ok(())
    }

    /// Apply a pointer move to the active gesture. Returns the new width.
    pub fn pointer_moved(&mut self, pointer_x: i32) -> Option<u16> {
        let gesture = self.gesture.as_ref()?;
        let min_width = self.spec(gesture.column).map(|s| s.min_width).unwrap_or(1);
        let delta = pointer_x.saturating_sub(gesture.start_x);
        let width = resized_width(gesture.start_width, delta, min_width);
        self.widths.insert(gesture.column, width);
        Some(width)
    }

    /// Finish the gesture, keeping the last applied width.
    pub fn end_resize(&mut self) -> Option<(&'static str, u16)> {
        let gesture = self.gesture.take()?;
        let width = self.widths.get(gesture.column).copied().unwrap_or(gesture.start_width);
        tracing::debug!(column = gesture.column, width, "column resized");
        Some((gesture.column, width))
    }

    /// Abort the gesture and restore the width it started from.
    pub fn cancel_resize(&mut self) -> bool {
        match self.gesture.take() {
            Some(gesture) => {
                self.widths.insert(gesture.column, gesture.start_width);
                true
            }
            None => false,
        }
    }

    /// Keyboard resize: grow or shrink by `delta`, same clamp as dragging.
    pub fn nudge(&mut self, key: &str, delta: i32) -> GridResult<u16> {
        let spec = self.resizable_spec(key)?;
        let current = self.widths.get(spec.key).copied().unwrap_or(spec.default_width);
        let width = resized_width(current, delta, spec.min_width);
        self.widths.insert(spec.key, width);
        Ok(width)
    }

    /// Column whose resize handle sits at horizontal offset `x`.
    ///
    /// Columns are laid out left to right separated by `spacing` cells; the
    /// handle is the last cell of each column.
    pub fn handle_at(&self, x: u16, spacing: u16) -> Option<&'static str> {
        let mut left: u32 = 0;
        for (key, width) in self.widths() {
            let right = left + u32::from(width);
            if width > 0 && u32::from(x) == right - 1 {
                return self.spec(key).filter(|s| s.resizable).map(|s| s.key);
            }
            left = right + u32::from(spacing);
        }
        None
    }

    fn spec(&self, key: &str) -> Option<&'static ColumnSpec> {
        self.columns.iter().find(|c| c.key == key)
    }

    fn resizable_spec(&self, key: &str) -> GridResult<&'static ColumnSpec> {
        self.spec(key)
            .filter(|s| s.resizable)
            .ok_or_else(|| GridError::UnknownColumn {
                key: key.to_string(),
            })
    }
}

impl fmt::Debug for ColumnLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnLayout")
            .field("widths", &self.widths())
            .field("gesture", &self.gesture)
            .finish()
    }
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Property: width never drops below the minimum for any drag delta
        #[test]
        fn prop_resized_width_respects_minimum(
            start in 0u16..2000,
            delta in -5000i32..5000,
            min in 1u16..400,
        ) {
            let width = resized_width(start, delta, min);
            prop_assert!(width >= min);
        }

        /// Property: inside the valid range the width follows the pointer exactly
        #[test]
        fn prop_resized_width_tracks_pointer(start in 100u16..1000, delta in -20i32..20) {
            let width = resized_width(start, delta, 50);
            prop_assert_eq!(i32::from(width), i32::from(start) + delta);
        }
    }
}
