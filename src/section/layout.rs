use crate::error::VitrineError;
use crate::scroll::{Rect, Viewport};

/// Vertical space one section occupies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    /// Height of the section box.
    pub height: f32,
    /// Extra scroll distance added below the box while it is pinned.
    pub pin_spacing: f32,
}

impl Extent {
    /// Unpinned section of `height`.
    #[must_use]
    pub const fn fixed(height: f32) -> Self {
        Self {
            height,
            pin_spacing: 0.0,
        }
    }

    fn is_usable(&self) -> bool {
        self.height.is_finite()
            && self.pin_spacing.is_finite()
            && self.height >= 0.0
            && self.pin_spacing >= 0.0
    }
}

/// Sections stacked top to bottom in page coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    viewport: Viewport,
    slots: Vec<(Rect, f32)>,
}

impl PageLayout {
    /// Stack `extents` from the page top.
    ///
    /// Layout stops at the first extent with a negative or non-finite
    /// size; that section and the ones below it get no box.
    #[must_use]
    pub fn stack(viewport: Viewport, extents: &[Extent]) -> Self {
        let mut top = 0.0;
        let mut slots = Vec::with_capacity(extents.len());
        for (index, extent) in extents.iter().enumerate() {
            if !extent.is_usable() {
                log::warn!("section {index} has unusable extent {extent:?}, not laid out");
                break;
            }
            slots.push((Rect::new(top, 0.0, viewport.width, extent.height), extent.pin_spacing));
            top += extent.height + extent.pin_spacing;
        }
        Self { viewport, slots }
    }

    /// Viewport the layout was computed for.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Box of section `index`.
    #[must_use]
    pub fn rect(&self, index: usize) -> Option<Rect> {
        self.slots.get(index).map(|(rect, _)| *rect)
    }

    /// Box of section `index`, or a layout error when it has none.
    ///
    /// # Errors
    ///
    /// Returns [`VitrineError::Layout`] when the section was left out of
    /// the layout.
    pub fn section_rect(&self, index: usize) -> Result<Rect, VitrineError> {
        self.rect(index).ok_or_else(|| {
            VitrineError::Layout(format!(
                "section {index} missing from layout of {} sections",
                self.slots.len()
            ))
        })
    }

    /// Total document height including pin spacing.
    #[must_use]
    pub fn page_height(&self) -> f32 {
        self.slots
            .last()
            .map_or(0.0, |(rect, pin)| rect.bottom() + pin)
    }

    /// Largest reachable scroll offset.
    #[must_use]
    pub fn max_scroll(&self) -> f32 {
        (self.page_height() - self.viewport.height).max(0.0)
    }

    /// Section under the viewport row `y` at page scroll `scroll`, and
    /// the row relative to the section's on-screen top.
    ///
    /// A pinned section stays at the viewport top for its pin spacing.
    #[must_use]
    pub fn hit(&self, scroll: f32, y: f32) -> Option<(usize, f32)> {
        let page_y = scroll + y;
        self.slots.iter().enumerate().find_map(|(i, (rect, pin))| {
            let span_end = rect.bottom() + pin;
            if page_y < rect.top || page_y >= span_end {
                return None;
            }
            let pinned_top = rect.top + (scroll - rect.top).clamp(0.0, *pin);
            Some((i, page_y - pinned_top))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEW: Viewport = Viewport::new(1200.0, 800.0);

    fn layout() -> PageLayout {
        PageLayout::stack(
            VIEW,
            &[
                Extent::fixed(800.0),
                Extent {
                    height: 800.0,
                    pin_spacing: 1200.0,
                },
            ],
        )
    }

    #[test]
    fn sections_stack_with_pin_spacing() {
        let layout = layout();
        assert_eq!(layout.rect(0).unwrap().top, 0.0);
        assert_eq!(layout.rect(1).unwrap().top, 800.0);
        assert_eq!(layout.page_height(), 2800.0);
        assert_eq!(layout.max_scroll(), 2000.0);
        assert!(layout.rect(2).is_none());
    }

    #[test]
    fn hit_follows_pinned_section() {
        let layout = layout();
        assert_eq!(layout.hit(0.0, 100.0), Some((0, 100.0)));
        assert_eq!(layout.hit(0.0, 700.0).map(|h| h.0), Some(0));
        // halfway through the pin the showcase still fills the viewport
        let (index, local) = layout.hit(1400.0, 100.0).unwrap();
        assert_eq!(index, 1);
        assert!((local - 100.0).abs() < 1e-3);
        assert!(layout.hit(2700.0, 200.0).is_none());
    }

    #[test]
    fn unusable_extent_ends_the_layout() {
        let layout = PageLayout::stack(
            VIEW,
            &[
                Extent::fixed(800.0),
                Extent::fixed(f32::NAN),
                Extent::fixed(800.0),
            ],
        );
        assert_eq!(layout.page_height(), 800.0);
        assert!(layout.section_rect(0).is_ok());
        assert!(matches!(layout.section_rect(1), Err(VitrineError::Layout(_))));
        assert!(layout.rect(2).is_none());
    }
}
