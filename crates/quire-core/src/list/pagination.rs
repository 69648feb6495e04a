//! Pagination window over the sorted note list.

/// Notes that fit in a viewport of `viewport_height`, at least one. Falls
/// back to `default_page_size` when the height is unknown or zero.
#[must_use]
pub fn page_size_for(
    viewport_height: Option<u32>,
    min_cell_height: f64,
    default_page_size: usize,
) -> usize {
    match viewport_height {
        Some(height) if height > 0 => {
            let fitted = (f64::from(height) / min_cell_height).floor();
            // Saturating float-to-int conversion; the value is non-negative.
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let fitted = fitted as usize;
            fitted.max(1)
        }
        _ => default_page_size.max(1),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page_size: usize,
    notes_to_display: usize,
}

impl Pagination {
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        let page_size = page_size.max(1);
        Self {
            page_size,
            notes_to_display: page_size,
        }
    }

    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    pub const fn notes_to_display(&self) -> usize {
        self.notes_to_display
    }

    /// Show one more page.
    pub fn paginate(&mut self) {
        self.notes_to_display = self.notes_to_display.saturating_add(self.page_size);
    }

    /// Adopt a freshly computed page size and shrink the window back to one
    /// page, unless `keep_current_if_larger` is set and the window is already
    /// larger than that.
    pub fn reset(&mut self, page_size: usize, keep_current_if_larger: bool) {
        self.page_size = page_size.max(1);
        if keep_current_if_larger && self.notes_to_display > self.page_size {
            return;
        }
        self.notes_to_display = self.page_size;
    }

    /// The visible prefix of `items`
    pub fn window<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[..items.len().min(self.notes_to_display)]
    }
}
