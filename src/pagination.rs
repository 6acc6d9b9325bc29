pub const DEFAULT_PAGE_SIZE: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    #[error("page {requested} is out of range (1..={total_pages})")]
    OutOfRange { requested: usize, total_pages: usize },
}

pub fn total_pages(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    len.div_ceil(page_size)
}

/// The `current_page` slice of `items`, 1-based. Out-of-range pages give an empty slice.
pub fn page<T>(items: &[T], page_size: usize, current_page: usize) -> &[T] {
    if page_size == 0 || current_page == 0 {
        return &[];
    }
    let start = (current_page - 1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// Page cursor driven by next/prev/numbered controls.
///
/// Moves outside `1..=total_pages` are rejected rather than producing an
/// empty page; `has_prev`/`has_next` tell the UI which controls to disable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page_size: usize,
    current_page: usize,
}

impl Pagination {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            current_page: 1,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_pages(&self, len: usize) -> usize {
        total_pages(len, self.page_size)
    }

    pub fn go_to(&mut self, requested: usize, total_pages: usize) -> Result<(), PageError> {
        if requested == 0 || requested > total_pages {
            return Err(PageError::OutOfRange {
                requested,
                total_pages,
            });
        }
        self.current_page = requested;
        Ok(())
    }

    pub fn next(&mut self, total_pages: usize) -> Result<(), PageError> {
        self.go_to(self.current_page + 1, total_pages)
    }

    pub fn prev(&mut self) -> Result<(), PageError> {
        // Any page below the current one exists.
        self.go_to(self.current_page - 1, self.current_page)
    }

    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self, total_pages: usize) -> bool {
        self.current_page < total_pages
    }

    /// Pulls the cursor back inside `1..=max(total_pages, 1)` after the result set shrank.
    pub fn clamp(&mut self, total_pages: usize) {
        self.current_page = self.current_page.clamp(1, total_pages.max(1));
    }

    pub fn reset(&mut self) {
        self.current_page = 1;
    }

    pub fn page_numbers(&self, total_pages: usize) -> std::ops::RangeInclusive<usize> {
        1..=total_pages
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        page(items, self.page_size, self.current_page)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}
