/// 1-based page cursor. There is no upper bound: the server decides when a
/// page is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Page(u32);

impl Page {
    pub const FIRST: Page = Page(1);

    pub fn new(number: u32) -> Option<Self> {
        (number >= 1).then_some(Self(number))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Floors at the first page.
    pub fn previous(self) -> Self {
        Self(self.0.saturating_sub(1).max(1))
    }

    pub fn window(self, page_size: u32) -> PageWindow {
        PageWindow {
            limit: page_size,
            offset: u64::from(self.0 - 1) * u64::from(page_size),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::FIRST
    }
}

impl std::fmt::Display for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// `limit`/`offset` pair sent with list and search queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub limit: u32,
    pub offset: u64,
}
