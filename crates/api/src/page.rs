//! Pagination request and result types shared by every gateway that lists entities.

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 1000;

/// Sort is restricted to the identity column so the gateway never has to
/// interpolate caller-provided column names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum SortOrder {
    #[default]
    IdAscending,
    IdDescending,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    size: i64,
    sort: SortOrder,
}

impl PageRequest {
    pub fn new(page: i64, size: i64, sort: SortOrder) -> Self {
        Self {
            page: page.max(0),
            size: size.clamp(1, MAX_PAGE_SIZE),
            sort,
        }
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn size(&self) -> i64 {
        self.size
    }

    pub fn sort(&self) -> SortOrder {
        self.sort
    }

    pub fn offset(&self) -> i64 {
        self.page * self.size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, DEFAULT_PAGE_SIZE, SortOrder::default())
    }
}

/// One page of content plus the total count needed for pagination headers.
#[derive(Clone, Debug)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_count: i64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, total_count: i64) -> Self {
        Self {
            content,
            total_count,
        }
    }

    pub fn total_pages(&self, size: i64) -> i64 {
        if size <= 0 {
            return 0;
        }
        (self.total_count + size - 1) / size
    }
}
