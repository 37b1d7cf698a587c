/// 1-based page request. Page numbers below 1 are clamped to 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub per_page: usize,
}

impl PageRequest {
    pub fn new(page: Option<i64>, per_page: usize) -> Self {
        let page = page.filter(|p| *p > 0).unwrap_or(1) as usize;
        Self {
            page,
            per_page: per_page.max(1),
        }
    }

    /// Slice one page out of `items`, returning the page and whether more
    /// items follow it.
    pub fn apply<T>(&self, items: Vec<T>) -> (Vec<T>, bool) {
        let skip = (self.page - 1).saturating_mul(self.per_page);
        let total = items.len();
        let page: Vec<T> = items.into_iter().skip(skip).take(self.per_page).collect();
        let has_more = total > skip.saturating_add(self.per_page);
        (page, has_more)
    }
}
