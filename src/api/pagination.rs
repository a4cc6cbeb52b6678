use serde::{Deserialize, Serialize};

pub(crate) const fn default_limit() -> i64 {
    100
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct PageQuery {
    #[serde(default)]
    pub(crate) skip: i64,
    #[serde(default = "default_limit")]
    pub(crate) limit: i64,
}

impl PageQuery {
    /// Same bounds the repositories apply, so the echoed values match the query.
    pub(crate) fn normalized(self) -> Self {
        Self { skip: self.skip.max(0), limit: self.limit.clamp(1, 1000) }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct PaginatedResponse<T> {
    pub(crate) items: Vec<T>,
    pub(crate) total_count: i64,
    pub(crate) skip: i64,
    pub(crate) limit: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_bounds_are_clamped() {
        let page = PageQuery { skip: -5, limit: 5000 }.normalized();
        assert_eq!(page.skip, 0);
        assert_eq!(page.limit, 1000);
        assert!(default_limit() > 0);
    }
}
