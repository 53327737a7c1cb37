use serde::Deserialize;

/// Offset/limit window applied to every `query`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Page {
    pub offset: i64,
    pub limit: i64,
}

impl Page {
    pub const DEFAULT_LIMIT: i64 = 50;
    pub const MAX_LIMIT: i64 = 500;

    pub fn new(offset: i64, limit: i64) -> Self {
        Self { offset, limit }
    }

    /// Offset and limit clamped to sane bounds. A limit of zero or less
    /// yields an empty page.
    pub fn bounds(self) -> (i64, i64) {
        (self.offset.max(0), self.limit.clamp(0, Self::MAX_LIMIT))
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_bounds_are_clamped() {
        assert_eq!(Page::new(-5, 0).bounds(), (0, 0));
        assert_eq!(Page::new(0, -3).bounds(), (0, 0));
        assert_eq!(Page::new(10, 10_000).bounds(), (10, Page::MAX_LIMIT));
        assert_eq!(Page::default().bounds(), (0, Page::DEFAULT_LIMIT));
    }

    #[test]
    fn test_page_deserializes_with_defaults() {
        let page: Page = serde_json::from_str(r#"{"offset": 20}"#).unwrap();
        assert_eq!(page, Page::new(20, Page::DEFAULT_LIMIT));
    }
}
