use serde::Deserialize;

use crate::config::PaginationConfig;

/// Offset/limit query parameters. `skip` and `offset` are interchangeable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default, alias = "offset")]
    pub skip: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

/// A resolved, bounded page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: i64,
    pub limit: i64,
}

impl PageQuery {
    pub fn resolve(&self, cfg: &PaginationConfig) -> Page {
        let limit = self.limit.unwrap_or(cfg.default_limit).clamp(1, cfg.max_limit);
        let skip = self.skip.unwrap_or(0).max(0);
        Page { skip, limit }
    }
}

impl Page {
    /// Page-number addressing: page `n` of `size` items starts at `n * size`.
    pub fn nth(page: i64, size: i64) -> Self {
        let size = size.max(1);
        Page { skip: page.max(0).saturating_mul(size), limit: size }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> PaginationConfig {
        PaginationConfig { default_limit: 50, max_limit: 1000 }
    }

    #[test]
    fn defaults_apply_when_missing() {
        assert_eq!(PageQuery::default().resolve(&cfg()), Page { skip: 0, limit: 50 });
    }

    #[test]
    fn limit_is_clamped_and_skip_floored() {
        let q = PageQuery { skip: Some(-10), limit: Some(5_000) };
        assert_eq!(q.resolve(&cfg()), Page { skip: 0, limit: 1000 });
        let q = PageQuery { skip: Some(20), limit: Some(0) };
        assert_eq!(q.resolve(&cfg()), Page { skip: 20, limit: 1 });
    }

    #[test]
    fn offset_alias_deserializes() {
        let q: PageQuery = serde_json::from_str(r#"{"offset": 30, "limit": 10}"#).unwrap();
        assert_eq!(q.skip, Some(30));
        assert_eq!(q.limit, Some(10));
    }

    #[test]
    fn nth_page_arithmetic() {
        assert_eq!(Page::nth(0, 25), Page { skip: 0, limit: 25 });
        assert_eq!(Page::nth(3, 25), Page { skip: 75, limit: 25 });
        assert_eq!(Page::nth(-2, 0), Page { skip: 0, limit: 1 });
    }
}
