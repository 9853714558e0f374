//! Listing parameters: parent filter and page parsing.

/// Number of entries returned per listing page.
pub const PAGE_SIZE: u32 = 20;

/// Which parent a listing is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParentFilter {
    /// No restriction.
    #[default]
    Any,
    /// Top-level entries only.
    Root,
    /// Direct children of the given folder.
    Folder(i64),
    /// A filter value that cannot name any entry; matches nothing.
    Unmatched,
}

impl ParentFilter {
    /// Parse the raw `parentId` query value.
    ///
    /// `0` is the wire encoding of "top level".
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim) else {
            return ParentFilter::Any;
        };
        if raw.is_empty() {
            return ParentFilter::Any;
        }
        match raw.parse::<i64>() {
            Ok(0) => ParentFilter::Root,
            Ok(id) if id > 0 => ParentFilter::Folder(id),
            _ => ParentFilter::Unmatched,
        }
    }
}

/// Parse a page number, treating anything that is not a non-negative
/// integer as page 0.
pub fn parse_page(raw: Option<&str>) -> u32 {
    raw.and_then(|p| p.trim().parse::<u32>().ok()).unwrap_or(0)
}

/// A listing request for one owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListQuery {
    /// Parent restriction.
    pub parent: ParentFilter,
    /// Zero-indexed page.
    pub page: u32,
}

impl ListQuery {
    /// Build a query from raw `parentId` and `page` parameters.
    pub fn from_params(parent_id: Option<&str>, page: Option<&str>) -> Self {
        Self {
            parent: ParentFilter::parse(parent_id),
            page: parse_page(page),
        }
    }

    /// Row offset of the first entry on this page.
    pub fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(PAGE_SIZE)
    }
}
