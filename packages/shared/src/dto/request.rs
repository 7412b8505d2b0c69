//! Pagination query parameters.

/// Page request sent as `page`, `size` and `sort` query parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub size: u32,
    /// Sort keys such as `"name,asc"`; each becomes one `sort` parameter
    pub sort: Vec<String>,
}

impl Pagination {
    /// First page with the given size and no sort keys
    pub fn first_page(size: u32) -> Self {
        Self {
            page: 0,
            size,
            sort: Vec::new(),
        }
    }

    /// Render the pagination as query pairs.
    ///
    /// An empty sort list still produces one empty `sort` parameter, which the
    /// backend treats as "unsorted".
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![("page", self.page.to_string()), ("size", self.size.to_string())];
        if self.sort.is_empty() {
            query.push(("sort", String::new()));
        } else {
            query.extend(self.sort.iter().map(|key| ("sort", key.clone())));
        }
        query
    }
}
