//! This modules defines the common functionality for paging data.

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: i64,
    /// The maximum transactions to display per page when not specified in a request.
    pub default_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 10,
        }
    }
}

impl PaginationConfig {
    /// Create a config that starts at page 1 with `default_page_size` transactions per page.
    pub fn with_page_size(default_page_size: u64) -> Self {
        Self {
            default_page_size,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PaginationConfig;

    #[test]
    fn with_page_size_keeps_first_page_default() {
        let config = PaginationConfig::with_page_size(25);

        assert_eq!(config.default_page, 1);
        assert_eq!(config.default_page_size, 25);
    }
}
