//! Arena configuration parameters.

/// Configuration for the item arena.
///
/// Controls initial allocation sizing and how deep placement searches
/// descend into nested containers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Number of handle slots to reserve up front.
    ///
    /// Default: 256. Purely a sizing hint; the arena grows past it.
    pub initial_items: usize,

    /// How many container levels below a search node `find` descends.
    ///
    /// Default: 1, meaning the node's direct children are searched as
    /// containers in their own right but grandchildren are not.
    pub search_depth: u32,
}

impl ArenaConfig {
    /// Default number of pre-reserved handle slots.
    pub const DEFAULT_INITIAL_ITEMS: usize = 256;

    /// Default recursion depth for placement search.
    pub const DEFAULT_SEARCH_DEPTH: u32 = 1;

    /// Create a config with default search depth and the given sizing hint.
    pub fn new(initial_items: usize) -> Self {
        Self {
            initial_items,
            search_depth: Self::DEFAULT_SEARCH_DEPTH,
        }
    }

    /// Override the placement search depth.
    pub fn with_search_depth(mut self, depth: u32) -> Self {
        self.search_depth = depth;
        self
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_INITIAL_ITEMS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_searches_one_level() {
        let config = ArenaConfig::default();
        assert_eq!(config.search_depth, 1);
        assert_eq!(config.initial_items, ArenaConfig::DEFAULT_INITIAL_ITEMS);
    }

    #[test]
    fn search_depth_override() {
        let config = ArenaConfig::new(8).with_search_depth(3);
        assert_eq!(config.search_depth, 3);
        assert_eq!(config.initial_items, 8);
    }
}
