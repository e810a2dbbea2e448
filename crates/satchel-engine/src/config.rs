//! World configuration, validation, and error types.
//!
//! [`WorldConfig`] is the builder-input for constructing an
//! [`ItemWorld`](crate::ItemWorld) or a bare [`TickEngine`](crate::TickEngine).
//! [`validate()`](WorldConfig::validate) checks structural invariants at
//! startup, before any arena is allocated.

use std::error::Error;
use std::fmt;

use satchel_arena::{ArenaConfig, TypeTable, TypeTableError};
use satchel_core::TypeDef;

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`WorldConfig::validate()`].
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// The type definitions do not form a valid table.
    Types(TypeTableError),
    /// Ingress queue capacity is zero.
    IngressQueueZero,
    /// Placement search depth exceeds [`WorldConfig::MAX_SEARCH_DEPTH`].
    SearchDepthTooLarge {
        /// The configured depth.
        configured: u32,
    },
    /// Type definitions could not be parsed.
    InvalidTypes {
        /// Description of the parse failure.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Types(e) => write!(f, "types: {e}"),
            Self::IngressQueueZero => write!(f, "max_ingress_queue must be at least 1"),
            Self::SearchDepthTooLarge { configured } => write!(
                f,
                "search_depth {configured} exceeds maximum of {}",
                WorldConfig::MAX_SEARCH_DEPTH
            ),
            Self::InvalidTypes { reason } => write!(f, "invalid type definitions: {reason}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Types(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TypeTableError> for ConfigError {
    fn from(e: TypeTableError) -> Self {
        Self::Types(e)
    }
}

// ── WorldConfig ────────────────────────────────────────────────────

/// Complete configuration for constructing an item world.
#[derive(Clone, Debug)]
pub struct WorldConfig {
    /// Type definitions. `ItemType(n)` corresponds to `types[n]`.
    pub types: Vec<TypeDef>,
    /// Arena sizing and search parameters.
    pub arena: ArenaConfig,
    /// Maximum requests buffered in the ingress queue. Default: 1024.
    pub max_ingress_queue: usize,
}

impl WorldConfig {
    /// Default ingress queue capacity.
    pub const DEFAULT_MAX_INGRESS_QUEUE: usize = 1024;

    /// Deepest placement search accepted by [`validate()`](Self::validate).
    pub const MAX_SEARCH_DEPTH: u32 = 16;

    /// Config with default arena and queue settings.
    pub fn new(types: Vec<TypeDef>) -> Self {
        Self {
            types,
            arena: ArenaConfig::default(),
            max_ingress_queue: Self::DEFAULT_MAX_INGRESS_QUEUE,
        }
    }

    /// Parse type definitions from a JSON array.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let types: Vec<TypeDef> = serde_json::from_str(json).map_err(|e| {
            ConfigError::InvalidTypes {
                reason: e.to_string(),
            }
        })?;
        Ok(Self::new(types))
    }

    /// Validate all structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.type_table().map(|_| ())
    }

    /// Validate and build the type table.
    pub(crate) fn type_table(&self) -> Result<TypeTable, ConfigError> {
        // 1. Ingress queue >= 1.
        if self.max_ingress_queue == 0 {
            return Err(ConfigError::IngressQueueZero);
        }
        // 2. Search recursion stays bounded.
        if self.arena.search_depth > Self::MAX_SEARCH_DEPTH {
            return Err(ConfigError::SearchDepthTooLarge {
                configured: self.arena.search_depth,
            });
        }
        // 3. Types: non-empty, filter and fungible references resolve.
        Ok(TypeTable::new(self.types.clone())?)
    }
}
