//! Page size configuration.
//!
//! Limits are plain values passed to the parsing functions; nothing here is
//! cached in a static. Load them once at startup and hand them to request
//! handlers.
//!
//! | Variable                       | Default | Valid range      |
//! |--------------------------------|---------|------------------|
//! | `CURSORPAGE_DEFAULT_PAGE_SIZE` | 20      | 1..=max          |
//! | `CURSORPAGE_MAX_PAGE_SIZE`     | 100     | 1..=100          |
//!
//! ```
//! use cursorpage::PageLimits;
//!
//! let env = vec![("CURSORPAGE_DEFAULT_PAGE_SIZE".to_string(), "50".to_string())];
//! let limits = PageLimits::from_env(&env);
//! assert_eq!(limits.default_page_size(), 50);
//! assert_eq!(limits.max_page_size(), 100);
//! ```

use crate::constants::{
    DEFAULT_PAGE_SIZE, ENV_DEFAULT_PAGE_SIZE, ENV_MAX_PAGE_SIZE, MAX_PAGE_SIZE, MIN_PAGE_SIZE,
};

/// Bounds applied to the `pageSize` request parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    default_page_size: u32,
    max_page_size: u32,
}

impl PageLimits {
    /// Create limits, falling back to the built-in defaults for values
    /// outside their valid range.
    #[must_use]
    pub const fn new(default_page_size: u32, max_page_size: u32) -> Self {
        let max_page_size = if max_page_size >= MIN_PAGE_SIZE && max_page_size <= MAX_PAGE_SIZE {
            max_page_size
        } else {
            MAX_PAGE_SIZE
        };
        let default_page_size =
            if default_page_size >= MIN_PAGE_SIZE && default_page_size <= max_page_size {
                default_page_size
            } else if DEFAULT_PAGE_SIZE <= max_page_size {
                DEFAULT_PAGE_SIZE
            } else {
                max_page_size
            };
        Self {
            default_page_size,
            max_page_size,
        }
    }

    /// Read limits from an environment snapshot.
    ///
    /// Unset or unparseable variables use the defaults.
    #[must_use]
    pub fn from_env(env: &[(String, String)]) -> Self {
        let read = |name: &str, default: u32| {
            env.iter()
                .rev()
                .find(|(k, _)| k == name)
                .and_then(|(_, v)| v.trim().parse::<u32>().ok())
                .unwrap_or(default)
        };
        Self::new(
            read(ENV_DEFAULT_PAGE_SIZE, DEFAULT_PAGE_SIZE),
            read(ENV_MAX_PAGE_SIZE, MAX_PAGE_SIZE),
        )
    }

    /// Read limits from the current process environment.
    #[must_use]
    pub fn from_process_env() -> Self {
        let env: Vec<(String, String)> = std::env::vars().collect();
        Self::from_env(&env)
    }

    /// Page size used when the request omits `pageSize`.
    #[inline]
    #[must_use]
    pub const fn default_page_size(&self) -> u32 {
        self.default_page_size
    }

    /// Smallest accepted `pageSize`.
    #[inline]
    #[must_use]
    pub const fn min_page_size(&self) -> u32 {
        MIN_PAGE_SIZE
    }

    /// Largest accepted `pageSize`.
    #[inline]
    #[must_use]
    pub const fn max_page_size(&self) -> u32 {
        self.max_page_size
    }
}

impl Default for PageLimits {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE)
    }
}
