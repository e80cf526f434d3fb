//! Cache domain - key-value store abstraction and grades key policy

mod key;
mod repository;

pub use key::{CacheKeyGenerator, GradesCacheKey, MonthlyKeyGenerator};
pub use repository::{Cache, CacheExt};

#[cfg(test)]
pub use repository::mock::MockCache;
