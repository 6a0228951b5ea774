//! A collection indexed by two independent key dimensions.
//!
//! [`DuoMap`] stores values addressable by a primary id, a secondary name, or
//! the pair of both. The pair mapping is the source of truth; the two
//! single-dimension views are kept in sync with it by every mutation.
//!
//! ```
//! use duomap::DuoMap;
//!
//! let mut map = DuoMap::new();
//! map.insert(1, "primary", "eth0")?;
//! map.insert(2, "primary", "eth1")?;
//! map.insert(1, "backup", "eth2")?;
//!
//! assert_eq!(map.get(&1, &"primary")?, &"eth0");
//! assert_eq!(map.get_by_id(&1)?, ["eth0", "eth2"]);
//! assert_eq!(map.get_by_name(&"primary")?, ["eth0", "eth1"]);
//! # Ok::<(), duomap::Error>(())
//! ```
//!
//! For use from multiple threads, [`SharedDuoMap`] (feature `sync`, on by
//! default) wraps the map in a per-instance reader-writer lock.

pub mod map;
#[cfg(feature = "sync")]
pub mod sync;

pub use self::map::{
    Builder,
    DefaultHashBuilder,
    DuoMap,
};
#[cfg(feature = "sync")]
pub use self::sync::SharedDuoMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The pair key is already present. Use [`DuoMap::set`] to replace.
    #[error("pair key already present")]
    DuplicateKey,

    /// The requested key has no entry.
    #[error("key not found")]
    NotFound,
}
