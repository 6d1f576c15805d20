use core::time::Duration;
use std::{
    collections::{HashMap, hash_map::Entry},
    sync::{Arc, OnceLock},
};

use crate::{
    error::Result,
    generator::{Mutex, SnowflakeGenerator, lock},
    id::{NodeId, SnowflakeId},
    time::{DEFAULT_EPOCH, SystemClock, TimeSource},
};

/// A cache of one [`SnowflakeGenerator`] per node identity.
///
/// Generators are created lazily the first time a `(datacenter, worker)` pair
/// is resolved and are kept for the lifetime of the registry; repeated
/// requests for the same identity reuse its sequence and clock tracking
/// instead of starting over. All generators share the registry's clock and
/// epoch.
///
/// Resolution holds a single lock around the map for the check-then-create
/// step, so concurrent first requests for the same identity still construct
/// exactly one generator. Generation itself runs on the generator's own lock,
/// so different identities never contend.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use snowmint::registry::GeneratorRegistry;
///
/// let registry = GeneratorRegistry::new();
/// let a = registry.resolve(1, 2).unwrap();
/// let b = registry.resolve(1, 2).unwrap();
/// assert!(Arc::ptr_eq(&a, &b));
///
/// let id = registry.next_id(1, 2).unwrap();
/// assert_eq!((id.datacenter_id(), id.worker_id()), (1, 2));
/// assert_eq!(registry.len(), Ok(1));
/// ```
pub struct GeneratorRegistry<T = SystemClock>
where
    T: TimeSource + Clone,
{
    generators: Mutex<HashMap<NodeId, Arc<SnowflakeGenerator<T>>>>,
    epoch: Duration,
    time: T,
}

impl GeneratorRegistry<SystemClock> {
    /// Creates an empty registry on the system clock and [`DEFAULT_EPOCH`].
    pub fn new() -> Self {
        Self::with_time(DEFAULT_EPOCH, SystemClock)
    }

    /// Returns the process-wide registry, creating it on first use.
    ///
    /// Prefer an owned [`GeneratorRegistry`] where it can be passed around;
    /// this exists for call sites that have nowhere to keep one.
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<GeneratorRegistry> = OnceLock::new();
        GLOBAL.get_or_init(Self::new)
    }
}

impl Default for GeneratorRegistry<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> GeneratorRegistry<T>
where
    T: TimeSource + Clone,
{
    /// Creates an empty registry whose generators read `time` and encode
    /// timestamps relative to `epoch`.
    pub fn with_time(epoch: Duration, time: T) -> Self {
        Self {
            generators: Mutex::new(HashMap::new()),
            epoch,
            time,
        }
    }

    /// Returns the generator for `(datacenter_id, worker_id)`, creating it on
    /// first request.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidIdentity`] if either ID exceeds 31.
    /// - [`Error::LockPoisoned`] if the map lock is poisoned (std mutex only).
    ///
    /// [`Error::InvalidIdentity`]: crate::Error::InvalidIdentity
    /// [`Error::LockPoisoned`]: crate::Error
    pub fn resolve(&self, datacenter_id: u8, worker_id: u8) -> Result<Arc<SnowflakeGenerator<T>>> {
        self.resolve_node(NodeId::new(datacenter_id, worker_id)?)
    }

    /// Same as [`Self::resolve`] for an already validated identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the map lock is poisoned (std mutex only).
    pub fn resolve_node(&self, node: NodeId) -> Result<Arc<SnowflakeGenerator<T>>> {
        let mut generators = lock!(self.generators);
        let generator = match generators.entry(node) {
            Entry::Occupied(entry) => Arc::clone(entry.get()),
            Entry::Vacant(entry) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(%node, epoch_ms = self.epoch.as_millis() as u64, "creating generator");
                Arc::clone(entry.insert(Arc::new(SnowflakeGenerator::with_time(
                    node,
                    self.epoch,
                    self.time.clone(),
                ))))
            }
        };
        Ok(generator)
    }

    /// Mints the next ID for `(datacenter_id, worker_id)`, reusing that
    /// identity's generator across calls.
    ///
    /// # Errors
    ///
    /// Anything [`Self::resolve`] or [`SnowflakeGenerator::next_id`] returns.
    pub fn next_id(&self, datacenter_id: u8, worker_id: u8) -> Result<SnowflakeId> {
        self.resolve(datacenter_id, worker_id)?.next_id()
    }

    /// Returns `true` if a generator exists for `node`.
    ///
    /// # Errors
    ///
    /// Returns an error if the map lock is poisoned (std mutex only).
    pub fn contains(&self, node: NodeId) -> Result<bool> {
        Ok(lock!(self.generators).contains_key(&node))
    }

    /// Number of identities resolved so far.
    ///
    /// # Errors
    ///
    /// Returns an error if the map lock is poisoned (std mutex only).
    pub fn len(&self) -> Result<usize> {
        Ok(lock!(self.generators).len())
    }

    /// # Errors
    ///
    /// Returns an error if the map lock is poisoned (std mutex only).
    pub fn is_empty(&self) -> Result<bool> {
        Ok(lock!(self.generators).is_empty())
    }

    pub fn epoch(&self) -> Duration {
        self.epoch
    }
}

/// Mints the next ID for `(datacenter_id, worker_id)` through the
/// process-wide [`GeneratorRegistry::global`].
///
/// # Errors
///
/// Anything [`GeneratorRegistry::next_id`] returns.
///
/// # Example
/// ```
/// let a = snowmint::next_id(0, 1).unwrap();
/// let b = snowmint::next_id(0, 1).unwrap();
/// assert!(a < b);
/// ```
pub fn next_id(datacenter_id: u8, worker_id: u8) -> Result<SnowflakeId> {
    GeneratorRegistry::global().next_id(datacenter_id, worker_id)
}
