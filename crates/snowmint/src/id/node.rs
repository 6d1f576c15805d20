use core::fmt;

use crate::error::{Error, Result};

/// Largest datacenter ID that fits the 5-bit datacenter field.
pub const MAX_DATACENTER_ID: u8 = (1 << 5) - 1;

/// Largest worker ID that fits the 5-bit worker field.
pub const MAX_WORKER_ID: u8 = (1 << 5) - 1;

/// The `(datacenter, worker)` pair identifying which generator issued an ID.
///
/// A `NodeId` is always in range once constructed, so it doubles as the
/// registry key for per-node generators.
///
/// # Example
/// ```
/// use snowmint::id::NodeId;
///
/// let node = NodeId::new(1, 7).unwrap();
/// assert_eq!(node.datacenter_id(), 1);
/// assert_eq!(node.worker_id(), 7);
/// assert_eq!(node.to_string(), "1-7");
///
/// assert!(NodeId::new(32, 0).is_err());
/// assert!(NodeId::try_from((-1, 0)).is_err());
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId {
    datacenter_id: u8,
    worker_id: u8,
}

impl NodeId {
    /// Validates and builds a node identity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentity`] if either value exceeds 31.
    pub fn new(datacenter_id: u8, worker_id: u8) -> Result<Self> {
        if datacenter_id > MAX_DATACENTER_ID || worker_id > MAX_WORKER_ID {
            return Err(Error::InvalidIdentity {
                datacenter_id: i64::from(datacenter_id),
                worker_id: i64::from(worker_id),
            });
        }
        Ok(Self {
            datacenter_id,
            worker_id,
        })
    }

    /// Builds a node identity from values already known to fit 5 bits.
    pub(crate) const fn from_masked(datacenter_id: u8, worker_id: u8) -> Self {
        Self {
            datacenter_id: datacenter_id & MAX_DATACENTER_ID,
            worker_id: worker_id & MAX_WORKER_ID,
        }
    }

    pub const fn datacenter_id(&self) -> u8 {
        self.datacenter_id
    }

    pub const fn worker_id(&self) -> u8 {
        self.worker_id
    }
}

/// Accepts signed configuration input, rejecting negatives as well as values
/// above 31.
impl TryFrom<(i64, i64)> for NodeId {
    type Error = Error;

    fn try_from((datacenter_id, worker_id): (i64, i64)) -> Result<Self> {
        let invalid = || Error::InvalidIdentity {
            datacenter_id,
            worker_id,
        };
        let dc = u8::try_from(datacenter_id).map_err(|_| invalid())?;
        let worker = u8::try_from(worker_id).map_err(|_| invalid())?;
        Self::new(dc, worker).map_err(|_| invalid())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.datacenter_id, self.worker_id)
    }
}
