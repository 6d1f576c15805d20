use core::{fmt, str::FromStr, time::Duration};

use crate::{
    error::{Error, Result},
    id::NodeId,
};

/// A 64-bit Snowflake ID keyed by datacenter and worker.
///
/// - 1 bit reserved
/// - 41 bits timestamp (ms since the generator's epoch)
/// - 5 bits datacenter ID
/// - 5 bits worker ID
/// - 12 bits sequence
///
/// ```text
///  Bit Index:  63           63 62            22 21            17 16        12 11             0
///              +--------------+----------------+----------------+------------+---------------+
///  Field:      | reserved (1) | timestamp (41) | datacenter (5) | worker (5) | sequence (12) |
///              +--------------+----------------+----------------+------------+---------------+
///              |<------------------ MSB ------------- 64 bits ------------ LSB ------------->|
/// ```
///
/// Comparing raw values orders IDs by time first, then node identity, then
/// issuance order within the millisecond. Across different nodes the node
/// bits only make values distinct; they say nothing about which was minted
/// first.
///
/// # Example
/// ```
/// use snowmint::id::SnowflakeId;
///
/// let id = SnowflakeId::from_components(1_000, 2, 3, 4);
/// assert_eq!(id.timestamp(), 1_000);
/// assert_eq!(id.datacenter_id(), 2);
/// assert_eq!(id.worker_id(), 3);
/// assert_eq!(id.sequence(), 4);
/// assert_eq!(id.to_raw(), (1_000 << 22) | (2 << 17) | (3 << 12) | 4);
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u64", into = "u64"))]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SnowflakeId {
    id: u64,
}

impl SnowflakeId {
    /// Bitmask for extracting the 41-bit timestamp field. Occupies bits 22
    /// through 62.
    pub const TIMESTAMP_MASK: u64 = (1 << 41) - 1;

    /// Bitmask for extracting the 5-bit datacenter field. Occupies bits 17
    /// through 21.
    pub const DATACENTER_ID_MASK: u64 = (1 << 5) - 1;

    /// Bitmask for extracting the 5-bit worker field. Occupies bits 12
    /// through 16.
    pub const WORKER_ID_MASK: u64 = (1 << 5) - 1;

    /// Bitmask for extracting the 12-bit sequence field. Occupies bits 0
    /// through 11.
    pub const SEQUENCE_MASK: u64 = (1 << 12) - 1;

    pub const TIMESTAMP_SHIFT: u64 = 22;
    pub const DATACENTER_ID_SHIFT: u64 = 17;
    pub const WORKER_ID_SHIFT: u64 = 12;
    pub const SEQUENCE_SHIFT: u64 = 0;

    /// The top bit, never set by a generator.
    pub const RESERVED_MASK: u64 = 1 << 63;

    /// Packs the fields into an ID. Each field is masked to its width.
    pub const fn from_components(
        timestamp: u64,
        datacenter_id: u64,
        worker_id: u64,
        sequence: u64,
    ) -> Self {
        let timestamp = (timestamp & Self::TIMESTAMP_MASK) << Self::TIMESTAMP_SHIFT;
        let datacenter_id =
            (datacenter_id & Self::DATACENTER_ID_MASK) << Self::DATACENTER_ID_SHIFT;
        let worker_id = (worker_id & Self::WORKER_ID_MASK) << Self::WORKER_ID_SHIFT;
        let sequence = (sequence & Self::SEQUENCE_MASK) << Self::SEQUENCE_SHIFT;
        Self {
            id: timestamp | datacenter_id | worker_id | sequence,
        }
    }

    pub(crate) const fn for_node(timestamp: u64, node: NodeId, sequence: u16) -> Self {
        Self::from_components(
            timestamp,
            node.datacenter_id() as u64,
            node.worker_id() as u64,
            sequence as u64,
        )
    }

    /// Extracts the epoch-relative timestamp in milliseconds.
    pub const fn timestamp(&self) -> u64 {
        (self.id >> Self::TIMESTAMP_SHIFT) & Self::TIMESTAMP_MASK
    }

    pub const fn datacenter_id(&self) -> u8 {
        ((self.id >> Self::DATACENTER_ID_SHIFT) & Self::DATACENTER_ID_MASK) as u8
    }

    pub const fn worker_id(&self) -> u8 {
        ((self.id >> Self::WORKER_ID_SHIFT) & Self::WORKER_ID_MASK) as u8
    }

    pub const fn sequence(&self) -> u16 {
        ((self.id >> Self::SEQUENCE_SHIFT) & Self::SEQUENCE_MASK) as u16
    }

    /// Returns the node that minted this ID.
    pub const fn node_id(&self) -> NodeId {
        NodeId::from_masked(self.datacenter_id(), self.worker_id())
    }

    /// Returns the wall-clock time, in milliseconds since the Unix epoch, at
    /// which this ID was minted given the `epoch` it was minted against.
    pub const fn unix_millis(&self, epoch: Duration) -> u64 {
        self.timestamp() + epoch.as_millis() as u64
    }

    pub const fn to_raw(&self) -> u64 {
        self.id
    }

    pub const fn from_raw(raw: u64) -> Self {
        Self { id: raw }
    }

    /// Returns `true` if the reserved top bit is clear.
    pub const fn is_valid(&self) -> bool {
        self.id & Self::RESERVED_MASK == 0
    }

    /// Returns the ID as a zero-padded 20-digit string.
    pub fn to_padded_string(&self) -> String {
        format!("{:020}", self.id)
    }
}

impl From<SnowflakeId> for u64 {
    fn from(id: SnowflakeId) -> Self {
        id.to_raw()
    }
}

/// Accepts any raw value with the reserved bit clear.
impl TryFrom<u64> for SnowflakeId {
    type Error = Error;

    fn try_from(raw: u64) -> Result<Self> {
        let id = Self::from_raw(raw);
        if !id.is_valid() {
            return Err(Error::ParseId(format!("{raw}: reserved bit is set")));
        }
        Ok(id)
    }
}

impl fmt::Display for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Debug for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnowflakeId")
            .field("id", &self.id)
            .field("timestamp", &self.timestamp())
            .field("datacenter_id", &self.datacenter_id())
            .field("worker_id", &self.worker_id())
            .field("sequence", &self.sequence())
            .finish()
    }
}

/// Parses the decimal form produced by [`Display`](fmt::Display).
impl FromStr for SnowflakeId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let raw = s
            .trim()
            .parse::<u64>()
            .map_err(|e| Error::ParseId(format!("{s:?}: {e}")))?;
        Self::try_from(raw).map_err(|_| Error::ParseId(format!("{s:?}: reserved bit is set")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_land_in_their_bit_ranges() {
        let id = SnowflakeId::from_components(SnowflakeId::TIMESTAMP_MASK, 0, 0, 0);
        assert_eq!(id.to_raw(), SnowflakeId::TIMESTAMP_MASK << 22);
        assert!(id.is_valid());

        let id = SnowflakeId::from_components(0, 31, 0, 0);
        assert_eq!(id.to_raw(), 0b11111 << 17);

        let id = SnowflakeId::from_components(0, 0, 31, 0);
        assert_eq!(id.to_raw(), 0b11111 << 12);

        let id = SnowflakeId::from_components(0, 0, 0, 4095);
        assert_eq!(id.to_raw(), 0xFFF);
    }

    #[test]
    fn oversized_fields_are_masked() {
        let id = SnowflakeId::from_components(0, 32, 33, 4096);
        assert_eq!(id.datacenter_id(), 0);
        assert_eq!(id.worker_id(), 1);
        assert_eq!(id.sequence(), 0);
    }

    #[test]
    fn orders_by_time_then_node_then_sequence() {
        let early = SnowflakeId::from_components(10, 31, 31, 4095);
        let later = SnowflakeId::from_components(11, 0, 0, 0);
        assert!(early < later);

        let low_node = SnowflakeId::from_components(10, 0, 5, 4095);
        let high_node = SnowflakeId::from_components(10, 1, 0, 0);
        assert!(low_node < high_node);

        let first = SnowflakeId::from_components(10, 1, 1, 0);
        let second = SnowflakeId::from_components(10, 1, 1, 1);
        assert!(first < second);
    }

    #[test]
    fn unix_millis_adds_epoch_back() {
        let epoch = Duration::from_millis(1_609_459_200_000);
        let id = SnowflakeId::from_components(1_234, 1, 1, 0);
        assert_eq!(id.unix_millis(epoch), 1_609_459_201_234);
    }

    #[test]
    fn parses_its_display_form() {
        let id = SnowflakeId::from_components(123_456_789, 7, 9, 42);
        let parsed: SnowflakeId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert_eq!(parsed.node_id(), NodeId::new(7, 9).unwrap());
    }

    #[test]
    fn rejects_garbage_and_reserved_bit() {
        assert!(matches!("".parse::<SnowflakeId>(), Err(Error::ParseId(_))));
        assert!(matches!("-5".parse::<SnowflakeId>(), Err(Error::ParseId(_))));
        assert!(matches!("12ab".parse::<SnowflakeId>(), Err(Error::ParseId(_))));
        assert!(matches!(
            u64::MAX.to_string().parse::<SnowflakeId>(),
            Err(Error::ParseId(_))
        ));
    }

    #[test]
    fn raw_conversion_checks_reserved_bit() {
        assert!(matches!(SnowflakeId::try_from(1u64 << 63), Err(Error::ParseId(_))));
        let id = SnowflakeId::try_from(u64::MAX >> 1).unwrap();
        assert_eq!(u64::from(id), u64::MAX >> 1);
    }

    #[test]
    fn padded_string_is_twenty_digits() {
        let id = SnowflakeId::from_raw(42);
        assert_eq!(id.to_padded_string(), "00000000000000000042");
    }
}
