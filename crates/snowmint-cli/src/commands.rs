use std::io::Write;
use std::time::Duration;

use anyhow::Context;
use snowmint::{SnowflakeGenerator, SnowflakeId, TimeSource};

/// Writes `count` freshly minted IDs to `out`, one per line.
///
/// Stops at the first generator error; lines already written stay written.
pub fn mint<T, W>(
    generator: &SnowflakeGenerator<T>,
    count: usize,
    padded: bool,
    out: &mut W,
) -> anyhow::Result<()>
where
    T: TimeSource,
    W: Write,
{
    for n in 0..count {
        let id = generator
            .next_id()
            .with_context(|| format!("failed to mint id {} of {count}", n + 1))?;
        if padded {
            writeln!(out, "{}", id.to_padded_string())?;
        } else {
            writeln!(out, "{id}")?;
        }
    }
    tracing::info!(node = %generator.node_id(), count, "minted ids");
    Ok(())
}

/// Writes the decoded fields of each ID in `ids` to `out`.
pub fn decode<W>(ids: &[String], epoch: Duration, out: &mut W) -> anyhow::Result<()>
where
    W: Write,
{
    for raw in ids {
        let id: SnowflakeId = raw.parse().with_context(|| format!("cannot decode {raw:?}"))?;
        writeln!(
            out,
            "{id} timestamp={} unix_ms={} datacenter={} worker={} sequence={}",
            id.timestamp(),
            id.unix_millis(epoch),
            id.datacenter_id(),
            id.worker_id(),
            id.sequence(),
        )?;
    }
    Ok(())
}
