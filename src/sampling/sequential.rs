//! Sequential record aggregation
//!
//! Reads records round-robin starting at the offset stored for the cursor key,
//! wrapping at the end of the list, and stores the offset after the last
//! record read. Unusable records are stepped over but still advance the
//! cursor.

use super::cursor::CursorRegistry;
use super::{ensure_usable, Aggregate, RecordSampler};
use crate::model::{CursorKey, ShotRecord};
use crate::Result;
use std::sync::Arc;

/// Round-robin sampler backed by a shared cursor
#[derive(Debug)]
pub struct SequentialSampler {
    registry: Arc<CursorRegistry>,
    key: CursorKey,
}

impl SequentialSampler {
    pub fn new(registry: Arc<CursorRegistry>, key: CursorKey) -> Self {
        Self { registry, key }
    }
}

impl RecordSampler for SequentialSampler {
    fn aggregate(&mut self, records: &[ShotRecord], shots: u64) -> Result<Aggregate> {
        ensure_usable(records)?;
        let n = records.len();

        let aggregate = self.registry.advance(&self.key, |stored| {
            // The stored offset may come from a different record count
            let mut offset = stored % n;
            let mut aggregate = Aggregate::default();

            while aggregate.total_shots < shots {
                let record = &records[offset];
                offset = (offset + 1) % n;
                aggregate.records_consumed += 1;
                aggregate.absorb(record);
            }

            (offset, aggregate)
        });

        Ok(aggregate)
    }
}
