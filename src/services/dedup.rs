//! Duplicate removal across one load of usage records

use crate::types::UsageRecord;
use std::collections::HashSet;

/// Removes records whose `messageId:requestId` key was already seen.
pub struct Deduplicator;

impl Deduplicator {
    /// Single pass, keeping first occurrences in their original order.
    /// Records without both ids are always kept.
    pub fn dedup(records: Vec<UsageRecord>) -> Vec<UsageRecord> {
        let mut seen: HashSet<String> = HashSet::with_capacity(records.len());
        let mut deduped: Vec<UsageRecord> = Vec::with_capacity(records.len());

        for record in records {
            match record.dedup_key() {
                Some(key) => {
                    if seen.insert(key) {
                        deduped.push(record);
                    }
                }
                None => deduped.push(record),
            }
        }

        deduped
    }
}
