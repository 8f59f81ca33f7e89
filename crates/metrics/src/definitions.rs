/// Inbound debounce and batching.
pub mod inbound {
    /// Platform events pushed into the pipeline
    pub const EVENTS_TOTAL: &str = "switchboard_inbound_events_total";
    /// Entries handed to the debouncer
    pub const ENTRIES_TOTAL: &str = "switchboard_inbound_entries_total";
    /// Batches delivered to the flush handler
    pub const BATCHES_FLUSHED_TOTAL: &str = "switchboard_inbound_batches_flushed_total";
    /// Entries per flushed batch
    pub const BATCH_SIZE: &str = "switchboard_inbound_batch_size";
    /// Flush handler failures
    pub const FLUSH_ERRORS_TOTAL: &str = "switchboard_inbound_flush_errors_total";
    /// Conversation keys with a buffered batch or a flush in progress
    pub const HOT_KEYS: &str = "switchboard_inbound_hot_keys";
}

/// Session identity.
pub mod sessions {
    /// Legacy keys rewritten into the canonical grammar
    pub const KEYS_MIGRATED_TOTAL: &str = "switchboard_session_keys_migrated_total";
}

/// Label keys.
pub mod labels {
    pub const CHANNEL: &str = "channel";
    pub const SHAPE: &str = "shape";
    /// Why an entry skipped the debounce window
    pub const REASON: &str = "reason";
}
