//! Collapse a flushed batch into one logical turn.

use std::borrow::Cow;

/// What the summarizer needs to know about an inbound entry.
pub trait InboundEntry {
    fn text(&self) -> Option<&str>;

    fn message_id(&self) -> Option<&str> {
        None
    }

    fn was_mentioned(&self) -> bool {
        false
    }
}

pub const DEFAULT_SEPARATOR: &str = "\n";

/// A summarized batch. Borrows from the entries it was built from.
#[derive(Debug)]
pub struct InboundBatch<'a, T> {
    /// Literal first entry, whatever the batch size.
    pub first: &'a T,
    /// Literal last entry; callers inherit author and channel metadata from it.
    pub last: &'a T,
    /// Borrowed verbatim for single-entry batches.
    pub combined_text: Cow<'a, str>,
    /// Non-empty ids in arrival order, duplicates kept.
    pub ids: Vec<&'a str>,
    pub first_id: Option<&'a str>,
    pub last_id: Option<&'a str>,
    pub any_mentioned: bool,
}

/// Summarize `entries`, joining non-empty texts with `separator`.
///
/// Returns `None` for an empty batch.
pub fn summarize_inbound_batch<'a, T: InboundEntry>(
    entries: &'a [T],
    separator: &str,
) -> Option<InboundBatch<'a, T>> {
    let (first, last) = (entries.first()?, entries.last()?);

    if let [only] = entries {
        let id = only.message_id().filter(|id| !id.is_empty());
        return Some(InboundBatch {
            first,
            last,
            combined_text: Cow::Borrowed(only.text().unwrap_or_default()),
            ids: id.into_iter().collect(),
            first_id: id,
            last_id: id,
            any_mentioned: only.was_mentioned(),
        });
    }

    let combined_text = entries
        .iter()
        .filter_map(InboundEntry::text)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(separator);
    let ids: Vec<&str> = entries
        .iter()
        .filter_map(InboundEntry::message_id)
        .filter(|id| !id.is_empty())
        .collect();

    Some(InboundBatch {
        first,
        last,
        combined_text: Cow::Owned(combined_text),
        first_id: ids.first().copied(),
        last_id: ids.last().copied(),
        ids,
        any_mentioned: entries.iter().any(InboundEntry::was_mentioned),
    })
}
