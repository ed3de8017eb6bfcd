use crate::{Error, Query, Record};

/// Keeps the records that satisfy every bound in `query`, in their original
/// order.
///
/// A record that lacks a field some bound needs fails the whole call.
pub fn apply(records: Vec<Record>, query: &Query) -> Result<Vec<Record>, Error> {
    if query.is_empty() {
        return Ok(records);
    }

    let total = records.len();
    let mut filtered = Vec::with_capacity(total);
    for (index, record) in records.into_iter().enumerate() {
        if query
            .matches(&record)
            .map_err(|source| Error::MalformedRecord { index, source })?
        {
            filtered.push(record);
        }
    }

    tracing::trace!(total, matched = filtered.len(), "records filtered");

    Ok(filtered)
}
