use std::ops::Range;

use crate::OrchestratorError;

/// Split `peer_count` slots into consecutive pages of at most `page_size`.
///
/// Only the last page may be short. No peers means no pages.
pub fn plan_pages(peer_count: usize, page_size: usize) -> Result<Vec<Range<usize>>, OrchestratorError> {
    if page_size == 0 {
        return Err(OrchestratorError::InvalidPageSize);
    }
    Ok((0..peer_count.div_ceil(page_size))
        .map(|page| {
            let start = page * page_size;
            start..(start + page_size).min(peer_count)
        })
        .collect())
}
