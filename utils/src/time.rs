//! Duration formatting helpers.

/// Format a duration in seconds to a human-readable string.
pub fn format_duration(secs: u64) -> String {
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs < 86400 {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else {
        format!("{}d {}h", secs / 86400, (secs % 86400) / 3600)
    }
}

/// Format a block count with its approximate wall-clock length.
pub fn format_blocks(blocks: u64, block_time_secs: u64) -> String {
    format!(
        "{} blocks (~{})",
        blocks,
        format_duration(blocks.saturating_mul(block_time_secs))
    )
}
