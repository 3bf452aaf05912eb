//! HTTP Range request parsing module
//!
//! Single-range `bytes=` parsing (RFC 7233 subset). Multi-range requests are
//! rejected, and open-ended or suffix ranges are capped by the chunk size.

/// A satisfiable byte window, `end` inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeWindow {
    /// First byte served
    pub start: u64,
    /// Last byte served (inclusive)
    pub end: u64,
    /// Total size of the content
    pub total: u64,
}

impl RangeWindow {
    /// Number of bytes in the window
    #[inline]
    pub const fn length(&self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` header value for a 206 response
    pub fn content_range(&self) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, self.total)
    }
}

/// Range header parse result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeOutcome {
    /// No Range header or malformed (serve full content)
    NoRange,
    /// Valid single range
    Satisfiable(RangeWindow),
    /// Multi-range or out of bounds - should return 416
    Unsatisfiable,
}

/// Parse HTTP Range header against the actual content size
///
/// Supported formats:
/// - `bytes=start-end` - Specific range, end clamped to the last byte.
///   Explicit windows are not capped by `max_chunk`; a non-numeric end
///   falls back to `min(total - 1, max_chunk)`
/// - `bytes=start-` - From start through byte `start + max_chunk`
///   (at most `max_chunk + 1` bytes)
/// - `bytes=-suffix` - Last suffix bytes, capped like an open range
///
/// # Examples
/// ```
/// use rangeserve::http::range::{parse_range_header, RangeOutcome};
///
/// let result = parse_range_header(Some("bytes=0-99"), 1000, 500);
/// assert!(matches!(result, RangeOutcome::Satisfiable(_)));
///
/// let result = parse_range_header(Some("bytes=0-9,20-29"), 1000, 500);
/// assert_eq!(result, RangeOutcome::Unsatisfiable);
///
/// let result = parse_range_header(None, 1000, 500);
/// assert_eq!(result, RangeOutcome::NoRange);
/// ```
pub fn parse_range_header(range_header: Option<&str>, total: u64, max_chunk: u64) -> RangeOutcome {
    let Some(header) = range_header.map(str::trim).filter(|h| !h.is_empty()) else {
        return RangeOutcome::NoRange;
    };

    let Some(spec) = header.strip_prefix("bytes=") else {
        return RangeOutcome::NoRange; // Not bytes unit, ignore
    };
    let spec = spec.trim();

    if spec.contains(',') {
        return RangeOutcome::Unsatisfiable;
    }

    let Some((start_str, end_str)) = spec.split_once('-') else {
        return RangeOutcome::NoRange;
    };
    let (start_str, end_str) = (start_str.trim(), end_str.trim());

    if start_str.is_empty() {
        return parse_suffix_range(end_str, total, max_chunk);
    }

    parse_standard_range(start_str, end_str, total, max_chunk)
}

/// `Content-Range` value sent with a 416: the default window the server would
/// have served from the start of the content.
pub fn unsatisfiable_content_range(total: u64, max_chunk: u64) -> String {
    match total.checked_sub(1) {
        Some(last) => format!("bytes 0-{}/{total}", last.min(max_chunk)),
        None => "bytes */0".to_string(),
    }
}

/// Parse suffix range (e.g., "-500")
fn parse_suffix_range(suffix_str: &str, total: u64, max_chunk: u64) -> RangeOutcome {
    let Ok(suffix) = suffix_str.parse::<u64>() else {
        return RangeOutcome::NoRange;
    };

    let Some(start) = total.checked_sub(suffix) else {
        return RangeOutcome::Unsatisfiable;
    };

    clamp_and_validate(start, capped_end(start, total, max_chunk), total)
}

/// Parse standard range (e.g., "0-99" or "100-")
fn parse_standard_range(start_str: &str, end_str: &str, total: u64, max_chunk: u64) -> RangeOutcome {
    let Ok(start) = start_str.parse::<u64>() else {
        return RangeOutcome::NoRange;
    };

    let end = if end_str.is_empty() {
        capped_end(start, total, max_chunk)
    } else {
        // An unreadable last byte keeps the range and falls back to the
        // default window from the start of the content
        end_str
            .parse::<u64>()
            .unwrap_or_else(|_| total.saturating_sub(1).min(max_chunk))
    };

    clamp_and_validate(start, end, total)
}

/// Default end for ranges without an explicit last byte
#[inline]
fn capped_end(start: u64, total: u64, max_chunk: u64) -> u64 {
    start.saturating_add(max_chunk).min(total)
}

fn clamp_and_validate(start: u64, end: u64, total: u64) -> RangeOutcome {
    // Nothing is satisfiable in empty content
    let Some(last) = total.checked_sub(1) else {
        return RangeOutcome::Unsatisfiable;
    };

    let end = end.min(last);
    if start > end || start > last {
        return RangeOutcome::Unsatisfiable;
    }

    RangeOutcome::Satisfiable(RangeWindow { start, end, total })
}
