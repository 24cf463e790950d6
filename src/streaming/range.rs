//! HTTP `Range` header handling for single byte ranges.

/// How a request's `Range` header applies to a file of a given size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeSpec {
    /// No usable range: send the whole file with 200.
    Full,
    /// Send `start..=end` with 206.
    Partial { start: u64, end: u64 },
    /// Well-formed but outside the file: 416.
    Unsatisfiable,
}

/// Parse a `Range` header against `file_size`.
///
/// Supports formats:
/// - bytes=0-499
/// - bytes=500- (to the end)
/// - bytes=-500 (last 500 bytes)
///
/// Anything malformed, including multi-range requests and `end < start`,
/// yields [`RangeSpec::Full`]: range hints only help seeking, so playback
/// falls back to the whole file instead of failing.
pub fn parse_range(header: Option<&str>, file_size: u64) -> RangeSpec {
    let Some(header) = header else {
        return RangeSpec::Full;
    };
    let Some(spec) = header.trim().strip_prefix("bytes=") else {
        return RangeSpec::Full;
    };
    if spec.contains(',') {
        return RangeSpec::Full;
    }
    let Some((start, end)) = spec.split_once('-') else {
        return RangeSpec::Full;
    };

    let (start, end) = (start.trim(), end.trim());

    match (start.is_empty(), end.is_empty()) {
        // bytes=-500
        (true, false) => {
            let Ok(suffix_len) = end.parse::<u64>() else {
                return RangeSpec::Full;
            };
            if suffix_len == 0 || file_size == 0 {
                return RangeSpec::Unsatisfiable;
            }
            RangeSpec::Partial {
                start: file_size.saturating_sub(suffix_len),
                end: file_size - 1,
            }
        }
        // bytes=500-
        (false, true) => {
            let Ok(start) = start.parse::<u64>() else {
                return RangeSpec::Full;
            };
            if start >= file_size {
                return RangeSpec::Unsatisfiable;
            }
            RangeSpec::Partial {
                start,
                end: file_size - 1,
            }
        }
        // bytes=0-499
        (false, false) => {
            let (Ok(start), Ok(end)) = (start.parse::<u64>(), end.parse::<u64>()) else {
                return RangeSpec::Full;
            };
            if end < start {
                return RangeSpec::Full;
            }
            if start >= file_size {
                return RangeSpec::Unsatisfiable;
            }
            RangeSpec::Partial {
                start,
                end: end.min(file_size - 1),
            }
        }
        // bytes=-
        (true, true) => RangeSpec::Full,
    }
}
