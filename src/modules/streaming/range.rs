use crate::common::error::AppError;
use crate::infrastructure::storage::ByteWindow;
use serde::Serialize;

/// Byte window resolved for a single request. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeWindow {
    pub start: u64,
    pub end: u64,
    pub total: u64,
    pub is_partial: bool,
}

impl RangeWindow {
    /// Resolves `range_header` (e.g. `bytes=0-1023`) against an object of
    /// `total` bytes.
    ///
    /// Only one contiguous window is understood; a multi-range header is
    /// read as its first `start-end` pair.
    pub fn resolve(total: u64, range_header: Option<&str>) -> Result<Self, AppError> {
        let Some(last) = total.checked_sub(1) else {
            return Err(AppError::EmptyObject("requested object".to_string()));
        };

        let Some(header) = range_header.filter(|h| !h.trim().is_empty()) else {
            return Ok(Self {
                start: 0,
                end: last,
                total,
                is_partial: false,
            });
        };

        let spec = header.trim();
        let spec = spec.strip_prefix("bytes=").unwrap_or(spec);
        let mut parts = spec.split('-');

        let start = parts.next().and_then(leading_integer).unwrap_or(0);
        let end = parts.next().and_then(leading_integer).unwrap_or(last).min(last);

        if start > end {
            return Err(AppError::InvalidRange { total });
        }

        Ok(Self {
            start,
            end,
            total,
            is_partial: true,
        })
    }

    pub fn content_length(&self) -> u64 {
        self.end - self.start + 1
    }

    pub fn content_range(&self) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, self.total)
    }

    pub fn byte_window(&self) -> ByteWindow {
        ByteWindow {
            start: self.start,
            end: self.end,
        }
    }
}

/// Leading decimal digits of `s`; values too large for `u64` saturate.
fn leading_integer(s: &str) -> Option<u64> {
    let s = s.trim_start();
    let digits = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    if digits == 0 {
        return None;
    }
    Some(s[..digits].parse().unwrap_or(u64::MAX))
}
