use super::types::{LineError, LogRecord};
use crate::analysis::round3;

/// Position of the request path in the `ui_short` log format:
///
/// ```text
/// $remote_addr  $remote_user $http_x_real_ip [$time_local] "$request" ...
/// ```
///
/// The double space after `$remote_addr` yields an empty field, so fields
/// are split on single spaces, not on runs of whitespace.
const URL_FIELD: usize = 7;

/// Extract the url and request time from one access log line.
///
/// The request time is the last field of the line.
pub fn parse_line(line: &str) -> Result<LogRecord, LineError> {
    let fields: Vec<&str> = line.split(' ').collect();

    let url = fields
        .get(URL_FIELD)
        .ok_or(LineError::TooFewFields(fields.len()))?;
    if url.is_empty() {
        return Err(LineError::EmptyUrl);
    }

    let raw_time = fields
        .last()
        .map(|field| strip_line_end(field))
        .filter(|field| !field.is_empty())
        .ok_or(LineError::MissingTime)?;

    let request_time: f64 = raw_time
        .parse()
        .map_err(|_| LineError::InvalidTime(raw_time.to_string()))?;
    if !request_time.is_finite() || request_time < 0.0 {
        return Err(LineError::InvalidTime(raw_time.to_string()));
    }

    Ok(LogRecord {
        url: url.to_string(),
        request_time: round3(request_time),
    })
}

/// Remove line terminators, including the escaped `\n'` left behind by
/// tools that dump byte strings with their repr
fn strip_line_end(field: &str) -> &str {
    let mut field = field.trim_end_matches(['\n', '\r']);
    loop {
        let trimmed = field
            .trim_end_matches('\'')
            .trim_end_matches("\\n")
            .trim_end_matches("\\r");
        if trimmed.len() == field.len() {
            return trimmed;
        }
        field = trimmed;
    }
}
