use ngxreport_core::Error;

pub mod commands;

/// Exit status when too many lines of a log failed to parse
pub const EXIT_THRESHOLD_EXCEEDED: u8 = 1;
/// Exit status for any other failure
pub const EXIT_FAILURE: u8 = 2;

/// Map a run failure to the process exit status
pub fn exit_code(err: &anyhow::Error) -> u8 {
    let threshold_exceeded = err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<Error>(),
            Some(Error::ErrorThresholdExceeded { .. })
        )
    });

    if threshold_exceeded {
        EXIT_THRESHOLD_EXCEEDED
    } else {
        EXIT_FAILURE
    }
}
