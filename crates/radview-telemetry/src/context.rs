//! Span helpers that tie every log line of one CLI invocation together.

use tracing::Span;

/// Build the root span for one command invocation.
///
/// The `trace_id` is the same value sent as `x-request-id`, so client logs
/// and server logs can be joined.
#[must_use]
pub fn invocation_span(command: &str, trace_id: &str) -> Span {
    tracing::info_span!(
        "invocation",
        command = %command,
        trace_id = %trace_id,
        version = env!("CARGO_PKG_VERSION")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invocation_span_can_be_entered() {
        let span = invocation_span("reports ls", "trace-1");
        let _entered = span.enter();
    }
}
