use std::fmt::Debug;

use tracing::debug;

/// One request/response exchange, handed to the [`RequestLogger`] when a
/// client runs in debug mode.
#[derive(Clone, Copy, Debug)]
pub struct RequestLog<'a> {
    pub url: &'a str,
    pub method: &'a str,
    pub request: &'a str,
    pub signature: Option<&'a str>,
    pub response: &'a str,
}

/// Sink for debug exchange logs.
pub trait RequestLogger: Debug + Send + Sync {
    fn log(&self, entry: &RequestLog<'_>);
}

/// Emits every exchange as a `debug` tracing event.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogger;

impl RequestLogger for TracingLogger {
    fn log(&self, entry: &RequestLog<'_>) {
        debug!(
            url = entry.url,
            method = entry.method,
            request = entry.request,
            signature = entry.signature.unwrap_or_default(),
            response = entry.response,
            "rpc exchange"
        );
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopLogger;

impl RequestLogger for NoopLogger {
    fn log(&self, _entry: &RequestLog<'_>) {}
}
