//  Copyright 2026 twoq Project Authors
//
//  Licensed under the Apache License, Version 2.0 (the "License");
//  you may not use this file except in compliance with the License.
//  You may obtain a copy of the License at
//
//  http://www.apache.org/licenses/LICENSE-2.0
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.

use std::{
    backtrace::Backtrace,
    fmt::{Debug, Display},
    sync::Arc,
};

/// Kinds of failure a twoq cache operation can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Writing back a changed object failed during a mandatory eviction.
    ///
    /// The object that failed to be written back is still resident in the cache.
    Writeback,
    /// The cache config is invalid.
    Config,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::Writeback => "Writeback error",
            ErrorKind::Config => "Config error",
        };
        f.write_str(s)
    }
}

/// Error returned by twoq operations.
///
/// `Display` prints a single line:
///
/// ```shell
/// Writeback error, context: { position: 42 } => write back evicted object failed, source: disk full
/// ```
///
/// `Debug` prints the context, the source and the captured backtrace on separate lines.
#[derive(Clone)]
pub struct Error {
    kind: ErrorKind,
    message: String,
    context: Vec<(&'static str, String)>,
    source: Option<Arc<anyhow::Error>>,
    backtrace: Arc<Backtrace>,
}

impl Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} => {}", self.kind, self.message)?;
        for (k, v) in self.context.iter() {
            writeln!(f, "  {k}: {v}")?;
        }
        if let Some(source) = &self.source {
            writeln!(f, "Source: {source:#}")?;
        }
        write!(f, "Backtrace:\n{}", self.backtrace)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)?;
        if !self.context.is_empty() {
            let context = self
                .context
                .iter()
                .map(|(k, v)| format!("{k}: {v}"))
                .collect::<Vec<_>>()
                .join(", ");
            write!(f, ", context: {{ {context} }}")?;
        }
        write!(f, " => {}", self.message)?;
        if let Some(source) = &self.source {
            write!(f, ", source: {source}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|v| v.as_ref().as_ref())
    }
}

impl Error {
    /// Create a new error without source.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: vec![],
            source: None,
            backtrace: Arc::new(Backtrace::capture()),
        }
    }

    /// Attach a key/value pair, e.g. the position of the object involved.
    pub fn with_context(mut self, key: &'static str, value: impl ToString) -> Self {
        self.context.push((key, value.to_string()));
        self
    }

    /// Set the underlying error. Panics in debug builds if a source is already set.
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        debug_assert!(self.source.is_none(), "the source error has been set");
        self.source = Some(Arc::new(source.into()));
        self
    }

    /// Error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Attached key/value pairs, in the order they were added.
    pub fn context(&self) -> &[(&'static str, String)] {
        &self.context
    }

    /// Backtrace captured on creation. Empty unless `RUST_BACKTRACE` or `RUST_LIB_BACKTRACE` is set.
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }

    /// Downcast the underlying error.
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source.as_deref().and_then(|e| e.downcast_ref::<E>())
    }

    /// Wrap an error raised by the persistence layer while writing back an evicted object.
    pub fn writeback(source: impl Into<anyhow::Error>) -> Self {
        Error::new(ErrorKind::Writeback, "write back evicted object failed").with_source(source)
    }

    /// Reject a cache config with the reason.
    pub fn config(reason: impl ToString) -> Self {
        Error::new(ErrorKind::Config, "invalid cache config").with_context("reason", reason)
    }
}

/// Result type for twoq.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    fn is_send_sync_static<T: Send + Sync + 'static>() {}

    #[test]
    fn test_send_sync_static() {
        is_send_sync_static::<Error>();
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct DeviceError(String);

    impl std::fmt::Display for DeviceError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "device error: {}", self.0)
        }
    }

    impl std::error::Error for DeviceError {}

    #[test]
    fn test_error_display() {
        let err = Error::writeback(std::io::Error::other("disk full")).with_context("position", 42);

        assert_eq!(
            "Writeback error, context: { position: 42 } => write back evicted object failed, source: disk full",
            err.to_string()
        );
    }

    #[test]
    fn test_error_downcast() {
        let inner = DeviceError("page 7 is gone".to_string());
        let err = Error::writeback(inner.clone());

        assert_eq!(err.kind(), ErrorKind::Writeback);
        assert_eq!(err.downcast_ref::<DeviceError>(), Some(&inner));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_config_error_context() {
        let err = Error::config("protected ratio must be in 0.0..=1.0, given: 1.5");
        assert_eq!(err.kind(), ErrorKind::Config);
        assert_eq!(err.context()[0].0, "reason");
        assert_eq!(
            "Config error, context: { reason: protected ratio must be in 0.0..=1.0, given: 1.5 } => invalid cache config",
            err.to_string()
        );
    }
}
