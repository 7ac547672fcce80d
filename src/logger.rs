//! Diagnostic logging
//!
//! The compiler and graph builder narrate what they are doing through a
//! [`Logger`]. Lines are nested with [`Logger::indent`], which returns a guard
//! that restores the previous depth when dropped. By default nothing is
//! written; [`Logger::tracing`] forwards every line as a `tracing` event.
//! Logging never influences the graph or its serialization.

use std::cell::Cell;
use std::fmt;

/// Destination for diagnostic lines
pub trait LogSink {
    /// Write one line at the given nesting depth
    fn write_line(&self, depth: usize, line: &str);
}

/// Sink that forwards lines to `tracing` at DEBUG level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn write_line(&self, depth: usize, line: &str) {
        tracing::debug!("{:indent$}{}", "", line, indent = depth * 2);
    }
}

/// Indentation-aware diagnostic logger
pub struct Logger {
    sink: Option<Box<dyn LogSink>>,
    depth: Cell<usize>,
}

impl Logger {
    /// Logger that discards everything
    pub fn null() -> Self {
        Self {
            sink: None,
            depth: Cell::new(0),
        }
    }

    /// Logger that emits `tracing` DEBUG events
    pub fn tracing() -> Self {
        Self::with_sink(TracingSink)
    }

    /// Logger writing to a custom sink
    pub fn with_sink(sink: impl LogSink + 'static) -> Self {
        Self {
            sink: Some(Box::new(sink)),
            depth: Cell::new(0),
        }
    }

    /// Whether lines are written anywhere
    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    /// Write one line at the current depth
    pub fn write_line(&self, args: fmt::Arguments<'_>) {
        if let Some(sink) = &self.sink {
            sink.write_line(self.depth.get(), &args.to_string());
        }
    }

    /// Nest subsequent lines one level deeper until the guard is dropped
    pub fn indent(&self) -> IndentGuard<'_> {
        self.depth.set(self.depth.get() + 1);
        IndentGuard { logger: self }
    }

    /// Current nesting depth
    pub fn depth(&self) -> usize {
        self.depth.get()
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::null()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("enabled", &self.is_enabled())
            .field("depth", &self.depth.get())
            .finish()
    }
}

/// Restores the logger depth on drop
#[must_use = "the indentation ends when the guard is dropped"]
pub struct IndentGuard<'a> {
    logger: &'a Logger,
}

impl Drop for IndentGuard<'_> {
    fn drop(&mut self) {
        let depth = self.logger.depth.get();
        self.logger.depth.set(depth.saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<String>>>);

    impl LogSink for Recorder {
        fn write_line(&self, depth: usize, line: &str) {
            self.0.borrow_mut().push(format!("{}{}", "  ".repeat(depth), line));
        }
    }

    #[test]
    fn test_indent_nests_and_restores() {
        let recorder = Recorder::default();
        let log = Logger::with_sink(recorder.clone());

        log.write_line(format_args!("Attributes"));
        {
            let _outer = log.indent();
            log.write_line(format_args!("{}", "id"));
            {
                let _inner = log.indent();
                log.write_line(format_args!("deeper"));
            }
            log.write_line(format_args!("back"));
        }
        log.write_line(format_args!("done"));

        assert_eq!(
            *recorder.0.borrow(),
            vec!["Attributes", "  id", "    deeper", "  back", "done"]
        );
        assert_eq!(log.depth(), 0);
    }

    #[test]
    fn test_null_logger_is_silent() {
        let log = Logger::default();
        assert!(!log.is_enabled());
        let _guard = log.indent();
        log.write_line(format_args!("ignored"));
        assert_eq!(log.depth(), 1);
    }
}
