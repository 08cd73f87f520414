use std::fmt;
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::{format::Writer, FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

/// Wraps each field in brackets
/// Format: [TIMESTAMP] [LEVEL] [SCOPE] [TARGET: FILE:LINE]: MESSAGE
///
/// `SCOPE` is the chain of open spans, outermost first and joined with `>`,
/// so an event inside `analyze` > `caption` reads `[analyze>caption]`. Outside
/// any span the last segment of the target stands in.
#[derive(Debug, Clone, Copy)]
pub struct BracketedFormatter {
    with_location: bool,
}

impl BracketedFormatter {
    /// Full format with source locations, used for log files
    pub fn new() -> Self {
        Self {
            with_location: true,
        }
    }

    /// Drops `FILE:LINE` to keep terminal lines short
    pub fn console() -> Self {
        Self {
            with_location: false,
        }
    }
}

impl Default for BracketedFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, N> FormatEvent<S, N> for BracketedFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();

        let now = chrono::Local::now();
        write!(writer, "[{}]  ", now.format("%Y-%m-%dT%H:%M:%S%.3f%:z"))?;

        write!(writer, "[{:5}] ", metadata.level())?;

        let scope = ctx
            .event_scope()
            .map(|scope| {
                scope
                    .from_root()
                    .map(|span| span.name())
                    .collect::<Vec<_>>()
                    .join(">")
            })
            .filter(|path| !path.is_empty())
            .unwrap_or_else(|| {
                metadata
                    .target()
                    .rsplit("::")
                    .next()
                    .unwrap_or("unknown")
                    .to_string()
            });
        write!(writer, "[{}] ", scope)?;

        match (self.with_location, metadata.file(), metadata.line()) {
            (true, Some(file), Some(line)) => {
                write!(writer, "[{}: {}:{}]: ", metadata.target(), file, line)?
            }
            _ => write!(writer, "[{}]: ", metadata.target())?,
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing::{info, info_span};
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn capture(formatter: BracketedFormatter, emit: impl FnOnce()) -> String {
        let out = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .event_format(formatter)
            .with_writer(out.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, emit);
        out.text()
    }

    #[test]
    fn test_nested_spans_form_a_path() {
        let line = capture(BracketedFormatter::new(), || {
            let outer = info_span!("analyze");
            let _outer = outer.enter();
            let inner = info_span!("caption");
            let _inner = inner.enter();
            info!("model loaded");
        });
        assert!(line.contains("[INFO ] [analyze>caption] "), "{}", line);
        assert!(line.trim_end().ends_with("model loaded"), "{}", line);
    }

    #[test]
    fn test_target_stands_in_without_span() {
        let line = capture(BracketedFormatter::new(), || info!("ready"));
        assert!(line.contains("[tests] "), "{}", line);
        assert!(line.contains("formatter.rs:"), "{}", line);
    }

    #[test]
    fn test_console_omits_location() {
        let line = capture(BracketedFormatter::console(), || info!("ready"));
        assert!(!line.contains("formatter.rs"), "{}", line);
        assert!(line.contains("[smart_image_analyzer::logging::formatter::tests]: ready"), "{}", line);
    }
}
