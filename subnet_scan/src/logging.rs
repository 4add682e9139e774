use colored::*;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::{self, Writer};
use tracing_subscriber::fmt::{FmtContext, FormatEvent};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

/// One line per event: a level tag, then the fields. Debug and trace events
/// also name the module they come from.
pub struct ScanFormatter;

fn level_tag(level: &Level) -> ColoredString {
    match *level {
        Level::ERROR => "[x]".red().bold(),
        Level::WARN => "[!]".yellow().bold(),
        Level::INFO => "[+]".green(),
        Level::DEBUG => "[.]".cyan(),
        Level::TRACE => "[.]".dimmed(),
    }
}

impl<S, N> FormatEvent<S, N> for ScanFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> format::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        write!(writer, "{} ", level_tag(meta.level()))?;
        if *meta.level() >= Level::DEBUG {
            write!(writer, "{} ", meta.target().dimmed())?;
        }
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

fn default_directives(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "subnet_scan=info,ip_ping_request=warn",
        1 => "subnet_scan=debug,ip_ping_request=debug",
        _ => "subnet_scan=trace,ip_ping_request=trace",
    }
}

/// Logs go to stderr so stdout only carries scan results.
///
/// `RUST_LOG` takes precedence over `verbosity`.
pub fn init_logging(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbosity)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .event_format(ScanFormatter)
        .init();
}
