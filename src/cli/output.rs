//! Colored terminal output for release runs
//!
//! Status lines go to stdout, errors to stderr. Quiet mode silences
//! everything except errors.

use std::io::{self, Write};
use termcolor::{Buffer, BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};

/// Output manager for consistent colored terminal output
#[derive(Debug)]
pub struct OutputManager {
    bufwtr: BufferWriter,
    verbose: bool,
    quiet: bool,
}

impl OutputManager {
    /// Create a new output manager
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            bufwtr: BufferWriter::stdout(ColorChoice::Auto),
            verbose,
            quiet,
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) -> io::Result<()> {
        self.marked("✓", ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true), None, message)
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) -> io::Result<()> {
        let text = ColorSpec::new().set_fg(Some(Color::Yellow)).clone();
        self.marked(
            "⚠",
            ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true),
            Some(&text),
            message,
        )
    }

    /// Print a pipeline progress line
    pub fn progress(&self, message: &str) -> io::Result<()> {
        self.marked("⋯", ColorSpec::new().set_fg(Some(Color::Magenta)), None, message)
    }

    /// Print a verbose/debug message (only in verbose mode)
    pub fn verbose(&self, message: &str) -> io::Result<()> {
        if !self.verbose {
            return Ok(());
        }
        self.marked("→", ColorSpec::new().set_fg(Some(Color::Blue)), None, message)
    }

    /// Print an error message (always shown)
    pub fn error(&self, message: &str) {
        let bufwtr = BufferWriter::stderr(ColorChoice::Auto);
        let mut buffer = bufwtr.buffer();
        let red = ColorSpec::new().set_fg(Some(Color::Red)).clone();
        let written = write_marked(
            &mut buffer,
            "✗",
            red.clone().set_bold(true),
            Some(&red),
            message,
        )
        .and_then(|()| bufwtr.print(&buffer));

        if written.is_err() {
            // Stderr is gone; stdout is the last place left
            println!("✗ {message}");
        }
    }

    /// Print a section header
    pub fn section(&self, title: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }

        let mut buffer = self.bufwtr.buffer();
        writeln!(&mut buffer)?;
        buffer.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))?;
        writeln!(&mut buffer, "═══ {title} ═══")?;
        buffer.reset()?;
        self.bufwtr.print(&buffer)
    }

    /// Print indented text (for sub-items)
    pub fn indent(&self, message: &str) -> io::Result<()> {
        self.plain(&format!("    {message}"))
    }

    /// Print a plain message (respects quiet mode)
    pub fn println(&self, message: &str) -> io::Result<()> {
        self.plain(message)
    }

    /// Check if quiet mode is enabled
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    fn plain(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }

        let mut buffer = self.bufwtr.buffer();
        writeln!(&mut buffer, "{message}")?;
        self.bufwtr.print(&buffer)
    }

    fn marked(
        &self,
        symbol: &str,
        symbol_color: &ColorSpec,
        text_color: Option<&ColorSpec>,
        message: &str,
    ) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }

        let mut buffer = self.bufwtr.buffer();
        write_marked(&mut buffer, symbol, symbol_color, text_color, message)?;
        self.bufwtr.print(&buffer)
    }
}

fn write_marked(
    buffer: &mut Buffer,
    symbol: &str,
    symbol_color: &ColorSpec,
    text_color: Option<&ColorSpec>,
    message: &str,
) -> io::Result<()> {
    buffer.set_color(symbol_color)?;
    write!(buffer, "{symbol}")?;
    buffer.reset()?;
    if let Some(color) = text_color {
        buffer.set_color(color)?;
    }
    writeln!(buffer, " {message}")?;
    buffer.reset()
}
