use colored::Colorize;
use std::io::{IsTerminal, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Advisory,
    Pending,
    Explanation,
    Error,
}

/// One state of the output area: its text and how it is colored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub tone: Tone,
    pub text: String,
}

impl Rendered {
    pub fn advisory(text: impl Into<String>) -> Self {
        Self {
            tone: Tone::Advisory,
            text: text.into(),
        }
    }

    pub fn pending(text: impl Into<String>) -> Self {
        Self {
            tone: Tone::Pending,
            text: text.into(),
        }
    }

    pub fn explanation(text: impl Into<String>) -> Self {
        Self {
            tone: Tone::Explanation,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            tone: Tone::Error,
            text: text.into(),
        }
    }
}

/// Where the decode handler writes. Each render replaces the previous one.
pub trait OutputArea {
    fn render(&mut self, rendered: Rendered);
}

/// Keeps every render in order; the last one is what the area currently shows.
#[derive(Debug, Default)]
pub struct BufferedOutput {
    pub history: Vec<Rendered>,
}

impl BufferedOutput {
    pub fn current(&self) -> Option<&Rendered> {
        self.history.last()
    }
}

impl OutputArea for BufferedOutput {
    fn render(&mut self, rendered: Rendered) {
        self.history.push(rendered);
    }
}

/// Colored terminal output. The pending line goes to stderr and is cleared
/// once the result arrives when stderr is a terminal.
#[derive(Debug, Default)]
pub struct TerminalOutput {
    pending_shown: bool,
}

impl TerminalOutput {
    pub fn new() -> Self {
        Self::default()
    }

    fn clear_pending(&mut self) {
        if !self.pending_shown {
            return;
        }
        self.pending_shown = false;
        let mut stderr = std::io::stderr();
        if stderr.is_terminal() {
            let _ = write!(stderr, "\r\x1b[2K");
        } else {
            let _ = writeln!(stderr);
        }
        let _ = stderr.flush();
    }
}

impl OutputArea for TerminalOutput {
    fn render(&mut self, rendered: Rendered) {
        self.clear_pending();
        match rendered.tone {
            Tone::Pending => {
                let mut stderr = std::io::stderr();
                let _ = write!(stderr, "{}", rendered.text.italic().dimmed());
                let _ = stderr.flush();
                self.pending_shown = true;
            }
            Tone::Advisory => eprintln!("{}", rendered.text.yellow()),
            Tone::Explanation => {
                println!("{}", "Explanation:".bold());
                println!("{}", rendered.text);
            }
            Tone::Error => eprintln!("{}", rendered.text.red()),
        }
    }
}
