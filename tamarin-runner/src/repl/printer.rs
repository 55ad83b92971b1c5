use std::io::{self, Write};

use tamarin_interpreter::{RunError, Session};

pub struct Printer<W: Write> {
    out: W,
}

impl<W: Write> Printer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn print(&mut self, (text, error): (String, Option<RunError>)) -> io::Result<()> {
        if let Some(error) = error {
            tracing::debug!(%error, "input failed");
        }
        self.out.write_all(text.as_bytes())?;
        self.out.flush()
    }

    /// One `name: value` line per global binding.
    pub fn print_bindings(&mut self, session: &Session) -> io::Result<()> {
        for (name, value) in session.bindings() {
            writeln!(self.out, "{}: {}", name, *value)?;
        }
        self.out.flush()
    }

    pub fn print_unknown_command(&mut self, command: &str) -> io::Result<()> {
        writeln!(self.out, "unknown command :{} (try :env or :quit)", command)
    }
}
