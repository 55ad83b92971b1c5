use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;

const PROMPT: &str = "➜ ";

#[derive(Debug, PartialEq)]
pub enum Command {
    Env,
    Quit,
    Unknown(String),
}

#[derive(Debug, PartialEq)]
pub enum ReadOutput {
    Exit,
    Clear,
    Command(Command),
    Source(String),
}

pub struct Reader {
    rl: Editor<(), DefaultHistory>,
}

impl Reader {
    pub fn new(rl: Editor<(), DefaultHistory>) -> Self {
        Self { rl }
    }

    pub fn read(&mut self) -> Result<ReadOutput, ReadlineError> {
        match self.rl.readline(PROMPT) {
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                Ok(ReadOutput::Clear)
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                Ok(ReadOutput::Exit)
            }
            Err(err) => Err(err),
            Ok(line) => {
                if let Err(err) = self.rl.add_history_entry(line.as_str()) {
                    tracing::warn!(%err, "could not record history entry");
                }
                Ok(classify(&line))
            }
        }
    }
}

/// Lines starting with `:` are shell commands, everything else is source.
pub fn classify(line: &str) -> ReadOutput {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ReadOutput::Clear;
    }
    match trimmed.strip_prefix(':') {
        Some("env") => ReadOutput::Command(Command::Env),
        Some("quit" | "q") => ReadOutput::Command(Command::Quit),
        Some(other) => ReadOutput::Command(Command::Unknown(other.to_owned())),
        None => ReadOutput::Source(line.to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::{classify, Command, ReadOutput};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_classify() {
        assert_eq!(classify("   "), ReadOutput::Clear);
        assert_eq!(classify(":env"), ReadOutput::Command(Command::Env));
        assert_eq!(classify(" :quit "), ReadOutput::Command(Command::Quit));
        assert_eq!(classify(":q"), ReadOutput::Command(Command::Quit));
        assert_eq!(
            classify(":help"),
            ReadOutput::Command(Command::Unknown("help".to_owned()))
        );
        assert_eq!(
            classify("let x = 1;"),
            ReadOutput::Source("let x = 1;".to_owned())
        );
    }
}
