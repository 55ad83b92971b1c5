mod printer;
mod reader;

use std::io::Stdout;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tamarin_interpreter::Session;

use printer::Printer;
use reader::{Command, ReadOutput, Reader};

struct Repl {
    reader: Reader,
    session: Session,
    printer: Printer<Stdout>,
}

impl Repl {
    fn run(mut self) -> Result<(), ReadlineError> {
        loop {
            match self.reader.read()? {
                ReadOutput::Exit | ReadOutput::Command(Command::Quit) => break,
                ReadOutput::Clear => continue,
                ReadOutput::Command(Command::Env) => self.printer.print_bindings(&self.session)?,
                ReadOutput::Command(Command::Unknown(command)) => {
                    self.printer.print_unknown_command(&command)?
                }
                ReadOutput::Source(source) => self.printer.print(self.session.run(&source))?,
            }
        }
        Ok(())
    }
}

pub fn start() -> Result<(), ReadlineError> {
    let rl = DefaultEditor::new()?;
    println!("Tamarin shell. Type :env to list bindings, :quit to exit.");

    Repl {
        reader: Reader::new(rl),
        session: Session::new(),
        printer: Printer::new(std::io::stdout()),
    }
    .run()
}
