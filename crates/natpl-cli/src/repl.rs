//! REPL (Read-Eval-Print Loop) for natpl
//!
//! Each line typed is one program line evaluated against a runtime that
//! persists for the whole session.

use std::path::{Path, PathBuf};

use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{DefaultEditor, Editor};

use natpl_core::Runtime;

use crate::config::Config;
use crate::report::{describe_error, format_print, format_result};

/// REPL prompt shown at the start of each line
const PROMPT: &str = "natpl> ";

/// Result of processing a REPL command
#[derive(Debug, PartialEq, Eq)]
enum CommandResult {
    /// Not a command; evaluate the input
    Continue,
    /// Exit the REPL
    Exit,
    /// Input was handled as a command
    Handled,
}

/// Evaluation state of a REPL session, kept apart from the line editor
pub struct Session {
    runtime: Runtime,
    prelude: Vec<PathBuf>,
}

/// The natpl REPL
pub struct Repl {
    session: Session,
    editor: Editor<(), DefaultHistory>,
    history_path: Option<PathBuf>,
}

impl Repl {
    /// Create a new REPL around an already prepared runtime
    pub fn new(runtime: Runtime, config: &Config) -> Result<Self> {
        let mut editor = DefaultEditor::new()?;
        let history_path = config.history_path();

        if let Some(path) = &history_path {
            if editor.load_history(path).is_err() {
                tracing::debug!(path = %path.display(), "no history loaded");
            }
        }

        Ok(Self {
            session: Session::new(runtime, config.prelude.clone()),
            editor,
            history_path,
        })
    }

    /// Run the REPL loop
    pub fn run(&mut self) -> Result<()> {
        println!("natpl v{}", natpl_core::VERSION);
        println!("Type :help for help, :quit to exit");
        println!();

        loop {
            match self.editor.readline(PROMPT) {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let _ = self.editor.add_history_entry(line.as_str());

                    match self.session.handle_command(&line) {
                        CommandResult::Exit => break,
                        CommandResult::Handled => continue,
                        CommandResult::Continue => {}
                    }

                    for output in self.session.eval(&line) {
                        println!("{output}");
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Goodbye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error reading input: {err}");
                    break;
                }
            }
        }

        if let Some(path) = &self.history_path {
            if let Err(e) = self.editor.save_history(path) {
                tracing::warn!(path = %path.display(), "failed to save history: {e}");
            }
        }

        Ok(())
    }
}

impl Session {
    pub fn new(runtime: Runtime, prelude: Vec<PathBuf>) -> Self {
        Self { runtime, prelude }
    }

    /// Evaluate one line and return what should be echoed. Errors are
    /// printed to stderr and leave the session running.
    fn eval(&mut self, input: &str) -> Vec<String> {
        match self.runtime.eval_source(input) {
            Ok(results) => results.iter().filter_map(format_result).collect(),
            Err(e) => {
                eprintln!("{}", describe_error(input, None, &e));
                Vec::new()
            }
        }
    }

    /// Handle REPL commands (starting with :)
    fn handle_command(&mut self, input: &str) -> CommandResult {
        let trimmed = input.trim();

        if !trimmed.starts_with(':') {
            return CommandResult::Continue;
        }

        let cmd = trimmed.trim_start_matches(':').trim();
        let (cmd_name, args) = cmd.split_once(' ').unwrap_or((cmd, ""));
        let args = args.trim();

        match cmd_name.to_lowercase().as_str() {
            "quit" | "q" | "exit" => CommandResult::Exit,

            "help" | "h" | "?" => {
                print_help();
                CommandResult::Handled
            }

            "clear" | "cls" => {
                // Clear screen using ANSI escape codes
                print!("\x1B[2J\x1B[1;1H");
                CommandResult::Handled
            }

            "units" => {
                for line in self.describe_units() {
                    println!("{line}");
                }
                CommandResult::Handled
            }

            "vars" => {
                for line in self.describe_variables() {
                    println!("{line}");
                }
                CommandResult::Handled
            }

            "fns" => {
                for line in self.describe_functions() {
                    println!("{line}");
                }
                CommandResult::Handled
            }

            "reset" => {
                self.reset();
                println!("Runtime reset");
                CommandResult::Handled
            }

            "load" | "l" => {
                if args.is_empty() {
                    println!("Usage: :load <file>");
                } else {
                    match self.load(Path::new(args)) {
                        Ok(printed) => {
                            for line in printed {
                                println!("{line}");
                            }
                        }
                        Err(e) => eprintln!("{e:#}"),
                    }
                }
                CommandResult::Handled
            }

            _ => {
                println!("Unknown command: :{cmd_name}");
                println!("Type :help for available commands");
                CommandResult::Handled
            }
        }
    }

    fn describe_units(&self) -> Vec<String> {
        let units = self.runtime.units();
        if units.is_empty() {
            return vec!["No units declared".to_string()];
        }
        let names: Vec<&str> = units.iter().map(|name| name.as_str()).collect();
        vec![names.join(" ")]
    }

    fn describe_variables(&self) -> Vec<String> {
        let variables = self.runtime.variables();
        if variables.is_empty() {
            return vec!["No variables defined".to_string()];
        }
        variables
            .into_iter()
            .map(|(name, value)| format!("{name} = {value}"))
            .collect()
    }

    fn describe_functions(&self) -> Vec<String> {
        let functions = self.runtime.functions();
        if functions.is_empty() {
            return vec!["No functions defined".to_string()];
        }
        functions
            .into_iter()
            .map(|(name, function)| format!("{name}{function}"))
            .collect()
    }

    /// Start over with an empty runtime, then evaluate the prelude again
    fn reset(&mut self) {
        self.runtime = Runtime::with_precision(self.runtime.precision());
        for path in self.prelude.clone() {
            if let Err(e) = self.load(&path) {
                eprintln!("{e:#}");
            }
        }
    }

    /// Evaluate a file into the session, returning its print lines
    fn load(&mut self, path: &Path) -> Result<Vec<String>> {
        crate::load_file(&mut self.runtime, path)
            .map(|results| results.iter().filter_map(format_print).collect())
    }
}

/// Print help information
fn print_help() {
    println!(
        r#"
natpl REPL Commands:
  :help, :h, :?    Show this help message
  :quit, :q        Exit the REPL
  :clear, :cls     Clear the screen
  :units           List declared units
  :vars            List variables and their values
  :fns             List functions
  :reset           Forget everything declared in this session
  :load <file>     Evaluate a file into the session

Language:
  unit m           Declare a base unit
  x = 3 km         Declare a variable (or compare, if x is defined)
  f(a, b) = a b    Declare a function
  print x / 2      Show an expression with its value
  [x]              The unit of x
  # comment        Ignored to the end of the line

Examples:
  natpl> unit m
  natpl> unit s
  natpl> 100 m / 9.58 s
  10.438413361169102296450939457202505219206680584551 m s^-1
"#
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repl() -> Session {
        Session::new(Runtime::new(), Vec::new())
    }

    #[test]
    fn test_eval_echoes_values() {
        let mut repl = repl();
        assert!(repl.eval("unit m").is_empty());
        assert_eq!(repl.eval("x = 3 km"), vec!["3000 m"]);
        assert_eq!(repl.eval("print x / 2"), vec!["x / 2 = 1500 m"]);
        assert_eq!(repl.eval("x = 3000 m"), vec!["true"]);
    }

    #[test]
    fn test_errors_keep_session() {
        let mut repl = repl();
        assert!(repl.eval("unit m").is_empty());
        assert!(repl.eval("y + 1").is_empty());
        assert!(repl.eval("unit m").is_empty());
        assert_eq!(repl.eval("2 m"), vec!["2 m"]);
    }

    #[test]
    fn test_commands() {
        let mut repl = repl();
        assert_eq!(repl.handle_command("1 + 2"), CommandResult::Continue);
        assert_eq!(repl.handle_command(":quit"), CommandResult::Exit);
        assert_eq!(repl.handle_command(":Q"), CommandResult::Exit);
        assert_eq!(repl.handle_command(":units"), CommandResult::Handled);
        assert_eq!(repl.handle_command(":nonsense"), CommandResult::Handled);
    }

    #[test]
    fn test_listings() {
        let mut repl = repl();
        assert_eq!(repl.describe_units(), vec!["No units declared"]);

        repl.eval("unit s");
        repl.eval("unit m");
        repl.eval("speed = 3 m / s");
        repl.eval("dist(v, t) = v t");

        assert_eq!(repl.describe_units(), vec!["m s"]);
        assert_eq!(repl.describe_variables(), vec!["speed = 3 m s^-1"]);
        assert_eq!(repl.describe_functions(), vec!["dist(v, t) = v * t"]);
    }

    #[test]
    fn test_reset_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("units.natpl");
        std::fs::write(&path, "unit m\nhalf = 0.5 m\nprint half * 4\n").unwrap();

        let mut repl = repl();
        assert_eq!(repl.load(&path).unwrap(), vec!["half * 4 = 2 m"]);
        assert_eq!(repl.describe_variables(), vec!["half = 0.5 m"]);

        repl.reset();
        assert_eq!(repl.describe_variables(), vec!["No variables defined"]);
        assert!(repl.load(&dir.path().join("missing.natpl")).is_err());
    }

    #[test]
    fn test_reset_keeps_prelude() {
        let dir = tempfile::tempdir().unwrap();
        let prelude = dir.path().join("prelude.natpl");
        std::fs::write(&prelude, "unit m\ng = 9.8 m\n").unwrap();

        let mut repl = Session::new(Runtime::with_precision(7), vec![prelude]);
        repl.reset();
        assert_eq!(repl.describe_units(), vec!["m"]);

        assert!(repl.eval("unit s").is_empty());
        assert_eq!(repl.eval("t = 2 s"), vec!["2 s"]);
        assert_eq!(repl.describe_units(), vec!["m s"]);

        repl.reset();
        assert_eq!(repl.describe_units(), vec!["m"]);
        assert_eq!(repl.describe_variables(), vec!["g = 9.8 m"]);
        assert_eq!(repl.runtime.precision(), 7);
        assert_eq!(repl.eval("g / 2"), vec!["4.9 m"]);
    }
}
