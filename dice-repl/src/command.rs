use dice_solver::{
    database::Scope,
    dice::{DiceConfig, MalformedConfig},
};
use thiserror::Error;

/// The help text printed by the `help` command.
pub const HELP: &str = "\
commands:
  solve <dice> <target> [budget]      search for solutions now
  lookup <dice> <target>              show the stored solutions
  analyze <dice> <target> <answer>    check an answer
  generate <all|unsolved> <budget>    fill the database
  unsolved                            list stored configurations without a solution
  help                                show this message
  quit                                leave

dice are written as five digits, such as `12345`";

/// A command line could not be understood.
#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("unknown command `{0}`; type `help` for a list of commands")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("`{0}` is not a number")]
    NotANumber(String),

    #[error(transparent)]
    Config(#[from] MalformedConfig),
}

/// A command typed at the prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Solve { config: DiceConfig, budget: Option<u32> },
    Lookup(DiceConfig),
    Analyze { config: DiceConfig, answer: String },
    Generate { scope: Scope, budget: u32 },
    Unsolved,
    Help,
    Quit,
}

/// Splits the first word off the input.
fn next_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    let end = input.find(char::is_whitespace).unwrap_or(input.len());
    (&input[..end], &input[end..])
}

fn number(word: &str) -> Result<u32, CommandError> {
    word.parse().map_err(|_| CommandError::NotANumber(word.to_owned()))
}

/// Reads the dice and target at the start of the input, returning the rest.
fn config<'a>(input: &'a str, usage: &'static str) -> Result<(DiceConfig, &'a str), CommandError> {
    let (dice, rest) = next_word(input);
    let (target, rest) = next_word(rest);
    if dice.is_empty() || target.is_empty() {
        return Err(CommandError::Usage(usage));
    }
    Ok((format!("{}-{}", dice, target).parse()?, rest))
}

/// Fails if anything but whitespace is left.
fn end(rest: &str, usage: &'static str) -> Result<(), CommandError> {
    if rest.trim().is_empty() {
        Ok(())
    } else {
        Err(CommandError::Usage(usage))
    }
}

impl Command {
    /// Parses a command line. Returns [`None`] for a blank line.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let (name, rest) = next_word(line);
        let command = match name {
            "" => return Ok(None),
            "solve" => {
                const USAGE: &str = "solve <dice> <target> [budget]";
                let (config, rest) = config(rest, USAGE)?;
                let (budget, rest) = next_word(rest);
                end(rest, USAGE)?;
                let budget = if budget.is_empty() { None } else { Some(number(budget)?) };
                Command::Solve { config, budget }
            },
            "lookup" => {
                const USAGE: &str = "lookup <dice> <target>";
                let (config, rest) = config(rest, USAGE)?;
                end(rest, USAGE)?;
                Command::Lookup(config)
            },
            "analyze" => {
                const USAGE: &str = "analyze <dice> <target> <answer>";
                let (config, rest) = config(rest, USAGE)?;
                let answer = rest.trim();
                if answer.is_empty() {
                    return Err(CommandError::Usage(USAGE));
                }
                Command::Analyze { config, answer: answer.to_owned() }
            },
            "generate" => {
                const USAGE: &str = "generate <all|unsolved> <budget>";
                let (scope, rest) = next_word(rest);
                let (budget, rest) = next_word(rest);
                end(rest, USAGE)?;
                let scope = match scope {
                    "all" => Scope::All,
                    "unsolved" => Scope::Unsolved,
                    _ => return Err(CommandError::Usage(USAGE)),
                };
                if budget.is_empty() {
                    return Err(CommandError::Usage(USAGE));
                }
                Command::Generate { scope, budget: number(budget)? }
            },
            "unsolved" => Command::Unsolved,
            "help" => Command::Help,
            "quit" | "exit" => Command::Quit,
            _ => return Err(CommandError::Unknown(name.to_owned())),
        };
        Ok(Some(command))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    fn config(key: &str) -> DiceConfig {
        key.parse().unwrap()
    }

    #[test]
    fn blank_line() {
        assert_eq!(Command::parse("   "), Ok(None));
    }

    #[test]
    fn solve() {
        assert_eq!(
            Command::parse("solve 54321 15"),
            Ok(Some(Command::Solve { config: config("12345-15"), budget: None })),
        );
        assert_eq!(
            Command::parse("  solve 11111 24   2 "),
            Ok(Some(Command::Solve { config: config("11111-24"), budget: Some(2) })),
        );
        assert_eq!(Command::parse("solve 11111"), Err(CommandError::Usage("solve <dice> <target> [budget]")));
        assert_eq!(Command::parse("solve 11111 24 x"), Err(CommandError::NotANumber("x".to_owned())));
    }

    #[test]
    fn analyze_keeps_answer_text() {
        assert_eq!(
            Command::parse("analyze 12345 15 (5 + 4) + 3 + 2 + 1"),
            Ok(Some(Command::Analyze {
                config: config("12345-15"),
                answer: "(5 + 4) + 3 + 2 + 1".to_owned(),
            })),
        );
    }

    #[test]
    fn generate() {
        assert_eq!(
            Command::parse("generate unsolved 2"),
            Ok(Some(Command::Generate { scope: Scope::Unsolved, budget: 2 })),
        );
        assert!(Command::parse("generate some 2").is_err());
        assert!(Command::parse("generate all").is_err());
    }

    #[test]
    fn bad_configuration() {
        assert!(matches!(Command::parse("lookup 12347 15"), Err(CommandError::Config(_))));
        assert!(matches!(Command::parse("lookup 12345 17"), Err(CommandError::Config(_))));
    }

    #[test]
    fn unknown_command() {
        assert_eq!(Command::parse("roll"), Err(CommandError::Unknown("roll".to_owned())));
    }
}
