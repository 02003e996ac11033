mod command;
mod error;
mod interrupt;

use command::{Command, HELP};
use dice_solver::{
    analyze::{analyze, Verdict},
    config::SolverConfig,
    database::{FileStore, SolutionDatabase, SolutionSet},
    dice::DiceConfig,
    search::solve,
};
use error::Error;
use interrupt::Interrupts;
use rustyline::{error::ReadlineError, DefaultEditor};
use std::{
    io::{self, BufRead, IsTerminal},
    path::PathBuf,
    process::ExitCode,
    time::Instant,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// State shared by every command of a session.
struct Session {
    config: SolverConfig,
    db: SolutionDatabase<FileStore>,
    interrupts: Interrupts,
}

/// Prints a solution set, best solutions first.
fn print_set(config: &DiceConfig, set: &SolutionSet) {
    let Some(budget) = set.budget else {
        println!("nothing is known about {} yet; try `solve` or `generate`", config);
        return;
    };

    if set.is_empty() {
        println!("{} has no solution with at most {} unary operators", config, budget);
        return;
    }

    println!("{} solutions for {} (unary budget {}):", set.entries.len(), config, budget);
    for entry in &set.entries {
        match entry.alternatives.len() {
            0 => println!("{:>4}  {}", entry.score, entry.representative),
            n => println!("{:>4}  {}  ({} other forms)", entry.score, entry.representative, n),
        }
    }
}

/// Runs one command. Returns false if the session should end.
fn execute(line: &str, session: &Session) -> Result<bool, Error> {
    let Some(command) = Command::parse(line)? else {
        return Ok(true);
    };

    match command {
        Command::Solve { config, budget } => {
            let options = session.config
                .search_options()
                .into_builder()
                .unary_budget(budget.unwrap_or(session.config.unary_budget))
                .build();
            let start = Instant::now();
            let set = solve(&config, &options, &session.config.weights);
            print_set(&config, &set);
            println!("searched in {:.2?}", start.elapsed());
        },
        Command::Lookup(config) => print_set(&config, &session.db.solutions(&config)?),
        Command::Analyze { config, answer } => {
            let known = session.db.solutions(&config)?;
            let analysis = analyze(&answer, &config, &session.config.unary_ops, &session.config.weights, &known)
                .map_err(|err| Error::Answer(err, answer.clone()))?;

            match analysis.verdict {
                Verdict::Incorrect => {
                    println!("{} = {}, not {}", analysis.expr, analysis.value, config.black());
                },
                Verdict::Correct { optimal, known: is_known } => {
                    println!("correct! {} scores {}", analysis.canonical, analysis.score);
                    match (optimal, known.min_score()) {
                        (Some(true), _) => println!("no known solution scores lower"),
                        (Some(false), Some(min)) => println!("the best known solution scores {}", min),
                        _ => println!("no solutions are known for {} yet", config),
                    }
                    if !is_known && optimal.is_some() {
                        println!("this solution is not in the database");
                    }
                },
            }
        },
        Command::Generate { scope, budget } => {
            let mut request = session.config.generate_request(scope);
            request.options.unary_budget = budget;
            let running = session.interrupts.begin();
            let report = session.db.generate(&request, &running.token)?;
            println!(
                "{} solved, {} unsolved, {} cancelled",
                report.solved.len(),
                report.unsolved.len(),
                report.cancelled.len(),
            );
        },
        Command::Unsolved => {
            let unsolved = session.db.unsolved()?;
            for config in &unsolved {
                println!("{}", config);
            }
            println!("{} unsolved configurations", unsolved.len());
        },
        Command::Help => println!("{}", HELP),
        Command::Quit => return Ok(false),
    }

    Ok(true)
}

/// Runs a command, reporting any error. Returns false if the session should end.
fn run_line(line: &str, session: &Session) -> bool {
    execute(line, session).unwrap_or_else(|err| {
        err.report_to_stderr();
        true
    })
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_logging();

    let mut args = std::env::args();
    args.next();

    let path = args.next().map(PathBuf::from);
    let config = match SolverConfig::load(path.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            Error::from(err).report_to_stderr();
            return ExitCode::FAILURE;
        },
    };
    let session = Session {
        db: config.database(),
        config,
        interrupts: Interrupts::default(),
    };
    if let Err(err) = session.interrupts.listen() {
        warn!(%err, "Ctrl-C will not cancel generation runs");
    }
    info!(db = session.db.name(), dir = ?session.config.database_dir, "opened solution database");

    if !io::stdin().is_terminal() {
        // run commands from stdin, one per line
        for line in io::stdin().lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    eprintln!("error: {}", err);
                    return ExitCode::FAILURE;
                },
            };
            if !run_line(&line, &session) {
                break;
            }
        }
        return ExitCode::SUCCESS;
    }

    // run the repl / interactive mode
    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(err) => {
            eprintln!("error: {}", err);
            return ExitCode::FAILURE;
        },
    };

    fn process_line(rl: &mut DefaultEditor, session: &Session) -> Result<bool, ReadlineError> {
        let input = rl.readline("> ")?;
        if input.trim().is_empty() {
            return Ok(true);
        }

        rl.add_history_entry(&input)?;
        Ok(run_line(&input, session))
    }

    loop {
        match process_line(&mut rl, &session) {
            Ok(true) => (),
            Ok(false) => break,
            Err(ReadlineError::Eof | ReadlineError::Interrupted) => break,
            Err(err) => {
                eprintln!("{}", err);
                break;
            },
        }
    }

    ExitCode::SUCCESS
}
