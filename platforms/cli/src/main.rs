use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};
use std::{fs, io, thread};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use turing_engine::form::{parse_blank, split_rules, split_states};
use turing_engine::{
    AutoRun, Definition, DefinitionLoader, Halt, PresetManager, Snapshot, Status, Step,
    TuringEngine, TuringMachineError, MAX_EXECUTION_STEPS,
};

/// Cells shown on each side of the head when printing the tape.
const TAPE_RADIUS: usize = 10;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(after_help = "EXAMPLES:
  turing-cli --program machines/palindrome.tm --input abba
  turing-cli --preset \"Binary increment\" --input 111 -d
  turing-cli --initial q0 --final qf --rules rules.txt --input 101
  cat machines/one-zero.tm | turing-cli --json")]
struct Cli {
    /// Machine definition file (.tm)
    #[clap(short, long)]
    program: Option<PathBuf>,

    /// Use a built-in machine by name
    #[clap(long, conflicts_with = "program")]
    preset: Option<String>,

    /// List the built-in machines and exit
    #[clap(long)]
    list: bool,

    /// Input written on the tape
    #[clap(short, long)]
    input: Option<String>,

    /// Initial state
    #[clap(long)]
    initial: Option<String>,

    /// Comma-separated final states
    #[clap(long = "final")]
    finals: Option<String>,

    /// Blank symbol (defaults to '_')
    #[clap(long)]
    blank: Option<String>,

    /// File with one transition rule per line
    #[clap(long)]
    rules: Option<PathBuf>,

    /// Print each step of the execution and the log
    #[clap(short = 'd', long)]
    debug: bool,

    /// Run automatically with this delay between steps, in milliseconds
    #[clap(long)]
    delay_ms: Option<u64>,

    /// Stop after this many steps
    #[clap(long, default_value_t = MAX_EXECUTION_STEPS)]
    max_steps: usize,

    /// Print the final configuration as JSON
    #[clap(long)]
    json: bool,

    /// Log level used when RUST_LOG is not set
    #[clap(long, default_value = "warn")]
    log_level: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    if cli.list {
        return list_presets();
    }

    let mut engine = TuringEngine::new();
    let loaded = build_definition(&cli).and_then(|definition| {
        tracing::info!("Running {}", definition.display_name());
        engine.load(&definition)
    });
    if let Err(e) = loaded {
        eprintln!("Error: {}", e);
        return ExitCode::from(2);
    }

    if cli.debug {
        print_state(&engine.snapshot());
    }

    match cli.delay_ms {
        Some(delay) => run_with_delay(&mut engine, &cli, Duration::from_millis(delay)),
        None if cli.debug => run_verbose(&mut engine, cli.max_steps),
        None => {
            engine.run(cli.max_steps);
        }
    }

    if cli.debug {
        println!("\nLog:");
        for entry in engine.journal().entries() {
            println!("{}", entry);
        }
        println!();
    }

    let snapshot = engine.snapshot();
    if cli.json {
        match serde_json::to_string_pretty(&snapshot) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(2);
            }
        }
    } else {
        println!("{}", snapshot.tape_string());
        println!(
            "{} after {} steps in state {}",
            snapshot.status, snapshot.step_count, snapshot.state
        );
    }

    match snapshot.status {
        Status::Accepted => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    }
}

fn list_presets() -> ExitCode {
    for index in 0..PresetManager::count() {
        match PresetManager::get_info(index) {
            Ok(info) => println!(
                "{}. {} (input: \"{}\", states: {}, final: {}, rules: {})",
                info.index + 1,
                info.name,
                info.input,
                info.states.join(", "),
                info.final_states.join(", "),
                info.rule_count
            ),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(2);
            }
        }
    }

    ExitCode::SUCCESS
}

/// Builds the definition from a file, a preset, stdin or the individual flags, then applies
/// the flag overrides.
fn build_definition(cli: &Cli) -> Result<Definition, TuringMachineError> {
    let base = if let Some(path) = &cli.program {
        Some(DefinitionLoader::load_definition(path)?)
    } else if let Some(name) = &cli.preset {
        Some(PresetManager::get_by_name(name)?.definition.clone())
    } else if cli.rules.is_none() && atty::isnt(atty::Stream::Stdin) {
        let source = DefinitionLoader::read_source(io::stdin().lock())?;
        Some(DefinitionLoader::load_definition_from_string(&source)?)
    } else {
        None
    };

    let rules = cli.rules.as_deref().map(read_rules).transpose()?;

    let Some(mut definition) = base else {
        return Definition::from_fields(
            cli.input.as_deref().unwrap_or_default(),
            cli.initial.as_deref().unwrap_or_default(),
            cli.finals.as_deref().unwrap_or_default(),
            cli.blank.as_deref().unwrap_or_default(),
            rules.as_deref().unwrap_or_default(),
        );
    };

    if let Some(input) = &cli.input {
        definition.input = input.clone();
    }
    if let Some(initial) = &cli.initial {
        definition.initial_state = initial.trim().to_string();
    }
    if let Some(finals) = &cli.finals {
        definition.final_states = split_states(finals);
    }
    if let Some(blank) = &cli.blank {
        definition.blank = parse_blank(blank)?;
    }
    if let Some(rules) = rules {
        definition.rules = split_rules(&rules);
    }

    Ok(definition)
}

fn read_rules(path: &Path) -> Result<String, TuringMachineError> {
    fs::read_to_string(path).map_err(|e| {
        TuringMachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
    })
}

fn run_verbose(engine: &mut TuringEngine, max_steps: usize) {
    for _ in 0..max_steps {
        match engine.step() {
            Step::Continue => print_state(&engine.snapshot()),
            Step::Halt(halt) => {
                if halt != Halt::Rejected {
                    print_state(&engine.snapshot());
                }
                println!("\nMachine halted: {:?}", halt);
                return;
            }
        }
    }

    println!("\nStep limit of {} reached.", max_steps);
}

fn run_with_delay(engine: &mut TuringEngine, cli: &Cli, interval: Duration) {
    let mut run = AutoRun::new(interval);
    let mut last = Instant::now();

    while run.is_active() {
        let now = Instant::now();
        let applied = run.advance(engine, now - last);
        last = now;

        if cli.debug && applied > 0 {
            print_state(&engine.snapshot());
        }

        if engine.step_count() >= cli.max_steps {
            run.cancel();
            break;
        }

        thread::sleep(run.next_due());
    }
}

fn print_state(snapshot: &Snapshot) {
    println!(
        "Step: {}, State: {}, Head: {}, Tape: {}",
        snapshot.step_count,
        snapshot.state,
        snapshot.head,
        render_tape(snapshot)
    );
}

/// Renders the cells around the head, with the head cell in brackets.
fn render_tape(snapshot: &Snapshot) -> String {
    snapshot
        .window(TAPE_RADIUS)
        .iter()
        .map(|cell| {
            if cell.is_head {
                format!("[{}]", cell.symbol)
            } else {
                format!(" {} ", cell.symbol)
            }
        })
        .collect()
}
