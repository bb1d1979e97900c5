/*
 * Shell Command Parsing
 *
 * Turns command-line flags into a KernelConfig and input lines into
 * Command values. Nothing here touches the kernel; execution lives in main.
 */

use simos_kernel::{KernelConfig, ProcessId, SchedulingAlgorithm};

/// Default window for the `cpu` command, in ticks
pub const DEFAULT_CPU_WINDOW: usize = 100;

/// Default length of the `history` listing
pub const DEFAULT_HISTORY_LEN: usize = 40;

pub const USAGE: &str = "\
Usage: simos-shell [OPTIONS]

Options:
  --memory <units>        Total simulated memory (default 1024)
  --page-size <units>     Page size (default 64)
  --algorithm <name>      fcfs | rr | priority | sjf (default rr)
  --quantum <ticks>       Round Robin time quantum (default 3)
  --seed <n>              Seed for the access and memory simulators
  -h, --help              Show this help

Environment:
  SIMOS_LOG               Log level: off, error, warn, info, debug, trace";

pub const HELP: &str = "\
Available commands:
  ps                                 - List processes
  spawn <name> <mem> [prio] [burst]  - Create a process
  kill <pid>                         - Terminate a process
  tick [n]                           - Advance the clock n ticks (default 1)
  algo [fcfs|rr|priority|sjf]        - Show or switch the scheduling algorithm
  quantum [n]                        - Show or set the Round Robin quantum
  prio <pid> <n>                     - Change a process priority
  burst <pid> <n>                    - Change a process burst estimate
  mem                                - Show the page map and access counters
  history [n]                        - Show the last n run history entries
  cpu [window]                       - CPU usage over the last window ticks
  shutdown                           - Terminate every process
  help                               - Show this help
  exit                               - Exit shell";

/// Parsed command-line flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Run(KernelConfig),
    Help,
}

/// Build the kernel configuration from program arguments (without argv[0])
pub fn parse_args<I>(args: I) -> Result<Invocation, String>
where
    I: IntoIterator<Item = String>,
{
    let mut config = KernelConfig::default();
    let mut args = args.into_iter();

    while let Some(flag) = args.next() {
        match flag.as_str() {
            "-h" | "--help" => return Ok(Invocation::Help),
            "--memory" => {
                config.total_memory = parse_number(&flag, args.next())?;
            }
            "--page-size" => {
                config.page_size = parse_number(&flag, args.next())?;
            }
            "--algorithm" => {
                let value = require_value(&flag, args.next())?;
                config.algorithm = parse_algorithm(&value)?;
            }
            "--quantum" => {
                let ticks: u32 = parse_number(&flag, args.next())?;
                config = config.with_time_quantum(ticks);
            }
            "--seed" => {
                let seed: u64 = parse_number(&flag, args.next())?;
                config = config.with_seed(seed);
            }
            other => return Err(format!("Unknown option: {}", other)),
        }
    }

    Ok(Invocation::Run(config))
}

fn require_value(flag: &str, value: Option<String>) -> Result<String, String> {
    value.ok_or_else(|| format!("{} requires a value", flag))
}

fn parse_number<T: std::str::FromStr>(flag: &str, value: Option<String>) -> Result<T, String> {
    let value = require_value(flag, value)?;
    value
        .parse()
        .map_err(|_| format!("{}: invalid number '{}'", flag, value))
}

fn parse_algorithm(value: &str) -> Result<SchedulingAlgorithm, String> {
    value
        .parse::<SchedulingAlgorithm>()
        .map_err(|e| e.to_string())
}

/// One shell command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Ps,
    Spawn {
        name: String,
        memory: usize,
        priority: Option<i32>,
        burst: Option<u32>,
    },
    Kill(ProcessId),
    Tick(usize),
    Algorithm(Option<SchedulingAlgorithm>),
    Quantum(Option<u32>),
    Priority(ProcessId, i32),
    Burst(ProcessId, u32),
    Memory,
    History(usize),
    Cpu(usize),
    Shutdown,
    Exit,
}

/// Parse one input line
///
/// # Returns
/// Ok(None) for a blank line, Err with a message for anything malformed
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let mut words = line.split_whitespace();
    let Some(cmd) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let command = match cmd {
        "help" | "?" => Command::Help,
        "ps" => Command::Ps,
        "spawn" => {
            if args.len() < 2 || args.len() > 4 {
                return Err("usage: spawn <name> <mem> [priority] [burst]".into());
            }
            Command::Spawn {
                name: args[0].to_string(),
                memory: parse_arg(args[1], "mem")?,
                priority: args.get(2).map(|s| parse_arg(s, "priority")).transpose()?,
                burst: args.get(3).map(|s| parse_arg(s, "burst")).transpose()?,
            }
        }
        "kill" => Command::Kill(parse_pid(single(&args, "usage: kill <pid>")?)?),
        "tick" => Command::Tick(optional(&args, "count")?.unwrap_or(1)),
        "algo" => match args.as_slice() {
            [] => Command::Algorithm(None),
            [name] => Command::Algorithm(Some(parse_algorithm(name)?)),
            _ => return Err("usage: algo [fcfs|rr|priority|sjf]".into()),
        },
        "quantum" => Command::Quantum(optional(&args, "quantum")?),
        "prio" => {
            let (pid, value) = pair(&args, "usage: prio <pid> <n>")?;
            Command::Priority(parse_pid(pid)?, parse_arg(value, "priority")?)
        }
        "burst" => {
            let (pid, value) = pair(&args, "usage: burst <pid> <n>")?;
            Command::Burst(parse_pid(pid)?, parse_arg(value, "burst")?)
        }
        "mem" => Command::Memory,
        "history" => Command::History(optional(&args, "count")?.unwrap_or(DEFAULT_HISTORY_LEN)),
        "cpu" => Command::Cpu(optional(&args, "window")?.unwrap_or(DEFAULT_CPU_WINDOW)),
        "shutdown" => Command::Shutdown,
        "exit" | "quit" => Command::Exit,
        other => {
            return Err(format!(
                "Unknown command: {}\nType 'help' for available commands",
                other
            ));
        }
    };

    Ok(Some(command))
}

fn parse_arg<T: std::str::FromStr>(value: &str, what: &str) -> Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("invalid {}: '{}'", what, value))
}

fn parse_pid(value: &str) -> Result<ProcessId, String> {
    parse_arg(value, "pid").map(ProcessId)
}

fn single<'a>(args: &[&'a str], usage: &str) -> Result<&'a str, String> {
    match args {
        [value] => Ok(*value),
        _ => Err(usage.to_string()),
    }
}

fn pair<'a>(args: &[&'a str], usage: &str) -> Result<(&'a str, &'a str), String> {
    match args {
        [first, second] => Ok((*first, *second)),
        _ => Err(usage.to_string()),
    }
}

fn optional<T: std::str::FromStr>(args: &[&str], what: &str) -> Result<Option<T>, String> {
    match args {
        [] => Ok(None),
        [value] => parse_arg(value, what).map(Some),
        _ => Err(format!("expected at most one {}", what)),
    }
}
