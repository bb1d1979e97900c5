/*
 * SimOS Shell
 *
 * Interactive front end for the simulated kernel. Reads one command per
 * line from stdin, drives the kernel and prints results to stdout. Kernel
 * diagnostics go to stderr through the kernel logger (level via SIMOS_LOG).
 */

mod commands;

use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;

use commands::{Command, Invocation};
use simos_kernel::utils::logger;
use simos_kernel::{MemoryStats, OsKernel, ProcessId, ProcessInfo, ProcessListener, ProcessSpec};

/// Echoes lifecycle events to the log
struct LifecycleLogger;

impl ProcessListener for LifecycleLogger {
    fn on_process_created(&self, process: &ProcessInfo) {
        log::info!(
            "[Shell] + {} '{}' ({} units)",
            process.pid,
            process.name,
            process.allocated_memory
        );
    }

    fn on_process_terminated(&self, process: &ProcessInfo) {
        log::info!(
            "[Shell] - {} '{}' after {} ticks",
            process.pid,
            process.name,
            process.cpu_time_used
        );
    }
}

fn main() -> ExitCode {
    let config = match commands::parse_args(std::env::args().skip(1)) {
        Ok(Invocation::Run(config)) => config,
        Ok(Invocation::Help) => {
            println!("{}", commands::USAGE);
            return ExitCode::SUCCESS;
        }
        Err(message) => {
            eprintln!("simos-shell: {}", message);
            eprintln!("{}", commands::USAGE);
            return ExitCode::from(2);
        }
    };

    let level = logger::level_from_name(std::env::var("SIMOS_LOG").ok().as_deref());
    if let Err(e) = logger::init(level) {
        eprintln!("simos-shell: logger unavailable: {}", e);
    }

    let kernel = match OsKernel::new(config) {
        Ok(kernel) => kernel,
        Err(e) => {
            eprintln!("simos-shell: {}", e);
            return ExitCode::FAILURE;
        }
    };
    kernel.add_listener(Arc::new(LifecycleLogger));

    println!();
    println!("SimOS Shell v0.1");
    println!(
        "{} units in {} pages, {} scheduling",
        kernel.memory().total_memory(),
        kernel.memory().page_count(),
        kernel.algorithm()
    );
    println!("Type 'help' for available commands");
    println!();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("root@simos:~# ");
        let _ = io::stdout().flush();

        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(e)) => {
                eprintln!("simos-shell: {}", e);
                break;
            }
            None => {
                println!();
                break;
            }
        };

        match commands::parse_command(&line) {
            Ok(Some(Command::Exit)) => {
                println!("Goodbye!");
                break;
            }
            Ok(Some(command)) => {
                let output = execute_command(&kernel, command);
                if !output.is_empty() {
                    println!("{}", output);
                }
            }
            Ok(None) => {}
            Err(message) => println!("{}", message),
        }
    }

    kernel.shutdown();
    ExitCode::SUCCESS
}

// Execute command, returning the text to show
fn execute_command(kernel: &OsKernel, command: Command) -> String {
    match command {
        Command::Help => commands::HELP.to_string(),
        Command::Ps => cmd_ps(&kernel.processes(), &kernel.ready_queue()),
        Command::Spawn {
            name,
            memory,
            priority,
            burst,
        } => {
            let mut spec = ProcessSpec::new(name, memory);
            if let Some(priority) = priority {
                spec = spec.priority(priority);
            }
            if let Some(burst) = burst {
                spec = spec.estimated_burst(burst);
            }
            match kernel.spawn(spec) {
                Ok(info) => format!(
                    "Started {} '{}' with {} units",
                    info.pid, info.name, info.allocated_memory
                ),
                Err(e) => format!("spawn: {}", e),
            }
        }
        Command::Kill(pid) => {
            if kernel.kill_process(pid) {
                format!("Killed {}", pid)
            } else {
                format!("kill: no running process {}", pid)
            }
        }
        Command::Tick(count) => {
            let ran = kernel.run(count);
            cmd_tick(kernel.tick_count(), &ran)
        }
        Command::Algorithm(algorithm) => {
            if let Some(algorithm) = algorithm {
                kernel.set_algorithm(algorithm);
            }
            format!("Algorithm: {}", kernel.algorithm())
        }
        Command::Quantum(ticks) => {
            if let Some(ticks) = ticks {
                kernel.set_time_quantum(ticks);
            }
            format!("Time quantum: {}", kernel.time_quantum().get())
        }
        Command::Priority(pid, priority) => {
            if kernel.set_priority(pid, priority) {
                String::new()
            } else {
                format!("prio: no process {}", pid)
            }
        }
        Command::Burst(pid, ticks) => {
            if kernel.set_estimated_burst(pid, ticks) {
                String::new()
            } else {
                format!("burst: no process {}", pid)
            }
        }
        Command::Memory => cmd_mem(&kernel.memory_stats()),
        Command::History(count) => cmd_history(&kernel.recent_history(count)),
        Command::Cpu(window) => format!(
            "CPU usage over last {} ticks: {:.1}%",
            window,
            kernel.cpu_usage(window)
        ),
        Command::Shutdown => format!("Terminated {} processes", kernel.shutdown()),
        Command::Exit => String::new(),
    }
}

fn cmd_ps(processes: &[ProcessInfo], ready_queue: &[ProcessId]) -> String {
    if processes.is_empty() {
        return "No processes".to_string();
    }
    let mut lines = vec![format!(
        "{:>5}  {:<16} {:<10} {:>4} {:>6} {:>6} {:>5} {:>5}",
        "PID", "NAME", "STATE", "PRIO", "ALLOC", "USAGE", "CPU", "BURST"
    )];
    for p in processes {
        lines.push(format!(
            "{:>5}  {:<16} {:<10} {:>4} {:>6} {:>6} {:>5} {:>5}",
            p.pid.as_u32(),
            p.name,
            p.state.name(),
            p.priority.0,
            p.allocated_memory,
            p.simulated_memory_usage,
            p.cpu_time_used,
            p.estimated_burst
        ));
    }
    let queue: Vec<String> = ready_queue
        .iter()
        .map(|pid| pid.as_u32().to_string())
        .collect();
    lines.push(format!("Ready queue: [{}]", queue.join(", ")));
    lines.join("\n")
}

fn cmd_tick(tick_count: u64, ran: &[Option<ProcessId>]) -> String {
    let busy = ran.iter().filter(|pid| pid.is_some()).count();
    match ran.last().copied().flatten() {
        Some(pid) => format!(
            "Tick {}: {} busy of {}, last ran {}",
            tick_count,
            busy,
            ran.len(),
            pid
        ),
        None => format!(
            "Tick {}: {} busy of {}, CPU idle",
            tick_count,
            busy,
            ran.len()
        ),
    }
}

fn cmd_mem(stats: &MemoryStats) -> String {
    let mut lines = vec![format!(
        "Memory: {} used / {} total ({} free), page size {}",
        stats.used, stats.total, stats.free, stats.page_size
    )];

    let map: Vec<String> = stats
        .pages
        .iter()
        .map(|page| match page.owner {
            Some(pid) if page.accessed => format!("{}*", pid.as_u32()),
            Some(pid) => pid.as_u32().to_string(),
            None => ".".to_string(),
        })
        .collect();
    for row in map.chunks(16) {
        lines.push(format!("  {}", row.join(" ")));
    }

    lines.push(format!(
        "Accesses: {}  TLB hits: {}  misses: {}  page faults: {}  hit rate: {:.1}%",
        stats.total_accesses,
        stats.tlb_hits,
        stats.tlb_misses,
        stats.page_faults,
        stats.tlb_hit_rate() * 100.0
    ));
    lines.join("\n")
}

fn cmd_history(entries: &[ProcessId]) -> String {
    if entries.is_empty() {
        return "No ticks yet".to_string();
    }
    let rendered: Vec<String> = entries
        .iter()
        .map(|pid| {
            if pid.is_idle() {
                "-".to_string()
            } else {
                pid.as_u32().to_string()
            }
        })
        .collect();
    rendered.join(" ")
}
