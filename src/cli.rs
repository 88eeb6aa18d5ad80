//! Command-line interface and REPL
//!
//! Thin presentation wrapper over the capture session: every command maps to
//! one session operation and returns immediately, so the listener loop never
//! waits on the terminal.

use anyhow::Result;
use colored::*;
use rustyline::DefaultEditor;

use crate::binding::short_token;
use crate::controls::LogicalControl;
use crate::paths::EmulatorPaths;
use crate::session::PadSession;

pub fn run_repl(session: &PadSession, paths: &EmulatorPaths) -> Result<()> {
    println!(
        "{}",
        "Pad configuration - type 'help' for commands".bold().cyan()
    );

    let mut rl = DefaultEditor::new()?;

    loop {
        let readline = rl.readline("padconf> ");
        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);
                if !dispatch(session, paths, line) {
                    break;
                }
            },
            Err(_) => break,
        }
    }

    Ok(())
}

/// Handle one command line. Returns false when the session should end.
fn dispatch(session: &PadSession, paths: &EmulatorPaths, line: &str) -> bool {
    let (command, arg) = match line.split_once(char::is_whitespace) {
        Some((c, a)) => (c, a.trim()),
        None => (line, ""),
    };

    match command {
        "quit" | "exit" => return false,
        "help" => print_help(),
        "devices" => cmd_devices(session),
        "refresh" => {
            session.request_refresh();
            println!("{}", "Device list refresh requested.".cyan());
        },
        "use" => cmd_use(session, arg),
        "arm" => cmd_arm(session, arg),
        "show" => cmd_show(session),
        "reset" => {
            session.reset();
            println!("{}", "All bindings cleared.".yellow());
        },
        "auto" => cmd_auto(session),
        "save" => cmd_save(session, paths),
        _ => {
            println!(
                "Unknown command {}. Type {} for the command list.",
                command.red(),
                "help".bold()
            );
        },
    }

    true
}

fn print_help() {
    println!("\n{}", "Commands:".bold());
    println!("  {}   list connected devices", "devices".bold());
    println!("  {}   re-enumerate devices", "refresh".bold());
    println!("  {}   select the active device", "use <n>".bold());
    println!("  {}  arm a control for capture (e.g. arm Cross)", "arm <name>".bold());
    println!("  {}      show current bindings", "show".bold());
    println!("  {}     clear all bindings", "reset".bold());
    println!("  {}      apply the standard-layout template", "auto".bold());
    println!("  {}      write bindings to the settings file", "save".bold());
    println!("  {}      exit\n", "quit".bold());
}

fn cmd_devices(session: &PadSession) {
    let devices = session.devices();
    if devices.is_empty() {
        println!("{}", "No joysticks detected.".yellow());
        return;
    }

    let active = session.device_index();
    for device in devices {
        if device.index == active {
            println!("  {} {}", "*".green().bold(), device);
        } else {
            println!("    {}", device);
        }
    }
}

fn cmd_use(session: &PadSession, arg: &str) {
    // An unparseable selection falls back to device 0
    let requested = arg.parse::<usize>().unwrap_or(0);
    let chosen = session.set_device(requested);
    println!("Active device: {}", format!("SDL-{}", chosen).green());
}

fn cmd_arm(session: &PadSession, arg: &str) {
    match LogicalControl::from_user(arg) {
        Some(control) => {
            session.arm(control);
            println!(
                "Recording {} - press a button or D-Pad direction on the controller.",
                control.to_string().bold().green()
            );
        },
        None => {
            println!("{} is not a capturable control.", arg.red());
        },
    }
}

fn cmd_show(session: &PadSession) {
    let armed = session.armed();
    println!();
    for (control, value) in session.bindings() {
        let display = if armed == Some(control) {
            "waiting...".yellow().to_string()
        } else if value.is_empty() {
            "Press Button".dimmed().to_string()
        } else {
            short_token(&value).green().to_string()
        };
        println!("  {:<10} {}", control.to_string().bold(), display);
    }
    println!();
}

fn cmd_auto(session: &PadSession) {
    if session.auto_configure() {
        println!(
            "{}",
            format!(
                "Applied standard template for device SDL-{}.",
                session.device_index()
            )
            .green()
        );
    } else {
        println!("{}", "No controller detected.".yellow());
    }
}

fn cmd_save(session: &PadSession, paths: &EmulatorPaths) {
    match session.confirm(&paths.pad_ini()) {
        Ok(()) => println!("{}", "Configuration saved.".green().bold()),
        Err(e) => println!("{} {}", "Failed to save configuration:".red(), e),
    }
}
