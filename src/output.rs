use colored::Colorize;

use quickclean::utils::format_size;

pub fn print_banner() {
    println!(
        "{}",
        concat!("quickclean v", env!("CARGO_PKG_VERSION")).bold().cyan()
    );
    println!();
}

pub fn print_section(label: &str) {
    println!("{}", format!("=== {label} ===").bold().white());
}

pub fn print_base_task(name: &str) {
    println!("  {}", name);
}

pub fn print_family_task(name: &str, key: &str, present: bool) {
    if present {
        println!("  {:<24} {}", name, format!("[{key}]").dimmed());
    } else {
        println!(
            "  {:<24} {}  {}",
            name,
            format!("[{key}]").dimmed(),
            "no data found".yellow()
        );
    }
}

pub fn print_dir(label: &str, path: &str) {
    println!("  {:<10} {}", format!("{label}:").bold(), path.dimmed());
}

pub fn print_stage(name: &str, step: usize, total: usize) {
    println!(
        "{} {} {}",
        "Cleaning:".cyan().bold(),
        name,
        format!("[{step}/{total}]").dimmed()
    );
}

pub fn print_progress(freed: u64) {
    println!("  {} {}", "Freed:".dimmed(), format_size(freed).yellow());
}

pub fn print_separator() {
    println!("  {}", "─".repeat(45).dimmed());
}

pub fn print_done(freed: u64, disk_gain: Option<u64>) {
    println!(
        "{} {}",
        "Done!".green().bold(),
        format!("{} freed.", format_size(freed)).green()
    );
    if let Some(gain) = disk_gain {
        println!(
            "  {} {}",
            "Free space gained on disk:".dimmed(),
            format_size(gain).green()
        );
    }
}

pub fn print_warning(msg: &str) {
    eprintln!("{} {}", "Warning:".red().bold(), msg.red());
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "Error:".red().bold(), msg);
}

pub fn print_info(msg: &str) {
    println!("{} {}", "Info:".cyan().bold(), msg);
}
