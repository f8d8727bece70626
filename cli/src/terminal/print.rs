use std::net::IpAddr;

use colored::*;
use tracing::info;

pub const TOTAL_WIDTH: usize = 64;
pub const PRINT_TARGET: &str = "vitals::print";

pub fn print(msg: &str) {
    info!(target: PRINT_TARGET, raw_msg = msg);
}

pub fn header(msg: &str, q_level: u8) {
    if q_level > 0 {
        return;
    }

    let formatted: String = format!("⟦ {} ⟧", msg);
    let msg_len: usize = formatted.chars().count();

    let dash_count: usize = TOTAL_WIDTH.saturating_sub(msg_len);
    let left: usize = dash_count / 2;
    let right: usize = dash_count - left;

    let line: ColoredString = format!(
        "{}{}{}",
        "─".repeat(left),
        formatted.to_uppercase().bright_green(),
        "─".repeat(right)
    )
    .bright_black();

    print(&format!("{}", line));
}

pub fn fat_separator() {
    let sep: ColoredString = "═".repeat(TOTAL_WIDTH).bright_black();
    print(&format!("{}", sep));
}

pub fn host_line(idx: usize, ip: IpAddr, status: ColoredString) {
    let idx_str: String = format!("[{}]", idx.to_string().bright_cyan());
    let ip_str: String = ip.to_string();
    let dots: String = ".".repeat(40usize.saturating_sub(ip_str.len()));
    print(&format!(
        "{} {} {}{} {}",
        idx_str.bright_black(),
        ip_str.white().bold(),
        dots.bright_black(),
        ":".bright_black(),
        status
    ));
}

pub fn verdict(alive: bool) -> ColoredString {
    if alive {
        "alive".green().bold()
    } else {
        "silent".red()
    }
}

pub fn no_results() {
    print(&format!("{}", "No responsive hosts".red().bold()));
}
