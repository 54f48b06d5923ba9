//! User-facing console messages.
//!
//! Prefixed lines are colored only when stdout is a TTY. Rename results go
//! through [`print_user`] unprefixed so they stay easy to script against.

use owo_colors::OwoColorize;

fn is_tty() -> bool {
    atty::is(atty::Stream::Stdout)
}

enum Tag {
    Info,
    Warn,
    Error,
    Ok,
}

fn render(tag: Tag, msg: &str, tty: bool) -> String {
    let (label, colored) = match tag {
        Tag::Info => ("info:", "info:".cyan().bold().to_string()),
        Tag::Warn => ("warn:", "warn:".yellow().bold().to_string()),
        Tag::Error => ("error:", "error:".red().bold().to_string()),
        Tag::Ok => ("ok:", "ok:".green().bold().to_string()),
    };
    if tty {
        format!("{colored} {msg}")
    } else {
        format!("{label} {msg}")
    }
}

pub fn print_info(msg: &str) {
    println!("{}", render(Tag::Info, msg, is_tty()));
}

pub fn print_warn(msg: &str) {
    eprintln!("{}", render(Tag::Warn, msg, is_tty()));
}

pub fn print_error(msg: &str) {
    eprintln!("{}", render(Tag::Error, msg, is_tty()));
}

pub fn print_success(msg: &str) {
    println!("{}", render(Tag::Ok, msg, is_tty()));
}

/// Plain line, no prefix: `renamed: 'a' -> 'b'`.
pub fn print_user(msg: &str) {
    println!("{}", msg);
}
