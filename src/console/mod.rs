//! Line-oriented text console driving a single `Game`.

pub mod event_loop;
pub mod parser;

pub use event_loop::{process_line, run_console, Console};
pub use parser::{parse_command, ConsoleCommand};
