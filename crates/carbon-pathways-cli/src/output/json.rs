use serde_json::Value;
use std::io::{self, Write};

/// Write the result envelope as pretty JSON. A closed pipe (`cpw ... | head`)
/// ends output quietly.
pub fn print_json(value: &Value) {
    let rendered = match serde_json::to_string_pretty(value) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Cannot render result as JSON: {e}");
            return;
        }
    };
    if let Err(e) = writeln!(io::stdout().lock(), "{rendered}") {
        if e.kind() != io::ErrorKind::BrokenPipe {
            eprintln!("Cannot write result: {e}");
        }
    }
}
