//! Result serialization: every subcommand writes its result as pretty
//! JSON to stdout (for piping) and, when an output directory is
//! configured, to a file under it as well.

use serde::Serialize;
use std::path::Path;

/// Prints `value` as pretty JSON to stdout, and additionally writes it
/// to `<output_dir>/<file_name>` if `output_dir` is given.
pub fn emit<T: Serialize>(value: &T, output_dir: Option<&Path>, file_name: &str) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    if let Some(dir) = output_dir {
        std::fs::create_dir_all(dir)?;
        std::fs::write(dir.join(file_name), &json)?;
    }
    Ok(())
}
