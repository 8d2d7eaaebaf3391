use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::Context;

pub mod convert;
pub mod hl7;

/// Reads a file, or stdin when `path` is `-`.
pub(crate) fn read_input(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read stdin")?;
        return Ok(buffer);
    }
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}
