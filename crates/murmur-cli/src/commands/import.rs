use std::fs;
use std::path::Path;

use super::SaveTarget;

pub fn run(target: &SaveTarget, file: &Path) -> Result<(), String> {
    let json = fs::read_to_string(file)
        .map_err(|e| format!("failed to read {}: {e}", file.display()))?;
    target
        .manager()
        .import_bundle(&json)
        .map_err(|e| format!("failed to import {}: {e}", file.display()))?;

    println!("  Imported {} into slot '{}'.", file.display(), target.slot());
    Ok(())
}
