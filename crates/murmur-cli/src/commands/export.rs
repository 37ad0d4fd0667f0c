use std::fs;
use std::path::Path;

use super::SaveTarget;

pub fn run(target: &SaveTarget, output: Option<&Path>) -> Result<(), String> {
    let bundle = target
        .manager()
        .export_bundle()
        .map_err(|e| format!("failed to export save: {e}"))?;

    match output {
        Some(path) => {
            fs::write(path, &bundle)
                .map_err(|e| format!("failed to write {}: {e}", path.display()))?;
            eprintln!(
                "  Exported slot '{}' to {}",
                target.slot(),
                path.display()
            );
        }
        None => println!("{bundle}"),
    }

    Ok(())
}
