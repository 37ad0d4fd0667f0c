use super::SaveTarget;

pub fn run(target: &SaveTarget) -> Result<(), String> {
    target
        .manager()
        .clear()
        .map_err(|e| format!("failed to clear save: {e}"))?;
    println!("  Save cleared for slot '{}'.", target.slot());
    Ok(())
}
