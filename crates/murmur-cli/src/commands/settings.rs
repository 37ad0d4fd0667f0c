use comfy_table::{ContentArrangement, Table};
use murmur_store::SETTING_KEYS;

use super::SaveTarget;

pub fn show(target: &SaveTarget) -> Result<(), String> {
    let settings = target.settings()?;

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Setting", "Value"]);
    for (key, value) in settings.entries() {
        table.add_row(vec![key.to_string(), value]);
    }

    println!("{table}");
    Ok(())
}

pub fn set(target: &SaveTarget, key: &str, value: &str) -> Result<(), String> {
    let mut settings = target.settings()?;
    settings.set(key, value).map_err(|e| {
        if SETTING_KEYS.contains(&key) {
            e.to_string()
        } else {
            format!("{e} (known settings: {})", SETTING_KEYS.join(", "))
        }
    })?;
    target.save_settings(&settings)?;

    let shown = settings
        .entries()
        .into_iter()
        .find(|(k, _)| *k == key)
        .map_or_else(|| value.to_string(), |(_, v)| v);
    println!("  {key} = {shown}");
    Ok(())
}
