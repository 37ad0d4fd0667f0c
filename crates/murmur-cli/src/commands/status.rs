use comfy_table::{ContentArrangement, Table};

use super::SaveTarget;

fn list_or_none(items: impl IntoIterator<Item = String>) -> String {
    let joined: Vec<String> = items.into_iter().collect();
    if joined.is_empty() {
        "(none)".to_string()
    } else {
        joined.join(", ")
    }
}

pub fn run(target: &SaveTarget) -> Result<(), String> {
    let saves = target.manager();
    let state = saves
        .load_state()
        .map_err(|e| format!("failed to read save: {e}"))?;

    let Some(state) = state else {
        println!("  No saved game in slot '{}'.", target.slot());
        return Ok(());
    };
    let messages = saves
        .load_messages()
        .map_err(|e| format!("failed to read transcript: {e}"))?
        .map_or(0, |m| m.len());

    let flags = state
        .flags
        .iter()
        .filter(|(_, set)| **set)
        .map(|(name, _)| name.clone());
    let relationships = state
        .relationships
        .iter()
        .map(|(entity, score)| format!("{entity} {score:+}"));
    let location = if state.location.is_empty() {
        "(unknown)".to_string()
    } else {
        state.location.clone()
    };
    let progress = match (&state.ending_id, &state.pending_node_id) {
        (Some(ending), _) => format!("ended ({ending})"),
        (None, Some(next)) => format!("leaving for '{next}'"),
        (None, None) if state.messages_complete => "waiting for a reply".to_string(),
        (None, None) => "mid-conversation".to_string(),
    };

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Field", "Value"]);
    table.add_row(vec!["Node".to_string(), state.current_node_id.clone()]);
    table.add_row(vec!["Progress".to_string(), progress]);
    table.add_row(vec!["Health".to_string(), format!("{}%", state.health)]);
    table.add_row(vec!["Location".to_string(), location]);
    table.add_row(vec![
        "Inventory".to_string(),
        list_or_none(state.inventory.iter().cloned()),
    ]);
    table.add_row(vec!["Flags".to_string(), list_or_none(flags)]);
    table.add_row(vec!["Relationships".to_string(), list_or_none(relationships)]);
    table.add_row(vec![
        "Visited".to_string(),
        state.visited_nodes.len().to_string(),
    ]);
    table.add_row(vec!["Status".to_string(), state.activity_status.to_string()]);
    table.add_row(vec![
        "Last action".to_string(),
        state.last_action_at.format("%Y-%m-%d %H:%M UTC").to_string(),
    ]);

    println!("{table}");
    println!();
    println!("  {messages} messages in slot '{}'", target.slot());

    Ok(())
}
