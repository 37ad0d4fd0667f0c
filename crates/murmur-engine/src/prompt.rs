//! Prompt text for language-model backed generators.

use murmur_core::PlayState;

use crate::event::OfferedChoice;

/// Reply meaning "no offered choice matches".
pub const NONE_SENTINEL: &str = "NONE";

/// Standing instructions for every request about a story.
pub fn story_system_prompt(title: &str, ai_context: Option<&str>) -> String {
    let mut prompt = format!(
        "You are assisting with a chat-based interactive story called \"{title}\".\n\
         Keep responses concise and in character, and stay within the established \
         narrative and character traits."
    );
    if let Some(context) = ai_context {
        prompt.push_str("\n\nStory background:\n");
        prompt.push_str(context.trim());
    }
    prompt
}

/// Summary of the play state handed to generators.
pub fn state_summary(state: &PlayState) -> String {
    let inventory = if state.inventory.is_empty() {
        "none".to_string()
    } else {
        state.inventory.join(", ")
    };
    let flags: Vec<&str> = state
        .flags
        .iter()
        .filter(|(_, set)| **set)
        .map(|(name, _)| name.as_str())
        .collect();
    let flags = if flags.is_empty() {
        "none".to_string()
    } else {
        flags.join(", ")
    };

    format!(
        "Current game context:\n\
         - Player is at location: {}\n\
         - Player health: {}%\n\
         - Inventory items: {inventory}\n\
         - Important flags: {flags}",
        state.location, state.health
    )
}

/// Instructions for mapping free text onto one of the offered choices.
pub fn choice_mapping_prompt(system: &str, summary: &str, offered: &[OfferedChoice]) -> String {
    let choices: Vec<String> = offered
        .iter()
        .map(|c| format!("{}: {}", c.id, c.text))
        .collect();
    format!(
        "{system}\n\n{summary}\n\n\
         Map the user's free-form response to the most appropriate available choice.\n\
         If none of the choices is a reasonable match, respond with \"{NONE_SENTINEL}\".\n\
         The available choices are:\n{}\n\n\
         Respond ONLY with the choice ID or \"{NONE_SENTINEL}\".",
        choices.join("\n")
    )
}

/// Interpret a model reply to [`choice_mapping_prompt`].
///
/// Accepts a bare id (optionally quoted), the sentinel, or prose that
/// mentions exactly one offered id. Anything else is no match.
pub fn parse_choice_reply(reply: &str, offered: &[OfferedChoice]) -> Option<String> {
    let cleaned = reply
        .trim()
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '`' | '.'))
        .trim();

    if cleaned.is_empty() || cleaned.eq_ignore_ascii_case(NONE_SENTINEL) {
        return None;
    }
    if let Some(exact) = offered.iter().find(|c| c.id == cleaned) {
        return Some(exact.id.clone());
    }

    let mentioned: Vec<&OfferedChoice> = offered
        .iter()
        .filter(|c| mentions_token(cleaned, &c.id))
        .collect();
    match mentioned.as_slice() {
        [only] => Some(only.id.clone()),
        _ => None,
    }
}

/// Whether `id` appears in `text` as a whole token.
fn mentions_token(text: &str, id: &str) -> bool {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_' || c == '-'))
        .any(|token| token == id)
}
