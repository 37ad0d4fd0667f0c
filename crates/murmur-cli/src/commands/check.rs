use std::path::Path;

use colored::Colorize;

pub fn run(story: &Path) -> Result<(), String> {
    let graph = super::load_story(story)?;
    let issues = murmur_core::validate(&graph);

    for issue in &issues {
        let line = issue.to_string();
        if issue.is_error {
            eprintln!("  {}", line.red());
        } else {
            eprintln!("  {}", line.yellow());
        }
    }

    let errors = issues.iter().filter(|i| i.is_error).count();
    let warnings = issues.len() - errors;

    if errors > 0 {
        eprintln!();
        eprintln!("  {errors} error(s), {warnings} warning(s)");
        return Err("validation failed with errors".into());
    }

    if warnings > 0 {
        println!(
            "  All checks passed for '{}' with {warnings} warning(s).",
            graph.title()
        );
    } else {
        println!("  All checks passed for '{}'.", graph.title());
    }
    println!(
        "  {} nodes, {} endings",
        graph.len(),
        graph.endings().len()
    );

    Ok(())
}
