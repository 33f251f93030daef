use crate::checker::tokenizer::context_snippet;
use crate::cli::output::line_column;
use crate::{Session, Suggestion};
use anyhow::Result;
use colored::*;
use dialoguer::{theme::ColorfulTheme, Select};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Apply,
    Skip,
    Quit,
}

pub fn prompt_suggestion(text: &str, suggestion: &Suggestion, colored: bool) -> Result<Choice> {
    let (Some(start), Some(replacement)) = (suggestion.start, suggestion.replacement.as_deref()) else {
        return Ok(Choice::Skip);
    };
    let (line, column) = line_column(text, start);
    let context = context_snippet(text, start, suggestion.length);

    if colored {
        println!(
            "\n{} {}:{}",
            suggestion.message.yellow().bold(),
            line.to_string().blue(),
            column.to_string().blue()
        );
        println!("  {}", context.dimmed());
    } else {
        println!("\n{} {}:{}", suggestion.message, line, column);
        println!("  {}", context);
    }

    let options = [
        format!("Apply: {}", replacement),
        "Skip".to_string(),
        "Quit".to_string(),
    ];
    let selected = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Choice")
        .items(&options)
        .default(0)
        .interact()?;

    Ok(match selected {
        0 => Choice::Apply,
        2 => Choice::Quit,
        _ => Choice::Skip,
    })
}

/// Offer each fixable suggestion of the last check, last in the text first so
/// earlier spans stay valid. Returns the edited text and how many fixes were
/// applied.
pub fn run(session: &mut Session, text: &str, colored: bool) -> Result<(String, usize)> {
    let mut candidates: Vec<Suggestion> = session
        .active_suggestions()
        .iter()
        .filter(|s| s.is_fixable())
        .cloned()
        .collect();
    candidates.sort_by(|a, b| b.start.cmp(&a.start));

    let mut current = text.to_string();
    let mut applied = 0;

    for candidate in candidates {
        match prompt_suggestion(&current, &candidate, colored)? {
            Choice::Apply => {
                let index = session.active_suggestions().iter().position(|s| *s == candidate);
                match index.and_then(|i| session.apply_suggestion(&current, i)) {
                    Some(edited) => {
                        current = edited;
                        applied += 1;
                    }
                    None => println!("  Suggestion no longer fits the text, skipped."),
                }
            }
            Choice::Skip => continue,
            Choice::Quit => break,
        }
    }

    Ok((current, applied))
}
