use crate::readability::ReadabilityScore;
use crate::stats::StatisticsCollector;
use crate::{CheckResult, Suggestion};
use anyhow::Result;
use colored::*;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    source: &'a str,
    issues: usize,
    from_cache: bool,
    corrected_text: Option<&'a str>,
    suggestions: &'a [Suggestion],
    #[serde(skip_serializing_if = "Option::is_none")]
    readability: Option<JsonReadability>,
}

#[derive(Debug, Serialize)]
struct JsonReadability {
    #[serde(flatten)]
    score: ReadabilityScore,
    level: &'static str,
}

#[derive(Debug, Serialize)]
struct JsonStats<'a> {
    total_checks: usize,
    total_errors: usize,
    average_errors_per_check: f64,
    top_errors: Vec<(&'a str, usize)>,
}

/// 1-based line and column of a byte offset.
pub fn line_column(text: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(text.len());
    let before = text.get(..offset).unwrap_or(text);
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

pub fn print_result(
    source: &str,
    text: &str,
    result: &CheckResult,
    readability: Option<&ReadabilityScore>,
    colored_output: bool,
    format: &OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Text => {
            print_text_result(source, text, result, colored_output);
            if let Some(score) = readability {
                print_readability(score, colored_output);
            }
        }
        OutputFormat::Json => {
            let report = JsonReport {
                source,
                issues: result.issue_count(),
                from_cache: result.from_cache,
                corrected_text: result.corrected_text.as_deref(),
                suggestions: &result.suggestions,
                readability: readability.map(|score| JsonReadability {
                    score: *score,
                    level: score.level(),
                }),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

fn print_text_result(source: &str, text: &str, result: &CheckResult, colored_output: bool) {
    if colored_output {
        println!("\n{}", source.bold().underline());
    } else {
        println!("\n{}", source);
    }

    for suggestion in &result.suggestions {
        let position = suggestion
            .start
            .map(|start| {
                let (line, column) = line_column(text, start);
                format!("{}:{}", line, column)
            })
            .unwrap_or_else(|| "-".to_string());

        if colored_output {
            let message = if suggestion.start.is_some() {
                suggestion.message.red().bold()
            } else {
                suggestion.message.cyan().bold()
            };
            println!("  {} {}", position.blue().bold(), message);
        } else {
            println!("  {} {}", position, suggestion.message);
        }

        if let Some(detail) = &suggestion.detail {
            for line in detail.lines().filter(|l| !l.trim().is_empty()) {
                if colored_output {
                    println!("    {}", line.dimmed());
                } else {
                    println!("    {}", line);
                }
            }
        }

        if let Some(replacement) = &suggestion.replacement {
            if colored_output {
                println!("    {} {}", "→".dimmed(), replacement.green());
            } else {
                println!("    → {}", replacement);
            }
        }
    }
}

fn print_readability(score: &ReadabilityScore, colored_output: bool) {
    println!();
    if colored_output {
        println!("{}", "Readability".bold());
    } else {
        println!("Readability");
    }

    if !score.is_applicable() {
        println!("  {}", score.level());
        return;
    }

    let level = if colored_output {
        score.level().yellow().to_string()
    } else {
        score.level().to_string()
    };
    println!("  Level: {}", level);
    println!("  Reading ease: {:.1}", score.reading_ease);
    println!("  Grade level: {:.1}", score.grade_level);
    println!(
        "  {} words, {} sentences, {:.1} words per sentence",
        score.word_count, score.sentence_count, score.average_words_per_sentence
    );
}

pub fn print_stats(stats: &StatisticsCollector, colored_output: bool, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let report = JsonStats {
                total_checks: stats.total_checks(),
                total_errors: stats.total_errors(),
                average_errors_per_check: stats.average_errors_per_check(),
                top_errors: stats.top_errors(10),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            println!();
            if colored_output {
                println!("{}", "Statistics".bold());
            } else {
                println!("Statistics");
            }
            println!("  Checks: {}", stats.total_checks());
            println!("  Errors: {}", stats.total_errors());
            println!("  Average errors per check: {:.2}", stats.average_errors_per_check());
            for (category, count) in stats.top_errors(10) {
                if colored_output {
                    println!("    {} {}", count.to_string().yellow(), category);
                } else {
                    println!("    {} {}", count, category);
                }
            }
        }
    }
    Ok(())
}

pub fn print_check_summary(total_issues: usize, sources: usize, colored: bool) {
    println!();
    if total_issues == 0 {
        if colored {
            println!("{}", "✓ No issues found!".green().bold());
        } else {
            println!("✓ No issues found!");
        }
    } else {
        let issue_word = if total_issues == 1 { "issue" } else { "issues" };
        let source_word = if sources == 1 { "input" } else { "inputs" };
        if colored {
            println!(
                "{} {} {} found in {} {}",
                "✗".red().bold(),
                total_issues.to_string().red().bold(),
                issue_word,
                sources,
                source_word
            );
        } else {
            println!("✗ {} {} found in {} {}", total_issues, issue_word, sources, source_word);
        }
    }
}

pub fn print_fix_summary(total_fixed: usize, sources: usize, colored: bool) {
    println!();
    if total_fixed == 0 {
        if colored {
            println!("{}", "No corrections needed!".green().bold());
        } else {
            println!("No corrections needed!");
        }
    } else {
        let fix_word = if total_fixed == 1 { "correction" } else { "corrections" };
        let source_word = if sources == 1 { "input" } else { "inputs" };
        if colored {
            println!(
                "{} {} {} applied to {} {}",
                "✓".green().bold(),
                total_fixed.to_string().green().bold(),
                fix_word,
                sources,
                source_word
            );
        } else {
            println!("✓ {} {} applied to {} {}", total_fixed, fix_word, sources, source_word);
        }
    }
}

pub fn print_rule_ids(ids: &[&str], colored: bool) {
    for id in ids {
        if colored {
            println!("  {}", id.cyan());
        } else {
            println!("  {}", id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_column() {
        let text = "first line\nsecond teh\nthird";
        assert_eq!(line_column(text, 0), (1, 1));
        assert_eq!(line_column(text, 18), (2, 8));
        assert_eq!(line_column(text, 999), (3, 6));
    }

    #[test]
    fn test_format_parse() {
        assert!(matches!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json)));
        assert!("yaml".parse::<OutputFormat>().is_err());
    }
}
