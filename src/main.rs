use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use grammarchk::ai::RewriteStyle;
use grammarchk::cli::output::{self, OutputFormat};
use grammarchk::cli::interactive;
use grammarchk::{dict, readability, Config, Session};
use log::{debug, LevelFilter};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "grammarchk")]
#[command(version, about = "Grammar, spelling and readability checker for plain text", long_about = None)]
struct Cli {
    /// Files to check (reads stdin when none are given)
    #[arg(value_name = "FILES")]
    files: Vec<PathBuf>,

    /// Apply every fixable suggestion in place
    #[arg(short, long)]
    fix: bool,

    /// Choose corrections one by one
    #[arg(short, long, requires = "fix")]
    interactive: bool,

    /// Check with the AI provider instead of the local rules
    #[arg(long)]
    ai: bool,

    /// API key for the AI provider
    #[arg(long, env = "GRAMMARCHK_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Rewrite the text in a style (professional, casual, formal, concise,
    /// elaborate, friendly, academic)
    #[arg(long, value_name = "STYLE")]
    rewrite: Option<RewriteStyle>,

    /// Report Flesch readability scores
    #[arg(short, long)]
    readability: bool,

    /// Print session statistics at the end
    #[arg(long)]
    stats: bool,

    /// Language/dictionary to use (e.g., en_US, en_GB)
    #[arg(short, long)]
    language: Option<String>,

    /// Directory holding <language>.dic and <language>.aff
    #[arg(long, value_name = "DIR")]
    dictionary_dir: Option<PathBuf>,

    /// Skip a rule (repeatable, see --list-rules)
    #[arg(long, value_name = "RULE")]
    disable_rule: Vec<String>,

    /// List rule ids and exit
    #[arg(long)]
    list_rules: bool,

    /// Output format (text, json)
    #[arg(short = 'o', long, default_value = "text")]
    format: OutputFormat,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Exit with code 0 even if issues are found
    #[arg(long)]
    no_fail: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Generate shell completion script
    #[arg(long, value_name = "SHELL")]
    completion: Option<Shell>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Parser, Debug)]
enum Commands {
    /// Dictionary management
    Dict {
        #[command(subcommand)]
        action: DictCommands,
    },
}

#[derive(Parser, Debug)]
enum DictCommands {
    /// List installed dictionaries
    List,
    /// Download a Hunspell dictionary
    Download {
        /// Language code (e.g., en_US, en_GB)
        language: String,
    },
    /// Show dictionary info
    Info {
        /// Language code
        language: String,
    },
}

struct Input {
    name: String,
    path: Option<PathBuf>,
    text: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Some(shell) = cli.completion {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "grammarchk", &mut io::stdout());
        return Ok(());
    }

    let mut config = Config::load(
        cli.language.clone(),
        cli.dictionary_dir.clone(),
        cli.disable_rule.clone(),
    )?;
    if cli.api_key.is_some() {
        config.ai.api_key = cli.api_key.clone();
    }

    if let Some(command) = cli.command {
        return handle_command(command, &config);
    }

    let colored = !cli.no_color;
    let mut session = Session::new(&config)?;

    if cli.list_rules {
        output::print_rule_ids(&session.checker().rule_ids(), colored);
        return Ok(());
    }

    let inputs = read_inputs(&cli.files)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let mut total_issues = 0;
    let mut total_fixed = 0;

    for input in &inputs {
        if let Some(style) = cli.rewrite {
            rewrite_input(&runtime, &mut session, input, style, cli.fix, colored)?;
            continue;
        }

        let result = if cli.ai {
            runtime.block_on(session.ai_check(&input.text))
        } else {
            session.quick_check(&input.text)
        };
        total_issues += result.issue_count();

        let score = cli.readability.then(|| readability::score(&input.text));
        output::print_result(&input.name, &input.text, &result, score.as_ref(), colored, &cli.format)?;

        if cli.fix {
            let edited = if cli.interactive {
                let (edited, applied) = interactive::run(&mut session, &input.text, colored)?;
                total_fixed += applied;
                (applied > 0).then_some(edited)
            } else {
                let edited = session.apply_all(&input.text, &result);
                if edited.is_some() {
                    total_fixed += result.suggestions.iter().filter(|s| s.is_fixable()).count();
                }
                edited
            };
            if let Some(edited) = edited {
                write_output(input, &edited)?;
            }
        }
    }

    if cli.rewrite.is_none() && matches!(cli.format, OutputFormat::Text) {
        if cli.fix {
            output::print_fix_summary(total_fixed, inputs.len(), colored);
        } else {
            output::print_check_summary(total_issues, inputs.len(), colored);
        }
    }

    if cli.stats {
        output::print_stats(session.stats(), colored, &cli.format)?;
    }

    if total_issues > 0 && !cli.no_fail && !cli.fix {
        std::process::exit(1);
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::new().filter_or("GRAMMARCHK_LOG", "warn"),
    );
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
}

fn read_inputs(files: &[PathBuf]) -> Result<Vec<Input>> {
    if files.is_empty() {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        return Ok(vec![Input {
            name: "<stdin>".to_string(),
            path: None,
            text,
        }]);
    }

    let mut inputs = Vec::new();
    for path in files {
        if !path.exists() {
            eprintln!("Error: File not found: {}", path.display());
            continue;
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        inputs.push(Input {
            name: path.display().to_string(),
            path: Some(path.clone()),
            text,
        });
    }
    Ok(inputs)
}

fn rewrite_input(
    runtime: &tokio::runtime::Runtime,
    session: &mut Session,
    input: &Input,
    style: RewriteStyle,
    write_back: bool,
    colored: bool,
) -> Result<()> {
    if !session.ai_configured() {
        anyhow::bail!("Rewriting needs an AI provider; set GRAMMARCHK_API_KEY or --api-key");
    }

    debug!("Rewriting {} in {} style", input.name, style);
    let Some(rewritten) = runtime.block_on(session.rewrite(&input.text, style)) else {
        anyhow::bail!("The AI provider did not return a rewrite for {}", input.name);
    };

    if write_back {
        session.accept_rewrite(&input.text, &rewritten);
        write_output(input, &rewritten)?;
        output::print_fix_summary(1, 1, colored);
    } else {
        println!("{}", rewritten);
    }
    Ok(())
}

fn write_output(input: &Input, text: &str) -> Result<()> {
    match &input.path {
        Some(path) => write_file(path, text),
        None => {
            print!("{}", text);
            Ok(())
        }
    }
}

fn write_file(path: &Path, text: &str) -> Result<()> {
    fs::write(path, text).with_context(|| format!("Failed to write file: {}", path.display()))
}

fn handle_command(command: Commands, config: &Config) -> Result<()> {
    let dir = config
        .dictionary_dir
        .clone()
        .or_else(Config::default_dictionary_dir)
        .context("Failed to determine dictionary directory")?;

    match command {
        Commands::Dict { action } => match action {
            DictCommands::List => {
                dict::manager::list_dictionaries(&dir)?;
            }
            DictCommands::Download { language } => {
                dict::manager::download_dictionary(&dir, &language)?;
            }
            DictCommands::Info { language } => {
                dict::manager::show_info(&dir, &language)?;
            }
        },
    }
    Ok(())
}
