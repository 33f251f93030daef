use crate::checker::dictionary::Dictionary;
use anyhow::{Context, Result};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::Path;
use std::time::Duration;

// Release branch of the LibreOffice dictionaries repository, so downloads
// do not follow whatever is on master.
const DICTIONARY_BASE_URL: &str =
    "https://raw.githubusercontent.com/LibreOffice/dictionaries/libreoffice-7-6/en";
const DICTIONARY_VERSION: &str = "libreoffice-7-6";
const SUPPORTED_LANGUAGES: &[&str] = &["en_US", "en_GB", "en_AU", "en_CA", "en_ZA"];

/// Download URLs of the `.dic` and `.aff` files for `language`.
pub fn dictionary_urls(language: &str) -> Result<(String, String)> {
    if !SUPPORTED_LANGUAGES.contains(&language) {
        anyhow::bail!(
            "Language '{}' is not supported. Available: {}",
            language,
            SUPPORTED_LANGUAGES.join(", ")
        );
    }
    Ok((
        format!("{}/{}.dic", DICTIONARY_BASE_URL, language),
        format!("{}/{}.aff", DICTIONARY_BASE_URL, language),
    ))
}

/// Languages with both a `.dic` and an `.aff` file in `dir`, sorted.
pub fn installed_languages(dir: &Path) -> Result<Vec<String>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut languages = Vec::new();
    for entry in fs::read_dir(dir)
        .with_context(|| format!("Failed to read dictionary directory: {}", dir.display()))?
    {
        let path = entry?.path();
        if path.extension().and_then(|s| s.to_str()) != Some("dic") {
            continue;
        }
        if let Some(language) = path.file_stem().and_then(|s| s.to_str()) {
            if path.with_extension("aff").exists() {
                languages.push(language.to_string());
            }
        }
    }
    languages.sort();
    Ok(languages)
}

pub fn list_dictionaries(dir: &Path) -> Result<()> {
    let languages = installed_languages(dir)?;

    if languages.is_empty() {
        println!("{}", "No dictionaries installed.".yellow());
        println!(
            "Run {} to download a dictionary.",
            "grammarchk dict download en_US".cyan()
        );
        return Ok(());
    }

    println!("{}", "Installed dictionaries:".bold());
    println!();

    for language in &languages {
        let (dic_path, aff_path) = Dictionary::files_for(dir, language);
        let size = fs::metadata(&dic_path)?.len() + fs::metadata(&aff_path)?.len();
        println!(
            "  {} {} ({})",
            "✓".green(),
            language.cyan().bold(),
            format!("{}KB", size / 1024).dimmed()
        );
    }

    println!();
    println!("Dictionary directory: {}", dir.display().to_string().dimmed());

    Ok(())
}

pub fn download_dictionary(dir: &Path, language: &str) -> Result<()> {
    let (dic_url, aff_url) = dictionary_urls(language)?;

    println!(
        "{} dictionary for {} (version: {})...",
        "Downloading".cyan().bold(),
        language.yellow(),
        DICTIONARY_VERSION.dimmed()
    );

    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create dictionary directory: {}", dir.display()))?;

    let (dic_path, aff_path) = Dictionary::files_for(dir, language);
    for (url, path) in [(&dic_url, &dic_path), (&aff_url, &aff_path)] {
        println!("Source: {}", url.dimmed());
        let content = fetch(url)?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    }

    println!("{}", "Building dictionary...".cyan());
    let dictionary = Dictionary::load_from_paths(&dic_path, &aff_path)?;
    println!("Expanded to {} word forms", dictionary.len().to_string().yellow());

    println!(
        "{} Dictionary installed: {}",
        "✓".green().bold(),
        dic_path.display().to_string().cyan()
    );

    Ok(())
}

fn fetch(url: &str) -> Result<String> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Downloading...");

    let response = reqwest::blocking::get(url).context("Failed to download dictionary")?;
    if !response.status().is_success() {
        pb.abandon_with_message("Download failed");
        anyhow::bail!("Failed to download dictionary: HTTP {}", response.status());
    }

    let content = response.text().context("Failed to read dictionary download")?;
    pb.finish_with_message("Download complete");
    Ok(content)
}

pub fn show_info(dir: &Path, language: &str) -> Result<()> {
    let (dic_path, aff_path) = Dictionary::files_for(dir, language);

    if !dic_path.exists() || !aff_path.exists() {
        println!(
            "{} Dictionary for {} not found.",
            "✗".red().bold(),
            language.yellow()
        );
        println!(
            "Run {} to download it.",
            format!("grammarchk dict download {}", language).cyan()
        );
        return Ok(());
    }

    println!("{}", format!("Dictionary: {}", language).bold());
    println!("  Word list: {} ({} KB)", dic_path.display(), fs::metadata(&dic_path)?.len() / 1024);
    println!("  Affix rules: {} ({} KB)", aff_path.display(), fs::metadata(&aff_path)?.len() / 1024);
    println!("  Format: Hunspell, expanded into an FST set");

    match Dictionary::load_from_paths(&dic_path, &aff_path) {
        Ok(dictionary) => println!("  Word forms: {}", dictionary.len()),
        Err(e) => println!("  {}: {:#}", "Error loading dictionary".red(), e),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_dictionary_urls() {
        let (dic, aff) = dictionary_urls("en_GB").unwrap();
        assert!(dic.ends_with("/en/en_GB.dic"));
        assert!(aff.ends_with("/en/en_GB.aff"));
        assert!(dictionary_urls("xx_YY").is_err());
    }

    #[test]
    fn test_installed_languages_need_both_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("en_US.dic"), "1\nhello\n").unwrap();
        fs::write(dir.path().join("en_US.aff"), "").unwrap();
        fs::write(dir.path().join("en_GB.dic"), "1\nhello\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        assert_eq!(installed_languages(dir.path()).unwrap(), vec!["en_US"]);
        assert!(installed_languages(&dir.path().join("missing")).unwrap().is_empty());
    }
}
