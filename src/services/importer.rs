use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Result;
use log::{info, warn};
use regex::Regex;

use crate::catalog::{BookFormat, BookStore, Category, NewBook};

const PROGRAMMING_KEYWORDS: &[&str] = &[
    "python",
    "java",
    "javascript",
    "c#",
    "c++",
    "sql",
    "database",
    "server",
    "network",
    "security",
    "hacking",
    "linux",
    "aws",
    "docker",
    "kubernetes",
    "react",
    "vue",
    "angular",
    "spring",
    "django",
    "flask",
    "coding",
    "programming",
    "developer",
];

const SELF_IMPROVEMENT_KEYWORDS: &[&str] = &[
    "habit",
    "success",
    "mindset",
    "growth",
    "psychology",
    "self-esteem",
    "confidence",
    "motivation",
    "self-help",
];

const ECONOMICS_KEYWORDS: &[&str] = &[
    "economy",
    "economics",
    "business",
    "investing",
    "investment",
    "stock",
    "real estate",
    "finance",
    "marketing",
];

const FICTION_KEYWORDS: &[&str] = &[
    "novel", "fiction", "poetry", "essay", "story", "literature",
];

fn parenthetical() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s*\([^)]*\)").expect("parenthetical pattern"))
}

/// Split a file stem into title and author. Library files are usually named
/// "<title> <author> (edition notes)"; the trailing word is taken as the
/// author unless it clearly isn't one (all digits, or a single character).
pub fn clean_filename(stem: &str) -> (String, Option<String>) {
    let cleaned = parenthetical().replace_all(stem, "");
    let cleaned = cleaned.trim();

    if let Some((title, author)) = cleaned.rsplit_once(' ') {
        let title = title.trim();
        let author = author.trim();
        if author.chars().all(|c| c.is_ascii_digit()) || author.chars().count() < 2 {
            return (cleaned.to_string(), None);
        }
        return (title.to_string(), Some(author.to_string()));
    }

    (cleaned.to_string(), None)
}

/// Keyword classification over title and table of contents; the programming
/// set also matches against the file path, since technical books tend to be
/// filed in their own directories.
pub fn classify(title: &str, toc: Option<&str>, filepath: &str) -> Category {
    let title_toc = format!("{} {}", title, toc.unwrap_or("")).to_lowercase();
    let filepath = filepath.to_lowercase();

    if PROGRAMMING_KEYWORDS
        .iter()
        .any(|k| title_toc.contains(k) || filepath.contains(k))
    {
        return Category::Programming;
    }
    if SELF_IMPROVEMENT_KEYWORDS.iter().any(|k| title_toc.contains(k)) {
        return Category::SelfImprovement;
    }
    if ECONOMICS_KEYWORDS.iter().any(|k| title_toc.contains(k)) {
        return Category::Economics;
    }
    if FICTION_KEYWORDS.iter().any(|k| title_toc.contains(k)) {
        return Category::Fiction;
    }
    Category::Other
}

fn collect_files(dir: &Path, found: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(&path, found)?;
        } else {
            found.push(path);
        }
    }
    Ok(())
}

/// Walk the library directory and return supported files that have not been
/// imported yet.
pub async fn scan_new_books(dir: &Path, store: &dyn BookStore) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect_files(dir, &mut files)?;
    files.sort();

    let mut new_books = Vec::new();
    for path in files {
        let supported = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(BookFormat::from_extension)
            .is_some();
        if supported && !store.contains_path(&path.to_string_lossy()).await? {
            new_books.push(path);
        }
    }
    Ok(new_books)
}

/// Import every new file under `dir` into the catalog and return how many
/// records were created. A file the store refuses is logged and skipped so
/// one bad entry never aborts the whole scan.
pub async fn import_books(dir: &Path, store: &dyn BookStore) -> Result<u64> {
    let new_books = scan_new_books(dir, store).await?;
    if new_books.is_empty() {
        info!("no new books under {}", dir.display());
        return Ok(0);
    }

    let mut imported = 0;
    for path in new_books {
        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let Some(format) = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(BookFormat::from_extension)
        else {
            continue;
        };

        let filepath = path.to_string_lossy().into_owned();
        let (title, author) = clean_filename(&stem);
        let category = classify(&title, None, &filepath);
        let book = NewBook {
            title,
            author: author.unwrap_or_default(),
            format,
            category,
            filepath,
            toc: None,
            preface: None,
        };

        match store.insert(&book).await {
            Ok(id) => {
                info!("imported \"{}\" as book {}", book.title, id);
                imported += 1;
            }
            Err(e) => warn!("skipping {}: {}", path.display(), e),
        }
    }
    Ok(imported)
}
