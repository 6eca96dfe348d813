use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

const CORPUS_EXTENSIONS: [&str; 2] = ["txt", "md"];

/// Splits text into chunks of at most `max_chars` characters at sentence
/// boundaries. Sentences that are too long are split between words; a
/// single word longer than the limit is kept whole.
pub fn split_into_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let pieces = text
        .split_inclusive(['.', '!', '?'])
        .map(str::trim)
        .filter(|sentence| !sentence.is_empty())
        .flat_map(|sentence| {
            if sentence.chars().count() <= max_chars {
                vec![sentence.to_string()]
            } else {
                pack(sentence.split_whitespace(), max_chars)
            }
        })
        .collect::<Vec<_>>();

    pack(pieces.iter().map(String::as_str), max_chars)
}

/// Greedily joins pieces with single spaces, at most `max_chars` per chunk.
fn pack<'a>(pieces: impl IntoIterator<Item = &'a str>, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for piece in pieces {
        let piece_len = piece.chars().count();
        if !current.is_empty() && current_len + 1 + piece_len > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(piece);
        current_len += piece_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Loads all `.txt` and `.md` files under `dir_path` recursively, sorted by
/// path. Invalid UTF-8 is replaced rather than rejected; unreadable files and
/// symlinked directories are skipped with a warning.
pub fn load_text_files(dir_path: impl AsRef<Path>) -> Result<Vec<(PathBuf, String)>> {
    let dir_path = dir_path.as_ref();
    let mut texts = Vec::new();

    let entries = fs::read_dir(dir_path)
        .with_context(|| format!("failed to read corpus directory {}", dir_path.display()))?;

    for entry in entries {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            // a linked directory can point back at an ancestor
            if entry.file_type()?.is_symlink() {
                warn!("Skipping symlinked directory {}", path.display());
                continue;
            }
            texts.extend(load_text_files(&path)?);
        } else if path.is_file() && has_corpus_extension(&path) {
            match fs::read(&path) {
                Ok(bytes) => texts.push((path, String::from_utf8_lossy(&bytes).into_owned())),
                Err(e) => warn!("Skipping unreadable file {}: {}", path.display(), e),
            }
        }
    }

    texts.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(texts)
}

fn has_corpus_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| CORPUS_EXTENSIONS.contains(&ext))
}
