use notepanes::front_matter;
use notepanes::links::strip_note_suffix;
use notepanes::ManifestEntry;
use regex::Regex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("notes directory {0} does not exist")]
    MissingDir(PathBuf),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not serialize the manifest: {0}")]
    Json(#[from] serde_json::Error),
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> IndexError + '_ {
    move |source| IndexError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn is_note_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
}

fn collect_markdown_files(
    root: &Path,
    dir: &Path,
    recursive: bool,
    out: &mut Vec<String>,
) -> Result<(), IndexError> {
    for entry in fs::read_dir(dir).map_err(io_error(dir))? {
        let entry = entry.map_err(io_error(dir))?;
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if file_name.starts_with('.') {
            continue;
        }
        let path = entry.path();
        if path.is_dir() {
            if recursive {
                collect_markdown_files(root, &path, recursive, out)?;
            }
            continue;
        }
        if !is_note_file(&path) {
            continue;
        }
        let rel = path
            .strip_prefix(root)
            .unwrap_or(&path)
            .to_string_lossy()
            .replace('\\', "/");
        out.push(rel);
    }
    Ok(())
}

/// Note files under `root` as `/`-separated relative paths, sorted. Dot files
/// and dot directories are skipped.
pub fn collect_note_paths(root: &Path, recursive: bool) -> Result<Vec<String>, IndexError> {
    if !root.is_dir() {
        return Err(IndexError::MissingDir(root.to_path_buf()));
    }
    let mut paths = Vec::new();
    collect_markdown_files(root, root, recursive, &mut paths)?;
    paths.sort();
    Ok(paths)
}

fn heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^#\s+(.+)$").unwrap())
}

fn first_heading(body: &str) -> Option<String> {
    body.lines().find_map(|line| {
        heading_re()
            .captures(line.trim())
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
    })
}

/// Manifest record for one note. Title comes from the front matter, then the
/// first top-level heading, then the file name.
pub fn build_entry(file: &str, raw: &str) -> ManifestEntry {
    let (metadata, body) = front_matter::parse(file, raw);
    let title = metadata
        .title()
        .or_else(|| first_heading(&body))
        .unwrap_or_else(|| {
            let name = file.rsplit('/').next().unwrap_or(file);
            strip_note_suffix(name).to_string()
        });
    ManifestEntry {
        file: file.to_string(),
        title,
        content: body,
        frontmatter: metadata.to_json(),
    }
}

pub fn generate_index(notes_dir: &Path, recursive: bool) -> Result<Vec<ManifestEntry>, IndexError> {
    let mut entries = Vec::new();
    for file in collect_note_paths(notes_dir, recursive)? {
        let path = notes_dir.join(&file);
        let raw = fs::read_to_string(&path).map_err(io_error(&path))?;
        log::debug!("indexed {file}");
        entries.push(build_entry(&file, &raw));
    }
    Ok(entries)
}

pub fn write_index(entries: &[ManifestEntry], output: &Path, pretty: bool) -> Result<(), IndexError> {
    let json = if pretty {
        serde_json::to_string_pretty(entries)?
    } else {
        serde_json::to_string(entries)?
    };
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error(parent))?;
    }
    fs::write(output, json).map_err(io_error(output))
}
