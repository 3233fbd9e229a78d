//! Path helpers for output naming and identity comparison

use std::path::{Component, Path, PathBuf};

/// Default output next to the input: `<stem>-cut.<ext>`, `mp4` when the input has no extension
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    let extension = input
        .extension()
        .map(|ext| ext.to_string_lossy().to_string())
        .filter(|ext| !ext.is_empty())
        .unwrap_or_else(|| "mp4".to_string());

    let file_name = format!("{}-cut.{}", stem, extension);
    match input.parent() {
        Some(parent) => parent.join(file_name),
        None => PathBuf::from(file_name),
    }
}

/// Lexically normalize a path: drop `.` components and fold `..` into the parent
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component.as_os_str());
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Whether two paths name the same file. Existing files are compared by their
/// canonical form so symlinks and relative spellings match.
pub fn same_file_path(a: &Path, b: &Path) -> bool {
    if let (Ok(a), Ok(b)) = (a.canonicalize(), b.canonicalize()) {
        return a == b;
    }
    normalize(&absolute(a)) == normalize(&absolute(b))
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// File name for status messages, falling back to the full path
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_keeps_extension() {
        assert_eq!(
            default_output_path(Path::new("/tmp/clip.mkv")),
            PathBuf::from("/tmp/clip-cut.mkv")
        );
    }

    #[test]
    fn test_default_output_without_extension() {
        assert_eq!(
            default_output_path(Path::new("/tmp/recording")),
            PathBuf::from("/tmp/recording-cut.mp4")
        );
    }

    #[test]
    fn test_same_file_path_lexical() {
        assert!(same_file_path(
            Path::new("/no/such/dir/./a.mp4"),
            Path::new("/no/such/other/../dir/a.mp4")
        ));
        assert!(!same_file_path(
            Path::new("/no/such/dir/a.mp4"),
            Path::new("/no/such/dir/b.mp4")
        ));
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(Path::new("/tmp/out.mp4")), "out.mp4");
    }
}
