//! Text file loading used by the shader factories

use std::path::Path;

/// Read a whole text file into memory
///
/// # Errors
/// Returns the underlying I/O error when the file cannot be opened or is not
/// valid UTF-8.
pub fn read_text_file<P: AsRef<Path>>(path: P) -> std::io::Result<String> {
    let path = path.as_ref();
    log::trace!("Reading text file {:?}", path);
    std::fs::read_to_string(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_missing_file_fails() {
        assert!(read_text_file("definitely/not/here.glsl").is_err());
    }

    #[test]
    fn test_read_round_trips_contents() {
        let path = std::env::temp_dir().join(format!("glkit_io_{}.txt", std::process::id()));
        std::fs::write(&path, "#version 330 core\n").unwrap();

        let contents = read_text_file(&path).unwrap();
        assert_eq!(contents, "#version 330 core\n");

        std::fs::remove_file(&path).ok();
    }
}
