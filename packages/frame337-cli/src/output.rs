use std::io::Write;
use std::path::Path;

/// Write text to stdout or a file.
pub fn write_output(text: &str, output_path: Option<&Path>) -> Result<(), String> {
    match output_path {
        Some(path) => std::fs::write(path, text)
            .map_err(|e| format!("Failed to write output file '{}': {}", path.display(), e)),
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(text.as_bytes())
                .and_then(|_| {
                    if text.ends_with('\n') {
                        Ok(())
                    } else {
                        handle.write_all(b"\n")
                    }
                })
                .map_err(|e| format!("Failed to write to stdout: {}", e))
        }
    }
}

