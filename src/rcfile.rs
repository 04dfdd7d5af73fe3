use pipesh::{LineOutcome, Shell};
use std::fs;
use std::path::Path;

/// Run each line of a startup file in the given shell.
///
/// A missing file is skipped silently. Errors on individual lines are
/// warnings and do not stop the rest of the file; `exit` stops it.
pub(crate) fn load_rc(shell: &mut Shell, path: &Path) {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            log::debug!("no rc file at {}: {}", path.display(), e);
            return;
        }
    };

    for (line_num, line) in content.lines().enumerate() {
        let trimmed = line.trim();

        // Skip empty lines and comments
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        match shell.execute_line(trimmed) {
            Ok(LineOutcome::Exit) => break,
            Ok(_) => {}
            Err(e) => eprintln!("Warning: {} line {}: {}", path.display(), line_num + 1, e),
        }
    }
}
