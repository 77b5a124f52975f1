use std::path::Path;

use packfile_format::PackFile;
use tracing::debug;

/// Read and parse a container, or exit with a message.
pub fn load_packfile(path: &Path) -> PackFile {
    match PackFile::from_path(path) {
        Ok(file) => {
            debug!(
                path = %path.display(),
                bytes = file.bytes().len(),
                sections = file.sections().count(),
                "loaded packfile"
            );
            file
        }
        Err(e) => {
            eprintln!("error: {}: {}", path.display(), e);
            std::process::exit(1);
        }
    }
}
