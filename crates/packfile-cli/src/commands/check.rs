use std::path::PathBuf;

use packfile_format::verify;
use tracing::debug;

use super::file_loader::load_packfile;

pub struct CheckArgs {
    pub file: PathBuf,
}

pub fn run(args: CheckArgs) {
    let file = load_packfile(&args.file);
    let violations = match verify(&file) {
        Ok(violations) => violations,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    if !violations.is_empty() {
        for violation in &violations {
            eprintln!("{}: {}", args.file.display(), violation);
        }
        eprintln!();
        eprintln!("{} violation(s)", violations.len());
        std::process::exit(1);
    }

    // Silent on success
    debug!(path = %args.file.display(), "no violations");
}
