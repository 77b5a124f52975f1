use std::path::PathBuf;

use packfile_format::{DumpOptions, dump};

use super::file_loader::load_packfile;

pub struct DumpArgs {
    pub file: PathBuf,
    pub fixups: bool,
}

pub fn run(args: DumpArgs) {
    let file = load_packfile(&args.file);
    let options = DumpOptions {
        fixups: args.fixups,
    };
    match dump(&file, options) {
        Ok(text) => print!("{}", text),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}
