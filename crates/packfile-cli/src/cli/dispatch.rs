//! Dispatch logic: extract params from ArgMatches and convert to command args.

use std::path::PathBuf;

use clap::ArgMatches;

use crate::commands::check::CheckArgs;
use crate::commands::dump::DumpArgs;
use crate::commands::layouts::LayoutsArgs;

pub struct DumpParams {
    pub file: PathBuf,
    pub fixups: bool,
}

impl DumpParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            file: required_path(m, "file"),
            fixups: m.get_flag("fixups"),
        }
    }
}

impl From<DumpParams> for DumpArgs {
    fn from(p: DumpParams) -> Self {
        Self {
            file: p.file,
            fixups: p.fixups,
        }
    }
}

pub struct CheckParams {
    pub file: PathBuf,
}

impl CheckParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            file: required_path(m, "file"),
        }
    }
}

impl From<CheckParams> for CheckArgs {
    fn from(p: CheckParams) -> Self {
        Self { file: p.file }
    }
}

pub struct LayoutsParams {
    pub json: bool,
}

impl LayoutsParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            json: m.get_flag("json"),
        }
    }
}

impl From<LayoutsParams> for LayoutsArgs {
    fn from(p: LayoutsParams) -> Self {
        Self { json: p.json }
    }
}

fn required_path(m: &ArgMatches, id: &str) -> PathBuf {
    m.get_one::<PathBuf>(id)
        .cloned()
        .unwrap_or_else(|| unreachable!("clap enforces required {id}"))
}
