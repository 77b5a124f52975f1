mod cli;
mod commands;

use cli::{CheckParams, DumpParams, LayoutsParams, build_cli, init_tracing};

fn main() {
    let matches = build_cli().get_matches();
    let Some((name, m)) = matches.subcommand() else {
        unreachable!("clap should have caught this")
    };
    init_tracing(m.get_count("verbose"));

    match name {
        "dump" => {
            let params = DumpParams::from_matches(m);
            commands::dump::run(params.into());
        }
        "check" => {
            let params = CheckParams::from_matches(m);
            commands::check::run(params.into());
        }
        "layouts" => {
            let params = LayoutsParams::from_matches(m);
            commands::layouts::run(params.into());
        }
        _ => unreachable!("clap should have caught this"),
    }
}
