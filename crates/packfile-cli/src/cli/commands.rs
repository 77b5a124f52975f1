//! Command builders for the CLI.

use clap::Command;

use super::args::*;

/// Build the complete CLI with all subcommands.
pub fn build_cli() -> Command {
    Command::new("packfile")
        .about("Inspect and verify packfile containers")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(verbose_arg())
        .subcommand(dump_command())
        .subcommand(check_command())
        .subcommand(layouts_command())
}

/// Print header, sections, class names and objects.
pub fn dump_command() -> Command {
    Command::new("dump")
        .about("Show the contents of a packfile")
        .override_usage("  packfile dump <FILE> [--fixups]")
        .after_help(
            r#"EXAMPLES:
  packfile dump skeleton.hkx            # header, sections, class names, objects
  packfile dump skeleton.hkx --fixups   # plus the three fixup tables"#,
        )
        .arg(file_arg())
        .arg(fixups_arg())
}

/// Run the verifier.
pub fn check_command() -> Command {
    Command::new("check")
        .about("Verify fixup tables and object alignment")
        .override_usage("  packfile check <FILE>")
        .after_help(
            r#"EXAMPLES:
  packfile check skeleton.hkx           # silent on success, exit 1 on violations
  packfile check skeleton.hkx -v        # log section and table sizes"#,
        )
        .arg(file_arg())
}

/// List layout presets.
pub fn layouts_command() -> Command {
    Command::new("layouts")
        .about("List layout presets")
        .override_usage("  packfile layouts [--json]")
        .arg(json_arg())
}
