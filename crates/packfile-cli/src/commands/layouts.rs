use packfile_format::Layout;
use packfile_format::dump::describe_layout;
use serde::Serialize;

pub struct LayoutsArgs {
    pub json: bool,
}

#[derive(Serialize)]
struct Preset {
    name: &'static str,
    #[serde(flatten)]
    layout: Layout,
}

pub fn run(args: LayoutsArgs) {
    if !args.json {
        print!("{}", render_text());
        return;
    }
    match render_json() {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}

pub fn render_text() -> String {
    Layout::PRESETS
        .iter()
        .map(|(name, layout)| format!("{:<8} {}\n", name, describe_layout(layout)))
        .collect()
}

pub fn render_json() -> serde_json::Result<String> {
    let presets: Vec<Preset> = Layout::PRESETS
        .iter()
        .map(|&(name, layout)| Preset { name, layout })
        .collect();
    serde_json::to_string_pretty(&presets)
}
