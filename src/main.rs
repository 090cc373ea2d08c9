use anyhow::{bail, Result};
use restats::{layout::WorkbookLayout, pipeline};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

const USAGE: &str = "usage: restats <workbook.xlsx> [out_dir] [--layout <layout.yaml>]";

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();

    std::panic::set_hook(Box::new(|info| {
        eprintln!("panic: {:?}", info);
    }));

    // ─── 2) parse args ───────────────────────────────────────────────
    let mut workbook: Option<PathBuf> = None;
    let mut out_dir = PathBuf::from("tidy");
    let mut layout_path: Option<PathBuf> = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--layout" => match args.next() {
                Some(path) => layout_path = Some(PathBuf::from(path)),
                None => bail!("{USAGE}"),
            },
            _ if workbook.is_none() => workbook = Some(PathBuf::from(arg)),
            _ => out_dir = PathBuf::from(arg),
        }
    }
    let Some(workbook) = workbook else {
        bail!("{USAGE}");
    };

    // ─── 3) resolve layout ───────────────────────────────────────────
    let layout = match &layout_path {
        Some(path) => WorkbookLayout::from_yaml_file(path)?,
        None => WorkbookLayout::default_layout(),
    };
    info!(edition = %layout.edition, sheets = layout.sheets.len(), "layout resolved");

    // ─── 4) run the batch ────────────────────────────────────────────
    pipeline::run(&workbook, &layout, &out_dir)?;
    Ok(())
}
