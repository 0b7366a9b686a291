#![allow(non_snake_case)]
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info, warn};
use plotters::prelude::*;

use RustedGraph::Utils::logger::init_logger;
use RustedGraph::graphing::config::PlotConfig;
use RustedGraph::graphing::context::PlotContext;
use RustedGraph::graphing::error::Result;
use RustedGraph::graphing::plotters_surface::PlottersSurface;
use RustedGraph::graphing::renderer::Theme;

/// Renders equations into a PNG.
///
/// RustedGraph "y = 1/x" "x(t) = cos(3t), y(t) = sin(2t)" "x^2 + y^2 <= 9"
#[derive(Parser, Debug)]
#[command(author, version, about = "Plots explicit, parametric, polar, implicit and inequality equations")]
struct Args {
    /// Output image.
    #[arg(short, long, value_name = "FILE", default_value = "graph.png")]
    out: PathBuf,

    /// TOML configuration overriding the defaults.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Surface size in pixels, e.g. 800x600.
    #[arg(long, value_name = "WxH", value_parser = parse_size)]
    size: Option<(u32, u32)>,

    /// Colour theme: light or dark.
    #[arg(long)]
    theme: Option<Theme>,

    /// off, error, warn, info, debug or trace.
    #[arg(long)]
    loglevel: Option<String>,

    #[arg(required = true, value_name = "EQUATION")]
    equations: Vec<String>,
}

fn parse_size(text: &str) -> std::result::Result<(u32, u32), String> {
    let bad = || format!("size must look like 800x600, got `{}`", text);
    let (w, h) = text.split_once(['x', 'X']).ok_or_else(bad)?;
    Ok((w.trim().parse().map_err(|_| bad())?, h.trim().parse().map_err(|_| bad())?))
}

fn run(args: Args) -> Result<()> {
    init_logger(args.loglevel.as_deref(), false)?;
    let mut config = match &args.config {
        Some(path) => PlotConfig::from_file(path)?,
        None => PlotConfig::default(),
    };
    if let Some((width, height)) = args.size {
        config.viewport.pixel_width = width;
        config.viewport.pixel_height = height;
    }
    if let Some(theme) = args.theme {
        config.render.theme = theme;
    }
    let (width, height) = (config.viewport.pixel_width, config.viewport.pixel_height);

    let mut ctx = PlotContext::new(config)?;
    for equation in &args.equations {
        ctx.add_equation(equation);
    }
    for (id, family, message) in ctx.errors() {
        warn!("{} ({:?}) not drawn: {}", id, family, message);
    }

    let area = BitMapBackend::new(&args.out, (width, height)).into_drawing_area();
    let mut surface = PlottersSurface::new(area);
    ctx.render(&mut surface)?;
    surface.present()?;
    info!("{} equations drawn into {}", ctx.registry().len(), args.out.display());
    Ok(())
}

fn main() -> ExitCode {
    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_and_theme_flags() {
        let args = Args::try_parse_from([
            "RustedGraph",
            "--size",
            "640x480",
            "--theme",
            "dark",
            "y = x",
        ])
        .unwrap();
        assert_eq!(args.size, Some((640, 480)));
        assert_eq!(args.theme, Some(Theme::Dark));
        assert_eq!(args.out, PathBuf::from("graph.png"));
        assert_eq!(args.equations, vec!["y = x".to_string()]);
    }

    #[test]
    fn test_bad_arguments_are_rejected() {
        assert!(Args::try_parse_from(["RustedGraph"]).is_err());
        assert!(Args::try_parse_from(["RustedGraph", "--size", "big", "y = x"]).is_err());
        assert!(Args::try_parse_from(["RustedGraph", "--theme", "sepia", "y = x"]).is_err());
    }
}
