use clap::Parser;
use img2laser::Params;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "img2laser", about = "Line-art raster image to laser-ready layered SVG")]
struct Cli {
    /// Input image path (PNG, JPEG, BMP)
    #[arg(short, long)]
    input: PathBuf,

    /// Output prefix; writes <prefix>.svg, <prefix>_cut.svg and
    /// <prefix>_engrave.svg
    #[arg(short, long)]
    output: PathBuf,

    /// Detail level, 0-100 (0 = silhouette only)
    #[arg(long, default_value = "50")]
    detail: u32,

    /// Centerline sensitivity, 0-100 (higher = more strokes engraved)
    #[arg(long, default_value = "50")]
    centerline: u32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let img = image::ImageReader::open(&cli.input)?.decode()?.into_rgba8();
    let (width, height) = img.dimensions();

    let params = Params {
        detail_level: cli.detail,
        centerline_sensitivity: cli.centerline,
    };
    let result = img2laser::process(img.as_raw(), width, height, &params)?;

    let prefix = cli.output.display();
    std::fs::write(format!("{prefix}.svg"), &result.full)?;
    std::fs::write(format!("{prefix}_cut.svg"), &result.cut)?;
    std::fs::write(format!("{prefix}_engrave.svg"), &result.engrave)?;

    eprintln!(
        "Traced {} into {} paths ({} cut, {} engrave)",
        cli.input.display(),
        result.stats.total_paths,
        result.stats.outline_count,
        result.stats.centerline_count,
    );
    Ok(())
}
