use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use cutout_raster::presets::DisplayPreset;
use point_prompt_cutout::config::config::SessionConfig;
use point_prompt_cutout::core::Point;
use point_prompt_cutout::processing::SinkReceipt;
use point_prompt_cutout::{CutoutRequest, ExportReport, cut_out};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Cut an object out of an image with a few clicks:
/// - image from the editor bridge (default) or a file
/// - clicks as normalized coordinates, foreground or background
/// - result saved locally and posted back to the editor
#[derive(Parser, Debug)]
#[command(name = "cutout")]
#[command(about = "✂️  Cut an object out of an image with point prompts")]
#[command(long_about = "Load an image, segment it with point prompts, and export the selected mask as an RGBA PNG.
The cut-out is written to the export directory and, unless disabled, posted to the editor's mask endpoint.")]
struct Args {
    /// Image file to segment instead of the editor's current frame
    #[arg(short, long, help = "Image file to segment (default: fetch the editor's current frame)")]
    image: Option<PathBuf>,

    /// Prompt points
    #[arg(short, long = "point", required = true,
          help = "Click as x,y[,fg|bg] in [0,1] image coordinates; repeat for more points")]
    points: Vec<Point>,

    /// Segmentation model id
    #[arg(short, long, default_value = "sam-vit-b")]
    model: String,

    /// Export directory
    #[arg(short, long, default_value = "cutouts", help = "Directory cut-outs are written to")]
    out_dir: PathBuf,

    /// Display size preset
    #[arg(short, long, value_enum, default_value = "medium",
          help = "Long-side limit of the working image: small (512), medium (1024), large (2048), native")]
    display: DisplayPreset,

    #[arg(long, help = "URL of the editor's current frame")]
    frame_url: Option<String>,

    #[arg(long, help = "URL the cut-out is posted to")]
    mask_url: Option<String>,

    #[arg(long, help = "Base URL of the inference service")]
    inference_url: Option<String>,

    /// Skip posting the cut-out to the editor
    #[arg(long)]
    no_upload: bool,

    #[arg(long, default_value_t = 30, help = "HTTP timeout in seconds")]
    timeout: u64,

    #[arg(long, default_value = "info", help = "Log filter, e.g. debug or point_prompt_cutout=trace (RUST_LOG wins)")]
    log_level: String,

    /// Print the export report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct SinkLine {
    sink: String,
    ok: bool,
    detail: String,
    path: Option<PathBuf>,
}

#[derive(Serialize)]
struct ReportJson {
    width: u32,
    height: u32,
    png_bytes: usize,
    opaque_pixels: usize,
    sinks: Vec<SinkLine>,
}

impl From<&ExportReport> for ReportJson {
    fn from(report: &ExportReport) -> Self {
        Self {
            width: report.dimensions.0,
            height: report.dimensions.1,
            png_bytes: report.png_len,
            opaque_pixels: report.opaque_pixels,
            sinks: report
                .outcomes
                .iter()
                .map(|o| SinkLine {
                    sink: o.sink.clone(),
                    ok: o.result.is_ok(),
                    detail: match &o.result {
                        Ok(receipt) => receipt.to_string(),
                        Err(err) => err.to_string(),
                    },
                    path: match &o.result {
                        Ok(SinkReceipt::Saved(path)) => Some(path.clone()),
                        _ => None,
                    },
                })
                .collect(),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let defaults = SessionConfig::default();
    let config = SessionConfig {
        frame_url: args.frame_url.unwrap_or(defaults.frame_url),
        mask_url: args.mask_url.unwrap_or(defaults.mask_url),
        inference_url: args.inference_url.unwrap_or(defaults.inference_url),
        model: args.model,
        export_dir: args.out_dir,
        display_max_side: args.display.max_long_side(),
        highlight: defaults.highlight,
        upload: !args.no_upload,
        http_timeout: Duration::from_secs(args.timeout),
    };
    config.validate().map_err(anyhow::Error::msg)?;

    let request = CutoutRequest {
        image: args.image,
        points: args.points,
    };
    let report = cut_out(config, request).await?;
    info!(opaque = report.opaque_pixels, "cut-out exported");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&ReportJson::from(&report))?);
    } else {
        println!("{}", report.status_message());
    }

    if report.saved_path().is_none() {
        anyhow::bail!("cut-out was not saved locally");
    }
    Ok(())
}
