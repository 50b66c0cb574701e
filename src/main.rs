use clap::{Parser, Subcommand};
use guji_layout::document::page::{open_page, PageSource};
use guji_layout::document::{BatchOptions, JsonFileSink, PageSink, PipelineContext};
use guji_layout::utils::image_utils::draw_blocks;
use guji_layout::{server, AppConfig, AppState, YoloLayout};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "guji-layout")]
#[command(about = "Layout detection and reading-order grouping for classical document pages")]
struct Args {
    /// Configuration file (defaults to config/app_config.json when present)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API
    Serve {
        /// Listen address, overriding the configured host_url
        #[arg(long)]
        addr: Option<String>,
    },
    /// Analyse page images and print the results as JSON
    Analyze {
        /// Page images in page order
        #[arg(required = true)]
        images: Vec<PathBuf>,

        #[arg(long)]
        conf: Option<f32>,

        #[arg(long)]
        iou: Option<f32>,

        /// Write each page's blocks to DIR/page_{n}.json
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Write each page with its block outlines to DIR/page_{n}.png
        #[arg(long)]
        overlay_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "guji_layout=info,tower_http=debug".into()),
        )
        .init();

    setup_ort()?;

    let config = AppConfig::load(args.config.as_deref())?;
    let context = Arc::new(PipelineContext::new(
        config.pipeline.clone(),
        config.inference_pool_size,
        YoloLayout::factory(config.layout_model_path(), config.use_cuda),
    )?);

    match args.command {
        Command::Serve { addr } => {
            let addr = addr.unwrap_or_else(|| config.host_url.to_string());
            let socket_addr: std::net::SocketAddr = addr.parse()?;
            let state = AppState::new(context, config.max_file_size);
            server::start_server(state, socket_addr).await?;
        }
        Command::Analyze {
            images,
            conf,
            iou,
            output_dir,
            overlay_dir,
        } => {
            tokio::task::spawn_blocking(move || {
                run_analyze(
                    &context,
                    &images,
                    conf,
                    iou,
                    output_dir.as_deref(),
                    overlay_dir.as_deref(),
                )
                .map_err(|e| e.to_string())
            })
            .await??;
        }
    }

    Ok(())
}

fn setup_ort() -> Result<(), Box<dyn std::error::Error>> {
    let dylib_path =
        env::var("ORT_DYLIB_PATH").unwrap_or_else(|_| "/usr/lib/libonnxruntime.so".to_string());

    ort::init_from(dylib_path).commit()?;

    Ok(())
}

fn run_analyze(
    context: &PipelineContext<YoloLayout>,
    images: &[PathBuf],
    conf_threshold: Option<f32>,
    iou_threshold: Option<f32>,
    output_dir: Option<&Path>,
    overlay_dir: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let pages: Vec<PageSource> = images.iter().cloned().map(PageSource::File).collect();

    let sink = output_dir.map(JsonFileSink::new).transpose()?;
    let options = BatchOptions {
        conf_threshold,
        iou_threshold,
        sink: sink.as_ref().map(|sink| sink as &dyn PageSink),
        ..BatchOptions::default()
    };

    let analysis = context.analyze_document_with(&pages, &options)?;

    if let Some(dir) = overlay_dir {
        std::fs::create_dir_all(dir)?;
        for (page, source) in analysis.pages.iter().zip(images) {
            if !page.is_success() {
                continue;
            }
            let image = match open_page(source) {
                Ok(image) => image,
                Err(e) => {
                    tracing::warn!("Skipping overlay for page {}: {}", page.page_number, e.reason());
                    continue;
                }
            };
            let path = dir.join(format!("page_{}.png", page.page_number));
            draw_blocks(&image, &page.blocks).save(&path)?;
            tracing::info!("Wrote overlay {}", path.display());
        }
    }

    println!("{}", serde_json::to_string_pretty(&analysis)?);

    if analysis.report.failed > 0 {
        tracing::warn!(
            "{} of {} pages failed",
            analysis.report.failed,
            analysis.report.total
        );
    }

    Ok(())
}
