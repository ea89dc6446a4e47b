use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;
use pmsc::{correct, io::{SpectraData, StWriter}, MscConfig, Strategy, Window};

#[derive(Parser)]
#[command(name = "pmsc", about = "Windowed multiplicative scatter correction")]
struct Args {
    /// Input safetensors with `X` [m, n] and `r` [n]
    #[arg(long)]
    input: PathBuf,

    /// Output safetensors path (corrected spectra under `Z`)
    #[arg(long)]
    output: PathBuf,

    /// Correction strategy: slope, band-manual or band-lsq
    #[arg(long, default_value = "slope")]
    strategy: Strategy,

    /// Full window width (half-width = (w-1)/2)
    #[arg(long, conflicts_with = "half_width")]
    width: Option<usize>,

    /// Explicit window half-width
    #[arg(long)]
    half_width: Option<usize>,

    /// Store `Z` as F32 instead of F64
    #[arg(long = "f32")]
    single: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let window = match (args.width, args.half_width) {
        (Some(w), None) => Window::Width(w),
        (None, Some(v)) => Window::HalfWidth(v),
        (None, None) => MscConfig::default().window,
        (Some(_), Some(_)) => bail!("--width and --half-width are mutually exclusive"),
    };
    let cfg = MscConfig { window, strategy: args.strategy };

    let data = SpectraData::load(&args.input)?;
    println!("Loaded {} spectra × {} channels", data.x.nrows(), data.x.ncols());

    let t0 = std::time::Instant::now();
    let z = correct(data.x.view(), data.r.view(), &cfg)?;
    let ms = t0.elapsed().as_secs_f64() * 1000.0;

    let n_bad = z.iter().filter(|v| !v.is_finite()).count();
    eprintln!("TIMING correct={ms:.4}ms strategy={} window={:?}", cfg.strategy, cfg.window);
    if n_bad > 0 {
        eprintln!("  warning: {n_bad} non-finite cells (degenerate bands)");
    }

    let mut w = StWriter::new();
    if args.single {
        w.add_f64_arr2_as_f32("Z", &z);
    } else {
        w.add_f64_arr2("Z", &z);
    }
    w.write(&args.output)?;
    println!("Written → {}", args.output.display());

    Ok(())
}
