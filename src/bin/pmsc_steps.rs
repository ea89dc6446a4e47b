/// pmsc_steps: read spectra, compute every intermediate of the windowed MSC
/// engine and write them to one safetensors file for comparison against the
/// MATLAB / R implementations.
///
/// Output keys:
///   X             [m, n]   f64  input spectra
///   r             [n]      f64  reference spectrum
///   band_size     [n]      i32  clipped window size per channel
///   r_mean        [n]      f64  moving mean of r
///   r_denom       [n]      f64  windowed centred second moment of r
///   x_mean        [m, n]   f64  row-wise moving mean of X
///   x_std         [m, n]   f64  row-wise moving std of X (NaN where count = 1)
///   z_slope       [m, n]   f64  Strategy::Slope
///   z_band_manual [m, n]   f64  Strategy::BandManual
///   z_band_lsq    [m, n]   f64  Strategy::BandLsq (only for odd widths)
use anyhow::{ensure, Result};
use clap::Parser;
use std::path::PathBuf;

use pmsc::{
    band::{band_lsq_correct, band_manual_correct},
    io::{SpectraData, StWriter},
    moving::{movmean_rows, movstd_rows},
    slope::{slope_correct, ReferenceMoments},
    span::band_sizes,
    Window,
};

#[derive(Parser, Debug)]
#[command(name = "pmsc_steps")]
struct Args {
    /// Input safetensors with `X` and `r`.
    #[arg(long)]
    input: PathBuf,

    /// Output safetensors path.
    #[arg(long)]
    output: PathBuf,

    /// Full window width.
    #[arg(long, default_value_t = 11)]
    width: usize,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let v = Window::Width(args.width).half_width(false)?;

    // ── 1. Load ───────────────────────────────────────────────────────────
    let t_io = now();
    let data = SpectraData::load(&args.input)?;
    let ms_io = t_io.elapsed().as_secs_f64() * 1000.0;
    let (m, n) = data.x.dim();
    ensure!(data.r.len() == n, "reference length {} != {n} channels", data.r.len());
    let (x, r) = (data.x.view(), data.r.view());

    // ── 2. Moving statistics ──────────────────────────────────────────────
    let t_mov = now();
    let moments = ReferenceMoments::new(r, v);
    let x_mean = movmean_rows(x, v);
    let x_std = movstd_rows(x, v);
    let ms_mov = t_mov.elapsed().as_secs_f64() * 1000.0;

    // ── 3. Correctors ─────────────────────────────────────────────────────
    let t_slope = now();
    let z_slope = slope_correct(x, r, v);
    let ms_slope = t_slope.elapsed().as_secs_f64() * 1000.0;

    let t_manual = now();
    let z_manual = band_manual_correct(x, r, v);
    let ms_manual = t_manual.elapsed().as_secs_f64() * 1000.0;

    let t_lsq = now();
    let z_lsq = (args.width % 2 == 1).then(|| band_lsq_correct(x, r, v));
    let ms_lsq = t_lsq.elapsed().as_secs_f64() * 1000.0;

    eprintln!(
        "TIMING io={ms_io:.4}ms moving={ms_mov:.4}ms slope={ms_slope:.4}ms \
         band_manual={ms_manual:.4}ms band_lsq={ms_lsq:.4}ms",
    );
    eprintln!("  {m} spectra  {n} channels  width={} (v={v})", args.width);
    if z_lsq.is_none() {
        eprintln!("  band_lsq skipped: width must be odd");
    }

    // ── 4. Write output ───────────────────────────────────────────────────
    eprintln!("Writing → {}", args.output.display());
    let mut w = StWriter::new();
    w.add_f64_arr2("X", &data.x);
    w.add_f64_arr1("r", &data.r);
    let sizes: Vec<i32> = band_sizes(n, v).into_iter().map(|b| b as i32).collect();
    w.add_i32("band_size", &sizes, &[n]);
    w.add_f64_arr1("r_mean", &moments.rmean);
    w.add_f64_arr1("r_denom", &moments.denom);
    w.add_f64_arr2("x_mean", &x_mean);
    w.add_f64_arr2("x_std", &x_std);
    w.add_f64_arr2("z_slope", &z_slope);
    w.add_f64_arr2("z_band_manual", &z_manual);
    if let Some(z) = &z_lsq {
        w.add_f64_arr2("z_band_lsq", z);
    }
    w.write(&args.output)?;

    eprintln!("Done.");
    Ok(())
}

/// Return `std::time::Instant::now()` (used for internal timing).
#[inline(always)]
fn now() -> std::time::Instant { std::time::Instant::now() }
