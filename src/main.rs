use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use vitrine::assets::AssetCache;
use vitrine::options::Options;
use vitrine::scroll::Viewport;
use vitrine::section::{headless_surfaces, Page};
use vitrine::util::frame_timing::FrameTiming;
use vitrine::VitrineError;
use web_time::Instant;

const LOAD_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Parser, Debug)]
#[command(name = "vitrine")]
#[command(about = "Scroll-choreographed 3D product showcase", long_about = None)]
struct Cli {
    /// Options file (TOML). Missing fields use defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Mount the page, replay a scroll script frame by frame, unmount.
    Simulate {
        /// Simulated seconds.
        #[arg(long, default_value_t = 12.0)]
        seconds: f32,
        /// Scroll keyframes as `time:offset` pairs, e.g. `2:1400,5:2000`.
        #[arg(long, value_delimiter = ',')]
        scroll: Vec<String>,
        /// Viewport width in CSS pixels.
        #[arg(long, default_value_t = 1280.0)]
        width: f32,
        /// Viewport height in CSS pixels.
        #[arg(long, default_value_t = 800.0)]
        height: f32,
        /// Device pixel ratio.
        #[arg(long, default_value_t = 1.0)]
        dpr: f32,
        /// Simulated frame rate.
        #[arg(long, default_value_t = 60)]
        fps: u32,
        /// Render through the GPU instead of recording frames.
        #[arg(long)]
        gpu: bool,
    },
    /// Print the default options as TOML.
    Defaults,
    /// Print the options JSON schema.
    Schema,
}

fn parse_keyframe(text: &str) -> Result<(f32, f32), VitrineError> {
    let parsed = text.split_once(':').and_then(|(t, s)| {
        Some((t.trim().parse::<f32>().ok()?, s.trim().parse::<f32>().ok()?))
    });
    parsed.ok_or_else(|| {
        VitrineError::OptionsParse(format!("bad scroll keyframe '{text}', expected time:offset"))
    })
}

/// Scroll offset at `t` seconds: held at each keyframe until the next.
fn scroll_at(keyframes: &[(f32, f32)], t: f32) -> Option<f32> {
    keyframes.iter().rev().find(|(at, _)| *at <= t).map(|(_, s)| *s)
}

fn wait_for_models(options: &Options, assets: &AssetCache) {
    let paths = options
        .hero
        .models
        .iter()
        .chain(options.showcase.panels.iter().flat_map(|p| p.models.iter()));
    for path in paths {
        match assets.wait(path, LOAD_TIMEOUT) {
            Some(Ok(_)) => log::debug!("{path} ready"),
            Some(Err(e)) => log::warn!("{e}"),
            None => log::warn!("{path} still loading after {LOAD_TIMEOUT:?}"),
        }
    }
}

struct Script<'a> {
    seconds: f32,
    fps: u32,
    keyframes: &'a [(f32, f32)],
}

fn simulate(page: &mut Page, options: &Options, script: &Script<'_>) -> Result<(), VitrineError> {
    let t0 = Instant::now();
    page.mount_all(t0)?;
    wait_for_models(options, page.assets());

    let mut timing = FrameTiming::new(script.fps, t0);
    let frames = (script.seconds / timing.frame_seconds()).ceil() as u64;
    let report_every = u64::from(script.fps.max(1));
    let mut user_scroll = None;
    while timing.frames() <= frames {
        let now = timing.begin_frame();
        let t = now.saturating_duration_since(t0).as_secs_f32();
        let scripted = scroll_at(script.keyframes, t);
        if scripted.is_some() && scripted != user_scroll {
            user_scroll = scripted;
            if let Some(scroll) = scripted {
                log::info!("t={t:.2}s scroll to {scroll}");
                page.scroll_to(scroll);
            }
        }
        page.frame(now);
        timing.end_frame();
        if timing.frames() % report_every == 0 {
            for (name, d) in page.diagnostics() {
                log::debug!(
                    "t={t:.2}s {name}: {} timers, {} bindings, {} timelines",
                    d.timers,
                    d.bindings,
                    d.timelines
                );
            }
        }
    }
    log::info!(
        "{} frames at {:.0} fps, page settled at scroll {}",
        timing.frames(),
        timing.fps(),
        page.scroll()
    );

    page.unmount_all();
    if page.is_idle() {
        log::info!("unmounted cleanly");
    } else {
        log::error!("resources left after unmount: {:?}", page.diagnostics());
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), VitrineError> {
    let options = match &cli.config {
        Some(path) => Options::load(path)?,
        None => Options::default(),
    };
    match cli.command {
        Command::Defaults => {
            println!("{}", options.to_toml()?);
        }
        Command::Schema => {
            let schema = serde_json::to_string_pretty(&Options::json_schema())
                .map_err(|e| VitrineError::OptionsParse(e.to_string()))?;
            println!("{schema}");
        }
        Command::Simulate {
            seconds,
            scroll,
            width,
            height,
            dpr,
            fps,
            gpu,
        } => {
            let keyframes = scroll
                .iter()
                .map(String::as_str)
                .map(parse_keyframe)
                .collect::<Result<Vec<_>, _>>()?;
            let viewport = Viewport::new(width, height);
            let assets = AssetCache::from_options(&options.assets);
            let mut page = if gpu {
                gpu_page(&options, assets, viewport, dpr)?
            } else {
                Page::standard(&options, assets, viewport, dpr, headless_surfaces)
            };
            let script = Script {
                seconds,
                fps,
                keyframes: &keyframes,
            };
            simulate(&mut page, &options, &script)?;
        }
    }
    Ok(())
}

#[cfg(feature = "gpu")]
fn gpu_page(
    options: &Options,
    assets: AssetCache,
    viewport: Viewport,
    dpr: f32,
) -> Result<Page, VitrineError> {
    use vitrine::renderer::gpu::GpuSurface;
    use vitrine::section::SurfaceFactory;

    fn surfaces() -> SurfaceFactory<GpuSurface> {
        Box::new(|size, options| GpuSurface::new(size, options).map_err(VitrineError::from))
    }
    Ok(Page::standard(options, assets, viewport, dpr, surfaces))
}

#[cfg(not(feature = "gpu"))]
#[allow(clippy::needless_pass_by_value)]
fn gpu_page(
    _options: &Options,
    _assets: AssetCache,
    _viewport: Viewport,
    _dpr: f32,
) -> Result<Page, VitrineError> {
    Err(VitrineError::OptionsParse(
        "--gpu needs a build with the gpu feature".to_owned(),
    ))
}

fn main() {
    env_logger::init();

    if let Err(e) = run(Cli::parse()) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyframes_parse_and_hold() {
        let frames = vec![parse_keyframe("1:400").unwrap(), parse_keyframe(" 3 : 1200").unwrap()];
        assert_eq!(scroll_at(&frames, 0.5), None);
        assert_eq!(scroll_at(&frames, 2.0), Some(400.0));
        assert_eq!(scroll_at(&frames, 3.0), Some(1200.0));
        assert!(parse_keyframe("fast").is_err());
    }
}
