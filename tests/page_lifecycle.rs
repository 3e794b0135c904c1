use std::path::{Path, PathBuf};
use std::time::Duration;

use vitrine::assets::{AssetCache, FsSource, LoadMode};
use vitrine::options::{HeroOptions, Options};
use vitrine::renderer::HeadlessSurface;
use vitrine::scroll::{Rect, Viewport};
use vitrine::section::{headless_surfaces, FrameInput, HeroSection, Page, Section};
use web_time::Instant;

#[path = "fixtures/glb.rs"]
mod glb;

use glb::triangle_glb;

const VIEW: Viewport = Viewport::new(1280.0, 800.0);

fn scratch_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("vitrine-{tag}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_models(root: &Path, paths: &[String]) {
    for path in paths {
        let file = root.join(path.trim_start_matches('/'));
        std::fs::create_dir_all(file.parent().unwrap()).unwrap();
        std::fs::write(&file, triangle_glb(path)).unwrap();
    }
}

fn all_models(options: &Options) -> Vec<String> {
    let mut paths: Vec<String> = options
        .hero
        .models
        .iter()
        .chain(options.showcase.panels.iter().flat_map(|p| p.models.iter()))
        .cloned()
        .collect();
    paths.sort();
    paths.dedup();
    paths
}

fn at(t0: Instant, ms: u64) -> Instant {
    t0 + Duration::from_millis(ms)
}

#[test]
fn page_mounts_scrolls_and_unmounts_cleanly() {
    let root = scratch_dir("page");
    let mut options = Options::default();
    options.assets.root = root.clone();
    let models = all_models(&options);
    write_models(&root, &models);

    let assets = AssetCache::from_options(&options.assets);
    let mut page = Page::standard(&options, assets, VIEW, 2.0, headless_surfaces);
    let t0 = Instant::now();
    page.mount_all(t0).unwrap();
    for path in &models {
        assert!(page.assets().wait(path, Duration::from_secs(10)).unwrap().is_ok());
    }
    // hero and showcase share models; each file is fetched once
    assert_eq!(page.assets().fetch_count(), models.len());

    let mut ms = 0;
    for (until, scroll) in [(3_000, 0.0), (6_000, 1_400.0), (9_000, 2_080.0), (12_000, 0.0)] {
        page.scroll_to(scroll);
        while ms < until {
            ms += 16;
            page.frame(at(t0, ms));
        }
    }

    let hero = page.section("hero").unwrap().diagnostics();
    assert_eq!(hero.bindings, 3);
    assert!(hero.timers > 0);
    let showcase = page.section("showcase").unwrap().diagnostics();
    assert_eq!(showcase.bindings, 5);
    assert_eq!(showcase.timers, 1);

    page.unmount_all();
    assert!(page.is_idle());
    assert!(!page.section("hero").unwrap().is_mounted());
    assert!(!page.section("showcase").unwrap().is_mounted());

    std::fs::remove_dir_all(&root).unwrap();
}

#[test]
fn failed_models_recover_only_on_explicit_retry() {
    let root = scratch_dir("retry");
    let options = HeroOptions::default();
    let assets = AssetCache::new(FsSource::new(&root), LoadMode::Inline);
    let mut hero: HeroSection<HeadlessSurface> =
        HeroSection::new(options.clone(), headless_surfaces());
    let t0 = Instant::now();
    let input = |now| FrameInput {
        now,
        scroll: 0.0,
        viewport: VIEW,
        device_pixel_ratio: 1.0,
        rect: Rect::new(0.0, 0.0, VIEW.width, VIEW.height),
        assets: &assets,
    };

    hero.mount(&input(t0)).unwrap();
    for ms in (100..=1_000).step_by(100) {
        let _ = hero.update(&input(at(t0, ms)));
    }
    let frame = hero.renderer().unwrap().surface().last_frame().unwrap();
    assert!(frame.placeholder.is_some());
    assert_eq!(frame.draw_count, 0);

    // files appearing later are not picked up on their own
    write_models(&root, &options.models);
    for ms in (1_100..=2_000).step_by(100) {
        let _ = hero.update(&input(at(t0, ms)));
    }
    assert!(!hero.renderer().unwrap().is_ready());
    assert_eq!(assets.fetch_count(), options.models.len());

    for path in &options.models {
        assert!(assets.retry(path));
    }
    for ms in (2_100..=3_000).step_by(100) {
        let _ = hero.update(&input(at(t0, ms)));
    }
    let renderer = hero.renderer().unwrap();
    assert!(renderer.is_ready());
    assert!(renderer.surface().last_frame().unwrap().placeholder.is_none());
    assert_eq!(assets.fetch_count(), 2 * options.models.len());

    hero.unmount();
    assert!(hero.diagnostics().is_idle());
    std::fs::remove_dir_all(&root).unwrap();
}
