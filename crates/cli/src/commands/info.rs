//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::HapticManifest;
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Manifest info for JSON output
#[derive(Serialize)]
struct ManifestInfo {
    version: String,
    engine: contracts::SyncEngineConfig,
    actuator: ActuatorInfo,
    assets: Vec<AssetInfo>,
}

#[derive(Serialize)]
struct ActuatorInfo {
    name: String,
    kind: String,
}

#[derive(Serialize)]
struct AssetInfo {
    locator: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_ms: Option<u64>,
    pages: Vec<PageInfo>,
}

#[derive(Serialize)]
struct PageInfo {
    number: contracts::PageNumber,
    cue_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    cues: Vec<CueInfo>,
}

#[derive(Serialize)]
struct CueInfo {
    at_ms: u64,
    pattern: String,
    intensity: f32,
    sharpness: f32,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(manifest = %args.manifest.display(), "Loading manifest info");

    if !args.manifest.exists() {
        anyhow::bail!("Manifest file not found: {}", args.manifest.display());
    }

    let manifest = config_loader::ConfigLoader::load_from_path(&args.manifest)
        .with_context(|| format!("Failed to load manifest from {}", args.manifest.display()))?;

    if args.json {
        let info = build_manifest_info(&manifest, args.cues);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize manifest info")?;
        println!("{}", json);
    } else {
        print_manifest_info(&manifest, args.cues);
    }

    Ok(())
}

fn build_manifest_info(manifest: &HapticManifest, with_cues: bool) -> ManifestInfo {
    let assets = manifest
        .assets
        .iter()
        .map(|asset| AssetInfo {
            locator: asset.locator.clone(),
            duration_ms: asset.duration_ms,
            pages: asset
                .pages
                .iter()
                .map(|page| PageInfo {
                    number: page.number,
                    cue_count: page.cues.len(),
                    cues: if with_cues {
                        page.cues
                            .iter()
                            .map(|c| {
                                let cue = c.to_cue();
                                CueInfo {
                                    at_ms: c.at_ms,
                                    pattern: cue.pattern.to_string(),
                                    intensity: cue.intensity,
                                    sharpness: cue.sharpness,
                                }
                            })
                            .collect()
                    } else {
                        Vec::new()
                    },
                })
                .collect(),
        })
        .collect();

    ManifestInfo {
        version: format!("{:?}", manifest.version),
        engine: manifest.engine.clone(),
        actuator: ActuatorInfo {
            name: manifest.actuator.name.clone(),
            kind: format!("{:?}", manifest.actuator.kind),
        },
        assets,
    }
}

fn print_manifest_info(manifest: &HapticManifest, with_cues: bool) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                 Haptic Sync Manifest                         ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let engine = &manifest.engine;
    println!("⚙️  Engine");
    println!("   ├─ Version: {:?}", manifest.version);
    println!("   ├─ Poll interval: {}ms", engine.poll_interval_ms);
    println!("   ├─ Dispatch timeout: {}ms", engine.dispatch_timeout_ms);
    println!("   ├─ Stall threshold: {} reads", engine.stall_threshold);
    match engine.late_cue_tolerance_ms {
        Some(ms) => println!("   ├─ Late cue tolerance: {}ms", ms),
        None => println!("   ├─ Late cue tolerance: off"),
    }
    println!("   ├─ Jitter tolerance: {}ms", engine.regression_tolerance_ms);
    println!("   └─ Initial page: {}", engine.initial_page);

    println!("\n📳 Actuator");
    println!(
        "   └─ {} ({:?})",
        manifest.actuator.name, manifest.actuator.kind
    );

    println!("\n🎵 Assets ({})", manifest.assets.len());
    for (i, asset) in manifest.assets.iter().enumerate() {
        let is_last = i == manifest.assets.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };
        let child_prefix = if is_last { "   " } else { "│  " };

        let duration = asset
            .duration_ms
            .map(|ms| format!("{:.2}s", ms as f64 / 1000.0))
            .unwrap_or_else(|| "unknown length".to_string());
        println!("   {} {} ({})", prefix, asset.locator, duration);

        for (j, page) in asset.pages.iter().enumerate() {
            let page_is_last = j == asset.pages.len() - 1;
            let page_prefix = if page_is_last { "└─" } else { "├─" };
            println!(
                "   {}  {} page {}: {} cues",
                child_prefix,
                page_prefix,
                page.number,
                page.cues.len()
            );

            if with_cues {
                let cue_prefix = if page_is_last { "   " } else { "│  " };
                for cue in &page.cues {
                    println!(
                        "   {}  {}   {:>8}ms  {}",
                        child_prefix, cue_prefix, cue.at_ms, cue.pattern
                    );
                }
            }
        }
    }

    println!();
}
