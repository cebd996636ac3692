//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::HapticManifest;
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    manifest_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ManifestSummary>,
}

#[derive(Serialize)]
struct ManifestSummary {
    version: String,
    actuator: String,
    asset_count: usize,
    page_count: usize,
    cue_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(manifest = %args.manifest.display(), "Validating manifest");

    let result = validate_manifest(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Manifest validation failed")
    }
}

fn validate_manifest(args: &ValidateArgs) -> ValidationResult {
    let manifest_path = args.manifest.display().to_string();

    if !args.manifest.exists() {
        return ValidationResult {
            valid: false,
            manifest_path,
            error: Some(format!("File not found: {}", args.manifest.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.manifest) {
        Ok(manifest) => {
            let warnings = collect_warnings(&manifest);
            let page_count = manifest.assets.iter().map(|a| a.pages.len()).sum();
            let cue_count = manifest
                .assets
                .iter()
                .flat_map(|a| &a.pages)
                .map(|p| p.cues.len())
                .sum();

            ValidationResult {
                valid: true,
                manifest_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ManifestSummary {
                    version: format!("{:?}", manifest.version),
                    actuator: format!("{} ({:?})", manifest.actuator.name, manifest.actuator.kind),
                    asset_count: manifest.assets.len(),
                    page_count,
                    cue_count,
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            manifest_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect manifest warnings (non-fatal issues)
fn collect_warnings(manifest: &HapticManifest) -> Vec<String> {
    let mut warnings = Vec::new();

    if manifest.assets.is_empty() {
        warnings.push("No assets configured - nothing to play".to_string());
    }

    let initial_page = manifest.engine.initial_page;
    for asset in &manifest.assets {
        if asset.pages.is_empty() {
            warnings.push(format!("Asset '{}' has no cue pages", asset.locator));
            continue;
        }

        if !asset.pages.iter().any(|p| p.number == initial_page) {
            warnings.push(format!(
                "Asset '{}' has no page {} (engine.initial_page) - no cues fire until the page changes",
                asset.locator, initial_page
            ));
        }

        for page in &asset.pages {
            if page.cues.is_empty() {
                warnings.push(format!(
                    "Asset '{}' page {} has no cues",
                    asset.locator, page.number
                ));
            }

            // Cues past the end never fire; the engine halts when the transport ends
            if let Some(duration_ms) = asset.duration_ms {
                let beyond = page.cues.iter().filter(|c| c.at_ms > duration_ms).count();
                if beyond > 0 {
                    warnings.push(format!(
                        "Asset '{}' page {} has {} cue(s) beyond the asset duration ({}ms)",
                        asset.locator, page.number, beyond, duration_ms
                    ));
                }
            }
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Manifest is valid: {}", result.manifest_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Actuator: {}", summary.actuator);
            println!("  Assets: {}", summary.asset_count);
            println!("  Pages: {}", summary.page_count);
            println!("  Cues: {}", summary.cue_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Manifest is invalid: {}", result.manifest_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
