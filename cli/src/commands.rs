use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use promptgen_shared::view::{HealthView, PromptCardView, ResultsView};
use promptgen_shared::{ArtifactHandle, Category, Document, Event, ServiceConfig};
use serde::Serialize;
use tracing::info;

use crate::cli::{GenerateArgs, HealthArgs};
use crate::shell::Shell;
use crate::transport::Transport;

#[derive(Serialize)]
struct GenerateOutput<'a> {
    heading: &'a str,
    prompts: &'a [PromptCardView],
    artifact: Option<&'a str>,
    using_fallback: bool,
    message: Option<&'a str>,
    qr_available: bool,
    files: Vec<String>,
}

pub async fn generate(base_url: &str, json: bool, args: GenerateArgs) -> Result<()> {
    let mut shell = Shell::new(Transport::new()?, args.out_dir.clone());
    configure(&mut shell, args.timeouts.service_config(base_url)).await?;

    let mut events = vec![
        Event::OverviewChanged(args.overview.clone()),
        Event::CountChanged(args.count),
        Event::MetaPromptChanged(args.meta_prompt.clone()),
    ];
    events.extend(
        unique_categories(&args.categories)
            .into_iter()
            .map(Event::CategoryToggled),
    );
    if let Some(path) = &args.document {
        events.push(Event::DocumentAttached(read_document(path).await?));
    }
    for event in events {
        shell.dispatch(event).await?;
    }

    if let Some(doc) = shell.view().form.document {
        for advisory in &doc.advisories {
            eprintln!("warning: {}: {advisory}", doc.file_name);
        }
    }

    shell.dispatch(Event::SubmitRequested).await?;

    let view = shell.view();
    if let Some(error) = view.error {
        bail!(error);
    }
    let Some(results) = view.results else {
        bail!("the service returned no prompts");
    };

    let mut files: Vec<PathBuf> = Vec::new();

    if args.download {
        let artifact = results
            .artifact
            .clone()
            .context("the service did not produce a spreadsheet to download")?;
        shell.dispatch(Event::DownloadRequested { artifact }).await?;
        if let Some(error) = shell.view().download_error {
            bail!(error);
        }
        files.extend(shell.saved().iter().cloned());
    }

    if args.qr {
        if results.qr_available {
            shell.dispatch(Event::ShowQrRequested).await?;
            if let Some(modal) = shell.view().qr_modal {
                let path = shell.out_dir().join(qr_file_name(&modal.mime_type));
                tokio::fs::create_dir_all(shell.out_dir()).await?;
                tokio::fs::write(&path, &modal.image)
                    .await
                    .with_context(|| format!("failed to write {}", path.display()))?;
                info!(path = %path.display(), "QR image written");
                files.push(path);
            }
            shell.dispatch(Event::CloseQrRequested).await?;
        } else {
            eprintln!("warning: no QR code is available for this result");
        }
    }

    print_results(&results, &files, json)
}

fn print_results(results: &ResultsView, files: &[PathBuf], json: bool) -> Result<()> {
    if json {
        let output = GenerateOutput {
            heading: &results.heading,
            prompts: &results.cards,
            artifact: results.artifact.as_ref().map(ArtifactHandle::as_str),
            using_fallback: results.using_fallback,
            message: results.message.as_deref(),
            qr_available: results.qr_available,
            files: files.iter().map(|p| p.display().to_string()).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", results.heading);
    if results.using_fallback {
        println!("(service used its fallback prompt set)");
    }
    for (i, card) in results.cards.iter().enumerate() {
        println!();
        println!("{:>3}. [{}] {}", i + 1, card.severity, card.category);
        println!("     {}", card.text);
    }
    if let Some(artifact) = &results.artifact {
        println!();
        println!("Spreadsheet: {artifact}");
    }
    for file in files {
        println!("Saved: {}", file.display());
    }
    Ok(())
}

pub fn categories(json: bool) -> Result<()> {
    let labels: Vec<&str> = Category::ALL.iter().map(|c| c.label()).collect();
    if json {
        println!("{}", serde_json::to_string_pretty(&labels)?);
    } else {
        for label in labels {
            println!("{label}");
        }
    }
    Ok(())
}

pub async fn health(base_url: &str, json: bool, args: HealthArgs) -> Result<()> {
    let mut shell = Shell::new(Transport::new()?, ".");
    configure(&mut shell, args.timeouts.service_config(base_url)).await?;
    shell.dispatch(Event::HealthCheckRequested).await?;

    match shell.view().service_health {
        Some(HealthView::Online {
            status,
            healthy,
            generator_configured,
            api_key_present,
        }) => {
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "status": status,
                        "healthy": healthy,
                        "generator_configured": generator_configured,
                        "api_key_present": api_key_present,
                    }))?
                );
            } else {
                println!("status: {status}");
                println!("generator configured: {generator_configured}");
                println!("api key present: {api_key_present}");
            }
            if !healthy {
                bail!("service reported status '{status}'");
            }
            Ok(())
        }
        Some(HealthView::Offline { reason }) => bail!("service unreachable: {reason}"),
        Some(HealthView::Checking) | None => bail!("health check did not complete"),
    }
}

async fn configure(shell: &mut Shell, config: ServiceConfig) -> Result<()> {
    config
        .validate()
        .with_context(|| format!("invalid service configuration for '{}'", config.base_url))?;
    shell.dispatch(Event::Configure(config)).await
}

fn qr_file_name(mime_type: &str) -> String {
    let extension = match mime_type {
        "image/jpeg" => "jpg",
        "image/webp" => "webp",
        _ => "png",
    };
    format!("qr_code.{extension}")
}

/// Each category is toggled once, so a repeated flag never deselects it.
/// The first mention fixes the position.
fn unique_categories(categories: &[Category]) -> Vec<Category> {
    let mut unique = Vec::with_capacity(categories.len());
    for category in categories {
        if !unique.contains(category) {
            unique.push(*category);
        }
    }
    unique
}

async fn read_document(path: &Path) -> Result<Document> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .context("document path has no file name")?
        .to_string();
    let mime_type = mime_guess::from_path(path).first().map(|m| m.to_string());
    Ok(Document::new(file_name, mime_type, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_categories_keep_first_position() {
        let flags = [
            Category::Jailbreaking,
            Category::DataLeakage,
            Category::Jailbreaking,
            Category::DataLeakage,
            Category::LogicFlaws,
        ];
        assert_eq!(
            unique_categories(&flags),
            vec![Category::Jailbreaking, Category::DataLeakage, Category::LogicFlaws]
        );
        assert!(unique_categories(&[]).is_empty());
    }

    #[test]
    fn qr_file_extension_matches_image_type() {
        assert_eq!(qr_file_name("image/png"), "qr_code.png");
        assert_eq!(qr_file_name("image/jpeg"), "qr_code.jpg");
        assert_eq!(qr_file_name("image/webp"), "qr_code.webp");
    }
}
