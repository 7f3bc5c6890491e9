use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use client_core::{
    config::{load_settings, parse_server_address},
    AnnotatorClient, CategoryStore, TracingAlertSink,
};
use shared::domain::AnnotationId;

#[derive(Parser, Debug)]
struct Cli {
    /// Base address of the annotator API, e.g. http://localhost:8000/api.
    /// Falls back to annotator.toml / environment configuration.
    #[arg(long)]
    server_address: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List categories and the annotations assigned to each.
    Categories,
    AddCategory {
        label: String,
    },
    RenameCategory {
        label: String,
        new_label: String,
    },
    DeleteCategory {
        label: String,
    },
    /// Assign an annotation (looked up by id in the transcript's annotation
    /// file) to a category.
    Assign {
        label: String,
        transcript: String,
        annotation_id: i64,
    },
    /// Remove an annotation from a category.
    Unassign {
        label: String,
        transcript: String,
        annotation_id: i64,
    },
    /// List transcript files known to the server.
    Transcripts,
    /// Show the annotation document for a transcript.
    Annotations {
        transcript: String,
    },
}

async fn print_categories(store: &CategoryStore) {
    for category in store.categories().await {
        println!(
            "{} ({} annotations)",
            category.label,
            category.annotations.len()
        );
        for assignment in &category.annotations {
            println!(
                "  {} #{}",
                assignment.transcript_file, assignment.annotation_id.0
            );
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let cli = Cli::parse();
    let address = match cli.server_address {
        Some(address) => address,
        None => load_settings().server_address,
    };
    let base_url = parse_server_address(&address)?;

    let store = CategoryStore::new(base_url.clone(), Arc::new(TracingAlertSink))?;
    let api = AnnotatorClient::new(base_url)?;

    match cli.command {
        Command::Categories => {
            store.fetch_all().await;
            print_categories(&store).await;
        }
        Command::AddCategory { label } => {
            store.add(&label).await;
            print_categories(&store).await;
        }
        Command::RenameCategory { label, new_label } => {
            store.fetch_all().await;
            store.rename(&label, &new_label).await;
            print_categories(&store).await;
        }
        Command::DeleteCategory { label } => {
            store.fetch_all().await;
            store.delete(&label).await;
            print_categories(&store).await;
        }
        Command::Assign {
            label,
            transcript,
            annotation_id,
        } => {
            store.fetch_all().await;
            let file = api.annotations(&transcript).await?;
            let annotation = file
                .annotations
                .iter()
                .find(|a| a.id == AnnotationId(annotation_id))
                .ok_or_else(|| anyhow!("annotation {annotation_id} not found in {transcript}"))?;
            store.assign_annotation(&label, &transcript, annotation).await;
            print_categories(&store).await;
        }
        Command::Unassign {
            label,
            transcript,
            annotation_id,
        } => {
            store.fetch_all().await;
            store
                .unassign_annotation(&label, &transcript, AnnotationId(annotation_id))
                .await;
            print_categories(&store).await;
        }
        Command::Transcripts => {
            for transcript in api.list_transcripts().await? {
                println!("{} ({} bytes)", transcript.filename, transcript.size);
            }
        }
        Command::Annotations { transcript } => {
            let file = api.annotations(&transcript).await?;
            println!(
                "{}: {} annotations (last modified {})",
                file.transcript_file,
                file.annotations.len(),
                file.last_modified.as_deref().unwrap_or("never")
            );
            for annotation in &file.annotations {
                println!(
                    "  #{} {} [{} messages]",
                    annotation.id.0,
                    annotation.label,
                    annotation.message_indices.len()
                );
            }
        }
    }

    Ok(())
}
