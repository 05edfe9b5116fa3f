//! imagen-studio - interactive AI image generator.

mod adapters;
mod cassette;
mod cli;
mod client;
mod config;
mod context;
mod display;
mod error;
mod loading;
mod model;
mod orchestrator;
mod output;
mod params;
mod ports;
mod prompt;
mod session;
mod styles;
mod suggest;

use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::client::GenerationClient;
use crate::config::Config;
use crate::context::ServiceContext;
use crate::error::ImageError;
use crate::loading::LoadingIndicator;
use crate::model::resolve_model;
use crate::orchestrator::{Orchestrator, Rejection, RequestState, Submission};
use crate::output::download;
use crate::params::AspectRatio;
use crate::prompt::PromptStore;
use crate::session::Session;
use crate::suggest::ExampleSuggester;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(true) => {}
        // The failure has already been rendered.
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

/// Returns `Ok(false)` when a generation failed and its error panel was shown.
async fn run(cli: Cli) -> Result<bool, ImageError> {
    let config_path = config::discover_config_path(cli.config.as_deref());
    let config = Config::load(&config_path)?;

    let suggester = ExampleSuggester::default();
    let prompt = if cli.surprise {
        suggester.pick_random().map(str::to_string)
    } else {
        cli.resolve_prompt()?
    };

    let model_name = cli.model.as_deref().unwrap_or(&config.defaults.model);
    let model = resolve_model(model_name)?;
    let aspect_ratio = cli.aspect_ratio.unwrap_or(config.defaults.aspect_ratio);
    let variant = cli.variant.unwrap_or(config.defaults.variant);
    let output_dir =
        cli.output_dir.as_ref().map_or_else(|| config.defaults.output_dir.clone(), PathBuf::from);
    tracing::debug!(
        model = %model.id,
        provider = ?model.provider,
        ratio = %aspect_ratio,
        ?variant,
        "resolved settings"
    );

    let (ctx, recording) = ServiceContext::from_env(model.provider, &config)?;
    let client = GenerationClient::new(ctx.generator, model.id, variant.presets());
    let indicator = LoadingIndicator::new(config.loading.phrases.clone(), config.loading.period());
    let orchestrator = Arc::new(Orchestrator::new(client, indicator));

    let result = match prompt {
        Some(prompt) => generate_once(&orchestrator, &prompt, aspect_ratio, &output_dir).await,
        None => {
            let session = Session::new(
                Arc::clone(&orchestrator),
                PromptStore::new(aspect_ratio),
                suggester,
                output_dir,
            );
            session.run(tokio::io::BufReader::new(tokio::io::stdin())).await.map(|()| true)
        }
    };

    // The recorder is shared with the generator inside the orchestrator.
    drop(orchestrator);
    if let Some(recording) = recording {
        match recording.finish() {
            Ok(path) => eprintln!("Cassette saved: {}", path.display()),
            Err(e) => eprintln!("Warning: failed to save cassette: {e}"),
        }
    }

    result
}

/// Submit `prompt` once, print the outcome and save every image.
///
/// Returns whether the generation succeeded.
async fn generate_once(
    orchestrator: &Orchestrator,
    prompt: &str,
    aspect_ratio: AspectRatio,
    output_dir: &Path,
) -> Result<bool, ImageError> {
    let per_request = orchestrator.images_per_request();
    eprintln!("Generating {per_request} image(s) for \"{}\" [{aspect_ratio}]", prompt.trim());

    let mut states = orchestrator.subscribe();
    let submission = orchestrator.submit(prompt, aspect_ratio);
    tokio::pin!(submission);
    let submission = loop {
        tokio::select! {
            done = &mut submission => break done,
            Ok(()) = states.changed() => {
                if let RequestState::Loading { message } = &*states.borrow_and_update() {
                    if !message.is_empty() {
                        eprintln!("{message}");
                    }
                }
            }
        }
    };

    match submission {
        Submission::Rejected(Rejection::EmptyPrompt) => {
            Err(ImageError::InvalidArgument("Prompt is empty".into()))
        }
        Submission::Rejected(Rejection::Busy) => {
            Err(ImageError::InvalidArgument("A generation is already in progress".into()))
        }
        Submission::Completed(state) => {
            println!("{}", display::render(&state, per_request));
            match state {
                RequestState::Success { request, images } => {
                    for image in &images {
                        let path = download(image, &request.prompt, output_dir)?;
                        eprintln!("Saved: {}", path.display());
                    }
                    Ok(true)
                }
                RequestState::Failure { .. } | RequestState::Idle | RequestState::Loading { .. } => {
                    Ok(false)
                }
            }
        }
    }
}
