//! Terminal rendering of the request state.

use colored::Colorize;

use crate::orchestrator::RequestState;
use crate::output::download_filename;

/// Render `state` as terminal text. `per_request` is how many images a
/// successful request yields and is only used by the idle placeholder.
#[must_use]
pub fn render(state: &RequestState, per_request: usize) -> String {
    match state {
        RequestState::Idle => {
            let noun = if per_request == 1 { "image" } else { "images" };
            format!("Your {per_request} generated {noun} will appear here.").dimmed().to_string()
        }
        RequestState::Loading { message } => {
            let message = if message.is_empty() { "Generating..." } else { message };
            format!("{} {}", "~".cyan(), message)
        }
        RequestState::Failure { message } => {
            format!("{}\n{}", "Oops! Something went wrong.".red().bold(), message.red())
        }
        RequestState::Success { request, images } => {
            let mut out = format!(
                "{} {}",
                format!("\"{}\"", request.prompt.trim()).bold(),
                format!("[{}]", request.aspect_ratio).dimmed()
            );
            for (i, image) in images.iter().enumerate() {
                out.push_str(&format!(
                    "\n  [{}] {:<15} {:>9}  {}  -> {}",
                    i + 1,
                    image.style.green(),
                    format_size(image.image.data.len()),
                    image.image.mime_type,
                    download_filename(&request.prompt, &image.style),
                ));
            }
            out
        }
    }
}

/// Startup banner.
#[must_use]
pub fn header() -> String {
    format!(
        "{}\n{}",
        "AI Image Generator".bold().cyan(),
        "Bring your ideas to life. Describe anything you can imagine.".dimmed()
    )
}

fn format_size(bytes: usize) -> String {
    let size = u32::try_from(bytes).map_or(f64::from(u32::MAX), f64::from);
    if bytes >= 1024 * 1024 {
        format!("{:.1} MiB", size / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1} KiB", size / 1024.0)
    } else {
        format!("{bytes} B")
    }
}
