//! Interactive conversation loop.

use std::sync::Arc;
use std::time::Duration;

use console::style;
use crime_advice_cli_utils::{LoadingSpinner, MultiProgress};
use crime_advice_conversation::{AdviceClient, ConversationWidget, SubmitError, WidgetState};
use crime_advice_map::{MapFocus, PoliceAreas, Viewport};
use dialoguer::Input;

/// Drives a [`ConversationWidget`] from terminal input until the user
/// types `quit` or `exit`.
///
/// # Errors
///
/// Returns an error if reading from the terminal fails.
pub async fn run(
    multi: &MultiProgress,
    client: Arc<dyn AdviceClient>,
    delay: Duration,
    areas: Option<&PoliceAreas>,
) -> Result<(), Box<dyn std::error::Error>> {
    let focus = MapFocus::default();
    let mut view = focus.subscribe();
    let mut widget = ConversationWidget::new(client, focus).with_delay(delay);

    println!("{}", style("Crime Advice").bold());
    println!("{}", style("Type 'quit' to leave.").dim());
    println!();
    print_lines(&widget);
    print_view(view.viewport(), areas);

    loop {
        let input: String = Input::new()
            .with_prompt(widget.placeholder())
            .allow_empty(true)
            .interact_text()?;

        if matches!(input.trim(), "quit" | "exit") {
            break;
        }

        widget.set_input(input)?;

        let spinner = (!widget.is_awaiting_city())
            .then(|| LoadingSpinner::start(multi, "Fetching security advice..."));
        let outcome = widget.submit().await;
        drop(spinner);

        match outcome {
            Ok(_) => {}
            Err(SubmitError::EmptyInput) => {
                println!("{}", style("Please enter a value.").dim());
                continue;
            }
            Err(e) => return Err(e.into()),
        }

        println!();
        print_lines(&widget);
        if view.sync() {
            print_view(view.viewport(), areas);
        }
        println!();
    }

    Ok(())
}

fn print_lines(widget: &ConversationWidget) {
    let failed = matches!(widget.state(), WidgetState::Failed { .. });
    for line in widget.lines() {
        if failed {
            println!("{}", style(line).red());
        } else {
            println!("{}", style(line).cyan());
        }
    }
}

fn print_view(viewport: Viewport, areas: Option<&PoliceAreas>) {
    let region = areas
        .and_then(|areas| areas.region_at(viewport.center))
        .unwrap_or("unknown region");
    println!(
        "{}",
        style(format!(
            "Map centred on {} at zoom {} ({region})",
            viewport.center, viewport.zoom
        ))
        .dim()
    );
}
