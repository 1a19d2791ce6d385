//! Simulate command implementation.

use super::output::format_text;
use super::{CliError, OutputFormat, SetupArgs};
use monopoly::Game;
use monopoly::game::{AgentId, GameResult};
use monopoly::presenter::{AutoPilot, Localizer, Message, TextTable};
use serde::Serialize;

/// JSON output: the result, plus the event log when requested.
#[derive(Debug, Serialize)]
struct JsonSimulation<'a> {
    result: &'a GameResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    events: Option<Vec<JsonEvent<'a>>>,
}

#[derive(Debug, Serialize)]
struct JsonEvent<'a> {
    agent: AgentId,
    #[serde(flatten)]
    message: &'a Message,
}

/// Execute the simulate command.
///
/// # Errors
///
/// Returns an error if the game cannot be set up or fails.
pub(crate) fn execute(
    setup: &SetupArgs,
    reserve: i64,
    events: bool,
    format: OutputFormat,
) -> Result<(), CliError> {
    let seed = setup.seed();
    let config = setup.config(seed)?;
    let mut game = Game::with_loader(config, &*setup.loader())?;

    let mut pilot = AutoPilot::new(reserve);
    if events {
        pilot = pilot.recording();
    }
    let result = game.run(&mut pilot)?;
    let log = pilot.take_messages();

    match format {
        OutputFormat::Text => {
            let table = TextTable::english()?;
            if events {
                for (agent, message) in &log {
                    println!("{}", table.render(*agent, message));
                }
                println!();
            }
            print!("{}", format_text(&result, &table));
        }
        OutputFormat::Json => {
            let events = events.then(|| {
                log.iter()
                    .map(|(agent, message)| JsonEvent {
                        agent: *agent,
                        message,
                    })
                    .collect()
            });
            let output = JsonSimulation {
                result: &result,
                events,
            };
            let json = serde_json::to_string_pretty(&output)?;
            println!("{json}");
        }
    }

    Ok(())
}
