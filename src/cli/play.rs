//! Play command implementation - interactive terminal game.
//!
//! Every seat is played from the same terminal: choices are numbered menus
//! read line by line from stdin.

use super::output::format_text;
use super::{CliError, SetupArgs};
use crossterm::{
    cursor::MoveToColumn,
    execute, queue,
    style::{Print, Stylize},
    terminal::{Clear, ClearType},
};
use monopoly::dice::EnsembleSample;
use monopoly::game::{ActionKind, AgentId};
use monopoly::presenter::{Localizer, Message, Question, TextTable};
use monopoly::{Game, Presenter};
use std::io::{self, BufRead, Stdout, Write, stdout};
use std::thread;
use std::time::Duration;

/// Execute the play command.
///
/// # Errors
///
/// Returns an error if the game cannot be set up or fails.
pub(crate) fn execute(setup: &SetupArgs, roll_ms: u64) -> Result<(), CliError> {
    let seed = setup.seed();
    let config = setup.config(seed)?;
    let mut game = Game::with_loader(config, &*setup.loader())?;
    game.set_roll_time(Duration::from_millis(roll_ms));

    let mut terminal = Terminal::new(TextTable::english()?);
    terminal.line(format!("Seed {seed}. Every seat is played from this terminal.").bold());
    let result = game.run(&mut terminal)?;

    println!();
    print!("{}", format_text(&result, &terminal.table));
    Ok(())
}

/// Terminal presenter: styled output on stdout, numbered menus on stdin.
struct Terminal {
    table: TextTable,
    out: Stdout,
    faces: Vec<u8>,
}

impl Terminal {
    fn new(table: TextTable) -> Self {
        Self {
            table,
            out: stdout(),
            faces: Vec::new(),
        }
    }

    fn line(&mut self, text: impl std::fmt::Display) {
        let _ = execute!(self.out, Print(text), Print("\n"));
    }

    /// Read a number in `min..=max`, asking again until one is given.
    /// `None` once stdin is closed.
    fn read_number(&mut self, min: usize, max: usize) -> Option<usize> {
        let stdin = io::stdin();
        loop {
            let _ = execute!(self.out, Print(format!("[{min}-{max}] > ").dark_grey()));
            let mut input = String::new();
            match stdin.lock().read_line(&mut input) {
                Ok(0) | Err(_) => return None,
                Ok(_) => {}
            }
            match input.trim().parse::<usize>() {
                Ok(n) if (min..=max).contains(&n) => return Some(n),
                _ => self.line("Please enter a number in range.".yellow()),
            }
        }
    }

    fn label(kind: ActionKind) -> &'static str {
        match kind {
            ActionKind::Roll => "Roll the dice",
            ActionKind::RollFromJail => "Try to roll a double",
            ActionKind::PayBail => "Pay bail",
            ActionKind::UseJailCard => "Use a get out of jail card",
            ActionKind::Buy => "Buy this property",
            ActionKind::Mortgage => "Mortgage a property",
            ActionKind::LiftMortgage => "Lift a mortgage",
            ActionKind::Build => "Build a house or hotel",
            ActionKind::Finish => "End turn",
        }
    }
}

impl Presenter for Terminal {
    fn announce(&mut self, _game: &Game, agent: AgentId, message: &Message) {
        let text = self.table.render(agent, message);
        match message {
            Message::TurnStarted { .. } => {
                self.line("");
                self.line(text.bold().cyan());
            }
            Message::Bankrupt { .. } | Message::WentToJail { .. } => self.line(text.red()),
            Message::Bought { .. } | Message::Salary { .. } | Message::Built { .. } => {
                self.line(text.green());
            }
            Message::Refused { .. } => self.line(text.yellow()),
            Message::GameOver { .. } => self.line(text.bold().magenta()),
            _ => self.line(text),
        }
    }

    fn present_choice(&mut self, _game: &Game, _agent: AgentId, options: &[ActionKind]) -> usize {
        for (i, kind) in options.iter().enumerate() {
            self.line(format!("  {}) {}", i + 1, Self::label(*kind)));
        }
        // A closed stdin takes the last option, which ends the turn once
        // that is possible.
        self.read_number(1, options.len())
            .map_or(options.len().saturating_sub(1), |n| n - 1)
    }

    fn present_number_choice(
        &mut self,
        _game: &Game,
        _agent: AgentId,
        min: usize,
        max: usize,
    ) -> usize {
        self.read_number(min, max).unwrap_or(min)
    }

    fn confirm(&mut self, _game: &Game, _agent: AgentId, question: &Question) -> bool {
        let prompt = match question {
            Question::Buy { position, price } => {
                format!("Buy {} for M{price}? [y/n] ", self.table.space_name(*position))
            }
        };
        let _ = execute!(self.out, Print(prompt));
        let mut input = String::new();
        if io::stdin().lock().read_line(&mut input).is_err() {
            return false;
        }
        matches!(input.trim(), "y" | "Y" | "yes")
    }

    fn choose_space(
        &mut self,
        game: &Game,
        agent: AgentId,
        action: ActionKind,
        candidates: &[usize],
    ) -> Option<usize> {
        self.line("  0) Cancel");
        for (i, position) in candidates.iter().enumerate() {
            let cost = game
                .action_cost(action, *position)
                .map(|c| if c < 0 { format!(" (+M{})", -c) } else { format!(" (M{c})") })
                .unwrap_or_default();
            self.line(format!("  {}) {}{cost}", i + 1, self.table.space_name(*position)));
        }
        self.present_number_choice(game, agent, 0, candidates.len())
            .checked_sub(1)
    }

    fn refresh(&mut self, game: &Game, agent: AgentId) {
        let Some(a) = game.agent(agent) else {
            return;
        };
        let holdings: Vec<String> = a
            .holdings
            .iter()
            .map(|p| {
                let name = self.table.space_name(*p);
                let mortgaged = game.board().space(*p).deed().is_some_and(|d| d.mortgaged);
                if mortgaged { format!("{name} (mortgaged)") } else { name }
            })
            .collect();
        let status = format!(
            "{} | M{} | on {}{}",
            self.table.agent_name(agent),
            a.funds,
            self.table.space_name(a.position),
            if a.in_jail { " (in jail)" } else { "" }
        );
        self.line(status.dark_cyan());
        if !holdings.is_empty() {
            self.line(format!("  owns: {}", holdings.join(", ")).dark_grey());
        }
    }

    fn animate_dice(&mut self, samples: &[EnsembleSample]) {
        for sample in samples {
            if self.faces.len() <= sample.die {
                self.faces.resize(sample.die + 1, 1);
            }
            self.faces[sample.die] = sample.value;
            let faces: Vec<String> = self.faces.iter().map(|f| format!("[{f}]")).collect();
            let _ = queue!(
                self.out,
                MoveToColumn(0),
                Clear(ClearType::CurrentLine),
                Print(format!("  {}", faces.join(" ")).bold())
            );
            let _ = self.out.flush();
            thread::sleep(sample.pause);
        }
        if !samples.is_empty() {
            let _ = execute!(self.out, Print("\n"));
        }
    }
}
