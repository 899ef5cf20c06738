//! Menu-driven session: pick an action by number, answer the prompts, see
//! the result as a table. Entering 0 at any scenario id prompt returns to
//! the menu.

use std::error::Error;
use std::fmt::Display;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use mortgage_calc_core::amortization::MAX_TERM_YEARS;
use mortgage_calc_core::types::ScenarioId;
use mortgage_calc_core::MortgageError;

use crate::output::table::render_table;
use crate::session::Session;

const BANNER: &str = r"
  __  __            _
 |  \/  | ___  _ __| |_ __ _  __ _  __ _  ___
 | |\/| |/ _ \| '__| __/ _` |/ _` |/ _` |/ _ \
 | |  | | (_) | |  | || (_| | (_| | (_| |  __/
 |_|  |_|\___/|_|   \__\__, |\__,_|\__, |\___|
                       |___/       |___/
        Mortgage Comparison Tool
";

/// Every action the menu can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    AddMortgage,
    ListMortgages,
    ShowMortgage,
    Schedule,
    YearlyBreakdown,
    LumpSum,
    MonthlyOverpayment,
    Compare,
    RemoveMortgage,
    Save,
    Load,
    Quit,
}

/// Menu key, command, label. Display order is table order.
const MENU: &[(&str, MenuCommand, &str)] = &[
    ("1", MenuCommand::AddMortgage, "Add a mortgage"),
    ("2", MenuCommand::ListMortgages, "List and compare mortgages"),
    ("3", MenuCommand::ShowMortgage, "Show one mortgage"),
    ("4", MenuCommand::Schedule, "Amortisation schedule"),
    ("5", MenuCommand::YearlyBreakdown, "Interest and principal by year"),
    ("6", MenuCommand::LumpSum, "Lump-sum overpayment"),
    ("7", MenuCommand::MonthlyOverpayment, "Monthly overpayment"),
    ("8", MenuCommand::Compare, "Difference between two mortgages"),
    ("9", MenuCommand::RemoveMortgage, "Remove a mortgage"),
    ("s", MenuCommand::Save, "Save mortgages"),
    ("l", MenuCommand::Load, "Load saved mortgages"),
    ("q", MenuCommand::Quit, "Quit"),
];

/// Resolve a menu selection.
pub fn lookup(choice: &str) -> Option<MenuCommand> {
    let choice = choice.trim();
    MENU.iter()
        .find(|(key, _, _)| key.eq_ignore_ascii_case(choice))
        .map(|(_, command, _)| *command)
}

/// Run the menu on the process's stdin and stdout.
pub fn run_interactive(session: &mut Session) -> Result<(), Box<dyn Error>> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut prompt = Prompt::new(stdin.lock(), stdout.lock());
    run_menu(session, &mut prompt)
}

/// Menu loop. Core errors are shown and the loop continues; I/O errors
/// (including closed input) end it.
pub fn run_menu<R: BufRead, W: Write>(
    session: &mut Session,
    prompt: &mut Prompt<R, W>,
) -> Result<(), Box<dyn Error>> {
    prompt.say(BANNER)?;

    loop {
        prompt.say("")?;
        for (key, _, label) in MENU {
            prompt.say(&format!("  {key}) {label}"))?;
        }

        let choice = match prompt.ask("Select an option: ") {
            Ok(choice) => choice,
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e.into()),
        };

        let Some(command) = lookup(&choice) else {
            prompt.say("That is not a valid option.")?;
            continue;
        };
        if command == MenuCommand::Quit {
            break;
        }

        match execute(command, session, prompt) {
            Ok(()) => {}
            Err(e) if e.downcast_ref::<MortgageError>().is_some() => {
                prompt.say(&format!("error: {e}"))?;
            }
            Err(e) if is_closed_input(e.as_ref()) => break,
            Err(e) => return Err(e),
        }
    }

    if session.is_dirty() {
        prompt.say("Unsaved changes were discarded. Use 's' to save before quitting.")?;
    }
    prompt.say("Goodbye.")?;
    Ok(())
}

fn execute<R: BufRead, W: Write>(
    command: MenuCommand,
    session: &mut Session,
    prompt: &mut Prompt<R, W>,
) -> Result<(), Box<dyn Error>> {
    match command {
        MenuCommand::AddMortgage => {
            let principal: Decimal = prompt.read("Enter the principal or loan amount: ", |p: &Decimal| {
                positive(p, "Please enter a number greater than 0.")
            })?;
            let apr: Decimal = prompt.read("Enter the Annual Percentage Rate (eg. 4.3): ", |r: &Decimal| {
                if *r > Decimal::ZERO && *r < Decimal::ONE_HUNDRED {
                    Ok(())
                } else {
                    Err("Please enter a percentage between 0 and 100.".into())
                }
            })?;
            let term: u32 = prompt.read("Enter the length of the mortgage in years (eg 30): ", |t: &u32| {
                if (1..=MAX_TERM_YEARS).contains(t) {
                    Ok(())
                } else {
                    Err(format!("Please enter a whole number from 1 to {MAX_TERM_YEARS}."))
                }
            })?;

            let id = session.calculator_mut().create_scenario(principal, apr, term)?;
            let scenario = session.calculator().get_scenario(id)?;
            prompt.say(&scenario.details())?;
            prompt.show(&scenario.summary_row())?;
        }
        MenuCommand::ListMortgages => {
            prompt.show(&session.calculator().compute_summary_table())?;
        }
        MenuCommand::ShowMortgage => {
            if let Some(id) = prompt.read_scenario_id(session, "Mortgage id (0 for menu): ")? {
                let scenario = session.calculator().get_scenario(id)?;
                prompt.say(&scenario.details())?;
                prompt.show(&scenario.summary_row())?;
            }
        }
        MenuCommand::Schedule => {
            if let Some(id) = prompt.read_scenario_id(session, "Mortgage id (0 for menu): ")? {
                prompt.show(&session.calculator().schedule_report(id, None)?)?;
            }
        }
        MenuCommand::YearlyBreakdown => {
            if let Some(id) = prompt.read_scenario_id(session, "Mortgage id (0 for menu): ")? {
                let year: u32 = prompt.read("Loan year (0 for every year): ", |_: &u32| Ok(()))?;
                let mut years = session.calculator().yearly_breakdown(id, None)?;
                if year > 0 {
                    years.retain(|y| y.loan_year == year);
                }
                prompt.show(&years)?;
            }
        }
        MenuCommand::LumpSum => {
            if let Some(id) = prompt.read_scenario_id(session, "Mortgage id (0 for menu): ")? {
                let principal = session.calculator().get_scenario(id)?.principal();
                let amount: Decimal = prompt.read("Lump sum to pay off the principal: ", |a: &Decimal| {
                    if *a >= Decimal::ZERO && *a < principal {
                        Ok(())
                    } else {
                        Err(format!("Please enter an amount from 0 up to (not including) {principal}."))
                    }
                })?;
                let projection = session.calculator_mut().project_lump_sum(id, amount)?;
                prompt.show(&projection)?;
            }
        }
        MenuCommand::MonthlyOverpayment => {
            if let Some(id) = prompt.read_scenario_id(session, "Mortgage id (0 for menu): ")? {
                let extra: Decimal = prompt.read("Extra principal per month: ", |e: &Decimal| {
                    if *e >= Decimal::ZERO {
                        Ok(())
                    } else {
                        Err("Please enter an amount of 0 or more.".into())
                    }
                })?;
                let projection = session.calculator().apply_monthly_overpayment(id, extra)?;
                let mut value = serde_json::to_value(projection)?;
                if let Some(Value::Object(result)) = value.get_mut("result") {
                    result.remove("schedule");
                }
                prompt.show(&value)?;
            }
        }
        MenuCommand::Compare => {
            let Some(base) = prompt.read_scenario_id(session, "First mortgage id (0 for menu): ")? else {
                return Ok(());
            };
            let Some(other) = prompt.read_scenario_id(session, "Second mortgage id (0 for menu): ")? else {
                return Ok(());
            };
            prompt.show(&session.calculator().compare_scenarios(base, other)?)?;
        }
        MenuCommand::RemoveMortgage => {
            if let Some(id) = prompt.read_scenario_id(session, "Mortgage id to remove (0 for menu): ")? {
                session.calculator_mut().remove_scenario(id)?;
                prompt.say(&format!("Mortgage {id} removed."))?;
            }
        }
        MenuCommand::Save => {
            session.save()?;
            prompt.say("Mortgages saved.")?;
        }
        MenuCommand::Load => {
            let count = session.reload()?;
            prompt.say(&format!("Loaded {count} mortgages."))?;
        }
        MenuCommand::Quit => {}
    }
    Ok(())
}

fn is_closed_input(e: &(dyn Error + 'static)) -> bool {
    e.downcast_ref::<io::Error>()
        .is_some_and(|io_err| io_err.kind() == io::ErrorKind::UnexpectedEof)
}

fn positive(value: &Decimal, message: &str) -> Result<(), String> {
    if *value > Decimal::ZERO {
        Ok(())
    } else {
        Err(message.into())
    }
}

/// Line-oriented prompting over any reader/writer pair.
pub struct Prompt<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Prompt { reader, writer }
    }

    pub fn say(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.writer, "{text}")
    }

    /// Render any serialisable value as tables.
    pub fn show<T: Serialize>(&mut self, value: &T) -> io::Result<()> {
        let value = serde_json::to_value(value).map_err(io::Error::other)?;
        write!(self.writer, "{}", render_table(&value))
    }

    /// One trimmed line of input. Closed input is `UnexpectedEof`.
    pub fn ask(&mut self, label: &str) -> io::Result<String> {
        write!(self.writer, "{label}")?;
        self.writer.flush()?;
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
        }
        Ok(line.trim().to_string())
    }

    /// Ask until the answer parses and passes `check`.
    pub fn read<T>(&mut self, label: &str, check: impl Fn(&T) -> Result<(), String>) -> io::Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        loop {
            let answer = self.ask(label)?;
            match answer.parse::<T>() {
                Ok(value) => match check(&value) {
                    Ok(()) => return Ok(value),
                    Err(message) => self.say(&message)?,
                },
                Err(_) => self.say("That is not a valid number. Please try again.")?,
            }
        }
    }

    /// Ask for a registered scenario id; `None` when the user enters 0.
    pub fn read_scenario_id(&mut self, session: &Session, label: &str) -> io::Result<Option<ScenarioId>> {
        loop {
            let id: ScenarioId = self.read(label, |_: &ScenarioId| Ok(()))?;
            if id == 0 {
                return Ok(None);
            }
            if session.calculator().registry().contains(id) {
                return Ok(Some(id));
            }
            self.say(&format!("There is no mortgage {id}."))?;
        }
    }
}
