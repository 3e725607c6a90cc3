use anyhow::{bail, Context, Result};
use clap::Subcommand;
use engine::{BillHistory, BillSheetParser, BillStore, CalculatorSession, EngineSettings};
use shared::utils::parse_members;
use shared::{BillForm, UtilityKind};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::info;

use crate::display;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the utilities a bill can include
    Utilities,
    /// Calculate a bill from a bill sheet
    Calculate {
        #[arg(
            long,
            help = "Bill sheet with Utility/Meter/Amount columns; repeated electric rows become Meter 1, Meter 2, ... in row order and the Meter column is not used for naming"
        )]
        sheet: PathBuf,
        #[arg(long, help = "Bill month as YYYY-MM (defaults to the current month)")]
        month: Option<String>,
        #[arg(long, help = "Name of the person calculating the bill")]
        made_by: Option<String>,
        #[arg(long, allow_hyphen_values = true, help = "Number of members sharing the bill")]
        members: Option<String>,
        #[arg(long, help = "Save the calculated bill")]
        save: bool,
    },
    /// Show the saved bill history
    List,
    /// Show one saved bill with its breakdown
    Show { id: String },
    /// Delete a saved bill (admin only)
    Delete {
        id: String,
        #[arg(long, help = "Admin PIN")]
        pin: String,
        #[arg(long, help = "Skip the confirmation prompt")]
        yes: bool,
    },
}

impl Commands {
    /// Whether the command reads or writes saved bills. An in-memory store
    /// does not outlive the process, so these need the bills API.
    pub fn uses_bills_api(&self) -> bool {
        match self {
            Commands::Utilities => false,
            Commands::Calculate { save, .. } => *save,
            Commands::List | Commands::Show { .. } | Commands::Delete { .. } => true,
        }
    }
}

pub async fn handle_command(command: Commands, settings: &EngineSettings, store: &dyn BillStore) -> Result<()> {
    match command {
        Commands::Utilities => {
            print!("{}", display::render_utilities(&UtilityKind::ALL));
            Ok(())
        }
        Commands::Calculate {
            sheet,
            month,
            made_by,
            members,
            save,
        } => {
            let mut form = BillForm::new(
                made_by.unwrap_or_else(|| settings.form.default_made_by.clone()),
                members.as_deref().map_or(settings.form.default_members, parse_members),
            );
            if let Some(month) = month {
                form.month = month;
            }
            BillSheetParser::load_into_form(&sheet, settings.sheet_delimiter()?, &mut form)
                .with_context(|| format!("Failed to load bill sheet '{}'", sheet.display()))?;
            if form.is_empty() {
                bail!("The bill sheet lists no utilities; add at least one before calculating");
            }

            let mut session = CalculatorSession::new(form);
            print!("{}", display::render_summary(session.calculate()));

            if save {
                let stored = session.save(store).await.context("Error saving bill")?;
                println!("Bill saved successfully! (id {})", stored.id.as_deref().unwrap_or("-"));
            }
            Ok(())
        }
        Commands::List => {
            let mut history = BillHistory::new(settings.admin.pin.clone());
            let bills = history
                .refresh(store)
                .await
                .context("Could not load bill history from the bills API")?;
            print!("{}", display::render_history(bills));
            Ok(())
        }
        Commands::Show { id } => {
            let mut history = BillHistory::new(settings.admin.pin.clone());
            history
                .refresh(store)
                .await
                .context("Could not load bill history from the bills API")?;
            match history.find(&id) {
                Some(bill) => {
                    print!("{}", display::render_bill(bill));
                    Ok(())
                }
                None => bail!("No bill with id '{}'", id),
            }
        }
        Commands::Delete { id, pin, yes } => {
            let session = settings.session();
            let mut history = BillHistory::new(settings.admin.pin.clone());
            history
                .refresh(store)
                .await
                .context("Could not load bill history from the bills API")?;
            let month = match history.find(&id) {
                Some(bill) => bill.month.clone(),
                None => bail!("No bill with id '{}'", id),
            };

            if !yes && !confirm(&format!(
                "Do you want to delete the bill for {}? This action cannot be undone. [y/N] ",
                month
            ))? {
                info!(id = %id, "Deletion cancelled");
                println!("Deletion cancelled.");
                return Ok(());
            }

            history
                .delete(store, &session, &id, &pin)
                .await
                .context("Error deleting bill")?;
            println!("Bill for {} has been deleted.", month);
            Ok(())
        }
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    let mut stdout = std::io::stdout();
    stdout.write_all(prompt.as_bytes())?;
    stdout.flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
