// UI layer: an interactive menu built with `dialoguer`. Each entry is a small
// synchronous flow that calls the API, updates the local collection and
// prints the outcome.

use crate::api::CardApi;
use crate::collection::CardCollection;
use crate::error::ApiError;
use crate::models::CardCreate;
use crate::picker::FilePicker;
use crate::scanner::{ScanState, ScanWorkflow, SubmitOutcome};
use anyhow::Result;
use crossterm::style::Stylize;
use dialoguer::{Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const EMPTY_COLLECTION: &str = "No cards yet. Scan your first card to get started!";

/// Main interactive menu. Runs until the user picks "Exit".
pub fn main_menu<A: CardApi>(api: A, mut picker: Box<dyn FilePicker>) -> Result<()> {
    let mut collection = CardCollection::new();
    let mut scanner = ScanWorkflow::new();
    scanner.subscribe(spinner_observer());

    println!("{}", "Card Collection Tracker".bold());
    println!("Scan and manage your sports card collection\n");

    if let Err(e) = collection.refresh(&api) {
        println!("{}", format!("Could not load your collection: {e}").yellow());
    }

    loop {
        let scan_label = if scanner.can_trigger() {
            "Take photo / upload image"
        } else {
            "Scanning..."
        };
        let items = vec![
            scan_label,
            "Add a card manually",
            "View collection",
            "Show card details",
            "Check card price",
            "Refresh collection",
            "Exit",
        ];
        let selection = Select::new()
            .with_prompt("What would you like to do?")
            .items(&items)
            .default(0)
            .interact()?;
        match selection {
            0 => match scanner.trigger(&api, &mut collection, picker.as_mut()) {
                SubmitOutcome::NoFile => println!("No image selected."),
                SubmitOutcome::Busy => println!("A scan is already in progress."),
                SubmitOutcome::Scanned(_) | SubmitOutcome::Failed => print_message(scanner.message()),
            },
            1 => handle_create(&api, &mut collection)?,
            2 => print_collection(&collection),
            3 => handle_show(&api)?,
            4 => handle_price(&api)?,
            5 => match collection.refresh(&api) {
                Ok(count) => println!("Collection refreshed: {count} card(s)."),
                Err(e) => print_failure("Failed to load cards", &e),
            },
            6 => break,
            _ => {}
        }
    }
    Ok(())
}

/// Keeps an `indicatif` spinner running while the workflow is busy.
fn spinner_observer() -> impl FnMut(&ScanState) {
    let mut spinner: Option<ProgressBar> = None;
    move |state: &ScanState| {
        if state.busy {
            let bar = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
                bar.set_style(style);
            }
            bar.set_message("Scanning...");
            bar.enable_steady_tick(Duration::from_millis(100));
            spinner = Some(bar);
        } else if let Some(bar) = spinner.take() {
            bar.finish_and_clear();
        }
    }
}

/// Collect fields for a new card and create it on the backend.
fn handle_create<A: CardApi>(api: &A, collection: &mut CardCollection) -> Result<()> {
    let player_name: String = Input::new()
        .with_prompt("Player name")
        .validate_with(|input: &String| {
            if input.trim().is_empty() {
                Err("Player name is required")
            } else {
                Ok(())
            }
        })
        .interact_text()?;
    let year: String = Input::new()
        .with_prompt("Year (optional)")
        .allow_empty(true)
        .validate_with(|input: &String| {
            let input = input.trim();
            if input.is_empty() || input.parse::<i32>().is_ok() {
                Ok(())
            } else {
                Err("Year must be a number")
            }
        })
        .interact_text()?;
    let year = year.trim().parse::<i32>().ok();

    let card = CardCreate {
        player_name: player_name.trim().to_string(),
        year,
        brand: optional_input("Brand")?,
        card_number: optional_input("Card number")?,
        set_name: optional_input("Set name")?,
        sport: optional_input("Sport")?,
        condition: optional_input("Condition")?,
        notes: optional_input("Notes")?,
    };

    match collection.add(api, &card) {
        Ok(card) => println!("{}", format!("Added {card}").green()),
        Err(e) => print_failure("Failed to add card", &e),
    }
    Ok(())
}

fn handle_show<A: CardApi>(api: &A) -> Result<()> {
    let id = ask_card_id()?;
    match api.get_card(id) {
        Ok(card) => {
            println!("{card}");
            if let Some(sport) = &card.sport {
                println!("  Sport: {sport}");
            }
            if let Some(notes) = &card.notes {
                println!("  Notes: {notes}");
            }
            if let Some(image) = &card.image_url {
                println!("  Image: {image}");
            }
            println!("  Added: {}", card.created_at.format("%Y-%m-%d %H:%M"));
        }
        Err(e) => print_failure("Failed to load card", &e),
    }
    Ok(())
}

fn handle_price<A: CardApi>(api: &A) -> Result<()> {
    let id = ask_card_id()?;
    match api.get_card_price(id) {
        Ok(price) => println!("{price}"),
        Err(e) => print_failure("Failed to get card price", &e),
    }
    Ok(())
}

fn print_collection(collection: &CardCollection) {
    println!("{}", "Your Collection".bold());
    if collection.is_empty() {
        println!("{EMPTY_COLLECTION}");
        return;
    }
    for card in collection.cards() {
        println!("  {card}");
    }
}

fn ask_card_id() -> Result<i64> {
    let id: i64 = Input::new().with_prompt("Card id").interact_text()?;
    Ok(id)
}

/// Prompt for a value that may be left empty.
fn optional_input(prompt: &str) -> Result<Option<String>> {
    let value: String = Input::new()
        .with_prompt(format!("{prompt} (optional)"))
        .allow_empty(true)
        .interact_text()?;
    let value = value.trim();
    Ok((!value.is_empty()).then(|| value.to_string()))
}

fn print_message(message: &str) {
    if message.starts_with("Success") {
        println!("{}", message.green());
    } else if !message.is_empty() {
        println!("{}", message.red());
    }
}

fn print_failure(fallback: &str, error: &ApiError) {
    let reason = error.reason().unwrap_or_else(|| fallback.to_string());
    println!("{}", format!("Error: {reason}").red());
}
