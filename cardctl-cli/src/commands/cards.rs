//! Card commands
//!
//! Commands: add, find, show, search, incr, decr

use anyhow::{anyhow, Context};
use cardctl_store::{Card, CardId, CardIdentity, CardStore, NewCard};
use clap::Parser;
use tracing::info;

use crate::error::AppError;

// === Arg Structs ===

#[derive(Parser, Debug)]
pub struct AddArgs {
    /// Card name, exactly as printed
    name: String,

    /// Foil printing
    #[arg(long)]
    foil: bool,

    /// Proxy rather than an original printing
    #[arg(long)]
    proxy: bool,

    /// Format the card is played in (repeatable or comma-separated)
    #[arg(long = "format", value_name = "FORMAT", value_delimiter = ',')]
    formats: Vec<String>,

    /// Edition or set the card comes from
    #[arg(long)]
    edition: String,

    /// Number of copies held
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    quantity: i32,

    /// Add the copies to an existing card with the same name, foil and proxy flags
    #[arg(long)]
    merge: bool,
}

#[derive(Parser, Debug)]
pub struct FindArgs {
    /// Card name, exactly as printed
    name: String,

    /// Match foil printings
    #[arg(long)]
    foil: bool,

    /// Match proxies
    #[arg(long)]
    proxy: bool,
}

#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Card ID
    id: i32,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
pub struct SearchArgs {
    /// Card name, exactly as printed
    name: String,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
pub struct AdjustArgs {
    /// Card ID
    id: i32,

    /// Number of copies
    #[arg(value_parser = clap::value_parser!(u32).range(1..=i64::from(i32::MAX)))]
    quantity: u32,
}

// === Validated requests ===

/// A card command whose arguments have been checked; no database needed yet
#[derive(Debug)]
pub enum CardCommand {
    Add { card: NewCard, merge: bool },
    Find(CardIdentity),
    Show { id: CardId, json: bool },
    Search { name: String, json: bool },
    Incr { id: CardId, quantity: u32 },
    Decr { id: CardId, quantity: u32 },
}

impl AddArgs {
    pub fn validate(self) -> Result<CardCommand, AppError> {
        let card = NewCard::new(
            &self.name,
            self.foil,
            self.proxy,
            self.formats,
            &self.edition,
            self.quantity,
        )
        .map_err(AppError::input)?;
        Ok(CardCommand::Add {
            card,
            merge: self.merge,
        })
    }
}

impl FindArgs {
    pub fn validate(self) -> Result<CardCommand, AppError> {
        CardIdentity::new(&self.name, self.foil, self.proxy)
            .map(CardCommand::Find)
            .map_err(AppError::input)
    }
}

impl ShowArgs {
    pub fn validate(self) -> CardCommand {
        CardCommand::Show {
            id: CardId::new(self.id),
            json: self.json,
        }
    }
}

impl SearchArgs {
    pub fn validate(self) -> CardCommand {
        CardCommand::Search {
            name: self.name,
            json: self.json,
        }
    }
}

impl AdjustArgs {
    pub fn increment(self) -> CardCommand {
        CardCommand::Incr {
            id: CardId::new(self.id),
            quantity: self.quantity,
        }
    }

    pub fn decrement(self) -> CardCommand {
        CardCommand::Decr {
            id: CardId::new(self.id),
            quantity: self.quantity,
        }
    }
}

// === Execution ===

pub async fn run_card_command(store: &CardStore, command: CardCommand) -> Result<(), AppError> {
    match command {
        CardCommand::Add { card, merge } => {
            if merge {
                if let Some(id) = store.find_id(card.identity()).await? {
                    let total = store.adjust_total(id, card.quantity()).await?;
                    info!(%id, total, "merged into existing card");
                    println!("{}", id);
                    return Ok(());
                }
            }
            let id = store.insert(&card).await?;
            info!(%id, name = %card.name(), "card added");
            println!("{}", id);
        }
        CardCommand::Find(identity) => match store.find_id(&identity).await? {
            Some(id) => println!("{}", id),
            None => return Err(AppError::missing(anyhow!("no such card"))),
        },
        CardCommand::Show { id, json } => {
            let card = store.get_by_id(id).await?;
            if json {
                println!("{}", to_json(&card)?);
            } else {
                print!("{}", render_card(&card));
            }
        }
        CardCommand::Search { name, json } => {
            let cards = store.get_by_name(&name).await?;
            if json {
                println!("{}", to_json(&cards)?);
            } else if cards.is_empty() {
                println!("No cards named {:?}", name);
            } else {
                print!("{}", render_table(&cards));
            }
        }
        CardCommand::Incr { id, quantity } => {
            let total = store.add_total(id, quantity).await?;
            info!(%id, quantity, total, "total increased");
            println!("{}", total);
        }
        CardCommand::Decr { id, quantity } => {
            let total = store.sub_total(id, quantity).await?;
            info!(%id, quantity, total, "total decreased");
            println!("{}", total);
        }
    }
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value)
        .context("Failed to serialize cards")
        .map_err(AppError::input)
}

// === Rendering ===

const HEADERS: [&str; 7] = ["ID", "NAME", "FOIL", "PROXY", "FORMATS", "EDITION", "TOTAL"];

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn formats_cell(formats: &[String]) -> String {
    if formats.is_empty() {
        "-".to_string()
    } else {
        formats.join(", ")
    }
}

fn row(card: &Card) -> [String; 7] {
    [
        card.id.to_string(),
        card.name.clone(),
        yes_no(card.is_foil).to_string(),
        yes_no(card.is_proxy).to_string(),
        formats_cell(&card.formats),
        card.edition.clone(),
        card.total_quantity.to_string(),
    ]
}

fn push_line<S: AsRef<str>>(out: &mut String, cells: &[S], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell.as_ref(), width = *width))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}

/// Column-aligned table, one line per card after the header
pub fn render_table(cards: &[Card]) -> String {
    let rows: Vec<[String; 7]> = cards.iter().map(row).collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, &HEADERS, &widths);
    for row in &rows {
        push_line(&mut out, row, &widths);
    }
    out
}

/// One card as `label: value` lines
pub fn render_card(card: &Card) -> String {
    format!(
        "id:       {}\nname:     {}\nfoil:     {}\nproxy:    {}\nformats:  {}\nedition:  {}\ntotal:    {}\n",
        card.id,
        card.name,
        yes_no(card.is_foil),
        yes_no(card.is_proxy),
        formats_cell(&card.formats),
        card.edition,
        card.total_quantity,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(id: i32, name: &str, formats: &[&str], total: i32) -> Card {
        Card {
            id: CardId::new(id),
            name: name.to_string(),
            is_foil: id % 2 == 0,
            is_proxy: false,
            formats: formats.iter().map(|f| f.to_string()).collect(),
            edition: "2024".to_string(),
            total_quantity: total,
        }
    }

    #[test]
    fn table_aligns_columns() {
        let table = render_table(&[
            card(1, "Bolt", &["Modern"], 5),
            card(12, "Bolt", &["Modern", "Legacy"], 120),
        ]);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("ID  NAME  FOIL  PROXY"));
        assert!(lines[1].starts_with("1   Bolt  no    no"));
        assert!(lines[2].starts_with("12  Bolt  yes   no"));
        assert!(lines[2].contains("Modern, Legacy"));
        assert!(lines[2].ends_with("120"));

        let total_col = lines[0].find("TOTAL").unwrap();
        assert_eq!(lines[1].find('5'), Some(total_col));
    }

    #[test]
    fn empty_formats_render_as_dash() {
        let rendered = render_card(&card(3, "Island", &[], 0));
        assert!(rendered.contains("formats:  -\n"));
        assert!(rendered.contains("total:    0\n"));
    }

    #[test]
    fn add_rejects_bad_input_before_touching_the_store() {
        let args = AddArgs::try_parse_from(["add", "  ", "--edition", "2024"]).unwrap();
        assert!(args.validate().is_err());

        let args =
            AddArgs::try_parse_from(["add", "Bolt", "--edition", "2024", "--quantity", "-1"])
                .unwrap();
        assert!(args.validate().is_err());

        let args = AddArgs::try_parse_from([
            "add",
            "Bolt",
            "--edition",
            "2024",
            "--format",
            "Modern,Legacy",
            "--quantity",
            "2",
        ])
        .unwrap();
        match args.validate().unwrap() {
            CardCommand::Add { card, merge } => {
                assert_eq!(card.formats(), ["Modern".to_string(), "Legacy".to_string()]);
                assert_eq!(card.quantity(), 2);
                assert!(!merge);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn adjust_quantity_must_be_positive() {
        assert!(AdjustArgs::try_parse_from(["incr", "1", "0"]).is_err());
        assert!(AdjustArgs::try_parse_from(["incr", "1", "3000000000"]).is_err());

        let largest = AdjustArgs::try_parse_from(["incr", "1", "2147483647"]).unwrap();
        assert_eq!(largest.quantity, i32::MAX as u32);

        let args = AdjustArgs::try_parse_from(["decr", "7", "3"]).unwrap();
        assert!(matches!(
            args.decrement(),
            CardCommand::Decr { id, quantity: 3 } if id == CardId::new(7)
        ));
    }
}
