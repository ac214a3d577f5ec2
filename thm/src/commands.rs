//! Subcommand implementations for the record-management CLI.
//!
//! `add` gathers its fields interactively and only then touches the store;
//! everything else is a thin wrapper that turns store errors into the
//! process exit status.

use std::io::{BufRead, Write};

use anyhow::{Context, Result, bail};
use libhunt::record::TreasureFields;
use libhunt::{HuntStore, Treasure};

pub fn add(
    store: &HuntStore,
    hunt: &str,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Result<()> {
    let fields = collect_fields(input, output)?;
    let id = store
        .append(hunt, fields)
        .with_context(|| format!("failed to add treasure to hunt {hunt}"))?;
    writeln!(output, "Treasure added successfully with ID: {id}")?;
    Ok(())
}

pub fn list(store: &HuntStore, hunt: &str, output: &mut impl Write) -> Result<()> {
    let records = store.scan(hunt)?;
    writeln!(output, "Treasures in hunt {hunt}:")?;
    writeln!(output, "-------------------")?;
    let mut count = 0u64;
    for record in records {
        print_record(output, &record?)?;
        count += 1;
    }
    if count == 0 {
        writeln!(output, "No treasures found in this hunt.")?;
    }
    Ok(())
}

pub fn view(store: &HuntStore, hunt: &str, id: u32, output: &mut impl Write) -> Result<()> {
    let record = store.lookup(hunt, id)?;
    writeln!(output, "Treasure Details:")?;
    print_record(output, &record)?;
    Ok(())
}

pub fn remove_treasure(
    store: &HuntStore,
    hunt: &str,
    id: u32,
    output: &mut impl Write,
) -> Result<()> {
    store.delete(hunt, id)?;
    writeln!(output, "Treasure with ID {id} removed from hunt {hunt}")?;
    Ok(())
}

pub fn remove_hunt(store: &HuntStore, hunt: &str, output: &mut impl Write) -> Result<()> {
    store.remove_hunt(hunt)?;
    writeln!(output, "Hunt {hunt} removed successfully")?;
    Ok(())
}

fn collect_fields(input: &mut impl BufRead, output: &mut impl Write) -> Result<TreasureFields> {
    let user = prompt(input, output, "Enter username: ")?;
    let latitude = prompt(input, output, "Enter latitude: ")?
        .parse()
        .context("latitude must be a number")?;
    let longitude = prompt(input, output, "Enter longitude: ")?
        .parse()
        .context("longitude must be a number")?;
    let clue = prompt(input, output, "Enter clue text: ")?;
    let value = prompt(input, output, "Enter value: ")?
        .parse()
        .context("value must be an integer")?;
    Ok(TreasureFields {
        user,
        latitude,
        longitude,
        clue,
        value,
    })
}

fn prompt(input: &mut impl BufRead, output: &mut impl Write, text: &str) -> Result<String> {
    write!(output, "{text}")?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        bail!("unexpected end of input");
    }
    Ok(line.trim().to_string())
}

fn print_record(output: &mut impl Write, t: &Treasure) -> std::io::Result<()> {
    writeln!(output, "ID: {}", t.id)?;
    writeln!(output, "User: {}", t.user)?;
    writeln!(output, "Location: {:.6}, {:.6}", t.latitude, t.longitude)?;
    writeln!(output, "Clue: {}", t.clue)?;
    writeln!(output, "Value: {}", t.value)?;
    writeln!(output, "-------------------")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_prompts_and_appends() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = HuntStore::new(dir.path());
        let mut input = std::io::Cursor::new(b"al\n45.5\n-122.25\nunder the oak\n5\n".to_vec());
        let mut out = Vec::new();

        add(&store, "pirates", &mut input, &mut out)?;

        let report = String::from_utf8(out)?;
        assert!(report.contains("Treasure added successfully with ID: 1"));
        let t = store.lookup("pirates", 1)?;
        assert_eq!(t.user, "al");
        assert_eq!(t.clue, "under the oak");
        assert_eq!(t.value, 5);
        Ok(())
    }

    #[test]
    fn test_add_rejects_non_numeric_latitude() {
        let dir = tempfile::tempdir().unwrap();
        let store = HuntStore::new(dir.path());
        let mut input = std::io::Cursor::new(b"al\nnorth\n".to_vec());
        let mut out = Vec::new();
        assert!(add(&store, "pirates", &mut input, &mut out).is_err());
        assert!(!store.hunt_exists("pirates"));
    }

    #[test]
    fn test_list_empty_hunt_reports_not_errors() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = HuntStore::new(dir.path());
        let mut input = std::io::Cursor::new(b"al\n1\n2\nx\n5\n".to_vec());
        add(&store, "h", &mut input, &mut Vec::new())?;
        store.delete("h", 1)?;

        let mut out = Vec::new();
        list(&store, "h", &mut out)?;
        assert!(String::from_utf8(out)?.contains("No treasures found in this hunt."));
        Ok(())
    }

    #[test]
    fn test_view_missing_treasure_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = HuntStore::new(dir.path());
        let mut input = std::io::Cursor::new(b"al\n1\n2\nx\n5\n".to_vec());
        add(&store, "h", &mut input, &mut Vec::new()).unwrap();

        assert!(view(&store, "h", 4, &mut Vec::new()).is_err());
        assert!(list(&store, "ghost", &mut Vec::new()).is_err());
    }
}
