//! Interactive console session over a [`RecordStore`].
//!
//! The shell reads from any `BufRead` and writes to any `Write`, so a session
//! can be driven from a terminal or scripted in tests. Store failures are
//! reported and shown to the user; the session keeps running.

use crate::error::{report_error, ErrorContext, RosterError, RosterResult};
use crate::store::{Lookup, Record, RecordStore, RecordUpdate};
use std::io::{BufRead, Write};
use tracing::debug;

const MENU: &str = "\n--- Record Management Menu ---\n\
1. Add new record\n\
2. Search record\n\
3. Update existing record\n\
4. Remove record\n\
5. List all records\n\
0. Quit";

/// Menu entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Add,
    Search,
    Update,
    Remove,
    List,
    Quit,
}

impl Action {
    fn from_choice(choice: i64) -> Option<Self> {
        match choice {
            1 => Some(Self::Add),
            2 => Some(Self::Search),
            3 => Some(Self::Update),
            4 => Some(Self::Remove),
            5 => Some(Self::List),
            0 => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Interactive session state.
pub struct Shell<'s, R, W> {
    store: &'s mut RecordStore,
    input: R,
    output: W,
}

impl<'s, R: BufRead, W: Write> Shell<'s, R, W> {
    /// Creates a session over `store`.
    pub fn new(store: &'s mut RecordStore, input: R, output: W) -> Self {
        Self {
            store,
            input,
            output,
        }
    }

    /// Runs the menu loop until the user quits or input ends, then flushes
    /// the store.
    pub fn run(mut self) -> RosterResult<()> {
        loop {
            writeln!(self.output, "{MENU}")?;
            let Some(choice) = self.prompt("Enter your choice:")? else {
                break;
            };

            let action = match choice.parse::<i64>() {
                Ok(n) => Action::from_choice(n),
                Err(_) => {
                    writeln!(
                        self.output,
                        "Invalid input. Please enter a number from 0 to 5."
                    )?;
                    continue;
                }
            };

            debug!(?action, "Shell action");
            match action {
                Some(Action::Add) => self.add()?,
                Some(Action::Search) => self.search()?,
                Some(Action::Update) => self.update()?,
                Some(Action::Remove) => self.remove()?,
                Some(Action::List) => self.list()?,
                Some(Action::Quit) => break,
                None => writeln!(
                    self.output,
                    "Unknown choice. Please select between 0 and 5."
                )?,
            }
        }

        if let Err(e) = self.store.flush() {
            self.fail("shell", e)?;
        }
        writeln!(self.output, "Goodbye!")?;
        Ok(())
    }

    fn add(&mut self) -> RosterResult<()> {
        let Some(id) = self.prompt("Enter record number:")? else {
            return Ok(());
        };
        if id.is_empty() {
            writeln!(self.output, "Record number cannot be empty.")?;
            return Ok(());
        }
        if self.store.contains(&id) {
            writeln!(self.output, "A record with number {id} already exists.")?;
            return Ok(());
        }

        let Some(name) = self.prompt("Enter name:")? else {
            return Ok(());
        };
        if name.is_empty() {
            writeln!(self.output, "Name cannot be empty.")?;
            return Ok(());
        }

        let Some(category) = self.prompt("Enter category:")? else {
            return Ok(());
        };
        let Some(score) = self.prompt("Enter score (e.g. 17.5):")? else {
            return Ok(());
        };
        let Some(score) = parse_score(&score) else {
            writeln!(self.output, "Invalid score. Please enter a numeric value.")?;
            return Ok(());
        };

        match self.store.add(Record::new(id, name, category, score)) {
            Ok(()) => writeln!(self.output, "Record added successfully.")?,
            Err(e) => self.fail("add", e)?,
        }
        Ok(())
    }

    fn search(&mut self) -> RosterResult<()> {
        let Some(query) = self.prompt("Enter record number (full or prefix):")? else {
            return Ok(());
        };
        if let Some(id) = self.resolve(&query, "Search")? {
            if let Some(record) = self.store.get(&id) {
                writeln!(self.output, "\n{record}\n")?;
            }
        }
        Ok(())
    }

    fn update(&mut self) -> RosterResult<()> {
        let Some(query) = self.prompt("Enter record number to update (full or prefix):")? else {
            return Ok(());
        };
        let Some(id) = self.resolve(&query, "Update")? else {
            return Ok(());
        };
        let Some(current) = self.store.get(&id).cloned() else {
            return Ok(());
        };

        writeln!(self.output, "Updating record: {id}")?;
        let mut update = RecordUpdate::default();

        let question = format!("Enter new name (leave blank to keep current: {}):", current.name);
        update.name = self.prompt(&question)?.filter(|s| !s.is_empty());

        let question = format!(
            "Enter new category (leave blank to keep current: {}):",
            current.category
        );
        update.category = self.prompt(&question)?.filter(|s| !s.is_empty());

        let question = format!("Enter new score (leave blank to keep current: {}):", current.score);
        if let Some(answer) = self.prompt(&question)?.filter(|s| !s.is_empty()) {
            match parse_score(&answer) {
                Some(score) => update.score = Some(score),
                None => writeln!(self.output, "Invalid score. Keeping current value.")?,
            }
        }

        match self.store.update(&id, update).map(|_| ()) {
            Ok(()) => writeln!(self.output, "Record updated successfully.")?,
            Err(e) => self.fail("update", e)?,
        }
        Ok(())
    }

    fn remove(&mut self) -> RosterResult<()> {
        let Some(query) = self.prompt("Enter record number to remove (full or prefix):")? else {
            return Ok(());
        };
        let Some(id) = self.resolve(&query, "Removal")? else {
            return Ok(());
        };

        match self.store.remove(&id) {
            Ok(_) => writeln!(self.output, "Record removed successfully.")?,
            Err(e) => self.fail("remove", e)?,
        }
        Ok(())
    }

    fn list(&mut self) -> RosterResult<()> {
        if self.store.is_empty() {
            writeln!(self.output, "No records registered.")?;
            return Ok(());
        }

        writeln!(self.output, "--- Record List (sorted by number) ---")?;
        for record in self.store.list() {
            writeln!(self.output, "\n{record}\n")?;
        }
        Ok(())
    }

    /// Turns a full identifier or a prefix into one stored identifier,
    /// asking the user to pick among suggestions when needed.
    fn resolve(&mut self, query: &str, operation: &str) -> RosterResult<Option<String>> {
        let suggestions = match self.store.lookup(query) {
            Lookup::Exact(record) => return Ok(Some(record.id.clone())),
            Lookup::Suggestions(suggestions) => suggestions,
            Lookup::NotFound => {
                writeln!(self.output, "Record with number {query} does not exist.")?;
                return Ok(None);
            }
        };

        writeln!(self.output, "Did you mean one of the following?")?;
        for (i, id) in suggestions.iter().enumerate() {
            writeln!(self.output, "{}. {}", i + 1, id)?;
        }

        let Some(answer) = self.prompt("Enter number of choice (or 0 to cancel):")? else {
            return Ok(None);
        };
        match answer.parse::<usize>() {
            Ok(0) => {
                writeln!(self.output, "{operation} cancelled.")?;
                Ok(None)
            }
            Ok(n) if n <= suggestions.len() => Ok(suggestions.into_iter().nth(n - 1)),
            _ => {
                writeln!(self.output, "Invalid selection.")?;
                Ok(None)
            }
        }
    }

    /// Writes `question` and reads one trimmed answer. `None` at end of input.
    fn prompt(&mut self, question: &str) -> RosterResult<Option<String>> {
        write!(self.output, "{question} ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn fail<E: Into<RosterError>>(&mut self, component: &str, error: E) -> RosterResult<()> {
        let context = ErrorContext::new(error, component);
        report_error(&context);
        writeln!(self.output, "{}", context.error)?;
        Ok(())
    }
}

fn parse_score(input: &str) -> Option<f64> {
    input.parse::<f64>().ok().filter(|s| s.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FlatFileRepository;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn store_with(lines: &str) -> (TempDir, RecordStore) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("students.csv");
        std::fs::write(&path, lines).unwrap();
        let mut store = RecordStore::new(FlatFileRepository::new(&path));
        store.load().unwrap();
        (dir, store)
    }

    fn run(store: &mut RecordStore, script: &str) -> String {
        let mut output = Vec::new();
        Shell::new(store, Cursor::new(script.to_string()), &mut output)
            .run()
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_add_then_list() {
        let (_dir, mut store) = store_with("");
        let out = run(&mut store, "1\n12A\nAda\nMaths\n17.5\n5\n0\n");

        assert!(out.contains("Record added successfully."));
        assert!(out.contains("--- Record List (sorted by number) ---"));
        assert!(out.contains("Number:   12A"));
        assert!(out.ends_with("Goodbye!\n"));
        assert_eq!(store.get("12A").unwrap().score, 17.5);
    }

    #[test]
    fn test_add_rejects_duplicate_and_bad_score() {
        let (_dir, mut store) = store_with("12A;Ada;Maths;17.5\n");
        let out = run(&mut store, "1\n12A\n1\n12B\nBo\nArt\nlots\n0\n");

        assert!(out.contains("A record with number 12A already exists."));
        assert!(out.contains("Invalid score. Please enter a numeric value."));
        assert!(!store.contains("12B"));
    }

    #[test]
    fn test_search_by_prefix_offers_choices() {
        let (_dir, mut store) = store_with("12A;Ada;Maths;17.5\n12B;Bo;Art;11\n13C;Cy;Music;12\n");
        let out = run(&mut store, "2\n12\n2\n0\n");

        assert!(out.contains("Did you mean one of the following?\n1. 12A\n2. 12B\n"));
        assert!(out.contains("Name:     Bo"));
    }

    #[test]
    fn test_update_keeps_blank_fields() {
        let (_dir, mut store) = store_with("12A;Ada;Maths;17.5\n");
        let out = run(&mut store, "3\n12A\n\nPhysics\nabc\n0\n");

        assert!(out.contains("Invalid score. Keeping current value."));
        assert!(out.contains("Record updated successfully."));
        let record = store.get("12A").unwrap();
        assert_eq!(record.name, "Ada");
        assert_eq!(record.category, "Physics");
        assert_eq!(record.score, 17.5);
    }

    #[test]
    fn test_remove_cancel_and_confirm() {
        let (_dir, mut store) = store_with("ab;A;X;1\nabc;B;X;2\n");
        let out = run(&mut store, "4\na\n0\n4\nab\n0\n");

        assert!(out.contains("Removal cancelled."));
        assert!(out.contains("Record removed successfully."));
        assert!(!store.contains("ab"));
        assert!(store.contains("abc"));
    }

    #[test]
    fn test_unknown_input_and_end_of_input() {
        let (_dir, mut store) = store_with("");
        let out = run(&mut store, "x\n9\n-1\n2\nzz\n");

        assert!(out.contains("Invalid input. Please enter a number from 0 to 5."));
        assert_eq!(
            out.matches("Unknown choice. Please select between 0 and 5.").count(),
            2
        );
        assert!(out.contains("Record with number zz does not exist."));
        assert!(out.ends_with("Goodbye!\n"));
    }

    #[test]
    fn test_invalid_selection() {
        let (_dir, mut store) = store_with("12A;Ada;Maths;17.5\n12B;Bo;Art;11\n");
        let out = run(&mut store, "2\n1\n7\n5\n");

        assert!(out.contains("Invalid selection."));
    }
}
