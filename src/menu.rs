use std::io::{self, BufRead, Write};
use log::debug;
use crate::csv_handler::ExpenseRecord;
use crate::error::{ExpenseError, Result};
use crate::expense_store::{self, ExpenseStore, ExpenseUpdate};

const MENU: &str = "==== Expense Tracker ====
1. Add Expense
2. View All Expenses
3. View Monthly Total
4. Category Summary
5. Search Notes
6. Edit Entry (by ID)
7. Delete Entry (by ID)
8. Exit";

/// The interactive numbered menu. Reads one answer per line from `input`
/// and writes prompts and results to `output`.
pub struct Menu<'a, R, W> {
    store: &'a ExpenseStore,
    input: R,
    output: W,
    currency: String,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    pub fn new(store: &'a ExpenseStore, input: R, output: W, currency: &str) -> Self {
        Menu {
            store,
            input,
            output,
            currency: currency.to_string(),
        }
    }

    /// Runs until Exit is chosen or the input ends. Only storage failures are returned;
    /// every other error is printed and the menu is shown again.
    pub fn run(&mut self) -> Result<()> {
        self.store.ensure_initialized()?;
        loop {
            writeln!(self.output, "{MENU}")?;
            let choice = match self.prompt("Choose an option: ") {
                Ok(choice) => choice,
                Err(e) if is_end_of_input(&e) => return Ok(()),
                Err(e) => return Err(e),
            };
            debug!("Menu choice: {:?}", choice);

            let outcome = match choice.as_str() {
                "1" => self.add_expense(),
                "2" => self.view_expenses(),
                "3" => self.monthly_total(),
                "4" => self.category_summary(),
                "5" => self.search_notes(),
                "6" => self.edit_entry(),
                "7" => self.delete_entry(),
                "8" => {
                    writeln!(self.output, "Goodbye!")?;
                    return Ok(());
                }
                _ => writeln!(self.output, "Invalid choice. Try again.\n").map_err(ExpenseError::from),
            };

            match outcome {
                Ok(()) => {}
                Err(e) if is_end_of_input(&e) => return Ok(()),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => writeln!(self.output, "{e}\n")?,
            }
        }
    }

    fn add_expense(&mut self) -> Result<()> {
        let date = self.prompt_until("Enter date (DD-MM-YYYY): ", |v| expense_store::parse_date(v).map(drop))?;
        let amount = self.prompt_until("Enter amount: ", |v| expense_store::parse_amount(v).map(drop))?;
        let category = self.prompt_until("Enter category (Food/Travel/Bill/etc): ", required("Category"))?;
        let note = self.prompt("Enter note (optional): ")?;

        let id = self.store.add(&date, &amount, &category, &note)?;
        writeln!(self.output, "\n[OK] Expense added with ID {id}\n")?;
        Ok(())
    }

    fn view_expenses(&mut self) -> Result<()> {
        let records = self.store.read_all()?;
        if records.is_empty() {
            writeln!(self.output, "\nNo expenses found.\n")?;
            return Ok(());
        }
        writeln!(self.output, "\n--- All Expenses ---")?;
        for record in &records {
            self.print_record(record)?;
        }
        writeln!(self.output)?;
        Ok(())
    }

    fn monthly_total(&mut self) -> Result<()> {
        let month = self.prompt("Enter month (MM): ")?;
        let year = self.prompt("Enter year (YYYY): ")?;

        let total = self.store.monthly_total(&month, &year)?;
        writeln!(
            self.output,
            "\nTotal expenses for {}-{}: {}{:.2}\n",
            expense_store::pad_month(&month),
            year,
            self.currency,
            total
        )?;
        Ok(())
    }

    fn category_summary(&mut self) -> Result<()> {
        let summary = self.store.category_summary()?;
        if summary.is_empty() {
            writeln!(self.output, "\nNo expenses found.\n")?;
            return Ok(());
        }
        writeln!(self.output, "\n--- Category Summary ---")?;
        for (category, total) in &summary {
            writeln!(self.output, "{:20} : {}{:.2}", category, self.currency, total)?;
        }
        writeln!(self.output)?;
        Ok(())
    }

    fn search_notes(&mut self) -> Result<()> {
        let keyword = self.prompt("Enter search keyword (searches notes): ")?;
        let found = self.store.search_notes(&keyword)?;
        if found.is_empty() {
            writeln!(self.output, "\nNo matching entries found.\n")?;
            return Ok(());
        }
        writeln!(self.output, "\nFound {} entries:", found.len())?;
        for record in &found {
            self.print_record(record)?;
        }
        writeln!(self.output)?;
        Ok(())
    }

    fn edit_entry(&mut self) -> Result<()> {
        if self.store.read_all()?.is_empty() {
            writeln!(self.output, "\nNo expenses to edit.\n")?;
            return Ok(());
        }
        let id = self.prompt_until("Enter ID to edit: ", required("ID"))?;
        let Some(current) = self.store.find(&id)? else {
            return Err(ExpenseError::RecordNotFound(id));
        };

        writeln!(self.output, "Current entry:")?;
        self.print_record(&current)?;
        writeln!(self.output, "Press Enter to keep current value.")?;
        let update = ExpenseUpdate {
            date: Some(self.prompt(&format!("Date [{}]: ", current.date))?),
            amount: Some(self.prompt(&format!("Amount [{}]: ", current.amount))?),
            category: Some(self.prompt(&format!("Category [{}]: ", current.category))?),
            note: Some(self.prompt(&format!("Note [{}]: ", current.note))?),
        };

        let report = self.store.edit(&id, update)?;
        for skip in &report.skipped {
            writeln!(self.output, "{} Skipping {} change.", skip.reason, skip.field)?;
        }
        writeln!(self.output, "Entry ID {id} updated.")?;
        self.print_record(&report.record)?;
        writeln!(self.output)?;
        Ok(())
    }

    fn delete_entry(&mut self) -> Result<()> {
        if self.store.read_all()?.is_empty() {
            writeln!(self.output, "\nNo expenses to delete.\n")?;
            return Ok(());
        }
        let id = self.prompt_until("Enter ID to delete: ", required("ID"))?;
        self.store.delete(&id)?;
        writeln!(self.output, "Deleted entry ID {id}\n")?;
        Ok(())
    }

    fn print_record(&mut self, record: &ExpenseRecord) -> Result<()> {
        writeln!(
            self.output,
            "ID: {:>3} | Date: {} | Amount: {}{} | Category: {} | Note: {}",
            record.id, record.date, self.currency, record.amount, record.category, record.note
        )?;
        Ok(())
    }

    /// Prints `prompt` and returns the next input line, trimmed.
    /// Lines that are not UTF-8 are reported and asked for again.
    fn prompt(&mut self, prompt: &str) -> Result<String> {
        loop {
            write!(self.output, "{prompt}")?;
            self.output.flush()?;

            let mut line = Vec::new();
            if self.input.read_until(b'\n', &mut line)? == 0 {
                return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
            }
            match String::from_utf8(line) {
                Ok(line) => return Ok(line.trim().to_string()),
                Err(_) => writeln!(self.output, "  {}", ExpenseError::InvalidInput)?,
            }
        }
    }

    /// Asks again until `check` accepts the answer.
    fn prompt_until(&mut self, prompt: &str, check: impl Fn(&str) -> Result<()>) -> Result<String> {
        loop {
            let value = self.prompt(prompt)?;
            match check(&value) {
                Ok(()) => return Ok(value),
                Err(e) => writeln!(self.output, "  {e}")?,
            }
        }
    }
}

fn required(field: &'static str) -> impl Fn(&str) -> Result<()> {
    move |value| {
        if value.is_empty() {
            Err(ExpenseError::EmptyRequiredField(field))
        } else {
            Ok(())
        }
    }
}

fn is_end_of_input(e: &ExpenseError) -> bool {
    matches!(e, ExpenseError::Io(err) if err.kind() == io::ErrorKind::UnexpectedEof)
}
