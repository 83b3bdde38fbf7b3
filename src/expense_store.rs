use std::collections::HashMap;
use std::path::{Path, PathBuf};
use chrono::{Datelike, NaiveDate};
use log::{info, warn};
use crate::csv_handler::{self, ExpenseID, ExpenseRecord};
use crate::error::{ExpenseError, Result};

pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// Optional replacement values for an edit. Blank values leave the field as it is.
#[derive(Debug, Default, Clone)]
pub struct ExpenseUpdate {
    pub date: Option<String>,
    pub amount: Option<String>,
    pub category: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug)]
pub struct SkippedField {
    pub field: &'static str,
    pub reason: ExpenseError,
}

/// Outcome of a successful edit: the stored record and the changes that were not applied.
#[derive(Debug)]
pub struct EditReport {
    pub record: ExpenseRecord,
    pub skipped: Vec<SkippedField>,
}

/// The expense file. Every operation re-reads the whole file and mutating
/// operations rewrite it entirely; nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct ExpenseStore {
    path: PathBuf,
}

impl ExpenseStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ExpenseStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the file with only the header row if it does not exist yet.
    pub fn ensure_initialized(&self) -> Result<()> {
        if !self.path.exists() {
            info!("Creating expense file {}", self.path.display());
            csv_handler::write_records(&self.path, &[])?;
        }
        Ok(())
    }

    pub fn read_all(&self) -> Result<Vec<ExpenseRecord>> {
        self.ensure_initialized()?;
        csv_handler::read_records(&self.path)
    }

    pub fn write_all(&self, records: &[ExpenseRecord]) -> Result<()> {
        csv_handler::write_records(&self.path, records)
    }

    pub fn find(&self, id: &str) -> Result<Option<ExpenseRecord>> {
        Ok(self.read_all()?.into_iter().find(|r| matches_id(r, id)))
    }

    /// Validates the input, appends a record with the next free ID and returns that ID.
    /// Surrounding whitespace is stripped from every field before it is checked and stored.
    pub fn add(&self, date: &str, amount: &str, category: &str, note: &str) -> Result<ExpenseID> {
        let (date, amount, category, note) = (date.trim(), amount.trim(), category.trim(), note.trim());
        parse_date(date)?;
        parse_amount(amount)?;
        if category.is_empty() {
            return Err(ExpenseError::EmptyRequiredField("Category"));
        }

        let mut records = self.read_all()?;
        let id = next_id(&records)?;
        records.push(ExpenseRecord {
            id,
            date: date.to_string(),
            amount: amount.to_string(),
            category: category.to_string(),
            note: note.to_string(),
        });
        self.write_all(&records)?;

        info!("Added expense {} ({} {})", id, amount, category);
        Ok(id)
    }

    /// Removes the record whose ID reads exactly as `id` and returns it.
    pub fn delete(&self, id: &str) -> Result<ExpenseRecord> {
        let mut records = self.read_all()?;
        let Some(position) = records.iter().position(|r| matches_id(r, id)) else {
            return Err(ExpenseError::RecordNotFound(id.to_string()));
        };
        let removed = records.remove(position);
        self.write_all(&records)?;

        info!("Deleted expense {}", id);
        Ok(removed)
    }

    /// Applies every valid field of `update` to the record. Invalid dates or
    /// amounts are reported in the returned report and the old value is kept.
    pub fn edit(&self, id: &str, update: ExpenseUpdate) -> Result<EditReport> {
        let mut records = self.read_all()?;
        let Some(record) = records.iter_mut().find(|r| matches_id(r, id)) else {
            return Err(ExpenseError::RecordNotFound(id.to_string()));
        };

        let mut skipped = Vec::new();
        if let Some(date) = non_blank(&update.date) {
            match parse_date(date) {
                Ok(_) => record.date = date.to_string(),
                Err(reason) => skipped.push(SkippedField { field: "date", reason }),
            }
        }
        if let Some(amount) = non_blank(&update.amount) {
            match parse_amount(amount) {
                Ok(_) => record.amount = amount.to_string(),
                Err(reason) => skipped.push(SkippedField { field: "amount", reason }),
            }
        }
        if let Some(category) = non_blank(&update.category) {
            record.category = category.to_string();
        }
        if let Some(note) = non_blank(&update.note) {
            record.note = note.to_string();
        }

        for skip in &skipped {
            warn!("Expense {}: skipping {} change: {}", id, skip.field, skip.reason);
        }
        let record = record.clone();
        self.write_all(&records)?;

        info!("Updated expense {}", id);
        Ok(EditReport { record, skipped })
    }

    /// Sums the amounts dated in the given month. `month` may be a single digit.
    /// Rows with unreadable dates or amounts are left out of the sum.
    pub fn monthly_total(&self, month: &str, year: &str) -> Result<f64> {
        let month = pad_month(month);
        let year = year.trim();
        let is_digits = |s: &str, len: usize| s.len() == len && s.bytes().all(|b| b.is_ascii_digit());
        if !is_digits(month.as_str(), 2) || !is_digits(year, 4) {
            return Err(ExpenseError::InvalidPeriod { month, year: year.to_string() });
        }
        let (Ok(month), Ok(year)) = (month.parse::<u32>(), year.parse::<i32>()) else {
            return Err(ExpenseError::InvalidPeriod { month, year: year.to_string() });
        };

        let total = self
            .read_all()?
            .iter()
            .filter_map(|r| {
                let date = parse_date(&r.date).ok()?;
                if date.month() != month || date.year() != year {
                    return None;
                }
                parse_amount(&r.amount).ok()
            })
            .fold(0.0, |acc, amount| acc + amount);
        Ok(total)
    }

    /// Totals per category, largest first. Equal totals keep the order in
    /// which their categories first appear in the file.
    pub fn category_summary(&self) -> Result<Vec<(String, f64)>> {
        let mut summary: Vec<(String, f64)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for record in self.read_all()? {
            let amount = match parse_amount(&record.amount) {
                Ok(amount) => amount,
                Err(e) => {
                    warn!("Skipping expense {} in summary: {}", record.id, e);
                    continue;
                }
            };
            match index.get(&record.category).copied() {
                Some(i) => summary[i].1 += amount,
                None => {
                    index.insert(record.category.clone(), summary.len());
                    summary.push((record.category, amount));
                }
            }
        }

        summary.sort_by(|a, b| b.1.total_cmp(&a.1));
        Ok(summary)
    }

    /// Records whose note contains `keyword`, ignoring case, in file order.
    pub fn search_notes(&self, keyword: &str) -> Result<Vec<ExpenseRecord>> {
        let keyword = keyword.trim().to_lowercase();
        if keyword.is_empty() {
            return Err(ExpenseError::EmptyRequiredField("Keyword"));
        }
        Ok(self
            .read_all()?
            .into_iter()
            .filter(|r| r.note.to_lowercase().contains(&keyword))
            .collect())
    }
}

/// Parses `DD-MM-YYYY`. The year must be four digits and not `0000`.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    let invalid = || ExpenseError::InvalidDateFormat(value.to_string());
    let year = value.rsplit('-').next().unwrap_or_default();
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) || year == "0000" {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| invalid())
}

pub fn parse_amount(value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| ExpenseError::InvalidAmountFormat(value.to_string()))
}

/// Left-pads a one-digit month with `0`.
pub fn pad_month(month: &str) -> String {
    format!("{:0>2}", month.trim())
}

fn next_id(records: &[ExpenseRecord]) -> Result<ExpenseID> {
    match records.iter().map(|r| r.id).max() {
        None => Ok(1),
        Some(max) => max.checked_add(1).ok_or(ExpenseError::IdsExhausted(max)),
    }
}

#[inline]
fn matches_id(record: &ExpenseRecord, id: &str) -> bool {
    record.id.to_string() == id
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
