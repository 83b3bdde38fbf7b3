use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExpenseError {
    #[error("Invalid date format '{0}'. Use DD-MM-YYYY (e.g., 05-12-2025).")]
    InvalidDateFormat(String),

    #[error("Invalid amount '{0}'. Enter number like 120 or 99.50")]
    InvalidAmountFormat(String),

    #[error("{0} cannot be empty.")]
    EmptyRequiredField(&'static str),

    #[error("Invalid month/year format: '{month}' / '{year}'.")]
    InvalidPeriod { month: String, year: String },

    #[error("No entry with ID {0}")]
    RecordNotFound(String),

    #[error("No IDs left after {0}.")]
    IdsExhausted(u32),

    #[error("Input is not valid UTF-8.")]
    InvalidInput,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl ExpenseError {
    /// Storage failures abort the command loop; everything else is reported and the loop goes on.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ExpenseError::Io(_) | ExpenseError::Csv(_))
    }
}

pub type Result<T> = std::result::Result<T, ExpenseError>;
