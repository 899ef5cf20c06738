pub mod amortization;
pub mod calculator;
pub mod error;
pub mod overpayment;
pub mod registry;
pub mod scenario;
pub mod store;
pub mod types;

pub use calculator::MortgageCalculator;
pub use error::MortgageError;
pub use scenario::{LoanScenario, LoanTerms, SummaryRow};
pub use types::*;

/// Standard result type for all mortgage-calc operations
pub type MortgageResult<T> = Result<T, MortgageError>;
