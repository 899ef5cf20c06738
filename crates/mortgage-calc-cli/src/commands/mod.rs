pub mod interactive;
pub mod overpayment;
pub mod scenario;
pub mod schedule;
