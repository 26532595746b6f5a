use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Db(#[from] sea_orm::DbErr),
  #[error("serialization error: {0}")]
  Json(#[from] json::Error),
  #[error("password hashing failed: {0}")]
  Hash(#[from] bcrypt::BcryptError),
  #[error("storage quota exceeded while writing `{0}`")]
  QuotaExceeded(String),

  #[error("Email already in use. Please try another one.")]
  EmailTaken,
  #[error("Passwords don't match")]
  PasswordMismatch,
  #[error("Invalid email or password")]
  InvalidCredentials,
  #[error("You must be logged in")]
  NotLoggedIn,
  #[error("Unauthorized access")]
  Forbidden,
  #[error("Task title cannot be empty")]
  EmptyTitle,
  #[error("Please fill out all required fields (missing `{0}`)")]
  MissingField(&'static str),
  #[error("Not enough free hours")]
  InsufficientFreeHours,
  #[error("Invalid arguments: {0}")]
  InvalidArgs(String),

  #[error("User not found. Please check your email.")]
  CustomerNotFound,
  #[error("Service not found")]
  ServiceNotFound,
  #[error("Booking not found")]
  BookingNotFound,
  #[error("Task not found")]
  TaskNotFound,
  #[error("QR code not found")]
  QrCodeNotFound,
}
