use rapport_core::user::UserId;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("user {0} not found upstream")]
  NotFound(UserId),

  #[error("GET {url} → {status}")]
  Status { url: String, status: StatusCode },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
