//! In-memory adapters for tests and local development.

mod subscriber_account_repository;

pub use subscriber_account_repository::InMemorySubscriberAccountRepository;
