//! PostgreSQL adapters - Database implementations for repository ports.

mod subscriber_account_repository;

pub use subscriber_account_repository::PostgresSubscriberAccountRepository;
