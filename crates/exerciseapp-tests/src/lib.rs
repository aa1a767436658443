//! End-to-end coverage: the application services running against the real
//! SQLite gateways, with recording collaborator doubles.

#[cfg(test)]
mod support;

#[cfg(test)]
mod exercise_integration;

#[cfg(test)]
mod submission_integration;

#[cfg(test)]
mod token_integration;
