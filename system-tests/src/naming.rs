// system-tests/src/naming.rs
// ============================================================================
// Module: Resource Naming
// Description: Unique names and generated passwords for remote fixtures.
// Purpose: Keep concurrently running tests from colliding on remote state.
// Dependencies: rand, time, seatable-harness
// ============================================================================

//! ## Overview
//! Every remote resource gets a timestamped, randomized name so parallel tests
//! never share state. Generated passwords come from the operating system RNG
//! and are returned as [`Secret`] values.

// ============================================================================
// SECTION: Imports
// ============================================================================

use rand::Rng;
use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use seatable_harness::Secret;
use time::OffsetDateTime;
use time::macros::format_description;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Prefix shared by every resource the suites create.
pub const NAME_PREFIX: &str = "Automated Tests";

/// Length of generated account passwords.
pub const PASSWORD_LEN: usize = 20;

/// Mail domain used for generated accounts.
pub const TEST_MAIL_DOMAIN: &str = "seatable.io";

// ============================================================================
// SECTION: Names
// ============================================================================

/// Returns `Automated Tests <YYYY-MM-DD HH-MM-SS> <n>` for the current UTC time.
#[must_use]
pub fn unique_name() -> String {
    format!("{NAME_PREFIX} {} {}", timestamp(OffsetDateTime::now_utc()), OsRng.gen_range(1 ..= 10_000))
}

/// Returns a slug-style name such as `automated-testing-org-4711`.
#[must_use]
pub fn unique_slug(kind: &str) -> String {
    format!("automated-testing-{kind}-{}", OsRng.gen_range(1 ..= 1_000_000))
}

/// Returns a unique account address for `slug`.
#[must_use]
pub fn account_email(slug: &str) -> String {
    format!("{slug}@{TEST_MAIL_DOMAIN}")
}

/// Generates an alphanumeric password.
#[must_use]
pub fn generate_password() -> Secret {
    let value: String = OsRng.sample_iter(&Alphanumeric).take(PASSWORD_LEN).map(char::from).collect();
    Secret::new(value)
}

/// Formats `at` as `YYYY-MM-DD HH-MM-SS`.
fn timestamp(at: OffsetDateTime) -> String {
    let format = format_description!("[year]-[month]-[day] [hour]-[minute]-[second]");
    at.format(format).unwrap_or_else(|_| at.unix_timestamp().to_string())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions use unwrap for clarity.")]

    use time::OffsetDateTime;

    use super::NAME_PREFIX;
    use super::PASSWORD_LEN;
    use super::account_email;
    use super::generate_password;
    use super::timestamp;
    use super::unique_name;
    use super::unique_slug;

    #[test]
    fn timestamp_uses_dashes_between_time_fields() {
        let at = OffsetDateTime::from_unix_timestamp(1_718_000_000).unwrap();
        assert_eq!(timestamp(at), "2024-06-10 06-13-20");
    }

    #[test]
    fn unique_name_carries_prefix_and_suffix() {
        let name = unique_name();
        assert!(name.starts_with(NAME_PREFIX));
        let suffix = name.rsplit(' ').next().unwrap();
        assert!(suffix.parse::<u32>().is_ok());
    }

    #[test]
    fn slugs_and_emails_are_lowercase() {
        let slug = unique_slug("org");
        assert!(slug.starts_with("automated-testing-org-"));
        assert_eq!(account_email("a-b"), "a-b@seatable.io");
    }

    #[test]
    fn passwords_are_alphanumeric_and_distinct() {
        let first = generate_password();
        let second = generate_password();
        assert_eq!(first.expose_secret().len(), PASSWORD_LEN);
        assert!(first.expose_secret().chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(first, second);
    }
}
