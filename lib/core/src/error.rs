//! Shared `Result` alias.
//!
//! Crates define their own error enums next to the code that raises them and
//! wrap them in a `rootcause::Report` where callers need layered context.
//! Plain `Result<T, E>` stays fine for errors that are matched on directly.

use rootcause::Report;

/// A Result whose error is a rootcause [`Report`] over context `C`.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::email::{EmailAddress, EmailError};

    fn parse_reported(raw: &str) -> Result<EmailAddress, EmailError> {
        Ok(EmailAddress::parse(raw)?)
    }

    #[test]
    fn typed_context_converts_with_question_mark() {
        assert!(parse_reported("a@x.com").is_ok());

        let report = parse_reported("nobody").expect_err("no @");
        assert!(report.to_string().contains("nobody"));
    }
}
