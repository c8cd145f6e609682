//! Regex-based PII masking for emails and phone numbers.

use once_cell::sync::Lazy;
use regex::Regex;

pub const EMAIL_PLACEHOLDER: &str = "[EMAIL]";
pub const PHONE_PLACEHOLDER: &str = "[PHONE]";

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap()
});

// North-American numbers need separators between groups; bare digit runs
// (timestamps, ids) only match in E.164 form with a leading `+`.
static PHONE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:\+?\b1[-.\s])?(?:\(\d{3}\)\s?|\b\d{3}[-.\s])\d{3}[-.\s]\d{4}\b|\+[1-9]\d{9,14}\b",
    )
    .unwrap()
});

/// Result of a masking pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterReport {
    pub text: String,
    pub emails_masked: usize,
    pub phones_masked: usize,
}

/// Replace emails with [`EMAIL_PLACEHOLDER`] and phone numbers with
/// [`PHONE_PLACEHOLDER`]. Everything else is returned untouched.
pub fn filter(text: &str) -> String {
    filter_report(text).text
}

pub fn filter_report(text: &str) -> FilterReport {
    // Emails first so digits in a local part never read as a phone number.
    let emails_masked = EMAIL_PATTERN.find_iter(text).count();
    let without_emails = EMAIL_PATTERN.replace_all(text, EMAIL_PLACEHOLDER);

    let phones_masked = PHONE_PATTERN.find_iter(&without_emails).count();
    let text = PHONE_PATTERN
        .replace_all(&without_emails, PHONE_PLACEHOLDER)
        .into_owned();

    FilterReport {
        text,
        emails_masked,
        phones_masked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_replaced_rest_unchanged() {
        assert_eq!(
            filter("Contact me at jane.doe+work@example.co.uk tomorrow."),
            "Contact me at [EMAIL] tomorrow."
        );
    }

    #[test]
    fn test_multiple_emails() {
        let report = filter_report("a@b.io and c.d@e-f.org");
        assert_eq!(report.text, "[EMAIL] and [EMAIL]");
        assert_eq!(report.emails_masked, 2);
        assert_eq!(report.phones_masked, 0);
    }

    #[test]
    fn test_us_phone_formats() {
        assert_eq!(filter("call 555-123-4567 now"), "call [PHONE] now");
        assert_eq!(filter("call (555) 123-4567 now"), "call [PHONE] now");
        assert_eq!(filter("call 555.123.4567"), "call [PHONE]");
        assert_eq!(filter("call +1 555 123 4567"), "call [PHONE]");
    }

    #[test]
    fn test_international_phone() {
        assert_eq!(filter("ring +4915112345678 please"), "ring [PHONE] please");
    }

    #[test]
    fn test_mixed_counts() {
        let report = filter_report("mail x1234567890@host.com or call 555-123-4567");
        assert_eq!(report.text, "mail [EMAIL] or call [PHONE]");
        assert_eq!(report.emails_masked, 1);
        assert_eq!(report.phones_masked, 1);
    }

    #[test]
    fn test_clean_text_untouched() {
        let text = "Drift 0.42 on slide 12, nothing personal here.";
        let report = filter_report(text);
        assert_eq!(report.text, text);
        assert_eq!(report.emails_masked + report.phones_masked, 0);
    }

    #[test]
    fn test_short_numbers_untouched() {
        assert_eq!(filter("order 12345 shipped"), "order 12345 shipped");
        assert_eq!(filter(""), "");
    }

    #[test]
    fn test_bare_digit_runs_untouched() {
        assert_eq!(filter("saved at ts 1700000000 ok"), "saved at ts 1700000000 ok");
        assert_eq!(filter("id 5551234567"), "id 5551234567");
        assert_eq!(filter("call 1-555-123-4567"), "call [PHONE]");
    }
}
