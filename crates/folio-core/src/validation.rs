//! Field rules for contact and post submissions.
//!
//! Payloads arrive as untyped JSON. Each validator checks every field and
//! either returns the normalized record or all violations at once.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::domain::{Category, ContactStatus, NewContact, PostDraft, PostStatus};
use crate::error::ValidationErrors;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*\.[A-Za-z]{2,}$",
    )
    .unwrap()
});

const GMAIL_DOMAINS: &[&str] = &["gmail.com", "googlemail.com"];
const ICLOUD_DOMAINS: &[&str] = &["icloud.com", "me.com"];
const YANDEX_DOMAINS: &[&str] = &[
    "yandex.ru", "yandex.ua", "yandex.kz", "yandex.com", "yandex.by", "ya.ru",
];
const YAHOO_DOMAINS: &[&str] = &[
    "rocketmail.com", "yahoo.ca", "yahoo.co.uk", "yahoo.com", "yahoo.de", "yahoo.fr", "yahoo.in",
    "yahoo.it", "ymail.com",
];
const OUTLOOK_DOMAINS: &[&str] = &[
    "hotmail.at", "hotmail.be", "hotmail.ca", "hotmail.cl", "hotmail.co.il", "hotmail.co.nz",
    "hotmail.co.th", "hotmail.co.uk", "hotmail.com", "hotmail.com.ar", "hotmail.com.au",
    "hotmail.com.br", "hotmail.com.gr", "hotmail.com.mx", "hotmail.com.pe", "hotmail.com.tr",
    "hotmail.com.vn", "hotmail.cz", "hotmail.de", "hotmail.dk", "hotmail.es", "hotmail.fr",
    "hotmail.hu", "hotmail.id", "hotmail.ie", "hotmail.in", "hotmail.it", "hotmail.jp",
    "hotmail.kr", "hotmail.lv", "hotmail.my", "hotmail.ph", "hotmail.pt", "hotmail.sa",
    "hotmail.sg", "hotmail.sk", "live.be", "live.co.uk", "live.com", "live.com.ar",
    "live.com.mx", "live.de", "live.es", "live.eu", "live.fr", "live.it", "live.nl", "msn.com",
    "outlook.at", "outlook.be", "outlook.cl", "outlook.co.il", "outlook.co.nz", "outlook.co.th",
    "outlook.com", "outlook.com.ar", "outlook.com.au", "outlook.com.br", "outlook.com.gr",
    "outlook.com.pe", "outlook.com.tr", "outlook.com.vn", "outlook.cz", "outlook.de",
    "outlook.dk", "outlook.es", "outlook.fr", "outlook.hu", "outlook.id", "outlook.ie",
    "outlook.in", "outlook.it", "outlook.jp", "outlook.kr", "outlook.lv", "outlook.my",
    "outlook.ph", "outlook.pt", "outlook.sa", "outlook.sg", "outlook.sk", "passport.com",
];

enum Field<'a> {
    Missing,
    Text(&'a str),
    Invalid,
}

fn field<'a>(payload: &'a Value, key: &str) -> Field<'a> {
    match payload.get(key) {
        None | Some(Value::Null) => Field::Missing,
        Some(Value::String(s)) => Field::Text(s),
        Some(_) => Field::Invalid,
    }
}

struct Bounds {
    min: usize,
    max: Option<usize>,
    message: &'static str,
}

/// Trimmed, non-empty text within bounds; records at most one violation.
fn required_text(
    errors: &mut ValidationErrors,
    payload: &Value,
    key: &'static str,
    label: &str,
    bounds: Bounds,
) -> Option<String> {
    let raw = match field(payload, key) {
        Field::Missing => "",
        Field::Text(s) => s,
        Field::Invalid => {
            errors.push(key, format!("{label} must be a string"));
            return None;
        }
    };
    let value = raw.trim();
    if value.is_empty() {
        errors.push(key, format!("{label} is required"));
        return None;
    }
    let len = value.chars().count();
    if len < bounds.min || bounds.max.is_some_and(|max| len > max) {
        errors.push(key, bounds.message);
        return None;
    }
    Some(value.to_string())
}

/// Trimmed optional text; empty strings count as absent.
fn optional_text(
    errors: &mut ValidationErrors,
    payload: &Value,
    key: &'static str,
    label: &str,
    max: Option<(usize, &'static str)>,
) -> Option<String> {
    let value = match field(payload, key) {
        Field::Missing => return None,
        Field::Text(s) => s.trim(),
        Field::Invalid => {
            errors.push(key, format!("{label} must be a string"));
            return None;
        }
    };
    if let Some((max, message)) = max {
        if value.chars().count() > max {
            errors.push(key, message);
            return None;
        }
    }
    (!value.is_empty()).then(|| value.to_string())
}

fn optional_enum<T: FromStr>(
    errors: &mut ValidationErrors,
    payload: &Value,
    key: &'static str,
    message: &'static str,
) -> Option<T> {
    match field(payload, key) {
        Field::Missing => None,
        Field::Text(s) => match s.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                errors.push(key, message);
                None
            }
        },
        Field::Invalid => {
            errors.push(key, message);
            None
        }
    }
}

pub fn is_valid_email(email: &str) -> bool {
    if email.len() > 254 {
        return false;
    }
    match email.split_once('@') {
        Some((local, _)) if local.len() <= 64 => EMAIL.is_match(email),
        _ => false,
    }
}

/// Canonical form of an address, or `None` when nothing is left of the
/// local part once provider rules are applied.
///
/// Everything is lowercased. Gmail drops dots and the `+tag` and folds
/// googlemail.com into gmail.com. Outlook/Hotmail/Live and iCloud drop the
/// `+tag`; Yahoo drops the last `-tag`; Yandex domains fold into yandex.ru.
pub fn normalize_email(email: &str) -> Option<String> {
    let lowered = email.trim().to_lowercase();
    let (local, domain) = lowered.rsplit_once('@')?;

    let (local, domain) = if GMAIL_DOMAINS.contains(&domain) {
        (strip_suffix_tag(local, '+').replace('.', ""), "gmail.com")
    } else if OUTLOOK_DOMAINS.contains(&domain) || ICLOUD_DOMAINS.contains(&domain) {
        (strip_suffix_tag(local, '+').to_string(), domain)
    } else if YAHOO_DOMAINS.contains(&domain) {
        let local = match local.rsplit_once('-') {
            Some((head, _)) => head,
            None => local,
        };
        (local.to_string(), domain)
    } else if YANDEX_DOMAINS.contains(&domain) {
        (local.to_string(), "yandex.ru")
    } else {
        (local.to_string(), domain)
    };

    (!local.is_empty()).then(|| format!("{local}@{domain}"))
}

fn strip_suffix_tag(local: &str, separator: char) -> &str {
    local.split(separator).next().unwrap_or(local)
}

/// Validate a contact form submission.
pub fn validate_contact(payload: &Value) -> Result<NewContact, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let name = required_text(
        &mut errors,
        payload,
        "name",
        "Name",
        Bounds {
            min: 2,
            max: Some(100),
            message: "Name must be 2-100 characters",
        },
    );

    let email = match field(payload, "email") {
        Field::Invalid => {
            errors.push("email", "Email must be a string");
            None
        }
        Field::Missing => {
            errors.push("email", "Email is required");
            None
        }
        Field::Text(raw) => {
            let raw = raw.trim();
            if raw.is_empty() {
                errors.push("email", "Email is required");
                None
            } else {
                let normalized = is_valid_email(raw).then(|| normalize_email(raw)).flatten();
                if normalized.is_none() {
                    errors.push("email", "Please provide a valid email");
                }
                normalized
            }
        }
    };

    let subject = optional_text(
        &mut errors,
        payload,
        "subject",
        "Subject",
        Some((200, "Subject cannot exceed 200 characters")),
    );

    let message = required_text(
        &mut errors,
        payload,
        "message",
        "Message",
        Bounds {
            min: 10,
            max: Some(5000),
            message: "Message must be 10-5000 characters",
        },
    );

    errors.finish(|| NewContact {
        name: name.unwrap_or_default(),
        email: email.unwrap_or_default(),
        subject,
        message: message.unwrap_or_default(),
    })
}

/// Lowercase, trim, drop empties and repeats, keep first-seen order.
fn normalize_tags(items: &[Value]) -> Option<Vec<String>> {
    let mut tags: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        let tag = item.as_str()?.trim().to_lowercase();
        if !tag.is_empty() && !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    Some(tags)
}

/// Validate a post submission. Create and update share the same rules.
pub fn validate_post(payload: &Value) -> Result<PostDraft, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let title = required_text(
        &mut errors,
        payload,
        "title",
        "Title",
        Bounds {
            min: 5,
            max: Some(200),
            message: "Title must be 5-200 characters",
        },
    );

    let content = required_text(
        &mut errors,
        payload,
        "content",
        "Content",
        Bounds {
            min: 50,
            max: None,
            message: "Content must be at least 50 characters",
        },
    );

    let excerpt = optional_text(
        &mut errors,
        payload,
        "excerpt",
        "Excerpt",
        Some((500, "Excerpt cannot exceed 500 characters")),
    );

    let category: Option<Category> =
        optional_enum(&mut errors, payload, "category", "Invalid category");
    let status: Option<PostStatus> = optional_enum(&mut errors, payload, "status", "Invalid status");

    let tags = match payload.get("tags") {
        None | Some(Value::Null) => None,
        Some(Value::Array(items)) => match normalize_tags(items) {
            Some(tags) => Some(tags),
            None => {
                errors.push("tags", "Tags must be an array of strings");
                None
            }
        },
        Some(_) => {
            errors.push("tags", "Tags must be an array");
            None
        }
    };

    // An empty cover image is meaningful (it clears the image), so this is
    // not routed through `optional_text`.
    let cover_image = match field(payload, "coverImage") {
        Field::Missing => None,
        Field::Text(s) => Some(s.trim().to_string()),
        Field::Invalid => {
            errors.push("coverImage", "Cover image must be a string");
            None
        }
    };

    let featured = match payload.get("featured") {
        None | Some(Value::Null) => None,
        Some(Value::Bool(b)) => Some(*b),
        Some(_) => {
            errors.push("featured", "Featured must be a boolean");
            None
        }
    };

    errors.finish(|| PostDraft {
        title: title.unwrap_or_default(),
        content: content.unwrap_or_default(),
        excerpt,
        category,
        status,
        tags,
        cover_image,
        featured,
    })
}

/// Parse the `status` of a contact status update.
pub fn validate_contact_status(value: Option<&Value>) -> Result<ContactStatus, ValidationErrors> {
    value
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| {
            ValidationErrors::single(
                "status",
                "Status must be one of: new, read, replied, archived",
            )
        })
}

/// Parse an optional status filter from a query string.
pub fn parse_status_filter<T: FromStr>(raw: Option<&str>) -> Result<Option<T>, ValidationErrors> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s
            .parse()
            .map(Some)
            .map_err(|_| ValidationErrors::single("status", "Invalid status")),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn valid_contact() -> Value {
        json!({
            "name": "  Ada Lovelace ",
            "email": " Ada@Example.COM ",
            "subject": "Hi",
            "message": "  I would like to talk about engines.  "
        })
    }

    fn long_content() -> String {
        "Rust makes systems programming approachable and safe. ".repeat(3)
    }

    #[test]
    fn contact_is_trimmed_and_normalized() {
        let contact = validate_contact(&valid_contact()).unwrap();
        assert_eq!(contact.name, "Ada Lovelace");
        assert_eq!(contact.email, "ada@example.com");
        assert_eq!(contact.subject.as_deref(), Some("Hi"));
        assert_eq!(contact.message, "I would like to talk about engines.");
    }

    #[test]
    fn contact_reports_every_failing_field() {
        let errors = validate_contact(&json!({
            "name": "A",
            "email": "not-an-email",
            "subject": "x".repeat(201),
        }))
        .unwrap_err();

        let fields: Vec<&str> = errors.errors().iter().map(|e| e.field).collect();
        assert_eq!(fields, ["name", "email", "subject", "message"]);
        assert_eq!(errors.errors()[3].message, "Message is required");
    }

    #[test]
    fn short_message_is_rejected() {
        let mut payload = valid_contact();
        payload["message"] = json!("too short");
        let errors = validate_contact(&payload).unwrap_err();
        assert!(errors.has_field("message"));
        assert_eq!(errors.errors().len(), 1);
    }

    #[test]
    fn whitespace_only_name_is_missing() {
        let mut payload = valid_contact();
        payload["name"] = json!("    ");
        let errors = validate_contact(&payload).unwrap_err();
        assert_eq!(errors.errors()[0].message, "Name is required");
    }

    #[test]
    fn non_string_fields_are_rejected() {
        let mut payload = valid_contact();
        payload["name"] = json!(42);
        let errors = validate_contact(&payload).unwrap_err();
        assert_eq!(errors.errors()[0].message, "Name must be a string");
    }

    #[test]
    fn empty_subject_is_absent() {
        let mut payload = valid_contact();
        payload["subject"] = json!("   ");
        assert_eq!(validate_contact(&payload).unwrap().subject, None);
    }

    #[test]
    fn non_object_body_reports_required_fields() {
        let errors = validate_contact(&json!("hello")).unwrap_err();
        assert!(errors.has_field("name"));
        assert!(errors.has_field("email"));
        assert!(errors.has_field("message"));
    }

    #[test]
    fn gmail_addresses_are_canonicalized() {
        assert_eq!(
            normalize_email("John.Doe+news@GoogleMail.com").as_deref(),
            Some("johndoe@gmail.com")
        );
        assert_eq!(
            normalize_email("John.Doe+news@example.org").as_deref(),
            Some("john.doe+news@example.org")
        );
    }

    #[test]
    fn provider_subaddresses_are_dropped() {
        assert_eq!(normalize_email("a.b+x@Hotmail.com").as_deref(), Some("a.b@hotmail.com"));
        assert_eq!(normalize_email("a.b+x@live.co.uk").as_deref(), Some("a.b@live.co.uk"));
        assert_eq!(normalize_email("a.b+x@me.com").as_deref(), Some("a.b@me.com"));
        assert_eq!(normalize_email("first-last-promo@yahoo.com").as_deref(), Some("first-last@yahoo.com"));
        assert_eq!(normalize_email("plain@yahoo.com").as_deref(), Some("plain@yahoo.com"));
        assert_eq!(normalize_email("Ivan@ya.ru").as_deref(), Some("ivan@yandex.ru"));
    }

    #[test]
    fn empty_local_part_after_normalizing_is_invalid() {
        assert_eq!(normalize_email("+promo@gmail.com"), None);
        assert_eq!(normalize_email("...@gmail.com"), None);
        assert_eq!(normalize_email("+x@outlook.com"), None);

        for email in ["+promo@gmail.com", "...@googlemail.com"] {
            let mut payload = valid_contact();
            payload["email"] = json!(email);
            let errors = validate_contact(&payload).unwrap_err();
            assert_eq!(errors.errors().len(), 1);
            assert_eq!(errors.errors()[0].field, "email");
            assert_eq!(errors.errors()[0].message, "Please provide a valid email");
        }
    }

    #[test]
    fn email_syntax() {
        assert!(is_valid_email("a.b-c@sub.example.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@example.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email(&format!("{}@example.com", "a".repeat(65))));
    }

    #[test]
    fn post_accepts_full_payload() {
        let draft = validate_post(&json!({
            "title": " Hello World!!! ",
            "content": long_content(),
            "excerpt": "",
            "category": "Programming",
            "status": "published",
            "tags": [" Rust ", "rust", "Actix", ""],
            "coverImage": "/img/cover.png",
            "featured": true
        }))
        .unwrap();

        assert_eq!(draft.title, "Hello World!!!");
        assert_eq!(draft.excerpt, None);
        assert_eq!(draft.category, Some(Category::Programming));
        assert_eq!(draft.status, Some(PostStatus::Published));
        assert_eq!(draft.tags, Some(vec!["rust".to_string(), "actix".to_string()]));
        assert_eq!(draft.cover_image.as_deref(), Some("/img/cover.png"));
        assert_eq!(draft.featured, Some(true));
    }

    #[test]
    fn post_rejects_bad_enums_and_tags() {
        let errors = validate_post(&json!({
            "title": "Tiny",
            "content": "short",
            "excerpt": "e".repeat(501),
            "category": "Cooking",
            "status": "live",
            "tags": "rust",
            "featured": "yes"
        }))
        .unwrap_err();

        let fields: Vec<&str> = errors.errors().iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            ["title", "content", "excerpt", "category", "status", "tags", "featured"]
        );
        assert_eq!(errors.errors()[3].message, "Invalid category");
        assert_eq!(errors.errors()[5].message, "Tags must be an array");
    }

    #[test]
    fn contact_status_values() {
        assert_eq!(
            validate_contact_status(Some(&json!("replied"))),
            Ok(ContactStatus::Replied)
        );
        assert!(validate_contact_status(Some(&json!("bogus"))).unwrap_err().has_field("status"));
        assert!(validate_contact_status(None).is_err());
    }

    #[test]
    fn status_filter_parsing() {
        assert_eq!(parse_status_filter::<PostStatus>(None), Ok(None));
        assert_eq!(parse_status_filter::<PostStatus>(Some("")), Ok(None));
        assert_eq!(
            parse_status_filter::<PostStatus>(Some("draft")),
            Ok(Some(PostStatus::Draft))
        );
        assert!(parse_status_filter::<ContactStatus>(Some("draft")).is_err());
    }
}
