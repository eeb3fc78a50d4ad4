//! Rendering of the "new contact" message sent to the site owner.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::Contact;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactNotification {
    pub reply_to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

impl ContactNotification {
    pub fn for_contact(contact: &Contact) -> Self {
        let subject_line = contact.subject.as_deref().unwrap_or("No Subject");
        let received = format_received(contact.created_at);

        let text = format!(
            "New Contact Form Submission\n\
             ===========================\n\n\
             From: {name}\n\
             Email: {email}\n\
             Subject: {subject}\n\n\
             Message:\n{message}\n\n\
             ---\n\
             Received: {received}\n",
            name = contact.name,
            email = contact.email,
            subject = subject_line,
            message = contact.message,
        );

        let html = format!(
            "<!DOCTYPE html>\n<html><body style=\"font-family: sans-serif; line-height: 1.6;\">\n\
             <h2>New Contact Form Submission</h2>\n\
             <p><strong>From:</strong> {name}</p>\n\
             <p><strong>Email:</strong> <a href=\"mailto:{email}\">{email}</a></p>\n\
             <p><strong>Subject:</strong> {subject}</p>\n\
             <div style=\"white-space: pre-wrap; border-left: 4px solid #00ffaa; padding: 12px;\">{message}</div>\n\
             <p style=\"color: #666; font-size: 12px;\">Received {received}</p>\n\
             </body></html>\n",
            name = escape_html(&contact.name),
            email = escape_html(&contact.email),
            subject = escape_html(subject_line),
            message = escape_html(&contact.message),
        );

        Self {
            reply_to: contact.email.clone(),
            subject: format!("New Contact: {subject_line} - from {}", contact.name),
            text,
            html,
        }
    }
}

fn format_received(at: DateTime<Utc>) -> String {
    at.format("%A, %B %-d, %Y %H:%M UTC").to_string()
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ClientOrigin, NewContact};

    fn contact(subject: Option<&str>) -> Contact {
        Contact::new(
            NewContact {
                name: "Eve <script>".into(),
                email: "eve@example.com".into(),
                subject: subject.map(String::from),
                message: "Hello & welcome, \"friend\"".into(),
            },
            ClientOrigin::default(),
        )
    }

    #[test]
    fn subject_falls_back() {
        let n = ContactNotification::for_contact(&contact(None));
        assert_eq!(n.subject, "New Contact: No Subject - from Eve <script>");
        assert_eq!(n.reply_to, "eve@example.com");
    }

    #[test]
    fn html_body_is_escaped() {
        let n = ContactNotification::for_contact(&contact(Some("Hi")));
        assert!(n.html.contains("Eve &lt;script&gt;"));
        assert!(n.html.contains("Hello &amp; welcome, &quot;friend&quot;"));
        assert!(!n.html.contains("<script>"));
        assert!(n.text.contains("Subject: Hi"));
    }
}
