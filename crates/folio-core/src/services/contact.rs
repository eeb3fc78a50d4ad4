//! Contact store: lifecycle of contact form submissions.

use std::sync::Arc;

use chrono::{DateTime, Local, NaiveTime, TimeZone, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::{ClientOrigin, Contact, ContactStats, ContactStatus};
use crate::error::{DomainError, RepoError};
use crate::notification::ContactNotification;
use crate::pagination::{Page, PageRequest};
use crate::ports::{ContactRepository, Notifier};
use crate::validation::{parse_status_filter, validate_contact, validate_contact_status};

const ENTITY: &str = "Contact";

pub struct ContactService {
    repo: Arc<dyn ContactRepository>,
    notifier: Arc<dyn Notifier>,
}

impl ContactService {
    pub fn new(repo: Arc<dyn ContactRepository>, notifier: Arc<dyn Notifier>) -> Self {
        Self { repo, notifier }
    }

    /// Validate and store a submission, then notify the owner in the background.
    pub async fn submit(&self, payload: &Value, origin: ClientOrigin) -> Result<Contact, DomainError> {
        let input = validate_contact(payload)?;
        let contact = self.repo.insert(Contact::new(input, origin)).await?;

        tracing::info!(
            contact_id = %contact.id,
            email = %contact.masked_email(),
            "Contact submitted"
        );

        self.dispatch(contact.clone());
        Ok(contact)
    }

    /// Fire-and-forget notification. Never awaited by the request path.
    fn dispatch(&self, contact: Contact) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(contact_id = %contact.id, "No runtime available, notification skipped");
            return;
        };
        let notifier = Arc::clone(&self.notifier);

        handle.spawn(async move {
            let notification = ContactNotification::for_contact(&contact);
            match notifier.send(&notification).await {
                Ok(()) => tracing::debug!(contact_id = %contact.id, "Contact notification sent"),
                Err(e) => tracing::warn!(
                    contact_id = %contact.id,
                    error = %e,
                    "Contact notification failed"
                ),
            }
        });
    }

    pub async fn list(
        &self,
        status: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<Contact>, DomainError> {
        let status = parse_status_filter::<ContactStatus>(status)?;
        Ok(self.repo.list(status, page).await?)
    }

    /// Fetch one contact. Reading has no side effects on its status.
    pub async fn get(&self, id: Uuid) -> Result<Contact, DomainError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(ENTITY, id))
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        status: Option<&Value>,
    ) -> Result<Contact, DomainError> {
        let status = validate_contact_status(status)?;
        let contact = self
            .repo
            .update_status(id, status)
            .await?
            .ok_or_else(|| DomainError::not_found(ENTITY, id))?;

        tracing::info!(contact_id = %id, status = %status, "Contact status updated");
        Ok(contact)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        match self.repo.delete(id).await {
            Ok(()) => {
                tracing::info!(contact_id = %id, "Contact deleted");
                Ok(())
            }
            Err(RepoError::NotFound) => Err(DomainError::not_found(ENTITY, id)),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn stats(&self) -> Result<ContactStats, DomainError> {
        Ok(self.repo.stats(start_of_local_day(Local::now())).await?)
    }
}

/// Midnight of `now`'s calendar day in server-local time, as UTC.
pub fn start_of_local_day(now: DateTime<Local>) -> DateTime<Utc> {
    let midnight = now.date_naive().and_time(NaiveTime::MIN);
    Local
        .from_local_datetime(&midnight)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or_else(|| midnight.and_utc())
}
