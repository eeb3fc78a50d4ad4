//! Contact entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use folio_core::domain::Contact;
use folio_core::error::RepoError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "contacts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    pub status: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Contact {
    type Error = RepoError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let status = model
            .status
            .parse()
            .map_err(|e| RepoError::Corrupt(format!("contact {}: {e}", model.id)))?;

        Ok(Self {
            id: model.id,
            name: model.name,
            email: model.email,
            subject: model.subject,
            message: model.message,
            status,
            ip_address: model.ip_address,
            user_agent: model.user_agent,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        })
    }
}

impl From<Contact> for ActiveModel {
    fn from(contact: Contact) -> Self {
        Self {
            id: Set(contact.id),
            name: Set(contact.name),
            email: Set(contact.email),
            subject: Set(contact.subject),
            message: Set(contact.message),
            status: Set(contact.status.to_string()),
            ip_address: Set(contact.ip_address),
            user_agent: Set(contact.user_agent),
            created_at: Set(contact.created_at.into()),
            updated_at: Set(contact.updated_at.into()),
        }
    }
}
