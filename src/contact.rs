//! Contact submission workflow: validate, persist, then notify.
//!
//! Success depends only on the store insert. E-mail dispatch happens after
//! the row is written and cannot turn a stored submission into a failure.

use std::sync::Arc;
use thiserror::Error;

use portfolio_core::contact::validate_contact;
use portfolio_core::models::{ContactForm, ContactSubmission};
use portfolio_core::store::ContactStore;
use portfolio_core::ValidationError;

use crate::config::MailConfig;
use crate::mailer::{dispatch_contact_emails, Mailer};

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("failed to store contact submission: {0}")]
    Store(anyhow::Error),
}

/// Everything the contact endpoint needs, injected at construction.
pub struct ContactService {
    store: Arc<dyn ContactStore>,
    mailer: Option<Arc<dyn Mailer>>,
    mail: MailConfig,
}

impl ContactService {
    pub fn new(
        store: Arc<dyn ContactStore>,
        mailer: Option<Arc<dyn Mailer>>,
        mail: MailConfig,
    ) -> Self {
        Self {
            store,
            mailer,
            mail,
        }
    }

    pub async fn submit(&self, form: ContactForm) -> Result<ContactSubmission, SubmitError> {
        let contact = validate_contact(form)?;

        let saved = self
            .store
            .insert(&contact)
            .await
            .map_err(SubmitError::Store)?;
        tracing::info!(contact_id = saved.id, "contact submission stored");

        if let Some(mailer) = &self.mailer {
            dispatch_contact_emails(mailer.clone(), &self.mail, &saved);
        }

        Ok(saved)
    }
}
