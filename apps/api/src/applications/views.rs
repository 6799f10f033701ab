//! Read path: applications joined with applicant contact details for display.
//! The repository only stores references; the join happens here.

use std::collections::HashMap;

use serde::Serialize;

use crate::applications::repository::{ApplicantDirectory, RepositoryError};
use crate::models::application::Application;
use crate::models::user::ApplicantContact;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationView {
    #[serde(flatten)]
    pub application: Application,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicant: Option<ApplicantContact>,
}

/// Attaches contact details to each application, looking up every distinct
/// applicant once. Unknown applicants are left without contact details.
pub async fn enrich(
    directory: &dyn ApplicantDirectory,
    applications: Vec<Application>,
) -> Result<Vec<ApplicationView>, RepositoryError> {
    let mut contacts: HashMap<String, Option<ApplicantContact>> = HashMap::new();
    for app in &applications {
        if !contacts.contains_key(&app.applicant_id) {
            let contact = directory.find(&app.applicant_id).await?;
            contacts.insert(app.applicant_id.clone(), contact);
        }
    }

    Ok(applications
        .into_iter()
        .map(|application| {
            let applicant = contacts.get(&application.applicant_id).cloned().flatten();
            ApplicationView {
                application,
                applicant,
            }
        })
        .collect())
}
