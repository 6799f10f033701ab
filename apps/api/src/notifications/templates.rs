// Email templates for review outcomes.
// Placeholders are replaced verbatim by `render`; keep them in braces.

use crate::applications::transitions::ReviewOutcome;

pub const ACCEPTED_SUBJECT: &str = "Your application for job {job_id} has been accepted";

pub const ACCEPTED_BODY: &str = "Hi {name},

Good news! {company} has reviewed your application for job {job_id} and would like to move forward with you.

Someone from the hiring team will reach out to {email} shortly with next steps.

Best regards,
{company}";

pub const REJECTED_SUBJECT: &str = "An update on your application for job {job_id}";

pub const REJECTED_BODY: &str = "Hi {name},

Thank you for your interest in job {job_id} and for the time you spent applying. After careful review, {company} has decided not to move forward with your application.

{encouragement}

Best regards,
{company}";

pub const ENCOURAGEMENT: &str = "This decision is not a reflection of your potential. We encourage you to keep building your skills and to apply for future openings that match your experience.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub body: String,
}

/// Values interpolated into a template.
pub struct TemplateVars<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub job_id: &'a str,
    pub company: &'a str,
}

pub fn render(outcome: ReviewOutcome, vars: &TemplateVars<'_>) -> RenderedEmail {
    let (subject, body) = match outcome {
        ReviewOutcome::Accepted => (ACCEPTED_SUBJECT, ACCEPTED_BODY),
        ReviewOutcome::Rejected => (REJECTED_SUBJECT, REJECTED_BODY),
    };
    RenderedEmail {
        subject: fill(subject, vars),
        body: fill(body, vars),
    }
}

fn fill(template: &str, vars: &TemplateVars<'_>) -> String {
    template
        .replace("{encouragement}", ENCOURAGEMENT)
        .replace("{name}", vars.name)
        .replace("{email}", vars.email)
        .replace("{job_id}", vars.job_id)
        .replace("{company}", vars.company)
}
