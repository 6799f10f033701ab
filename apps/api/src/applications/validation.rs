//! Intake validation — pure checks over a raw multipart submission.
//!
//! Runs before any network call. The first failing rule is reported, in the
//! order: applicant, location, skills, years of experience, rating, resume.

use std::collections::HashMap;

use bytes::Bytes;
use thiserror::Error;

/// Multipart field names accepted by `POST /applications/:job_id`.
pub const FIELD_APPLICANT: &str = "appliedBy";
pub const FIELD_LOCATION: &str = "userLocation";
pub const FIELD_SKILLS: &str = "skills";
pub const FIELD_EXPERIENCE: &str = "yearOfExperience";
pub const FIELD_RATING: &str = "rating";
pub const FIELD_PROFILE_IMAGE: &str = "userProfileImage";
pub const FIELD_RESUME: &str = "resume";
pub const FIELD_JOB: &str = "jobId";

pub const MAX_RATING: f64 = 5.0;

/// An uploaded file part as received from the client.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl FileUpload {
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Submission exactly as the transport delivered it.
#[derive(Debug, Clone, Default)]
pub struct RawSubmission {
    pub job_id: String,
    pub fields: HashMap<String, String>,
    pub resume: Option<FileUpload>,
    pub profile_image: Option<FileUpload>,
}

/// Submission that passed every intake rule.
#[derive(Debug, Clone)]
pub struct ValidatedSubmission {
    pub applicant_id: String,
    pub job_id: String,
    pub location: String,
    pub skills: Vec<String>,
    pub years_of_experience: f64,
    pub rating: f64,
    pub resume: FileUpload,
    pub profile_image: Option<FileUpload>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Missing { field: &'static str },

    #[error("{field} {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("resume file is required")]
    MissingResume,

    #[error("malformed multipart body: {0}")]
    Malformed(String),
}

impl ValidationError {
    /// Name of the offending field, as the client sent it.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Missing { field } | ValidationError::Invalid { field, .. } => field,
            ValidationError::MissingResume => FIELD_RESUME,
            ValidationError::Malformed(_) => "body",
        }
    }
}

pub fn validate(raw: RawSubmission) -> Result<ValidatedSubmission, ValidationError> {
    let RawSubmission {
        job_id,
        fields,
        resume,
        profile_image,
    } = raw;

    let job_id = job_id.trim().to_string();
    if job_id.is_empty() {
        return Err(ValidationError::Missing { field: FIELD_JOB });
    }

    let applicant_id = required(&fields, FIELD_APPLICANT)?.to_string();
    let location = required(&fields, FIELD_LOCATION)?.to_string();

    let skills = parse_skills(required(&fields, FIELD_SKILLS)?);
    if skills.is_empty() {
        return Err(ValidationError::Invalid {
            field: FIELD_SKILLS,
            reason: "must contain at least one non-empty entry".to_string(),
        });
    }

    let years_of_experience = parse_number(&fields, FIELD_EXPERIENCE)?;
    if years_of_experience < 0.0 {
        return Err(ValidationError::Invalid {
            field: FIELD_EXPERIENCE,
            reason: "must be zero or greater".to_string(),
        });
    }

    let rating = parse_number(&fields, FIELD_RATING)?;
    if !(0.0..=MAX_RATING).contains(&rating) {
        return Err(ValidationError::Invalid {
            field: FIELD_RATING,
            reason: format!("must be between 0 and {MAX_RATING}"),
        });
    }

    let resume = match resume {
        Some(file) if !file.is_empty() => file,
        _ => return Err(ValidationError::MissingResume),
    };

    // An empty image part is what browsers send for an untouched file input.
    let profile_image = profile_image.filter(|f| !f.is_empty() && !f.file_name.trim().is_empty());

    Ok(ValidatedSubmission {
        applicant_id,
        job_id,
        location,
        skills,
        years_of_experience,
        rating,
        resume,
        profile_image,
    })
}

/// Splits a comma-separated skills string, trimming and dropping empty tokens.
pub fn parse_skills(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn required<'a>(
    fields: &'a HashMap<String, String>,
    field: &'static str,
) -> Result<&'a str, ValidationError> {
    fields
        .get(field)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .ok_or(ValidationError::Missing { field })
}

fn parse_number(
    fields: &HashMap<String, String>,
    field: &'static str,
) -> Result<f64, ValidationError> {
    let raw = required(fields, field)?;
    match raw.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(n),
        _ => Err(ValidationError::Invalid {
            field,
            reason: format!("must be a number, got '{raw}'"),
        }),
    }
}
