// Job applications: intake, storage, and reviewer decisions.
// Collaborators (store, uploader, mailer) are traits so each can be swapped.

pub mod handlers;
pub mod intake;
pub mod repository;
pub mod review;
pub mod transitions;
pub mod uploader;
pub mod validation;
pub mod views;
