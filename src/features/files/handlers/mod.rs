mod file_handler;
mod upload_form;

pub use file_handler::*;
pub use upload_form::UploadForm;
