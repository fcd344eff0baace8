pub mod email_service;
pub mod reference_data;
pub mod upload_service;
