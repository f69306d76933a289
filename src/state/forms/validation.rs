//! Client-side input checks run before anything is sent

use crate::error::{UploadError, ValidationError};
use std::path::{Path, PathBuf};

/// Largest accepted image, 5 MiB
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

/// MIME types the prediction service accepts
pub const ACCEPTED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png"];

/// Symbols the password policy accepts (and requires one of)
pub const PASSWORD_SYMBOLS: &str = "@$!%*?&";

const MIN_PASSWORD_LEN: usize = 8;

/// Size and type of a candidate upload
pub trait FileDescriptor {
    fn size_bytes(&self) -> u64;
    fn mime_type(&self) -> &str;
}

/// An image chosen from disk. Only metadata is held; bytes are read at upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub file_name: String,
    pub size_bytes: u64,
    pub mime_type: String,
}

impl SelectedFile {
    /// Stat a file and guess its MIME type from the extension
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, UploadError> {
        let path = path.as_ref();
        let metadata =
            std::fs::metadata(path).map_err(|e| UploadError::Unreadable(e.to_string()))?;
        if !metadata.is_file() {
            return Err(UploadError::Unreadable(format!(
                "{} is not a file",
                path.display()
            )));
        }

        let mime_type = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or("application/octet-stream")
            .to_string();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        Ok(Self {
            path: path.to_path_buf(),
            file_name,
            size_bytes: metadata.len(),
            mime_type,
        })
    }
}

impl FileDescriptor for SelectedFile {
    fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    fn mime_type(&self) -> &str {
        &self.mime_type
    }
}

/// Reject oversized files first, then unsupported types
pub fn validate_file(file: &impl FileDescriptor) -> Result<(), UploadError> {
    if file.size_bytes() > MAX_IMAGE_BYTES {
        return Err(UploadError::TooLarge);
    }
    if !ACCEPTED_IMAGE_TYPES.contains(&file.mime_type()) {
        return Err(UploadError::InvalidType);
    }
    Ok(())
}

/// At least 8 characters drawn from letters, digits and `@$!%*?&`, with at
/// least one lowercase, one uppercase, one digit and one symbol.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let mut lower = false;
    let mut upper = false;
    let mut digit = false;
    let mut symbol = false;

    for c in password.chars() {
        match c {
            'a'..='z' => lower = true,
            'A'..='Z' => upper = true,
            '0'..='9' => digit = true,
            c if PASSWORD_SYMBOLS.contains(c) => symbol = true,
            _ => return Err(ValidationError::WeakPassword),
        }
    }

    if password.chars().count() >= MIN_PASSWORD_LEN && lower && upper && digit && symbol {
        Ok(())
    } else {
        Err(ValidationError::WeakPassword)
    }
}

/// Full registration check, in the order the user sees the fields
pub fn validate_registration(
    name: &str,
    email: &str,
    password: &str,
    confirm_password: &str,
) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::MissingField("Full name"));
    }
    validate_email(email)?;
    validate_password(password)?;
    if password != confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

/// Checks done before a login request
pub fn validate_login(email: &str, password: &str) -> Result<(), ValidationError> {
    validate_email(email)?;
    if password.is_empty() {
        return Err(ValidationError::MissingField("Password"));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::MissingField("Email"));
    }
    if !email.contains('@') {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}
