use thiserror::Error;

/// Largest structure file accepted for upload (10 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;
pub const ACCEPTED_EXTENSION: &str = ".cif";

/// Input rejected before any remote call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Only .cif files are accepted")]
    WrongExtension,
    #[error("File exceeds 10MB limit")]
    TooLarge,
    #[error("Please select a .cif file first")]
    NoFileSelected,
    #[error("Please enter a prompt")]
    EmptyPrompt,
}

pub fn validate_upload(name: &str, size: u64) -> Result<(), InputError> {
    if !name.to_lowercase().ends_with(ACCEPTED_EXTENSION) {
        return Err(InputError::WrongExtension);
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(InputError::TooLarge);
    }
    Ok(())
}

/// Returns the trimmed prompt, or an error when nothing is left.
pub fn validate_prompt(prompt: &str) -> Result<&str, InputError> {
    let trimmed = prompt.trim();
    if trimmed.is_empty() {
        Err(InputError::EmptyPrompt)
    } else {
        Ok(trimmed)
    }
}

/// Human-readable size, e.g. `1.50 KB`.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 B".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.2} {}", UNITS[unit])
}
