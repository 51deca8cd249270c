//! World name rules and file-name mapping

use thiserror::Error;

pub const MIN_NAME_LEN: usize = 2;
pub const MAX_NAME_LEN: usize = 15;

/// Reasons a world name is refused. Display text is shown to the player.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("Please enter a world name.")]
    Empty,

    #[error("World name must be at least {} characters.", MIN_NAME_LEN)]
    TooShort,

    #[error("World name must be at most {} characters.", MAX_NAME_LEN)]
    TooLong,

    #[error("A world named \"{0}\" already exists.")]
    Duplicate(String),
}

/// Check a candidate name against length rules and the existing world names.
///
/// Length is counted in characters after trimming surrounding whitespace.
/// Duplicates are detected on the file name they would map to, ignoring case,
/// so two names can never collide on disk.
pub fn validate_world_name<'a, I>(name: &str, existing: I) -> Result<(), NameError>
where
    I: IntoIterator<Item = &'a str>,
{
    let trimmed = name.trim();
    let len = trimmed.chars().count();

    if len == 0 {
        return Err(NameError::Empty);
    }
    if len < MIN_NAME_LEN {
        return Err(NameError::TooShort);
    }
    if len > MAX_NAME_LEN {
        return Err(NameError::TooLong);
    }

    let stem = sanitize_file_stem(trimmed).to_lowercase();
    if let Some(taken) = existing
        .into_iter()
        .find(|other| sanitize_file_stem(other.trim()).to_lowercase() == stem)
    {
        return Err(NameError::Duplicate(taken.to_string()));
    }

    Ok(())
}

/// Map a world name to a safe file stem.
///
/// Path separators, characters reserved on common filesystems and control
/// characters become `_`. Leading dots are replaced so the file is never hidden.
pub fn sanitize_file_stem(name: &str) -> String {
    const RESERVED: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

    name.chars()
        .enumerate()
        .map(|(i, c)| {
            if RESERVED.contains(&c) || c.is_control() || (i == 0 && c == '.') {
                '_'
            } else {
                c
            }
        })
        .collect()
}
