//! World management: save model, name rules, on-disk store

pub mod name;
pub mod save;
pub mod store;

pub use name::{sanitize_file_stem, validate_world_name, NameError, MAX_NAME_LEN, MIN_NAME_LEN};
pub use save::{Difficulty, SaveFormatError, WorldSave, SAVE_FORMAT_VERSION};
pub use store::{StoreError, WorldStore};
