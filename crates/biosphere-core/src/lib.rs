//! # BioSphere core
//!
//! World saves on disk, the creature editor state and the gameplay session
//! the UI layer drives once per frame.

pub mod editor;
pub mod notice;
pub mod session;
pub mod world;

pub use editor::CreatureEditor;
pub use notice::{Notice, NoticeBoard, NoticeLevel};
pub use session::{GameSession, SessionConfig, SimulationState, TickReport};
pub use world::{Difficulty, NameError, StoreError, WorldSave, WorldStore};
