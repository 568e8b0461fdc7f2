//! SurrealDB repository implementations.

mod achievement;
mod category;
mod counseling;
mod permit;
mod roster;
mod support;
mod violation;

pub use achievement::SurrealAchievementRepository;
pub use category::SurrealViolationCategoryRepository;
pub use counseling::SurrealCounselingNoteRepository;
pub use permit::SurrealPermitRepository;
pub use roster::SurrealRosterDirectory;
pub use violation::SurrealViolationRepository;
