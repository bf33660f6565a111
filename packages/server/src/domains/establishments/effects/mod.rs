pub mod lifecycle;

pub use lifecycle::{
    archive, create_establishment, get_establishment, list_by_partner, list_pending_moderation,
    moderate, submit_for_moderation, suspend, unsuspend, update_establishment, ModerationAction,
};
