mod spirit;
mod stage;
mod variants;

pub use spirit::{message_for, MessageKind, ValueSpirit};
pub use stage::{progress_for, stage_for, ProgressionSnapshot, Stage, StageTable};
pub use variants::{random_variant, variant_by_id, MonsterVariant, MONSTER_VARIANTS, SPIRIT_STAGES};
