//! Skills that ship with the runtime.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use cskills::builtin::register_builtin_skills;
//! use cskills::{SkillRegistry, StaticSkillConfig};
//!
//! let registry = SkillRegistry::new();
//! register_builtin_skills(&registry, Arc::new(StaticSkillConfig::new())).expect("built-ins");
//!
//! assert!(registry.has_handler("convert_units"));
//! assert!(registry.has_handler("generate_uuid"));
//! assert!(!registry.has_handler("save_note"));
//! ```
//!
//! Notes and reminders persist to a data directory and are registered separately
//! through [`register_data_skills`].

use std::sync::Arc;

pub use store::DataStore;

use crate::{SkillConfigSource, SkillDefinition, SkillError, SkillRegistry};

pub mod encoding;
pub mod ids;
pub mod notes;
pub mod password;
pub mod reminders;
mod store;
pub mod timezone;
pub mod units;
#[cfg(feature = "builtin-weather")]
pub mod weather;

/// Definitions of every built-in skill compiled into this build.
pub fn definitions() -> Vec<SkillDefinition> {
    let mut definitions = vec![
        units::definition(),
        encoding::encode_definition(),
        encoding::decode_definition(),
        encoding::hash_definition(),
        ids::definition(),
        password::definition(),
        timezone::definition(),
    ];
    #[cfg(feature = "builtin-weather")]
    definitions.push(weather::definition());
    definitions
}

pub fn register_builtin_skills(
    registry: &SkillRegistry,
    config: Arc<dyn SkillConfigSource>,
) -> Result<(), SkillError> {
    registry.register_skill(units::definition())?;
    registry.register_sync_fn(units::NAME, |args, _ctx| units::convert(&args));

    registry.register_skill(encoding::encode_definition())?;
    registry.register_sync_fn(encoding::ENCODE_NAME, |args, _ctx| encoding::encode(&args));

    registry.register_skill(encoding::decode_definition())?;
    registry.register_sync_fn(encoding::DECODE_NAME, |args, _ctx| encoding::decode(&args));

    registry.register_skill(encoding::hash_definition())?;
    registry.register_sync_fn(encoding::HASH_NAME, |args, _ctx| encoding::hash(&args));

    registry.register_skill(ids::definition())?;
    registry.register_sync_fn(ids::NAME, |_args, _ctx| ids::generate());

    registry.register_skill(password::definition())?;
    registry.register_sync_fn(password::NAME, |args, _ctx| password::generate(&args));

    registry.register_skill(timezone::definition())?;
    registry.register_sync_fn(timezone::NAME, |args, _ctx| timezone::convert(&args));

    #[cfg(feature = "builtin-weather")]
    registry.register(weather::definition(), weather::WeatherSkill::new(config))?;
    #[cfg(not(feature = "builtin-weather"))]
    drop(config);

    tracing::debug!(event = "builtin_skills_registered", count = definitions().len());
    Ok(())
}

/// Definitions of the skills that need a [`DataStore`].
pub fn data_definitions() -> Vec<SkillDefinition> {
    vec![
        notes::save_definition(),
        notes::get_definition(),
        notes::list_definition(),
        reminders::set_definition(),
        reminders::list_definition(),
    ]
}

pub fn register_data_skills(registry: &SkillRegistry, store: DataStore) -> Result<(), SkillError> {
    tracing::debug!(
        event = "data_skills_registering",
        count = data_definitions().len(),
        data_dir = %store.dir().display(),
    );

    registry.register_skill(notes::save_definition())?;
    let notes_store = store.clone();
    registry.register_sync_fn(notes::SAVE_NAME, move |args, _ctx| notes::save(&notes_store, &args));

    registry.register_skill(notes::get_definition())?;
    let notes_store = store.clone();
    registry.register_sync_fn(notes::GET_NAME, move |args, _ctx| notes::get(&notes_store, &args));

    registry.register_skill(notes::list_definition())?;
    let notes_store = store.clone();
    registry.register_sync_fn(notes::LIST_NAME, move |_args, _ctx| notes::list(&notes_store));

    registry.register_skill(reminders::set_definition())?;
    let reminder_store = store.clone();
    registry.register_sync_fn(reminders::SET_NAME, move |args, _ctx| {
        reminders::set(&reminder_store, &args)
    });

    registry.register_skill(reminders::list_definition())?;
    registry.register_sync_fn(reminders::LIST_NAME, move |_args, _ctx| reminders::list(&store));
    Ok(())
}
