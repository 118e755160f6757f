//! Game handlers for the app-data payload.
//!
//! Each game that writes app data to an amiibo is identified by a 32-bit
//! AppID. A [`Game`] knows that game's payload layout: how to initialize it,
//! and which fields tools may expose as "cheats". Handlers are registered
//! explicitly in a [`GameRegistry`], keyed by AppID:
//!
//! ```
//! use amiikit::games::{CheatDescriptor, Game, GameRegistry};
//! use amiikit::tag::title::TitleId;
//!
//! struct Example;
//!
//! impl Game for Example {
//!     fn name(&self) -> &'static str { "Example" }
//!     fn app_id(&self) -> u32 { 0x0010_0000 }
//!     fn initialization_title_ids(&self) -> &'static [TitleId] {
//!         &[TitleId(0x0004_0000_0010_0000)]
//!     }
//!     fn initialize_app_data(&self, app_data: &mut [u8]) -> amiikit::Result<()> {
//!         app_data.fill(0);
//!         Ok(())
//!     }
//! }
//!
//! let mut registry = GameRegistry::new();
//! registry.register(0x0010_0000, || Box::new(Example))?;
//! assert_eq!(registry.resolve(0x0010_0000).unwrap().name(), "Example");
//! # Ok::<(), amiikit::Error>(())
//! ```

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, warn};

use crate::tag::title::TitleId;
use crate::{Error, Result};

/// How a tool should present an editable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheatKind {
    /// Integer within `[min, max]`.
    NumberSpinner,
    /// One of a fixed set of values.
    DropDown,
}

/// Metadata for one editable app-data field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheatDescriptor {
    /// Grouping shown by tools, e.g. `"General"`.
    pub section: &'static str,
    /// Field name; also the key passed to [`Game::cheat_value`].
    pub name: &'static str,
    pub kind: CheatKind,
    pub description: &'static str,
    pub min: u32,
    pub max: u32,
}

/// A game that owns the app-data payload of a tag.
pub trait Game {
    fn name(&self) -> &'static str;

    fn app_id(&self) -> u32;

    /// Title IDs that can initialize this game's app data. The first one is
    /// written to the tag by [`crate::tag::AmiiboTag::initialize_app_data`].
    fn initialization_title_ids(&self) -> &'static [TitleId];

    fn cheats(&self) -> &'static [CheatDescriptor] {
        &[]
    }

    /// Write a fresh payload into `app_data` (0xD8 bytes).
    fn initialize_app_data(&self, app_data: &mut [u8]) -> Result<()>;

    /// Read the cheat called `name` from `app_data`.
    fn cheat_value(&self, _app_data: &[u8], _name: &str) -> Option<u32> {
        None
    }

    /// Write the cheat called `name` into `app_data`.
    fn set_cheat_value(&self, _app_data: &mut [u8], _name: &str, _value: u32) -> Result<()> {
        Err(Error::Game("unsupported cheat"))
    }
}

/// Builds a fresh handler.
pub type GameFactory = fn() -> Box<dyn Game>;

/// AppID → handler factory.
#[derive(Default, Clone)]
pub struct GameRegistry {
    factories: HashMap<u32, GameFactory>,
}

impl GameRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` for `app_id`, replacing any earlier registration.
    ///
    /// Fails with [`Error::Game`] if the handler built by `factory` reports
    /// a different AppID.
    pub fn register(&mut self, app_id: u32, factory: GameFactory) -> Result<&mut Self> {
        let actual = factory().app_id();
        if actual != app_id {
            warn!(app_id, actual, "game handler registered under a foreign AppID");
            return Err(Error::Game("handler AppID does not match registration"));
        }
        if self.factories.insert(app_id, factory).is_some() {
            debug!(app_id, "replaced game handler");
        } else {
            debug!(app_id, "registered game handler");
        }
        Ok(self)
    }

    /// Instantiate the handler for `app_id`.
    pub fn resolve(&self, app_id: u32) -> Option<Box<dyn Game>> {
        self.factories.get(&app_id).map(|factory| factory())
    }

    /// Whether a handler is registered for `app_id`.
    pub fn contains(&self, app_id: u32) -> bool {
        self.factories.contains_key(&app_id)
    }

    /// Registered AppIDs, in ascending order.
    pub fn app_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.factories.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Whether no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for GameRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameRegistry")
            .field("app_ids", &self.app_ids())
            .finish()
    }
}
