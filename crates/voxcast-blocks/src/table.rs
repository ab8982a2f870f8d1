use std::error::Error;
use std::fs;
use std::path::Path;

use hashbrown::HashMap;

use super::BlockId;
use super::config::BlocksConfig;

/// Lookup table `block id -> solid`, read-only during traversal.
///
/// Ids past the end of the table are empty. Named entries are only present when
/// the table was built from a [`BlocksConfig`].
#[derive(Default, Clone, Debug)]
pub struct OccupancyTable {
    solid: Vec<bool>,
    by_name: HashMap<String, BlockId>,
}

impl OccupancyTable {
    pub fn new() -> Self {
        Self {
            solid: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    pub fn from_flags(solid: Vec<bool>) -> Self {
        Self {
            solid,
            by_name: HashMap::new(),
        }
    }

    /// Byte-per-entry table, any non-zero byte is solid.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::from_flags(bytes.iter().map(|b| *b != 0).collect())
    }

    #[inline]
    pub fn is_solid(&self, id: BlockId) -> bool {
        self.solid.get(id as usize).copied().unwrap_or(false)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.solid.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.solid.is_empty()
    }

    pub fn set_solid(&mut self, id: BlockId, solid: bool) {
        if self.solid.len() <= id as usize {
            self.solid.resize(id as usize + 1, false);
        }
        self.solid[id as usize] = solid;
    }

    pub fn id_by_name(&self, name: &str) -> Option<BlockId> {
        self.by_name.get(name).copied()
    }

    pub fn solid_count(&self) -> usize {
        self.solid.iter().filter(|s| **s).count()
    }

    pub fn as_flags(&self) -> &[bool] {
        &self.solid
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: BlocksConfig = toml::from_str(toml_str)?;
        Self::from_config(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    pub fn from_config(cfg: BlocksConfig) -> Result<Self, Box<dyn Error>> {
        let mut table = OccupancyTable::new();
        let mut defined: Vec<bool> = Vec::new();
        for (pos, def) in cfg.blocks.into_iter().enumerate() {
            let id = match def.id {
                Some(id) => id,
                None => BlockId::try_from(pos)
                    .map_err(|_| format!("block `{}` at position {pos} has no u16 id", def.name))?,
            };
            if defined.len() <= id as usize {
                defined.resize(id as usize + 1, false);
            }
            if defined[id as usize] {
                return Err(format!("duplicate block id {id} (`{}`)", def.name).into());
            }
            if table.by_name.contains_key(&def.name) {
                return Err(format!("duplicate block name `{}`", def.name).into());
            }
            defined[id as usize] = true;
            table.set_solid(id, def.solid.unwrap_or(true));
            table.by_name.insert(def.name, id);
        }
        log::debug!(
            "occupancy table: {} ids, {} solid",
            table.len(),
            table.solid_count()
        );
        Ok(table)
    }
}
