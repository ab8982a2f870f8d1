use serde::Deserialize;

use crate::BlockId;

// Top-level blocks config file
#[derive(Deserialize, Debug, Clone, Default)]
pub struct BlocksConfig {
    #[serde(default)]
    pub blocks: Vec<BlockDef>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct BlockDef {
    pub name: String,
    // Defaults to the block's position in the list
    #[serde(default)]
    pub id: Option<BlockId>,
    // Defaults to true; only an explicit `solid = false` makes a block transparent to rays
    #[serde(default)]
    pub solid: Option<bool>,
}

impl BlockDef {
    pub fn new(name: impl Into<String>, id: Option<BlockId>, solid: Option<bool>) -> Self {
        Self {
            name: name.into(),
            id,
            solid,
        }
    }
}
