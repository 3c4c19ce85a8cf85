use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------- registers.yaml ----------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegisterMap {
    pub blocks: BTreeMap<String, Block>,
    #[serde(default)]
    pub memory: BTreeMap<String, u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub base_address: u32,
    #[serde(default)]
    pub registers: Vec<RegisterDef>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegisterDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub byte_offset: u32,
    /// Rust path of the word type, e.g. `crate::cgu::Pll1Ctrl` or `u32`.
    pub fieldset: String,
    #[serde(default)]
    pub access: Access,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Access {
    #[default]
    ReadWrite,
    Read,
    Write,
}

// ---------- pinmux.yaml ----------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pinmux {
    pub spifi: Vec<PinmuxPin>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PinmuxPin {
    /// `P<port>_<pin>`, e.g. `P3_3`.
    pub pin: String,
    pub signal: String,
    pub function: u8,
}

impl PinmuxPin {
    /// Split `P3_8` into `(3, 8)`.
    pub fn port_and_pin(&self) -> Option<(u32, u32)> {
        let rest = self.pin.strip_prefix('P')?;
        let (port, pin) = rest.split_once('_')?;
        let port = u32::from_str_radix(port, 16).ok()?;
        let pin = pin.parse().ok()?;
        Some((port, pin))
    }
}
