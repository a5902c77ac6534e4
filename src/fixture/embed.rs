//! Template expansion for hand-written fixtures.
//!
//! Fixtures may reference files and Type ID scripts instead of inlining them:
//!
//! | Marker | Replaced with |
//! |--------|---------------|
//! | `{{ data <path> }}` | hex of the file contents |
//! | `{{ hash <path> }}` | hex of the CKB blake2b-256 of the file contents |
//! | `{{ def_type <name> }}` | JSON of a Type ID script whose args are `<name>` |
//! | `{{ ref_type <name> }}` | hex of the hash of that Type ID script |
//!
//! Relative paths are resolved against the fixture's directory. Hex output
//! carries no `0x` prefix; the fixture supplies it.

use super::script_hash::{blake2b_256, calc_script_hash, type_id_script};
use crate::{DebuggerError, Result};
use ckb_types::H256;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

const DATA_PATTERN: &str = r"\{\{ ?data (.+?) ?\}\}";
const HASH_PATTERN: &str = r"\{\{ ?hash (.+?) ?\}\}";
const DEF_TYPE_PATTERN: &str = r"\{\{ ?def_type (.+?) ?\}\}";
const QUOTED_DEF_TYPE_PATTERN: &str = r#""?\{\{ ?def_type (.+?) ?\}\}"?"#;
const REF_TYPE_PATTERN: &str = r"\{\{ ?ref_type (.+?) ?\}\}";

/// True when `text` contains anything that looks like a template marker.
pub fn has_templates(text: &str) -> bool {
    text.contains("{{")
}

/// A fixture's text being expanded in place.
pub struct Embed {
    data: String,
    root: PathBuf,
    type_ids: HashMap<String, H256>,
}

impl Embed {
    /// `path` is the fixture's own location; its directory anchors relative
    /// file references.
    pub fn new(path: impl AsRef<Path>, data: String) -> Self {
        let root = path
            .as_ref()
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            data,
            root,
            type_ids: HashMap::new(),
        }
    }

    fn resolve(&self, reference: &str) -> PathBuf {
        let path = Path::new(reference);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    fn read(&self, reference: &str) -> Result<Vec<u8>> {
        let path = self.resolve(reference);
        std::fs::read(&path).map_err(|e| {
            DebuggerError::Fixture(format!("Read {} failed: {}", path.display(), e)).into()
        })
    }

    pub fn replace_data(&mut self) -> Result<&mut Self> {
        let regex = pattern(DATA_PATTERN)?;
        self.data = replace_each(&regex, &self.data, |caps| Ok(hex::encode(self.read(&caps[1])?)))?;
        Ok(self)
    }

    pub fn replace_hash(&mut self) -> Result<&mut Self> {
        let regex = pattern(HASH_PATTERN)?;
        self.data = replace_each(&regex, &self.data, |caps| {
            Ok(hex::encode(blake2b_256(self.read(&caps[1])?)))
        })?;
        Ok(self)
    }

    /// Record the script hash of every `def_type` name. Each name may be
    /// defined once.
    pub fn prelude_type_id(&mut self) -> Result<&mut Self> {
        let regex = pattern(DEF_TYPE_PATTERN)?;
        for caps in regex.captures_iter(&self.data) {
            let name = caps[1].to_string();
            if self.type_ids.contains_key(&name) {
                return Err(DebuggerError::Fixture(format!(
                    "Type ID `{}` is defined more than once",
                    name
                ))
                .into());
            }
            let hash = calc_script_hash(&type_id_script(&name));
            debug!("Type ID `{}` -> {}", name, hex::encode(hash.as_bytes()));
            self.type_ids.insert(name, hash);
        }
        Ok(self)
    }

    pub fn replace_def_type(&mut self) -> Result<&mut Self> {
        let regex = pattern(QUOTED_DEF_TYPE_PATTERN)?;
        self.data = replace_each(&regex, &self.data, |caps| {
            serde_json::to_string_pretty(&type_id_script(&caps[1])).map_err(|e| {
                DebuggerError::Fixture(format!("cannot render Type ID script: {}", e)).into()
            })
        })?;
        Ok(self)
    }

    pub fn replace_ref_type(&mut self) -> Result<&mut Self> {
        let regex = pattern(REF_TYPE_PATTERN)?;
        self.data = replace_each(&regex, &self.data, |caps| {
            self.type_ids
                .get(&caps[1])
                .map(|hash| hex::encode(hash.as_bytes()))
                .ok_or_else(|| {
                    DebuggerError::Fixture(format!("Type ID `{}` is referenced but never defined", &caps[1]))
                        .into()
                })
        })?;
        Ok(self)
    }

    /// Run every expansion in order and return the final text.
    pub fn replace_all(mut self) -> Result<String> {
        self.replace_data()?
            .replace_hash()?
            .prelude_type_id()?
            .replace_def_type()?
            .replace_ref_type()?;
        Ok(self.data)
    }
}

fn pattern(source: &str) -> Result<Regex> {
    Regex::new(source)
        .map_err(|e| DebuggerError::Fixture(format!("bad template pattern: {}", e)).into())
}

/// `Regex::replace_all` with a fallible replacement.
fn replace_each<F>(regex: &Regex, text: &str, mut replacement: F) -> Result<String>
where
    F: FnMut(&Captures<'_>) -> Result<String>,
{
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in regex.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&text[last..whole.start()]);
        out.push_str(&replacement(&caps)?);
        last = whole.end();
    }
    out.push_str(&text[last..]);
    Ok(out)
}
