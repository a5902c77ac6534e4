//! Script hash lookup and dep group decoding on top of the CKB types.

use crate::runtime::ScriptGroupType;
use crate::{DebuggerError, Result};
use ckb_jsonrpc_types::{OutPoint, Script, ScriptHashType};
use ckb_mock_tx_types::ReprMockTransaction;
use ckb_types::{packed, prelude::*, H256};
use std::fmt;
use std::str::FromStr;

pub use ckb_chain_spec::consensus::TYPE_ID_CODE_HASH;
pub use ckb_hash::blake2b_256;

/// Hash of a script in its JSON form.
pub fn calc_script_hash(script: &Script) -> H256 {
    packed::Script::from(script.clone()).calc_script_hash().unpack()
}

/// The Type ID script named `name`.
pub fn type_id_script(name: &str) -> Script {
    Script {
        code_hash: TYPE_ID_CODE_HASH,
        hash_type: ScriptHashType::Type,
        args: ckb_jsonrpc_types::JsonBytes::from_vec(name.as_bytes().to_vec()),
    }
}

/// `0x`-prefixed lowercase hex, the form engines accept for script hashes.
pub fn hash_hex(hash: &H256) -> String {
    format!("0x{}", hex::encode(hash.as_bytes()))
}

/// Out points listed in a dep group cell's data.
pub fn parse_dep_group_data(data: &[u8]) -> std::result::Result<Vec<OutPoint>, String> {
    if data.is_empty() {
        return Err("data is empty".to_string());
    }
    let out_points = packed::OutPointVec::from_slice(data).map_err(|e| e.to_string())?;
    if out_points.is_empty() {
        return Err("dep group is empty".to_string());
    }
    Ok(out_points.into_iter().map(OutPoint::from).collect())
}

/// Which side of the transaction a cell is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CellType {
    Input,
    Output,
}

impl fmt::Display for CellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellType::Input => f.write_str("input"),
            CellType::Output => f.write_str("output"),
        }
    }
}

impl FromStr for CellType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "input" => Ok(CellType::Input),
            "output" => Ok(CellType::Output),
            other => Err(format!("unknown cell type `{}`, expected `input` or `output`", other)),
        }
    }
}

/// Hash of the lock or type script of the `index`-th input or output.
pub fn script_hash_by_index(
    tx: &ReprMockTransaction,
    group: ScriptGroupType,
    cell_type: CellType,
    index: usize,
) -> Result<H256> {
    let output = match cell_type {
        CellType::Input => tx.mock_info.inputs.get(index).map(|input| &input.output),
        CellType::Output => tx.tx.outputs.get(index),
    }
    .ok_or_else(|| {
        DebuggerError::InvalidArguments(format!("{} cell index {} is out of range", cell_type, index))
    })?;

    let script = match group {
        ScriptGroupType::Lock => &output.lock,
        ScriptGroupType::Type => output.type_.as_ref().ok_or_else(|| {
            DebuggerError::InvalidArguments(format!(
                "{} cell {} has no type script",
                cell_type, index
            ))
        })?,
    };
    Ok(calc_script_hash(script))
}
