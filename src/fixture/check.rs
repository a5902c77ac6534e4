//! Structural consistency check of a mock transaction.
//!
//! Catches the usual hand-editing mistakes before the engine sees a fixture:
//! cell deps without mock data, inputs out of sync with their mock cells,
//! and header deps without mock headers.

use super::script_hash::{hash_hex, parse_dep_group_data};
use crate::{DebuggerError, Result};
use ckb_jsonrpc_types::{CellDep, DepType};
use ckb_mock_tx_types::ReprMockTransaction;
use ckb_types::{packed, prelude::*};

/// Verify that `tx.mock_info` covers exactly what `tx.tx` references.
pub fn check(tx: &ReprMockTransaction) -> Result<()> {
    check_cell_deps(tx)?;
    check_inputs(tx)?;
    if tx.mock_info.header_deps.len() != tx.tx.header_deps.len() {
        return Err(pre_check(format!(
            "{} mock header deps for {} transaction header deps",
            tx.mock_info.header_deps.len(),
            tx.tx.header_deps.len()
        )));
    }
    Ok(())
}

fn pre_check(msg: String) -> anyhow::Error {
    DebuggerError::PreCheck(msg).into()
}

/// Every dep group expands into `code` deps for each out point it lists; the
/// expanded transaction deps must equal the mock deps as a multiset.
fn check_cell_deps(tx: &ReprMockTransaction) -> Result<()> {
    let mut mock_cell_deps: Vec<CellDep> =
        tx.mock_info.cell_deps.iter().map(|dep| dep.cell_dep.clone()).collect();
    let mut cell_deps: Vec<CellDep> = tx.tx.cell_deps.clone();

    for dep in &tx.mock_info.cell_deps {
        if dep.cell_dep.dep_type != DepType::DepGroup {
            continue;
        }
        let out_points = parse_dep_group_data(dep.data.as_bytes()).map_err(|e| {
            pre_check(format!(
                "dep group {}#{} has invalid data: {}",
                hash_hex(&dep.cell_dep.out_point.tx_hash),
                dep.cell_dep.out_point.index.value(),
                e
            ))
        })?;
        cell_deps.extend(out_points.into_iter().map(|out_point| CellDep {
            out_point,
            dep_type: DepType::Code,
        }));
    }

    mock_cell_deps.sort_by_cached_key(molecule_bytes);
    cell_deps.sort_by_cached_key(molecule_bytes);

    if mock_cell_deps.len() != cell_deps.len() {
        return Err(pre_check(format!(
            "{} mock cell deps for {} transaction cell deps (dep groups expanded)",
            mock_cell_deps.len(),
            cell_deps.len()
        )));
    }
    for (mock, actual) in mock_cell_deps.iter().zip(cell_deps.iter()) {
        if mock != actual {
            return Err(pre_check(format!("CellDeps {:?} != {:?}", mock, actual)));
        }
    }
    Ok(())
}

/// Ordering key for cell deps: their binary encoding.
fn molecule_bytes(dep: &CellDep) -> Vec<u8> {
    packed::CellDep::from(dep.clone()).as_slice().to_vec()
}

fn check_inputs(tx: &ReprMockTransaction) -> Result<()> {
    if tx.mock_info.inputs.len() != tx.tx.inputs.len() {
        return Err(pre_check(format!(
            "{} mock inputs for {} transaction inputs",
            tx.mock_info.inputs.len(),
            tx.tx.inputs.len()
        )));
    }
    for (index, (mock, input)) in tx.mock_info.inputs.iter().zip(&tx.tx.inputs).enumerate() {
        if &mock.input != input {
            return Err(pre_check(format!("inputs at index {} is mismatched", index)));
        }
    }
    Ok(())
}
