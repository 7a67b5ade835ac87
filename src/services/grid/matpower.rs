//! Minimal MATPOWER case reader.
//!
//! Only the numeric `mpc.bus`, `mpc.gen` and `mpc.branch` matrices are read.
//! Column positions follow the MATPOWER case format (0-based here).

use regex::Regex;

use super::GridDataError;

pub mod bus {
    pub const BUS_I: usize = 0;
    pub const PD: usize = 2;
    pub const BASE_KV: usize = 9;
    pub const BUS_AREA: usize = 6;
}

pub mod generator {
    pub const GEN_BUS: usize = 0;
    pub const PMAX: usize = 8;
}

pub mod branch {
    pub const F_BUS: usize = 0;
    pub const T_BUS: usize = 1;
    pub const BR_X: usize = 3;
    pub const RATE_A: usize = 5;
}

/// Numeric matrices of a MATPOWER case.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatpowerCase {
    pub bus: Vec<Vec<f64>>,
    pub gen: Vec<Vec<f64>>,
    pub branch: Vec<Vec<f64>>,
}

impl MatpowerCase {
    pub fn parse(text: &str) -> Result<Self, GridDataError> {
        Ok(Self {
            bus: parse_matrix(text, "bus")?,
            gen: parse_matrix(text, "gen")?,
            branch: parse_matrix(text, "branch")?,
        })
    }
}

/// Parse the matrix assigned to `mpc.<name> = [ ... ];`.
pub fn parse_matrix(text: &str, name: &str) -> Result<Vec<Vec<f64>>, GridDataError> {
    let re = Regex::new(&format!(r"(?s)mpc\.{}\s*=\s*\[(.*?)\]\s*;", regex::escape(name)))?;
    let body = re
        .captures(text)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| GridDataError::MissingMatrix(name.to_string()))?
        .as_str();

    let mut rows = Vec::new();
    for line in body.lines() {
        let line = line.split('%').next().unwrap_or("");
        for segment in line.split(';') {
            let values = segment
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|t| !t.is_empty())
                .map(|t| {
                    t.parse::<f64>().map_err(|_| GridDataError::Parse {
                        context: format!("mpc.{}", name),
                        value: t.to_string(),
                    })
                })
                .collect::<Result<Vec<f64>, _>>()?;
            if !values.is_empty() {
                rows.push(values);
            }
        }
    }

    Ok(rows)
}

/// Column value or `default` when the row is short.
pub fn column(row: &[f64], idx: usize, default: f64) -> f64 {
    row.get(idx).copied().unwrap_or(default)
}
