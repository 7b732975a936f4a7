// Copyright 2025 MindShow contributors
// SPDX-License-Identifier: Apache-2.0

//! Wire protocol frames
//!
//! Controllers speak JSON over a persistent websocket: `{"setVars": {...}}`
//! for variable updates and `{"activeProgramId": "..."}` for pattern
//! selection. Variable values are floats in [0, 1] unless the pattern's
//! own variable semantics say otherwise.

use serde::Serialize;

use mindshow_core::VariableSet;

use crate::error::LinkResult;

/// Variable update frame
#[derive(Debug, Serialize)]
pub struct SetVarsFrame<'a> {
    #[serde(rename = "setVars")]
    pub set_vars: &'a VariableSet,
}

/// Pattern selection frame
#[derive(Debug, Serialize)]
pub struct SetPatternFrame<'a> {
    #[serde(rename = "activeProgramId")]
    pub active_program_id: &'a str,
}

/// Encode a variable update as a text frame payload.
pub fn encode_set_vars(variables: &VariableSet) -> LinkResult<String> {
    Ok(serde_json::to_string(&SetVarsFrame {
        set_vars: variables,
    })?)
}

/// Encode a pattern switch as a text frame payload.
pub fn encode_set_pattern(pattern: &str) -> LinkResult<String> {
    Ok(serde_json::to_string(&SetPatternFrame {
        active_program_id: pattern,
    })?)
}
