//=============================================
// kwenda/interpreter/errors.rs
//=============================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Driver-level error reporting
// Objective: Classify failures that stop a program before or around
//            evaluation under stable error codes
//=============================================

use thiserror::Error;

use crate::config::ConfigError;
use crate::modules::ModuleError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Syntax,
    ModuleResolution,
    Io,
    InvalidOperation,
    RuntimePanic,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Syntax => "E001",
            ErrorCode::ModuleResolution => "E002",
            ErrorCode::Io => "E003",
            ErrorCode::InvalidOperation => "E004",
            ErrorCode::RuntimePanic => "E005",
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("[{}] {message}", code.as_str())]
pub struct ScriptError {
    pub code: ErrorCode,
    pub message: String,
}

impl ScriptError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

impl From<ModuleError> for ScriptError {
    fn from(value: ModuleError) -> Self {
        let code = match value {
            ModuleError::Io { .. } => ErrorCode::Io,
            _ => ErrorCode::ModuleResolution,
        };
        ScriptError::new(code, value.to_string())
    }
}

impl From<ConfigError> for ScriptError {
    fn from(value: ConfigError) -> Self {
        ScriptError::new(ErrorCode::InvalidOperation, value.to_string())
    }
}


//=============================================
// End of file
//=============================================
