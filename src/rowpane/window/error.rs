/*!
# Window Engine Error Handling

This module provides error handling for the window evaluation engine. All
engine operations return well-structured errors with the context needed to
identify the offending part of a window request.

## Error Categories

- **Key Errors**: References to columns that do not exist, or output column
  collisions
- **Frame Errors**: Malformed or inverted frame specifications
- **Type Errors**: Non-numeric columns used where a numeric one is required
- **Unsupported Function Errors**: Window function names the engine does not
  implement
- **Execution Errors**: Argument arity/value problems and internal invariant
  violations
- **Cancellation**: Parallel evaluation stopped by a cancellation handle

## Error Context

All errors include relevant context:
- Column names for key errors
- The rendered frame clause for frame errors
- Expected vs actual types for type errors
- The function name for unsupported-function errors

Configuration errors (`InvalidKey`, `InvalidFrame`, `TypeMismatch`,
`UnsupportedFunction`) are all raised while a request is validated and
planned, before any row is touched.
*/

use std::fmt;

/// Error types for window request validation and evaluation.
///
/// Each variant includes context specific to the error category, enabling
/// detailed error reporting without re-parsing the request.
///
/// # Examples
///
/// ```rust
/// use rowpane::rowpane::window::error::WindowError;
///
/// let key_err = WindowError::invalid_key("region", "column not found in schema");
/// assert!(key_err.to_string().contains("region"));
///
/// let type_err = WindowError::type_mismatch("INTEGER or FLOAT", "STRING", Some("category".to_string()));
/// assert!(type_err.to_string().contains("STRING"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum WindowError {
    /// A partition, order, argument, or output column reference is invalid.
    ///
    /// Raised when a request names a column absent from the schema, or when
    /// two computed columns (or a computed column and an input column) share
    /// a name.
    InvalidKey {
        /// The offending column name
        key: String,
        /// Description of why the reference is invalid
        message: String,
    },

    /// A frame specification is malformed.
    ///
    /// Raised for statically inverted bounds (start after end), RANGE offset
    /// frames over an unsupported ORDER BY shape, and frames that remain
    /// inverted after per-row clamping.
    InvalidFrame {
        /// Rendered frame clause, e.g. "ROWS BETWEEN 1 FOLLOWING AND 1 PRECEDING"
        frame: String,
        /// Description of the violation
        message: String,
    },

    /// A column has the wrong type for its role in the request.
    ///
    /// Raised for non-numeric aggregate arguments and non-numeric ORDER BY
    /// columns under RANGE offset frames.
    TypeMismatch {
        /// Expected data type description
        expected: String,
        /// Actual data type encountered
        actual: String,
        /// Name of the column that caused the mismatch, if applicable
        column: Option<String>,
    },

    /// The request names a window function the engine does not implement.
    UnsupportedFunction {
        /// The unrecognized function name as given
        function: String,
        /// Names the engine does support
        supported: &'static str,
    },

    /// Runtime errors during window evaluation.
    ///
    /// Covers argument arity/value problems detected during planning and
    /// internal invariant violations; includes the call rendering when one
    /// is available.
    ExecutionError {
        /// Description of the failure
        message: String,
        /// The window call that caused the error, if available
        call: Option<String>,
    },

    /// Parallel evaluation was stopped by its cancellation handle.
    Cancelled,
}

impl fmt::Display for WindowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowError::InvalidKey { key, message } => {
                write!(f, "Invalid key '{}': {}", key, message)
            }
            WindowError::InvalidFrame { frame, message } => {
                write!(f, "Invalid frame '{}': {}", frame, message)
            }
            WindowError::TypeMismatch {
                expected,
                actual,
                column,
            } => {
                if let Some(col) = column {
                    write!(
                        f,
                        "Type mismatch for column '{}': expected {}, got {}",
                        col, expected, actual
                    )
                } else {
                    write!(f, "Type mismatch: expected {}, got {}", expected, actual)
                }
            }
            WindowError::UnsupportedFunction {
                function,
                supported,
            } => {
                write!(
                    f,
                    "Unsupported window function: '{}'. Supported window functions are: {}",
                    function, supported
                )
            }
            WindowError::ExecutionError { message, call } => {
                if let Some(c) = call {
                    write!(f, "Window execution error in '{}': {}", c, message)
                } else {
                    write!(f, "Window execution error: {}", message)
                }
            }
            WindowError::Cancelled => {
                write!(f, "Window evaluation cancelled")
            }
        }
    }
}

impl std::error::Error for WindowError {}

impl WindowError {
    /// Create an invalid key error
    pub fn invalid_key(key: impl Into<String>, message: impl Into<String>) -> Self {
        WindowError::InvalidKey {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create an invalid frame error
    pub fn invalid_frame(frame: impl Into<String>, message: impl Into<String>) -> Self {
        WindowError::InvalidFrame {
            frame: frame.into(),
            message: message.into(),
        }
    }

    /// Create a type mismatch error
    pub fn type_mismatch(
        expected: impl Into<String>,
        actual: impl Into<String>,
        column: Option<String>,
    ) -> Self {
        WindowError::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
            column,
        }
    }

    /// Create an execution error
    pub fn execution_error(message: impl Into<String>, call: Option<String>) -> Self {
        WindowError::ExecutionError {
            message: message.into(),
            call,
        }
    }
}

/// Result type for window engine operations
pub type WindowResult<T> = Result<T, WindowError>;
