//! Gateway failure classification.
//!
//! The gateway surfaces one canonical [`ClientError`], but the program
//! error code inside it can arrive several ways depending on the RPC
//! node: a structured custom code, a `custom program error: 0x<hex>`
//! message, an `InstructionErrorCustom(<n>)` message, or the error's
//! name rendered into the log text (`Error Code: AlreadyFinalized`).
//! The classifier tries them in that order and collapses everything
//! else into transient or unknown, so the orchestrator branches on a
//! closed set of outcomes.

use gavel_sdk::ClientError;

/// Program error code for a day that has already been settled.
pub const ALREADY_FINALIZED: u32 = 6003;

/// Program error code for settlement attempted before the day is over.
pub const TOO_EARLY: u32 = 6009;

/// Classified outcome of a failed gateway operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorOutcome {
    /// The program rejected the instruction with a custom error code.
    Program(u32),

    /// Network or RPC-level failure; worth a blind retry.
    Transient,

    /// Anything else. The original error carries the message for logs.
    Unknown,
}

impl ErrorOutcome {
    /// Returns true if this is the given program error code.
    #[must_use]
    pub fn is_program_error(self, code: u32) -> bool {
        self == Self::Program(code)
    }
}

/// Classifies a gateway error into an [`ErrorOutcome`].
#[must_use]
pub fn classify(error: &ClientError) -> ErrorOutcome {
    // Structured code first, then the textual fallbacks.
    if let Some(code) = error.custom_code() {
        return ErrorOutcome::Program(code);
    }

    let text = error.to_string();
    if let Some(code) = parse_hex_code(&text)
        .or_else(|| parse_instruction_error(&text))
        .or_else(|| parse_named_error(&text))
    {
        return ErrorOutcome::Program(code);
    }

    if error.is_transport() {
        return ErrorOutcome::Transient;
    }

    ErrorOutcome::Unknown
}

/// Parses `custom program error: 0x<hex>` out of an error message.
fn parse_hex_code(text: &str) -> Option<u32> {
    let rest = text.split("custom program error: 0x").nth(1)?;
    let hex = rest.split_whitespace().next()?;
    u32::from_str_radix(hex, 16).ok()
}

/// Parses `InstructionErrorCustom(<n>)` out of an error message.
fn parse_instruction_error(text: &str) -> Option<u32> {
    let rest = text.split("InstructionErrorCustom(").nth(1)?;
    let num = rest.split(')').next()?;
    num.parse().ok()
}

/// Recognizes a known error name rendered into the log text, as Anchor
/// does with `Error Code: <Name>`.
fn parse_named_error(text: &str) -> Option<u32> {
    const NAMED: &[(&str, u32)] = &[
        ("AlreadyFinalized", ALREADY_FINALIZED),
        ("TooEarly", TOO_EARLY),
    ];

    NAMED
        .iter()
        .find(|(name, _)| text.contains(name))
        .map(|&(_, code)| code)
}
