// ABOUTME: Validated domain types shared by the client and the CLI.
// ABOUTME: Session tokens and minion targeting modes.

mod target_type;
mod token;

pub use target_type::{TargetType, TargetTypeError};
pub use token::SessionToken;
