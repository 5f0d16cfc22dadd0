//! Wire format of the control channel.
//!
//! One exchange per connection, plain text, no response:
//!
//! ```text
//! line 1: <shared key>
//! line 2: <command>
//! ```
//!
//! Commands are `configure <name>=<value>`, `pause`, `resume` and `stop`.
//! Anything else decodes to [`Command::Continue`], a no-op that keeps the
//! listener running.

pub mod codec;
pub mod command;

pub use codec::{AuthFailure, decode, encode};
pub use command::Command;
