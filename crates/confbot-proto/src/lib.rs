//! # confbot-proto
//!
//! The text grammar spoken between operators and the conference bot, plus
//! the identity types the messaging engine hands to the bot.
//!
//! ## Features
//!
//! - Bounded command tokenizer with double-quote grouping
//! - Public key and friend address types with hex encoding
//! - Transport limits shared by the bot and its engine adapters
//!
//! ## Quick Start
//!
//! ```rust
//! use confbot_proto::tokenize;
//!
//! let tokens = tokenize("set-title 3 \"Weekly Sync\"").expect("valid line");
//! assert_eq!(tokens.len(), 3);
//! assert_eq!(tokens[2], "Weekly Sync");
//! assert!(tokens[2].is_quoted());
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod error;
pub mod key;
pub mod limits;
pub mod token;

pub use self::error::{KeyError, ParseError};
pub use self::key::{Address, PublicKey};
pub use self::limits::{
    ADDRESS_SIZE, MAX_MESSAGE_LENGTH, MAX_NAME_LENGTH, MAX_NUM_ARGS, MAX_PASSWORD_SIZE,
    MAX_STATUS_MESSAGE_LENGTH, PUBLIC_KEY_SIZE, clamp_str,
};
pub use self::token::{Token, tokenize};
