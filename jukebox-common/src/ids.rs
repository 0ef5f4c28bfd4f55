//! Identifier newtypes
//!
//! Sessions, voice channels, chat messages and users are all identified by
//! opaque 64-bit snowflakes handed to us by the chat platform. Wrapping them
//! keeps a message id from ever being passed where a session id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! snowflake_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Raw snowflake value
            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<u64>().map(Self)
            }
        }
    };
}

snowflake_id!(
    /// Playback session (one per guild / hosting voice context)
    SessionId
);

snowflake_id!(
    /// Voice channel a session streams into
    ChannelId
);

snowflake_id!(
    /// Posted chat message (the now-playing display)
    MessageId
);

snowflake_id!(
    /// Chat user (requesters, reactors, and the bot itself)
    UserId
);
