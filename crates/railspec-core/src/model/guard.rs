//! Storage and API envelopes around a RAIL specification

use super::rail::RailSpec;

/// A named guard definition wrapping a RAIL spec
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guard {
    pub name: String,
    pub railspec: RailSpec,
    /// How many times the engine may re-ask the LLM after a failure
    pub num_reasks: Option<u32>,
}

impl Guard {
    pub fn new<N: Into<String>>(name: N, railspec: RailSpec) -> Self {
        Self {
            name: name.into(),
            railspec,
            num_reasks: None,
        }
    }

    pub fn with_num_reasks(mut self, num_reasks: u32) -> Self {
        self.num_reasks = Some(num_reasks);
        self
    }
}

/// A reusable, optionally public RAIL spec owned by a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RailspecTemplate {
    pub name: String,
    pub railspec: RailSpec,
    pub owner: Option<String>,
    pub is_public: Option<bool>,
}

impl RailspecTemplate {
    pub fn new<N: Into<String>>(name: N, railspec: RailSpec) -> Self {
        Self {
            name: name.into(),
            railspec,
            owner: None,
            is_public: None,
        }
    }

    /// Whether a given principal may read this template
    pub fn visible_to(&self, principal: &str) -> bool {
        self.is_public.unwrap_or(false) || self.owner.as_deref() == Some(principal)
    }
}
