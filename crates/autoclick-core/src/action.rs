//! # Action Catalogue
//!
//! The closed set of automation steps a drawing can contain.
//!
//! Every kind maps to a fixed wire tag, a slot interface and a set of
//! default params. The mapping is static: there is no runtime registration,
//! so an unknown tag is detected by `ActionKind::from_tag` returning `None`.

use crate::types::{AutoclickError, Params, Size};
use serde_json::{Value, json};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// SLOTS
// =============================================================================

/// Data carried by a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    /// Control flow: "run the next step".
    Event,
    Boolean,
    Vec2,
}

/// One connection point on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub name: &'static str,
    pub kind: SlotKind,
}

const fn event(name: &'static str) -> Slot {
    Slot {
        name,
        kind: SlotKind::Event,
    }
}

const EVENT_IN: &[Slot] = &[event("")];
const EVENT_OUT: &[Slot] = &[event("")];
const FIND_IMAGE_OUT: &[Slot] = &[
    Slot {
        name: "found",
        kind: SlotKind::Boolean,
    },
    Slot {
        name: "position",
        kind: SlotKind::Vec2,
    },
];
const BRANCH_OUT: &[Slot] = &[event("true"), event("false")];

/// The input and output slots defined by an action kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotInterface {
    pub inputs: &'static [Slot],
    pub outputs: &'static [Slot],
}

impl SlotInterface {
    #[must_use]
    pub fn has_input(&self, slot: usize) -> bool {
        slot < self.inputs.len()
    }

    #[must_use]
    pub fn has_output(&self, slot: usize) -> bool {
        slot < self.outputs.len()
    }
}

// =============================================================================
// CATEGORY
// =============================================================================

/// Palette grouping of action kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Category {
    /// Mouse and keyboard steps.
    Action,
    /// Template-matching steps.
    Image,
    /// Flow control.
    Logic,
}

// =============================================================================
// ACTION KIND
// =============================================================================

/// An automation step type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ActionKind {
    Click,
    Move,
    Keyboard,
    Wait,
    MouseDown,
    MouseUp,
    MouseScroll,
    FindImage,
    ClickImage,
    FollowImage,
    Conditional,
}

impl ActionKind {
    /// Every kind, in palette order.
    pub const ALL: [ActionKind; 11] = [
        Self::Click,
        Self::Move,
        Self::Keyboard,
        Self::Wait,
        Self::MouseDown,
        Self::MouseUp,
        Self::MouseScroll,
        Self::FindImage,
        Self::ClickImage,
        Self::FollowImage,
        Self::Conditional,
    ];

    /// Look up a kind by its wire tag.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    /// The wire tag stored in `action_type`.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Move => "move",
            Self::Keyboard => "keyboard",
            Self::Wait => "wait",
            Self::MouseDown => "mousedown",
            Self::MouseUp => "mouseup",
            Self::MouseScroll => "mousescroll",
            Self::FindImage => "findimg",
            Self::ClickImage => "clickimg",
            Self::FollowImage => "followimg",
            Self::Conditional => "if",
        }
    }

    /// Default display title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Click => "Click",
            Self::Move => "Move",
            Self::Keyboard => "Keyboard",
            Self::Wait => "Wait",
            Self::MouseDown => "Mouse Down",
            Self::MouseUp => "Mouse Up",
            Self::MouseScroll => "Mouse Scroll",
            Self::FindImage => "Find Image",
            Self::ClickImage => "Click Image",
            Self::FollowImage => "Follow Image",
            Self::Conditional => "If",
        }
    }

    #[must_use]
    pub const fn category(self) -> Category {
        match self {
            Self::FindImage | Self::ClickImage | Self::FollowImage => Category::Image,
            Self::Conditional => Category::Logic,
            _ => Category::Action,
        }
    }

    /// The slots this kind exposes.
    #[must_use]
    pub const fn interface(self) -> SlotInterface {
        let outputs = match self {
            Self::FindImage => FIND_IMAGE_OUT,
            Self::Conditional => BRANCH_OUT,
            _ => EVENT_OUT,
        };
        SlotInterface {
            inputs: EVENT_IN,
            outputs,
        }
    }

    /// Size used when a node carries no override.
    #[must_use]
    pub fn default_size(self) -> Size {
        match self {
            Self::Conditional => Size::new(160.0, 140.0),
            _ => Size::default(),
        }
    }

    /// Default params for a freshly added node of this kind.
    #[must_use]
    pub fn defaults(self) -> Params {
        let pairs: Vec<(&str, Value)> = match self {
            Self::Click => vec![
                ("position_mode", json!("absolute")),
                ("x", json!(0)),
                ("y", json!(0)),
                ("x_random", json!(0)),
                ("y_random", json!(0)),
            ],
            Self::Move => vec![
                ("x", json!(0)),
                ("y", json!(0)),
                ("duration", json!(0.2)),
                ("duration_random", json!(0)),
                ("speed_factor", json!(1.0)),
                ("speed_random", json!(0)),
            ],
            Self::Keyboard => vec![
                ("text", json!("")),
                ("key", json!("")),
                ("input_type", json!("text")),
            ],
            Self::Wait => vec![("duration", json!(1.0))],
            Self::MouseDown | Self::MouseUp => vec![
                ("position_mode", json!("absolute")),
                ("x", json!(0)),
                ("y", json!(0)),
                ("button", json!("left")),
                ("x_random", json!(0)),
                ("y_random", json!(0)),
            ],
            Self::MouseScroll => vec![
                ("position_mode", json!("absolute")),
                ("x", json!(0)),
                ("y", json!(0)),
                ("direction", json!("up")),
                ("clicks", json!(3)),
                ("x_random", json!(0)),
                ("y_random", json!(0)),
            ],
            Self::FindImage | Self::FollowImage => {
                vec![("image_path", json!("")), ("confidence", json!(0.8))]
            }
            Self::ClickImage => vec![
                ("image_path", json!("")),
                ("confidence", json!(0.8)),
                ("x_random", json!(0)),
                ("y_random", json!(0)),
            ],
            Self::Conditional => vec![
                ("condition_type", json!("image_exists")),
                ("image_path", json!("")),
                ("target_node_id", json!("")),
                ("expected_result", json!("true")),
            ],
        };
        pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    /// A single default param, if the kind defines one for `key`.
    #[must_use]
    pub fn default_param(self, key: &str) -> Option<Value> {
        self.defaults().remove(key)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ActionKind {
    type Err = AutoclickError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s).ok_or_else(|| AutoclickError::UnknownActionType(s.to_string()))
    }
}
