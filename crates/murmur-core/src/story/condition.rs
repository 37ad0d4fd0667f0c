//! Guard predicates for choices and endings.

use serde::{Deserialize, Serialize};

use crate::state::PlayState;

/// A predicate evaluated against the play state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum Condition {
    /// Check if a flag is set to true.
    FlagSet {
        /// Flag key.
        flag: String,
    },
    /// Check if a flag is unset or false.
    FlagUnset {
        /// Flag key.
        flag: String,
    },
    /// Check if the inventory holds an item.
    HasItem {
        /// Item label.
        item: String,
    },
    /// Check if health is at or below a threshold.
    HealthAtMost {
        /// Inclusive upper bound.
        value: i32,
    },
    /// Check if health is strictly above a threshold.
    HealthAbove {
        /// Exclusive lower bound.
        value: i32,
    },
    /// Check if affinity with an entity is at least a value.
    RelationshipAtLeast {
        /// Entity name.
        entity: String,
        /// Inclusive lower bound.
        value: i32,
    },
    /// Check if affinity with an entity is below a value.
    RelationshipBelow {
        /// Entity name.
        entity: String,
        /// Exclusive upper bound.
        value: i32,
    },
    /// Check if the current node is a specific node.
    AtNode {
        /// Node id.
        node: String,
    },
    /// Check if a node has been visited.
    Visited {
        /// Node id.
        node: String,
    },
    /// Check the current location label.
    AtLocation {
        /// Location label.
        location: String,
    },
    /// Logical NOT.
    Not {
        /// Negated condition.
        condition: Box<Condition>,
    },
    /// Logical AND. Empty is true.
    All {
        /// Conditions that must all hold.
        conditions: Vec<Condition>,
    },
    /// Logical OR. Empty is false.
    Any {
        /// Conditions of which one must hold.
        conditions: Vec<Condition>,
    },
    /// Always true.
    #[default]
    Always,
}

impl Condition {
    /// Evaluate the condition against the current state.
    pub fn evaluate(&self, state: &PlayState) -> bool {
        match self {
            Condition::FlagSet { flag } => state.flag(flag),
            Condition::FlagUnset { flag } => !state.flag(flag),
            Condition::HasItem { item } => state.has_item(item),
            Condition::HealthAtMost { value } => state.health <= *value,
            Condition::HealthAbove { value } => state.health > *value,
            Condition::RelationshipAtLeast { entity, value } => {
                state.relationship(entity) >= *value
            }
            Condition::RelationshipBelow { entity, value } => state.relationship(entity) < *value,
            Condition::AtNode { node } => state.current_node_id == *node,
            Condition::Visited { node } => state.has_visited(node),
            Condition::AtLocation { location } => state.location.eq_ignore_ascii_case(location),
            Condition::Not { condition } => !condition.evaluate(state),
            Condition::All { conditions } => conditions.iter().all(|c| c.evaluate(state)),
            Condition::Any { conditions } => conditions.iter().any(|c| c.evaluate(state)),
            Condition::Always => true,
        }
    }

    /// Node ids this condition refers to, for integrity checks.
    pub fn referenced_nodes(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_nodes(&mut out);
        out
    }

    fn collect_nodes<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Condition::AtNode { node } | Condition::Visited { node } => out.push(node),
            Condition::Not { condition } => condition.collect_nodes(out),
            Condition::All { conditions } | Condition::Any { conditions } => {
                for c in conditions {
                    c.collect_nodes(out);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn state() -> PlayState {
        PlayState::new("shelter_1", Utc::now())
    }

    #[test]
    fn flags() {
        let mut s = state();
        let set = Condition::FlagSet {
            flag: "isInjured".to_string(),
        };
        let unset = Condition::FlagUnset {
            flag: "isInjured".to_string(),
        };
        assert!(!set.evaluate(&s));
        assert!(unset.evaluate(&s));

        s.set_flag("isInjured", true);
        assert!(set.evaluate(&s));
        assert!(!unset.evaluate(&s));
    }

    #[test]
    fn health_thresholds() {
        let mut s = state();
        let low = Condition::HealthAtMost { value: 30 };
        let high = Condition::HealthAbove { value: 30 };
        assert!(!low.evaluate(&s));
        assert!(high.evaluate(&s));

        s.adjust_health(-70);
        assert!(low.evaluate(&s));
        assert!(!high.evaluate(&s));
    }

    #[test]
    fn node_and_location() {
        let mut s = state();
        s.visit("shelter_1");
        s.location = "Storage Bunker".to_string();

        assert!(
            Condition::AtNode {
                node: "shelter_1".to_string()
            }
            .evaluate(&s)
        );
        assert!(
            Condition::Visited {
                node: "shelter_1".to_string()
            }
            .evaluate(&s)
        );
        assert!(
            Condition::AtLocation {
                location: "storage bunker".to_string()
            }
            .evaluate(&s)
        );
    }

    #[test]
    fn logical_combinators() {
        let mut s = state();
        s.set_flag("a", true);

        let a = Condition::FlagSet {
            flag: "a".to_string(),
        };
        let b = Condition::FlagSet {
            flag: "b".to_string(),
        };

        let all = Condition::All {
            conditions: vec![a.clone(), b.clone()],
        };
        let any = Condition::Any {
            conditions: vec![a.clone(), b.clone()],
        };
        let not_b = Condition::Not {
            condition: Box::new(b),
        };

        assert!(!all.evaluate(&s));
        assert!(any.evaluate(&s));
        assert!(not_b.evaluate(&s));
        assert!(
            Condition::All {
                conditions: Vec::new()
            }
            .evaluate(&s)
        );
        assert!(
            !Condition::Any {
                conditions: Vec::new()
            }
            .evaluate(&s)
        );
    }

    #[test]
    fn parses_tagged_json() {
        let json = r#"{"check": "any", "conditions": [
            {"check": "health_at_most", "value": 30},
            {"check": "flag_set", "flag": "trapped"}
        ]}"#;
        let cond: Condition = serde_json::from_str(json).unwrap();
        let mut s = state();
        assert!(!cond.evaluate(&s));
        s.set_flag("trapped", true);
        assert!(cond.evaluate(&s));
    }

    #[test]
    fn collects_referenced_nodes() {
        let cond = Condition::Any {
            conditions: vec![
                Condition::AtNode {
                    node: "ending_good".to_string(),
                },
                Condition::Not {
                    condition: Box::new(Condition::Visited {
                        node: "bunker".to_string(),
                    }),
                },
            ],
        };
        assert_eq!(cond.referenced_nodes(), vec!["ending_good", "bunker"]);
    }
}
