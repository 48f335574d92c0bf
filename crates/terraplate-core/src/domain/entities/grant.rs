use std::fmt;

use crate::domain::value_objects::ServiceType;

/// A `(service type, instance name)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceRef {
    pub service: ServiceType,
    pub instance: String,
}

impl InstanceRef {
    pub fn new(service: ServiceType, instance: impl Into<String>) -> Self {
        Self {
            service,
            instance: instance.into(),
        }
    }
}

impl fmt::Display for InstanceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.service, self.instance)
    }
}

/// A resolved permission: `holder` may perform `actions` on `target`.
///
/// The holder is always the update side of the relation; its instance record
/// is the one that stores the grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    pub holder: InstanceRef,
    pub target: InstanceRef,
    pub actions: Vec<String>,
}

impl fmt::Display for Grant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} [{}]",
            self.holder,
            self.target,
            self.actions.join(", ")
        )
    }
}
