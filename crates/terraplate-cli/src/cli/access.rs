//! `--access TYPE:INSTANCE:LEVEL[+LEVEL]` values.

use std::fmt;
use std::str::FromStr;

use terraplate_core::domain::ServiceType;

/// One scripted grant: connect to `instance` of `service` with `levels`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessSpec {
    pub service: ServiceType,
    pub instance: String,
    pub levels: Vec<String>,
}

impl FromStr for AccessSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        let (Some(service), Some(instance), Some(levels)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(format!(
                "expected TYPE:INSTANCE:LEVEL[+LEVEL], got '{s}'"
            ));
        };

        let service = service
            .trim()
            .parse::<ServiceType>()
            .map_err(|e| e.to_string())?;

        let instance = instance.trim();
        if instance.is_empty() {
            return Err(format!("missing instance name in '{s}'"));
        }

        let levels: Vec<String> = levels
            .split('+')
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        if levels.is_empty() {
            return Err(format!("no access level given in '{s}'"));
        }

        Ok(Self {
            service,
            instance: instance.to_string(),
            levels,
        })
    }
}

impl fmt::Display for AccessSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.service,
            self.instance,
            self.levels.join("+")
        )
    }
}
