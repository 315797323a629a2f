//! Value-range constraints attached to specifications.

use std::cmp::Ordering;
use std::fmt;

use crate::spec::SpecificationError;
use crate::types::{ScalarValue, ValueKind};

/// Constraint every bound value must satisfy.
///
/// # Examples
///
/// ```
/// use argspec_core::{Range, ScalarValue};
///
/// let percent = Range::continuous(ScalarValue::integer(0), ScalarValue::integer(100));
/// assert!(percent.contains(&ScalarValue::integer(100)));
/// assert!(!percent.contains(&ScalarValue::integer(101)));
///
/// let format = Range::discrete(vec![ScalarValue::text("json"), ScalarValue::text("yaml")]);
/// assert!(format.contains(&ScalarValue::text("yaml")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Range {
    /// Inclusive `[lower, upper]` interval.
    Continuous {
        lower: ScalarValue,
        upper: ScalarValue,
    },
    /// Explicit set of allowed values.
    Discrete { values: Vec<ScalarValue> },
}

impl Range {
    pub fn continuous(lower: ScalarValue, upper: ScalarValue) -> Self {
        Self::Continuous { lower, upper }
    }

    pub fn discrete(values: Vec<ScalarValue>) -> Self {
        Self::Discrete { values }
    }

    /// Returns `true` when `value` satisfies the constraint. Values that do
    /// not compare with the bounds are never contained.
    pub fn contains(&self, value: &ScalarValue) -> bool {
        match self {
            Self::Continuous { lower, upper } => {
                matches!(
                    value.compare(lower),
                    Some(Ordering::Greater | Ordering::Equal)
                ) && matches!(value.compare(upper), Some(Ordering::Less | Ordering::Equal))
            }
            Self::Discrete { values } => values
                .iter()
                .any(|allowed| value.compare(allowed) == Some(Ordering::Equal)),
        }
    }

    /// Checks that the range is well formed for a specification of `kind`.
    pub(crate) fn check(&self, kind: ValueKind) -> Result<(), SpecificationError> {
        let bounds: Vec<&ScalarValue> = match self {
            Self::Continuous { lower, upper } => vec![lower, upper],
            Self::Discrete { values } => values.iter().collect(),
        };
        if let Some(bad) = bounds.iter().find(|v| v.kind() != kind) {
            return Err(SpecificationError::RangeTypeMismatch {
                expected: kind,
                found: bad.kind(),
            });
        }

        match self {
            Self::Continuous { lower, upper } if lower.compare(upper) == Some(Ordering::Greater) => {
                Err(SpecificationError::InvalidRange(self.to_string()))
            }
            Self::Discrete { values } if values.is_empty() => {
                Err(SpecificationError::InvalidRange(self.to_string()))
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Continuous { lower, upper } => write!(f, "[{lower}, {upper}]"),
            Self::Discrete { values } => {
                let items: Vec<String> = values.iter().map(ToString::to_string).collect();
                write!(f, "{{{}}}", items.join(", "))
            }
        }
    }
}
