//! Filter and ordering operators for structured queries

/// Operator for field filters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    /// Equal to
    Eq,

    /// Not equal to
    Neq,

    /// Greater than
    Gt,

    /// Greater than or equal to
    Gte,

    /// Less than
    Lt,

    /// Less than or equal to
    Lte,
}

impl FilterOperator {
    /// Convert the operator to its wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "EQUAL",
            FilterOperator::Neq => "NOT_EQUAL",
            FilterOperator::Gt => "GREATER_THAN",
            FilterOperator::Gte => "GREATER_THAN_OR_EQUAL",
            FilterOperator::Lt => "LESS_THAN",
            FilterOperator::Lte => "LESS_THAN_OR_EQUAL",
        }
    }

    /// Range and not-equal operators
    pub fn is_inequality(&self) -> bool {
        !matches!(self, FilterOperator::Eq)
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Ascending => "ASCENDING",
            Direction::Descending => "DESCENDING",
        }
    }
}
