//! Status code classification.
//!
//! The device reports a numeric code with most responses. Each code in the
//! table maps to exactly one [`Category`]; anything else is
//! [`Category::Unknown`] and fatal.

use std::fmt::{self, Display, Formatter};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    BadRequest,
    Forbidden,
    NotFound,
    NotUnique,
    ReferenceCountNonZero,
    Malformed,
    Success,
    Timeout,
    Internal,
    Unknown,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::BadRequest => "bad-request",
            Category::Forbidden => "forbidden",
            Category::NotFound => "not-found",
            Category::NotUnique => "not-unique",
            Category::ReferenceCountNonZero => "reference-count-nonzero",
            Category::Malformed => "malformed",
            Category::Success => "success",
            Category::Timeout => "timeout",
            Category::Internal => "internal",
            Category::Unknown => "unknown",
        }
    }

    /// Failures the caller can act on by changing the request or the
    /// configuration, as opposed to device or credential problems.
    pub fn is_recoverable(self) -> bool {
        matches!(
            self,
            Category::BadRequest
                | Category::NotFound
                | Category::NotUnique
                | Category::ReferenceCountNonZero
                | Category::Timeout
        )
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CodeEntry {
    pub code: &'static str,
    pub category: Category,
    pub description: &'static str,
}

const INTERNAL: &str = "Internal error - Check with technical support when seeing these errors.";

static CODE_TABLE: &[CodeEntry] = &[
    CodeEntry {
        code: "400",
        category: Category::BadRequest,
        description: "Bad request - Returned when a required parameter is missing, an illegal parameter value is used.",
    },
    CodeEntry {
        code: "403",
        category: Category::Forbidden,
        description: "Forbidden - Returned for authentication or authorization errors including invalid key or insufficient admin access rights.",
    },
    CodeEntry {
        code: "1",
        category: Category::BadRequest,
        description: "Unknown command - The specific config or operational command is not recognized.",
    },
    CodeEntry { code: "2", category: Category::Internal, description: INTERNAL },
    CodeEntry { code: "3", category: Category::Internal, description: INTERNAL },
    CodeEntry { code: "4", category: Category::Internal, description: INTERNAL },
    CodeEntry { code: "5", category: Category::Internal, description: INTERNAL },
    CodeEntry {
        code: "6",
        category: Category::Malformed,
        description: "Bad Xpath - The xpath specified in one or more attributes of the command is invalid.",
    },
    CodeEntry {
        code: "7",
        category: Category::NotFound,
        description: "Object not present - Object specified by the xpath is not present. For example, entry[@name='value'] where no object with name 'value' is present.",
    },
    CodeEntry {
        code: "8",
        category: Category::NotUnique,
        description: "Object not unique - For commands that operate on a single object, the specified object is not unique.",
    },
    CodeEntry {
        code: "10",
        category: Category::ReferenceCountNonZero,
        description: "Reference count not zero - Object cannot be deleted as there are other objects that refer to it. For example, address object still in use in policy.",
    },
    CodeEntry { code: "11", category: Category::Internal, description: INTERNAL },
    CodeEntry {
        code: "12",
        category: Category::Malformed,
        description: "Invalid object - Xpath or element values provided are not complete.",
    },
    CodeEntry {
        code: "14",
        category: Category::BadRequest,
        description: "Operation not possible - Operation is allowed but not possible in this case. For example, moving a rule up one position when it is already at the top.",
    },
    CodeEntry {
        code: "15",
        category: Category::Forbidden,
        description: "Operation denied - Operation is not allowed. For example, admin not allowed to delete own account, running a command that is not allowed on a passive device.",
    },
    CodeEntry {
        code: "16",
        category: Category::Forbidden,
        description: "Unauthorized - The API role does not have access rights to run this query.",
    },
    CodeEntry {
        code: "17",
        category: Category::BadRequest,
        description: "Invalid command - Invalid command or parameters.",
    },
    CodeEntry {
        code: "18",
        category: Category::Malformed,
        description: "Malformed command - The XML is malformed.",
    },
    CodeEntry {
        code: "19",
        category: Category::Success,
        description: "Success - Command succeeded.",
    },
    CodeEntry {
        code: "20",
        category: Category::Success,
        description: "Success - Command succeeded.",
    },
    CodeEntry { code: "21", category: Category::Internal, description: INTERNAL },
    CodeEntry {
        code: "22",
        category: Category::Timeout,
        description: "Session timed out - The session for this query timed out.",
    },
];

/// Every code with a fixed classification.
pub fn code_table() -> &'static [CodeEntry] {
    CODE_TABLE
}

pub fn lookup(code: &str) -> Option<&'static CodeEntry> {
    let code = code.trim();
    CODE_TABLE.iter().find(|entry| entry.code == code)
}

/// Result of classifying one response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum Outcome {
    Success,
    Recoverable { category: Category, message: String },
    Fatal { category: Category, message: String },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }

    pub fn category(&self) -> Category {
        match self {
            Outcome::Success => Category::Success,
            Outcome::Recoverable { category, .. } | Outcome::Fatal { category, .. } => *category,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Outcome::Success => None,
            Outcome::Recoverable { message, .. } | Outcome::Fatal { message, .. } => Some(message),
        }
    }
}

/// Classify a status code. Known codes carry the table description; unknown
/// codes are fatal and carry `raw_message` unchanged.
pub fn classify(code: &str, raw_message: &str) -> Outcome {
    match lookup(code) {
        Some(entry) if entry.category == Category::Success => Outcome::Success,
        Some(entry) if entry.category.is_recoverable() => Outcome::Recoverable {
            category: entry.category,
            message: entry.description.to_string(),
        },
        Some(entry) => Outcome::Fatal {
            category: entry.category,
            message: entry.description.to_string(),
        },
        None => Outcome::Fatal {
            category: Category::Unknown,
            message: raw_message.to_string(),
        },
    }
}
