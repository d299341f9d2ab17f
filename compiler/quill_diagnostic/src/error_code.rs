//! Error codes for all binder and analysis diagnostics.
//!
//! Each code is a stable identifier (e.g. `E2013`) with the first digit
//! indicating the error family. Codes never change meaning once shipped;
//! distinct failure sites get distinct codes.

use std::fmt;

/// Error codes for all compiler diagnostics.
///
/// Format: E#### where the first digit indicates the family:
/// - E1xxx: Declaration errors
/// - E2xxx: Resolution errors
/// - E3xxx: Type errors
/// - E4xxx: Structural and control-flow errors
/// - E5xxx: Entry-point errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Declaration Errors (E1xxx)
    /// Variable or parameter already declared
    E1001,
    /// Type already declared
    E1002,
    /// Method already declared
    E1003,
    /// Field already declared
    E1004,
    /// Member shares the name of its containing class
    E1005,
    /// Method and field with the same name
    E1006,
    /// Method hides an inherited method that is not virtual
    E1007,
    /// Method hiding a virtual base method is missing `override`
    E1008,
    /// `override` method has no matching base method
    E1009,

    // Resolution Errors (E2xxx)
    /// Undefined name
    E2001,
    /// Undefined type
    E2002,
    /// Undefined method
    E2003,
    /// Undefined member
    E2004,
    /// Name does not denote a value
    E2005,
    /// Expression is not callable
    E2006,
    /// Type arguments supplied to a non-generic type
    E2010,
    /// Generic type used without type arguments
    E2011,
    /// Wrong number of type arguments
    E2012,
    /// Type argument violates a generic constraint
    E2013,
    /// Method type argument violates a generic constraint
    E2014,
    /// Wrong number of method type arguments
    E2015,
    /// Static member accessed through an instance
    E2016,
    /// Instance member accessed from a static context
    E2017,
    /// Constraint clause names an unknown type parameter
    E2018,
    /// `this` used in a static context
    E2019,

    // Type Errors (E3xxx)
    /// No conversion exists between the types
    E3001,
    /// Conversion exists but is not implicit
    E3002,
    /// Assignment to a readonly variable
    E3003,
    /// Binary operator not defined for the operand types
    E3004,
    /// Unary operator not defined for the operand type
    E3005,
    /// Invalid assignment target
    E3006,
    /// Wrong number of arguments
    E3007,
    /// Variable declaration needs a type annotation or an initializer
    E3008,
    /// Readonly variable must be initialized
    E3009,
    /// Type cannot be constructed
    E3010,

    // Structural and Control-Flow Errors (E4xxx)
    /// Class inherits from itself
    E4001,
    /// Inheritance-diamond member conflict
    E4002,
    /// Only assignment and call expressions may be used as statements
    E4003,
    /// `break` outside a loop
    E4004,
    /// `continue` outside a loop
    E4005,
    /// `return` with a value in a void method
    E4006,
    /// `return` missing a value in a non-void method
    E4007,
    /// Not all code paths return a value
    E4008,
    /// Variable used before it is definitely assigned
    E4009,
    /// Cannot inherit from a builtin type
    E4010,
    /// Cannot inherit from a type parameter
    E4011,

    // Entry-Point Errors (E5xxx)
    /// No `main` method found
    E5001,
    /// `main` method has the wrong signature
    E5002,
    /// More than one `main` method
    E5003,
}

impl ErrorCode {
    /// All error code variants, for exhaustive testing.
    ///
    /// Kept in sync with `as_str()` which is exhaustive (Rust match
    /// enforces it). The `all_variants_classified` test catches omissions.
    pub const ALL: &[ErrorCode] = &[
        // Declaration
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E1003,
        ErrorCode::E1004,
        ErrorCode::E1005,
        ErrorCode::E1006,
        ErrorCode::E1007,
        ErrorCode::E1008,
        ErrorCode::E1009,
        // Resolution
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E2003,
        ErrorCode::E2004,
        ErrorCode::E2005,
        ErrorCode::E2006,
        ErrorCode::E2010,
        ErrorCode::E2011,
        ErrorCode::E2012,
        ErrorCode::E2013,
        ErrorCode::E2014,
        ErrorCode::E2015,
        ErrorCode::E2016,
        ErrorCode::E2017,
        ErrorCode::E2018,
        ErrorCode::E2019,
        // Type
        ErrorCode::E3001,
        ErrorCode::E3002,
        ErrorCode::E3003,
        ErrorCode::E3004,
        ErrorCode::E3005,
        ErrorCode::E3006,
        ErrorCode::E3007,
        ErrorCode::E3008,
        ErrorCode::E3009,
        ErrorCode::E3010,
        // Structural
        ErrorCode::E4001,
        ErrorCode::E4002,
        ErrorCode::E4003,
        ErrorCode::E4004,
        ErrorCode::E4005,
        ErrorCode::E4006,
        ErrorCode::E4007,
        ErrorCode::E4008,
        ErrorCode::E4009,
        ErrorCode::E4010,
        ErrorCode::E4011,
        // Entry point
        ErrorCode::E5001,
        ErrorCode::E5002,
        ErrorCode::E5003,
    ];

    /// Get the code as a string (e.g. "E2013").
    pub fn as_str(&self) -> &'static str {
        match self {
            // Declaration
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E1006 => "E1006",
            ErrorCode::E1007 => "E1007",
            ErrorCode::E1008 => "E1008",
            ErrorCode::E1009 => "E1009",
            // Resolution
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2010 => "E2010",
            ErrorCode::E2011 => "E2011",
            ErrorCode::E2012 => "E2012",
            ErrorCode::E2013 => "E2013",
            ErrorCode::E2014 => "E2014",
            ErrorCode::E2015 => "E2015",
            ErrorCode::E2016 => "E2016",
            ErrorCode::E2017 => "E2017",
            ErrorCode::E2018 => "E2018",
            ErrorCode::E2019 => "E2019",
            // Type
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E3003 => "E3003",
            ErrorCode::E3004 => "E3004",
            ErrorCode::E3005 => "E3005",
            ErrorCode::E3006 => "E3006",
            ErrorCode::E3007 => "E3007",
            ErrorCode::E3008 => "E3008",
            ErrorCode::E3009 => "E3009",
            ErrorCode::E3010 => "E3010",
            // Structural
            ErrorCode::E4001 => "E4001",
            ErrorCode::E4002 => "E4002",
            ErrorCode::E4003 => "E4003",
            ErrorCode::E4004 => "E4004",
            ErrorCode::E4005 => "E4005",
            ErrorCode::E4006 => "E4006",
            ErrorCode::E4007 => "E4007",
            ErrorCode::E4008 => "E4008",
            ErrorCode::E4009 => "E4009",
            ErrorCode::E4010 => "E4010",
            ErrorCode::E4011 => "E4011",
            // Entry point
            ErrorCode::E5001 => "E5001",
            ErrorCode::E5002 => "E5002",
            ErrorCode::E5003 => "E5003",
        }
    }

    /// Check if this is a declaration error (E1xxx range).
    pub fn is_declaration_error(&self) -> bool {
        self.as_str().as_bytes()[1] == b'1'
    }

    /// Check if this is a resolution error (E2xxx range).
    pub fn is_resolution_error(&self) -> bool {
        self.as_str().as_bytes()[1] == b'2'
    }

    /// Check if this is a type error (E3xxx range).
    pub fn is_type_error(&self) -> bool {
        self.as_str().as_bytes()[1] == b'3'
    }

    /// Check if this is a structural or control-flow error (E4xxx range).
    pub fn is_structural_error(&self) -> bool {
        self.as_str().as_bytes()[1] == b'4'
    }

    /// Check if this is an entry-point error (E5xxx range).
    pub fn is_entry_point_error(&self) -> bool {
        self.as_str().as_bytes()[1] == b'5'
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse an error code string like `"E2013"`.
///
/// Case-insensitive. Derived from [`ErrorCode::ALL`] and
/// [`ErrorCode::as_str()`], so it is automatically exhaustive.
impl std::str::FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        Self::ALL
            .iter()
            .find(|code| code.as_str() == upper)
            .copied()
            .ok_or(())
    }
}
