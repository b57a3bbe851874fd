mod result_precedence;

pub use result_precedence::ResultPrecedence;
