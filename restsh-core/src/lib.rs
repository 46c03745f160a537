pub mod ast;
pub mod client;
pub mod completer;
pub mod error;
pub mod format;
pub mod functions;
pub mod fuzzy;
pub mod lexer;
pub mod normalize;
pub mod parser;
pub mod spec;
pub mod token;
pub mod url_lexer;
pub mod vm;
