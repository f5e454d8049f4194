//! Thread-local parser reuse for multi-unit batches.
//!
//! Source units are independent, so batches may be processed by any number
//! of threads; each thread lazily creates one parser and reuses it for
//! every unit it handles.

use crate::parser::{ParserError, RustParser};
use std::cell::RefCell;

thread_local! {
    static PARSER: RefCell<Option<RustParser>> = const { RefCell::new(None) };
}

/// Run `f` with this thread's parser, creating it on first use.
pub fn with_parser<F, R>(f: F) -> Result<R, ParserError>
where
    F: FnOnce(&mut RustParser) -> R,
{
    PARSER.with(|cell| {
        let mut slot = cell.borrow_mut();
        if slot.is_none() {
            *slot = Some(RustParser::new()?);
        }
        Ok(f(slot.as_mut().expect("parser was just initialized above")))
    })
}
